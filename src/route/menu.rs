use std::sync::Arc;

use chrono::Local;
use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::{security::BearerAuthorization, utils::datetime_to_string_opt},
    model::menu::Menu,
    repository::menu::{
        create_menu, get_dropdown_menu, get_menu_by_id, is_menu_url_taken, paginate_menu,
        soft_delete_menu, update_menu,
    },
    route::common::{audit_users, begin_authorized, internal_error, RequestError},
    schema::{
        common::{BadRequestResponse, NotFoundResponse, PaginateResponse, UnauthorizedResponse},
        menu::{
            MenuCreateResponses, MenuDeleteResponses, MenuDetail, MenuDetailResponses,
            MenuDropdownResponse, MenuDropdownResponses, MenuRequest, MenuUpdateResponses,
            PaginateMenuResponses,
        },
    },
    AppState,
};

const LOCATION: &str = "route.menu";

#[derive(Tags)]
enum ApiMenuTags {
    Menu,
}

async fn menu_detail(tx: &mut Transaction<'_, Postgres>, menu: Menu) -> anyhow::Result<MenuDetail> {
    let (created_by, updated_by) = audit_users(tx, menu.created_by, menu.updated_by).await?;
    Ok(MenuDetail {
        id: menu.id.to_string(),
        menu_name: menu.menu_name,
        menu_url: menu.menu_url,
        icon: menu.icon,
        parent_id: menu.parent_id.map(|x| x.to_string()),
        sort_order: menu.sort_order,
        is_active: menu.is_active,
        created_by,
        updated_by,
        created_date: datetime_to_string_opt(menu.created_date),
        updated_date: datetime_to_string_opt(menu.updated_date),
    })
}

struct ValidMenu {
    menu_name: String,
    menu_url: String,
    parent_id: Option<Uuid>,
}

/// The inner `Err` is a message for a 400.
async fn validate_menu_request(
    tx: &mut Transaction<'_, Postgres>,
    json: &MenuRequest,
    menu_id: Option<Uuid>,
) -> anyhow::Result<Result<ValidMenu, String>> {
    let menu_name = json.menu_name.trim().to_string();
    let menu_url = json.menu_url.trim().to_string();
    if menu_name.is_empty() || menu_url.is_empty() {
        return Ok(Err("menu_name and menu_url are required".to_string()));
    }
    if is_menu_url_taken(tx, &menu_url, menu_id).await? {
        return Ok(Err(format!("menu_url {} already exists", menu_url)));
    }
    let parent_id = match &json.parent_id {
        Some(parent_id) => {
            let Ok(id) = Uuid::parse_str(parent_id) else {
                return Ok(Err(format!("parent menu with id = {} not found", parent_id)));
            };
            if Some(id) == menu_id {
                return Ok(Err("menu cannot be its own parent".to_string()));
            }
            if get_menu_by_id(tx, &id).await?.is_none() {
                return Ok(Err(format!("parent menu with id = {} not found", parent_id)));
            }
            Some(id)
        }
        None => None,
    };
    Ok(Ok(ValidMenu {
        menu_name,
        menu_url,
        parent_id,
    }))
}

fn menu_not_found(id: &str) -> Json<NotFoundResponse> {
    Json(NotFoundResponse {
        message: format!("menu with id = {} not found", id),
    })
}

pub struct ApiMenu;

#[OpenApi]
impl ApiMenu {
    #[oai(path = "/menu/", method = "get", tag = "ApiMenuTags::Menu")]
    async fn paginate_menu_api(
        &self,
        Query(page): Query<Option<u32>>,
        Query(page_size): Query<Option<u32>>,
        Query(search): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PaginateMenuResponses {
        let (mut tx, _) = match begin_authorized(&state, auth, LOCATION, "paginate_menu_api").await
        {
            Ok(val) => val,
            Err(RequestError::Unauthorized) => {
                return PaginateMenuResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Err(RequestError::InternalServerError(err)) => {
                return PaginateMenuResponses::InternalServerError(Json(err))
            }
        };

        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(10);
        let (data, counts, page_count) = match paginate_menu(&mut tx, page, page_size, search).await
        {
            Ok(val) => val,
            Err(err) => {
                return PaginateMenuResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "paginate_menu_api",
                    "paginate_menu",
                    err,
                )))
            }
        };
        let mut results: Vec<MenuDetail> = vec![];
        for item in data {
            match menu_detail(&mut tx, item).await {
                Ok(val) => results.push(val),
                Err(err) => {
                    return PaginateMenuResponses::InternalServerError(Json(internal_error(
                        LOCATION,
                        "paginate_menu_api",
                        "menu_detail",
                        err,
                    )))
                }
            }
        }
        PaginateMenuResponses::Ok(Json(PaginateResponse {
            counts,
            page: page.max(1),
            page_count,
            page_size,
            results,
        }))
    }

    #[oai(path = "/menu/dropdown/", method = "get", tag = "ApiMenuTags::Menu")]
    async fn dropdown_menu_api(
        &self,
        Query(limit): Query<Option<u32>>,
        Query(search): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> MenuDropdownResponses {
        let (mut tx, _) = match begin_authorized(&state, auth, LOCATION, "dropdown_menu_api").await
        {
            Ok(val) => val,
            Err(RequestError::Unauthorized) => {
                return MenuDropdownResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Err(RequestError::InternalServerError(err)) => {
                return MenuDropdownResponses::InternalServerError(Json(err))
            }
        };

        match get_dropdown_menu(&mut tx, limit, search).await {
            Ok(data) => MenuDropdownResponses::Ok(Json(
                data.into_iter()
                    .map(|x| MenuDropdownResponse {
                        id: x.id.to_string(),
                        menu_name: x.menu_name,
                        menu_url: x.menu_url,
                    })
                    .collect(),
            )),
            Err(err) => MenuDropdownResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "dropdown_menu_api",
                "get_dropdown_menu",
                err,
            ))),
        }
    }

    #[oai(path = "/menu/detail/", method = "get", tag = "ApiMenuTags::Menu")]
    async fn detail_menu_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> MenuDetailResponses {
        let (mut tx, _) = match begin_authorized(&state, auth, LOCATION, "detail_menu_api").await {
            Ok(val) => val,
            Err(RequestError::Unauthorized) => {
                return MenuDetailResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Err(RequestError::InternalServerError(err)) => {
                return MenuDetailResponses::InternalServerError(Json(err))
            }
        };

        let Ok(menu_id) = Uuid::parse_str(&id) else {
            return MenuDetailResponses::NotFound(menu_not_found(&id));
        };
        let menu = match get_menu_by_id(&mut tx, &menu_id).await {
            Ok(Some(val)) => val,
            Ok(None) => return MenuDetailResponses::NotFound(menu_not_found(&id)),
            Err(err) => {
                return MenuDetailResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "detail_menu_api",
                    "get_menu_by_id",
                    err,
                )))
            }
        };
        match menu_detail(&mut tx, menu).await {
            Ok(val) => MenuDetailResponses::Ok(Json(val)),
            Err(err) => MenuDetailResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "detail_menu_api",
                "menu_detail",
                err,
            ))),
        }
    }

    #[oai(path = "/menu/", method = "post", tag = "ApiMenuTags::Menu")]
    async fn create_menu_api(
        &self,
        Json(json): Json<MenuRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> MenuCreateResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "create_menu_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return MenuCreateResponses::Unauthorized(Json(UnauthorizedResponse::default()))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return MenuCreateResponses::InternalServerError(Json(err))
                }
            };

        let valid = match validate_menu_request(&mut tx, &json, None).await {
            Ok(Ok(val)) => val,
            Ok(Err(message)) => {
                return MenuCreateResponses::BadRequest(Json(BadRequestResponse { message }))
            }
            Err(err) => {
                return MenuCreateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "create_menu_api",
                    "validate_menu_request",
                    err,
                )))
            }
        };
        let now = Local::now().fixed_offset();
        let menu = Menu {
            id: Uuid::now_v7(),
            menu_name: valid.menu_name,
            menu_url: valid.menu_url,
            icon: json.icon,
            parent_id: valid.parent_id,
            sort_order: json.sort_order.unwrap_or(0),
            is_active: true,
            created_by: Some(request_user.id),
            updated_by: Some(request_user.id),
            created_date: Some(now),
            updated_date: Some(now),
        };
        if let Err(err) = create_menu(&mut tx, &menu).await {
            return MenuCreateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "create_menu_api",
                "create_menu",
                err,
            )));
        }
        let detail = match menu_detail(&mut tx, menu).await {
            Ok(val) => val,
            Err(err) => {
                return MenuCreateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "create_menu_api",
                    "menu_detail",
                    err,
                )))
            }
        };
        if let Err(err) = tx.commit().await {
            return MenuCreateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "create_menu_api",
                "commit transaction",
                err,
            )));
        }
        MenuCreateResponses::Ok(Json(detail))
    }

    #[oai(path = "/menu/", method = "put", tag = "ApiMenuTags::Menu")]
    async fn update_menu_api(
        &self,
        Query(id): Query<String>,
        Json(json): Json<MenuRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> MenuUpdateResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "update_menu_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return MenuUpdateResponses::Unauthorized(Json(UnauthorizedResponse::default()))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return MenuUpdateResponses::InternalServerError(Json(err))
                }
            };

        let Ok(menu_id) = Uuid::parse_str(&id) else {
            return MenuUpdateResponses::NotFound(menu_not_found(&id));
        };
        let mut menu = match get_menu_by_id(&mut tx, &menu_id).await {
            Ok(Some(val)) => val,
            Ok(None) => return MenuUpdateResponses::NotFound(menu_not_found(&id)),
            Err(err) => {
                return MenuUpdateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "update_menu_api",
                    "get_menu_by_id",
                    err,
                )))
            }
        };
        let valid = match validate_menu_request(&mut tx, &json, Some(menu.id)).await {
            Ok(Ok(val)) => val,
            Ok(Err(message)) => {
                return MenuUpdateResponses::BadRequest(Json(BadRequestResponse { message }))
            }
            Err(err) => {
                return MenuUpdateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "update_menu_api",
                    "validate_menu_request",
                    err,
                )))
            }
        };
        menu.menu_name = valid.menu_name;
        menu.menu_url = valid.menu_url;
        menu.icon = json.icon;
        menu.parent_id = valid.parent_id;
        menu.sort_order = json.sort_order.unwrap_or(menu.sort_order);

        let now = Local::now().fixed_offset();
        if let Err(err) = update_menu(&mut tx, &mut menu, &request_user, &now).await {
            return MenuUpdateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "update_menu_api",
                "update_menu",
                err,
            )));
        }
        let detail = match menu_detail(&mut tx, menu).await {
            Ok(val) => val,
            Err(err) => {
                return MenuUpdateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "update_menu_api",
                    "menu_detail",
                    err,
                )))
            }
        };
        if let Err(err) = tx.commit().await {
            return MenuUpdateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "update_menu_api",
                "commit transaction",
                err,
            )));
        }
        MenuUpdateResponses::Ok(Json(detail))
    }

    #[oai(path = "/menu/", method = "delete", tag = "ApiMenuTags::Menu")]
    async fn delete_menu_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> MenuDeleteResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "delete_menu_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return MenuDeleteResponses::Unauthorized(Json(UnauthorizedResponse::default()))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return MenuDeleteResponses::InternalServerError(Json(err))
                }
            };

        let Ok(menu_id) = Uuid::parse_str(&id) else {
            return MenuDeleteResponses::NotFound(menu_not_found(&id));
        };
        let mut menu = match get_menu_by_id(&mut tx, &menu_id).await {
            Ok(Some(val)) => val,
            Ok(None) => return MenuDeleteResponses::NotFound(menu_not_found(&id)),
            Err(err) => {
                return MenuDeleteResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "delete_menu_api",
                    "get_menu_by_id",
                    err,
                )))
            }
        };
        let now = Local::now().fixed_offset();
        if let Err(err) = soft_delete_menu(&mut tx, &mut menu, &request_user, &now).await {
            return MenuDeleteResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "delete_menu_api",
                "soft_delete_menu",
                err,
            )));
        }
        if let Err(err) = tx.commit().await {
            return MenuDeleteResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "delete_menu_api",
                "commit transaction",
                err,
            )));
        }
        MenuDeleteResponses::NoContent
    }
}
