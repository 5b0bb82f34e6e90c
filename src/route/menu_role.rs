use std::sync::Arc;

use chrono::Local;
use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::{security::BearerAuthorization, utils::datetime_to_string_opt},
    model::menu_role::MenuRole,
    repository::{
        group::get_group_by_id,
        menu::get_menu_by_id,
        menu_role::{get_menu_role, get_menu_role_by_group, soft_delete_menu_role, upsert_menu_role},
    },
    route::common::{audit_users, begin_authorized, internal_error, RequestError},
    schema::{
        common::{BadRequestResponse, NotFoundResponse, UnauthorizedResponse},
        menu_role::{
            MenuRoleDeleteResponses, MenuRoleDetail, MenuRoleListResponses,
            MenuRoleUpsertRequest, MenuRoleUpsertResponses,
        },
    },
    AppState,
};

const LOCATION: &str = "route.menu_role";

#[derive(Tags)]
enum ApiMenuRoleTags {
    MenuRole,
}

async fn menu_role_detail(
    tx: &mut Transaction<'_, Postgres>,
    menu_role: MenuRole,
) -> anyhow::Result<MenuRoleDetail> {
    // a grant may outlive its menu
    let menu = get_menu_by_id(tx, &menu_role.menu_id).await?;
    let (created_by, updated_by) =
        audit_users(tx, menu_role.created_by, menu_role.updated_by).await?;
    Ok(MenuRoleDetail {
        id: menu_role.id.to_string(),
        menu_id: menu_role.menu_id.to_string(),
        menu_name: menu.as_ref().map(|x| x.menu_name.clone()),
        menu_url: menu.map(|x| x.menu_url),
        group_id: menu_role.group_id.to_string(),
        can_read: menu_role.can_read,
        can_write: menu_role.can_write,
        can_update: menu_role.can_update,
        can_delete: menu_role.can_delete,
        created_by,
        updated_by,
        created_date: datetime_to_string_opt(menu_role.created_date),
        updated_date: datetime_to_string_opt(menu_role.updated_date),
    })
}

pub struct ApiMenuRole;

#[OpenApi]
impl ApiMenuRole {
    /// Grants of a group
    #[oai(path = "/menu-role/", method = "get", tag = "ApiMenuRoleTags::MenuRole")]
    async fn list_menu_role_api(
        &self,
        Query(group_id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> MenuRoleListResponses {
        let (mut tx, _) = match begin_authorized(&state, auth, LOCATION, "list_menu_role_api").await
        {
            Ok(val) => val,
            Err(RequestError::Unauthorized) => {
                return MenuRoleListResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Err(RequestError::InternalServerError(err)) => {
                return MenuRoleListResponses::InternalServerError(Json(err))
            }
        };

        let not_found = Json(NotFoundResponse {
            message: format!("group with id = {} not found", group_id),
        });
        let Ok(id) = Uuid::parse_str(&group_id) else {
            return MenuRoleListResponses::NotFound(not_found);
        };
        match get_group_by_id(&mut tx, &id).await {
            Ok(Some(_)) => {}
            Ok(None) => return MenuRoleListResponses::NotFound(not_found),
            Err(err) => {
                return MenuRoleListResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "list_menu_role_api",
                    "get_group_by_id",
                    err,
                )))
            }
        }
        let data = match get_menu_role_by_group(&mut tx, &id).await {
            Ok(val) => val,
            Err(err) => {
                return MenuRoleListResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "list_menu_role_api",
                    "get_menu_role_by_group",
                    err,
                )))
            }
        };
        let mut results: Vec<MenuRoleDetail> = vec![];
        for item in data {
            match menu_role_detail(&mut tx, item).await {
                Ok(val) => results.push(val),
                Err(err) => {
                    return MenuRoleListResponses::InternalServerError(Json(internal_error(
                        LOCATION,
                        "list_menu_role_api",
                        "menu_role_detail",
                        err,
                    )))
                }
            }
        }
        MenuRoleListResponses::Ok(Json(results))
    }

    /// Create or replace the grant of a menu to a group
    #[oai(path = "/menu-role/", method = "post", tag = "ApiMenuRoleTags::MenuRole")]
    async fn upsert_menu_role_api(
        &self,
        Json(json): Json<MenuRoleUpsertRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> MenuRoleUpsertResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "upsert_menu_role_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return MenuRoleUpsertResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return MenuRoleUpsertResponses::InternalServerError(Json(err))
                }
            };

        let menu = match Uuid::parse_str(&json.menu_id) {
            Ok(id) => get_menu_by_id(&mut tx, &id).await,
            Err(_) => Ok(None),
        };
        let menu = match menu {
            Ok(Some(val)) => val,
            Ok(None) => {
                return MenuRoleUpsertResponses::BadRequest(Json(BadRequestResponse {
                    message: format!("menu with id = {} not found", json.menu_id),
                }))
            }
            Err(err) => {
                return MenuRoleUpsertResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "upsert_menu_role_api",
                    "get_menu_by_id",
                    err,
                )))
            }
        };
        let group = match Uuid::parse_str(&json.group_id) {
            Ok(id) => get_group_by_id(&mut tx, &id).await,
            Err(_) => Ok(None),
        };
        let group = match group {
            Ok(Some(val)) => val,
            Ok(None) => {
                return MenuRoleUpsertResponses::BadRequest(Json(BadRequestResponse {
                    message: format!("group with id = {} not found", json.group_id),
                }))
            }
            Err(err) => {
                return MenuRoleUpsertResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "upsert_menu_role_api",
                    "get_group_by_id",
                    err,
                )))
            }
        };

        let now = Local::now().fixed_offset();
        let menu_role = match upsert_menu_role(
            &mut tx,
            &menu.id,
            &group.id,
            json.can_read.unwrap_or(false),
            json.can_write.unwrap_or(false),
            json.can_update.unwrap_or(false),
            json.can_delete.unwrap_or(false),
            &request_user,
            &now,
        )
        .await
        {
            Ok(val) => val,
            Err(err) => {
                return MenuRoleUpsertResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "upsert_menu_role_api",
                    "upsert_menu_role",
                    err,
                )))
            }
        };
        let detail = match menu_role_detail(&mut tx, menu_role).await {
            Ok(val) => val,
            Err(err) => {
                return MenuRoleUpsertResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "upsert_menu_role_api",
                    "menu_role_detail",
                    err,
                )))
            }
        };
        if let Err(err) = tx.commit().await {
            return MenuRoleUpsertResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "upsert_menu_role_api",
                "commit transaction",
                err,
            )));
        }
        MenuRoleUpsertResponses::Ok(Json(detail))
    }

    #[oai(path = "/menu-role/", method = "delete", tag = "ApiMenuRoleTags::MenuRole")]
    async fn delete_menu_role_api(
        &self,
        Query(menu_id): Query<String>,
        Query(group_id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> MenuRoleDeleteResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "delete_menu_role_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return MenuRoleDeleteResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return MenuRoleDeleteResponses::InternalServerError(Json(err))
                }
            };

        let not_found = Json(NotFoundResponse {
            message: format!(
                "menu role with menu_id = {} and group_id = {} not found",
                menu_id, group_id
            ),
        });
        let (Ok(menu_id), Ok(group_id)) = (Uuid::parse_str(&menu_id), Uuid::parse_str(&group_id))
        else {
            return MenuRoleDeleteResponses::NotFound(not_found);
        };
        let mut menu_role = match get_menu_role(&mut tx, &menu_id, &group_id).await {
            Ok(Some(val)) => val,
            Ok(None) => return MenuRoleDeleteResponses::NotFound(not_found),
            Err(err) => {
                return MenuRoleDeleteResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "delete_menu_role_api",
                    "get_menu_role",
                    err,
                )))
            }
        };
        let now = Local::now().fixed_offset();
        if let Err(err) = soft_delete_menu_role(&mut tx, &mut menu_role, &request_user, &now).await
        {
            return MenuRoleDeleteResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "delete_menu_role_api",
                "soft_delete_menu_role",
                err,
            )));
        }
        if let Err(err) = tx.commit().await {
            return MenuRoleDeleteResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "delete_menu_role_api",
                "commit transaction",
                err,
            )));
        }
        MenuRoleDeleteResponses::NoContent
    }
}
