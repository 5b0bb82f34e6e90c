use std::sync::Arc;

use chrono::Local;
use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};
use sqlx::{Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::{
    core::{
        security::{hash_password, BearerAuthorization},
        utils::datetime_to_string_opt,
    },
    model::user::User,
    repository::{
        group::get_group_by_id,
        group_role::{get_groups_by_user, replace_user_groups},
        user::{
            create_user, get_user_by_id, is_user_name_taken, paginate_user, soft_delete_user,
            update_user,
        },
    },
    route::common::{audit_users, begin_authorized, internal_error, RequestError},
    schema::{
        common::{BadRequestResponse, NotFoundResponse, PaginateResponse, UnauthorizedResponse},
        user::{
            PaginateUserResponses, UserCreateRequest, UserCreateResponses, UserDeleteResponses,
            UserDetail, UserDetailResponses, UserGroup, UserUpdateRequest, UserUpdateResponses,
        },
    },
    AppState,
};

const LOCATION: &str = "route.user";

#[derive(Tags)]
enum ApiUserTags {
    User,
}

async fn user_detail(tx: &mut Transaction<'_, Postgres>, user: User) -> anyhow::Result<UserDetail> {
    let groups = get_groups_by_user(tx, &user.id).await?;
    let (created_by, updated_by) = audit_users(tx, user.created_by, user.updated_by).await?;
    Ok(UserDetail {
        id: user.id.to_string(),
        user_name: user.user_name,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        external_id: user.external_id,
        is_active: user.is_active,
        groups: groups
            .into_iter()
            .map(|x| UserGroup {
                id: x.id.to_string(),
                group_name: x.group_name,
            })
            .collect(),
        created_by,
        updated_by,
        created_date: datetime_to_string_opt(user.created_date),
        updated_date: datetime_to_string_opt(user.updated_date),
    })
}

/// Resolve requested group ids. The inner `Err` is a message for a 400.
async fn resolve_group_ids(
    tx: &mut Transaction<'_, Postgres>,
    group_ids: &[String],
) -> anyhow::Result<Result<Vec<Uuid>, String>> {
    let mut ids: Vec<Uuid> = vec![];
    for group_id in group_ids {
        let Ok(id) = Uuid::parse_str(group_id) else {
            return Ok(Err(format!("group with id = {} not found", group_id)));
        };
        if get_group_by_id(tx, &id).await?.is_none() {
            return Ok(Err(format!("group with id = {} not found", group_id)));
        }
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(Ok(ids))
}

fn user_not_found(id: &str) -> Json<NotFoundResponse> {
    Json(NotFoundResponse {
        message: format!("user with id = {} not found", id),
    })
}

pub struct ApiUser;

#[OpenApi]
impl ApiUser {
    #[oai(path = "/user/", method = "get", tag = "ApiUserTags::User")]
    async fn paginate_user_api(
        &self,
        Query(page): Query<Option<u32>>,
        Query(page_size): Query<Option<u32>>,
        Query(search): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PaginateUserResponses {
        let (mut tx, _) = match begin_authorized(&state, auth, LOCATION, "paginate_user_api").await
        {
            Ok(val) => val,
            Err(RequestError::Unauthorized) => {
                return PaginateUserResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Err(RequestError::InternalServerError(err)) => {
                return PaginateUserResponses::InternalServerError(Json(err))
            }
        };

        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(10);
        let (data, counts, page_count) = match paginate_user(&mut tx, page, page_size, search).await
        {
            Ok(val) => val,
            Err(err) => {
                return PaginateUserResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "paginate_user_api",
                    "paginate_user",
                    err,
                )))
            }
        };
        let mut results: Vec<UserDetail> = vec![];
        for item in data {
            match user_detail(&mut tx, item).await {
                Ok(val) => results.push(val),
                Err(err) => {
                    return PaginateUserResponses::InternalServerError(Json(internal_error(
                        LOCATION,
                        "paginate_user_api",
                        "user_detail",
                        err,
                    )))
                }
            }
        }
        PaginateUserResponses::Ok(Json(PaginateResponse {
            counts,
            page: page.max(1),
            page_count,
            page_size,
            results,
        }))
    }

    #[oai(path = "/user/detail/", method = "get", tag = "ApiUserTags::User")]
    async fn detail_user_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UserDetailResponses {
        let (mut tx, _) = match begin_authorized(&state, auth, LOCATION, "detail_user_api").await {
            Ok(val) => val,
            Err(RequestError::Unauthorized) => {
                return UserDetailResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Err(RequestError::InternalServerError(err)) => {
                return UserDetailResponses::InternalServerError(Json(err))
            }
        };

        let Ok(user_id) = Uuid::parse_str(&id) else {
            return UserDetailResponses::NotFound(user_not_found(&id));
        };
        let user = match get_user_by_id(&mut tx, &user_id, None).await {
            Ok(Some(val)) => val,
            Ok(None) => return UserDetailResponses::NotFound(user_not_found(&id)),
            Err(err) => {
                return UserDetailResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "detail_user_api",
                    "get_user_by_id",
                    err,
                )))
            }
        };
        match user_detail(&mut tx, user).await {
            Ok(val) => UserDetailResponses::Ok(Json(val)),
            Err(err) => UserDetailResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "detail_user_api",
                "user_detail",
                err,
            ))),
        }
    }

    #[oai(path = "/user/", method = "post", tag = "ApiUserTags::User")]
    async fn create_user_api(
        &self,
        Json(json): Json<UserCreateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UserCreateResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "create_user_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return UserCreateResponses::Unauthorized(Json(UnauthorizedResponse::default()))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return UserCreateResponses::InternalServerError(Json(err))
                }
            };

        let user_name = json.user_name.trim().to_string();
        if user_name.is_empty() || json.password.is_empty() {
            return UserCreateResponses::BadRequest(Json(BadRequestResponse {
                message: "user_name and password are required".to_string(),
            }));
        }
        match is_user_name_taken(&mut tx, &user_name, None).await {
            Ok(false) => {}
            Ok(true) => {
                return UserCreateResponses::BadRequest(Json(BadRequestResponse {
                    message: format!("user_name {} already exists", user_name),
                }))
            }
            Err(err) => {
                return UserCreateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "create_user_api",
                    "is_user_name_taken",
                    err,
                )))
            }
        }
        let group_ids =
            match resolve_group_ids(&mut tx, &json.group_ids.unwrap_or_default()).await {
                Ok(Ok(val)) => val,
                Ok(Err(message)) => {
                    return UserCreateResponses::BadRequest(Json(BadRequestResponse { message }))
                }
                Err(err) => {
                    return UserCreateResponses::InternalServerError(Json(internal_error(
                        LOCATION,
                        "create_user_api",
                        "resolve_group_ids",
                        err,
                    )))
                }
            };
        let password = match hash_password(&json.password) {
            Ok(val) => val,
            Err(err) => {
                return UserCreateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "create_user_api",
                    "hash_password",
                    err,
                )))
            }
        };

        let now = Local::now().fixed_offset();
        let user = User {
            id: Uuid::now_v7(),
            user_name,
            password,
            email: json.email,
            first_name: json.first_name,
            last_name: json.last_name,
            external_id: None,
            is_active: true,
            created_by: Some(request_user.id),
            updated_by: Some(request_user.id),
            created_date: Some(now),
            updated_date: Some(now),
        };
        if let Err(err) = create_user(&mut tx, &user).await {
            return UserCreateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "create_user_api",
                "create_user",
                err,
            )));
        }
        if let Err(err) = replace_user_groups(&mut tx, &user.id, &group_ids, &now).await {
            return UserCreateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "create_user_api",
                "replace_user_groups",
                err,
            )));
        }
        let detail = match user_detail(&mut tx, user).await {
            Ok(val) => val,
            Err(err) => {
                return UserCreateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "create_user_api",
                    "user_detail",
                    err,
                )))
            }
        };
        if let Err(err) = tx.commit().await {
            return UserCreateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "create_user_api",
                "commit transaction",
                err,
            )));
        }
        info!("user {} created by {}", detail.user_name, request_user.user_name);
        UserCreateResponses::Ok(Json(detail))
    }

    #[oai(path = "/user/", method = "put", tag = "ApiUserTags::User")]
    async fn update_user_api(
        &self,
        Query(id): Query<String>,
        Json(json): Json<UserUpdateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UserUpdateResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "update_user_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return UserUpdateResponses::Unauthorized(Json(UnauthorizedResponse::default()))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return UserUpdateResponses::InternalServerError(Json(err))
                }
            };

        let Ok(user_id) = Uuid::parse_str(&id) else {
            return UserUpdateResponses::NotFound(user_not_found(&id));
        };
        let mut user = match get_user_by_id(&mut tx, &user_id, None).await {
            Ok(Some(val)) => val,
            Ok(None) => return UserUpdateResponses::NotFound(user_not_found(&id)),
            Err(err) => {
                return UserUpdateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "update_user_api",
                    "get_user_by_id",
                    err,
                )))
            }
        };

        let user_name = json.user_name.trim().to_string();
        if user_name.is_empty() {
            return UserUpdateResponses::BadRequest(Json(BadRequestResponse {
                message: "user_name is required".to_string(),
            }));
        }
        match is_user_name_taken(&mut tx, &user_name, Some(user.id)).await {
            Ok(false) => {}
            Ok(true) => {
                return UserUpdateResponses::BadRequest(Json(BadRequestResponse {
                    message: format!("user_name {} already exists", user_name),
                }))
            }
            Err(err) => {
                return UserUpdateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "update_user_api",
                    "is_user_name_taken",
                    err,
                )))
            }
        }
        let group_ids = match json.group_ids {
            Some(group_ids) => match resolve_group_ids(&mut tx, &group_ids).await {
                Ok(Ok(val)) => Some(val),
                Ok(Err(message)) => {
                    return UserUpdateResponses::BadRequest(Json(BadRequestResponse { message }))
                }
                Err(err) => {
                    return UserUpdateResponses::InternalServerError(Json(internal_error(
                        LOCATION,
                        "update_user_api",
                        "resolve_group_ids",
                        err,
                    )))
                }
            },
            None => None,
        };
        if let Some(password) = json.password.filter(|x| !x.is_empty()) {
            user.password = match hash_password(&password) {
                Ok(val) => val,
                Err(err) => {
                    return UserUpdateResponses::InternalServerError(Json(internal_error(
                        LOCATION,
                        "update_user_api",
                        "hash_password",
                        err,
                    )))
                }
            };
        }
        user.user_name = user_name;
        user.email = json.email;
        user.first_name = json.first_name;
        user.last_name = json.last_name;

        let now = Local::now().fixed_offset();
        if let Err(err) = update_user(&mut tx, &mut user, Some(&request_user), &now).await {
            return UserUpdateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "update_user_api",
                "update_user",
                err,
            )));
        }
        if let Some(group_ids) = group_ids {
            if let Err(err) = replace_user_groups(&mut tx, &user.id, &group_ids, &now).await {
                return UserUpdateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "update_user_api",
                    "replace_user_groups",
                    err,
                )));
            }
        }
        let detail = match user_detail(&mut tx, user).await {
            Ok(val) => val,
            Err(err) => {
                return UserUpdateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "update_user_api",
                    "user_detail",
                    err,
                )))
            }
        };
        if let Err(err) = tx.commit().await {
            return UserUpdateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "update_user_api",
                "commit transaction",
                err,
            )));
        }
        UserUpdateResponses::Ok(Json(detail))
    }

    #[oai(path = "/user/", method = "delete", tag = "ApiUserTags::User")]
    async fn delete_user_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UserDeleteResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "delete_user_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return UserDeleteResponses::Unauthorized(Json(UnauthorizedResponse::default()))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return UserDeleteResponses::InternalServerError(Json(err))
                }
            };

        let Ok(user_id) = Uuid::parse_str(&id) else {
            return UserDeleteResponses::NotFound(user_not_found(&id));
        };
        if user_id == request_user.id {
            return UserDeleteResponses::BadRequest(Json(BadRequestResponse {
                message: "cannot delete the logged in user".to_string(),
            }));
        }
        let mut user = match get_user_by_id(&mut tx, &user_id, None).await {
            Ok(Some(val)) => val,
            Ok(None) => return UserDeleteResponses::NotFound(user_not_found(&id)),
            Err(err) => {
                return UserDeleteResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "delete_user_api",
                    "get_user_by_id",
                    err,
                )))
            }
        };
        let now = Local::now().fixed_offset();
        if let Err(err) = soft_delete_user(&mut tx, &mut user, Some(&request_user), &now).await {
            return UserDeleteResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "delete_user_api",
                "soft_delete_user",
                err,
            )));
        }
        if let Err(err) = tx.commit().await {
            return UserDeleteResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "delete_user_api",
                "commit transaction",
                err,
            )));
        }
        UserDeleteResponses::NoContent
    }
}
