use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};

use crate::{
    core::security::BearerAuthorization,
    model::menu_role::MenuAction,
    repository::access::{get_user_menu_access, has_menu_permission},
    route::common::{begin_authorized, internal_error, RequestError},
    schema::{
        access::{
            AccessCheckResponse, AccessCheckResponses, MenuAccessResponse, MenuAccessResponses,
        },
        common::UnauthorizedResponse,
    },
    AppState,
};

const LOCATION: &str = "route.access";

#[derive(Tags)]
enum ApiAccessTags {
    Access,
}

pub struct ApiAccess;

#[OpenApi]
impl ApiAccess {
    /// Menus visible to the logged in user
    #[oai(path = "/access/menu/", method = "get", tag = "ApiAccessTags::Access")]
    async fn menu_access_api(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> MenuAccessResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "menu_access_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return MenuAccessResponses::Unauthorized(Json(UnauthorizedResponse::default()))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return MenuAccessResponses::InternalServerError(Json(err))
                }
            };

        match get_user_menu_access(&mut tx, &request_user.id).await {
            Ok(data) => MenuAccessResponses::Ok(Json(
                data.into_iter()
                    .map(|x| MenuAccessResponse {
                        menu_id: x.menu_id.to_string(),
                        menu_name: x.menu_name,
                        menu_url: x.menu_url,
                        icon: x.icon,
                        parent_id: x.parent_id.map(|x| x.to_string()),
                        sort_order: x.sort_order,
                        can_read: x.can_read,
                        can_write: x.can_write,
                        can_update: x.can_update,
                        can_delete: x.can_delete,
                    })
                    .collect(),
            )),
            Err(err) => MenuAccessResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "menu_access_api",
                "get_user_menu_access",
                err,
            ))),
        }
    }

    #[oai(path = "/access/check/", method = "get", tag = "ApiAccessTags::Access")]
    async fn check_access_api(
        &self,
        Query(menu_url): Query<String>,
        Query(action): Query<Option<MenuAction>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> AccessCheckResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "check_access_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return AccessCheckResponses::Unauthorized(Json(UnauthorizedResponse::default()))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return AccessCheckResponses::InternalServerError(Json(err))
                }
            };

        let action = action.unwrap_or(MenuAction::Read);
        match has_menu_permission(&mut tx, &request_user.id, &menu_url, action).await {
            Ok(allowed) => AccessCheckResponses::Ok(Json(AccessCheckResponse {
                menu_url,
                action: action.as_str().to_string(),
                allowed,
            })),
            Err(err) => AccessCheckResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "check_access_api",
                "has_menu_permission",
                err,
            ))),
        }
    }
}
