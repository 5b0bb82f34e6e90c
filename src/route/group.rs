use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::{security::BearerAuthorization, utils::datetime_to_string_opt},
    model::group::Group,
    repository::group::{
        create_group, get_dropdown_group, get_group_by_id, paginate_group, soft_delete_group,
        update_group,
    },
    route::common::{audit_users, begin_authorized, internal_error, RequestError},
    schema::{
        common::{BadRequestResponse, NotFoundResponse, PaginateResponse, UnauthorizedResponse},
        group::{
            GroupCreateRequest, GroupCreateResponses, GroupDeleteResponses, GroupDetail,
            GroupDetailResponses, GroupDropdownResponse, GroupDropdownResponses,
            GroupUpdateRequest, GroupUpdateResponses, PaginateGroupResponses,
        },
    },
    AppState,
};

const LOCATION: &str = "route.group";

#[derive(Tags)]
enum ApiGroupTags {
    Group,
}

async fn group_detail(
    tx: &mut Transaction<'_, Postgres>,
    group: Group,
) -> anyhow::Result<GroupDetail> {
    let (created_by, updated_by) = audit_users(tx, group.created_by, group.updated_by).await?;
    Ok(GroupDetail {
        id: group.id.to_string(),
        group_name: group.group_name,
        description: group.description,
        is_active: group.is_active,
        created_by,
        updated_by,
        created_date: datetime_to_string_opt(group.created_date),
        updated_date: datetime_to_string_opt(group.updated_date),
    })
}

fn group_not_found(id: &str) -> Json<NotFoundResponse> {
    Json(NotFoundResponse {
        message: format!("group with id = {} not found", id),
    })
}

pub struct ApiGroup;

#[OpenApi]
impl ApiGroup {
    #[oai(path = "/group/", method = "get", tag = "ApiGroupTags::Group")]
    async fn paginate_group_api(
        &self,
        Query(page): Query<Option<u32>>,
        Query(page_size): Query<Option<u32>>,
        Query(search): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PaginateGroupResponses {
        let (mut tx, _) = match begin_authorized(&state, auth, LOCATION, "paginate_group_api").await
        {
            Ok(val) => val,
            Err(RequestError::Unauthorized) => {
                return PaginateGroupResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Err(RequestError::InternalServerError(err)) => {
                return PaginateGroupResponses::InternalServerError(Json(err))
            }
        };

        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(10);
        let (data, counts, page_count) =
            match paginate_group(&mut tx, page, page_size, search).await {
                Ok(val) => val,
                Err(err) => {
                    return PaginateGroupResponses::InternalServerError(Json(internal_error(
                        LOCATION,
                        "paginate_group_api",
                        "paginate_group",
                        err,
                    )))
                }
            };

        let mut results: Vec<GroupDetail> = vec![];
        for item in data {
            match group_detail(&mut tx, item).await {
                Ok(val) => results.push(val),
                Err(err) => {
                    return PaginateGroupResponses::InternalServerError(Json(internal_error(
                        LOCATION,
                        "paginate_group_api",
                        "group_detail",
                        err,
                    )))
                }
            }
        }

        PaginateGroupResponses::Ok(Json(PaginateResponse {
            counts,
            page: page.max(1),
            page_count,
            page_size,
            results,
        }))
    }

    #[oai(path = "/group/dropdown/", method = "get", tag = "ApiGroupTags::Group")]
    async fn dropdown_group_api(
        &self,
        Query(limit): Query<Option<u32>>,
        Query(search): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> GroupDropdownResponses {
        let (mut tx, _) = match begin_authorized(&state, auth, LOCATION, "dropdown_group_api").await
        {
            Ok(val) => val,
            Err(RequestError::Unauthorized) => {
                return GroupDropdownResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Err(RequestError::InternalServerError(err)) => {
                return GroupDropdownResponses::InternalServerError(Json(err))
            }
        };

        let data = match get_dropdown_group(&mut tx, limit, search).await {
            Ok(val) => val,
            Err(err) => {
                return GroupDropdownResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "dropdown_group_api",
                    "get_dropdown_group",
                    err,
                )))
            }
        };
        GroupDropdownResponses::Ok(Json(
            data.into_iter()
                .map(|x| GroupDropdownResponse {
                    id: x.id.to_string(),
                    group_name: x.group_name,
                })
                .collect(),
        ))
    }

    #[oai(path = "/group/detail/", method = "get", tag = "ApiGroupTags::Group")]
    async fn detail_group_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> GroupDetailResponses {
        let (mut tx, _) = match begin_authorized(&state, auth, LOCATION, "detail_group_api").await {
            Ok(val) => val,
            Err(RequestError::Unauthorized) => {
                return GroupDetailResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Err(RequestError::InternalServerError(err)) => {
                return GroupDetailResponses::InternalServerError(Json(err))
            }
        };

        let Ok(group_id) = Uuid::parse_str(&id) else {
            return GroupDetailResponses::NotFound(group_not_found(&id));
        };
        let group = match get_group_by_id(&mut tx, &group_id).await {
            Ok(Some(val)) => val,
            Ok(None) => return GroupDetailResponses::NotFound(group_not_found(&id)),
            Err(err) => {
                return GroupDetailResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "detail_group_api",
                    "get_group_by_id",
                    err,
                )))
            }
        };
        match group_detail(&mut tx, group).await {
            Ok(val) => GroupDetailResponses::Ok(Json(val)),
            Err(err) => GroupDetailResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "detail_group_api",
                "group_detail",
                err,
            ))),
        }
    }

    #[oai(path = "/group/", method = "post", tag = "ApiGroupTags::Group")]
    async fn create_group_api(
        &self,
        Json(json): Json<GroupCreateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> GroupCreateResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "create_group_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return GroupCreateResponses::Unauthorized(Json(UnauthorizedResponse::default()))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return GroupCreateResponses::InternalServerError(Json(err))
                }
            };

        if json.group_name.trim().is_empty() {
            return GroupCreateResponses::BadRequest(Json(BadRequestResponse {
                message: "group_name is required".to_string(),
            }));
        }

        let new_group = match create_group(
            &mut tx,
            None,
            json.group_name.trim().to_string(),
            json.description,
            &request_user,
            None,
        )
        .await
        {
            Ok(val) => val,
            Err(err) => {
                return GroupCreateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "create_group_api",
                    "create_group",
                    err,
                )))
            }
        };
        let detail = match group_detail(&mut tx, new_group).await {
            Ok(val) => val,
            Err(err) => {
                return GroupCreateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "create_group_api",
                    "group_detail",
                    err,
                )))
            }
        };
        if let Err(err) = tx.commit().await {
            return GroupCreateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "create_group_api",
                "commit transaction",
                err,
            )));
        }
        GroupCreateResponses::Ok(Json(detail))
    }

    #[oai(path = "/group/", method = "put", tag = "ApiGroupTags::Group")]
    async fn update_group_api(
        &self,
        Query(id): Query<String>,
        Json(json): Json<GroupUpdateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> GroupUpdateResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "update_group_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return GroupUpdateResponses::Unauthorized(Json(UnauthorizedResponse::default()))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return GroupUpdateResponses::InternalServerError(Json(err))
                }
            };

        let Ok(group_id) = Uuid::parse_str(&id) else {
            return GroupUpdateResponses::NotFound(group_not_found(&id));
        };
        let mut group = match get_group_by_id(&mut tx, &group_id).await {
            Ok(Some(val)) => val,
            Ok(None) => return GroupUpdateResponses::NotFound(group_not_found(&id)),
            Err(err) => {
                return GroupUpdateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "update_group_api",
                    "get_group_by_id",
                    err,
                )))
            }
        };
        if json.group_name.trim().is_empty() {
            return GroupUpdateResponses::BadRequest(Json(BadRequestResponse {
                message: "group_name is required".to_string(),
            }));
        }

        if let Err(err) = update_group(
            &mut tx,
            &mut group,
            json.group_name.trim().to_string(),
            json.description,
            &request_user,
            None,
        )
        .await
        {
            return GroupUpdateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "update_group_api",
                "update_group",
                err,
            )));
        }
        let detail = match group_detail(&mut tx, group).await {
            Ok(val) => val,
            Err(err) => {
                return GroupUpdateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "update_group_api",
                    "group_detail",
                    err,
                )))
            }
        };
        if let Err(err) = tx.commit().await {
            return GroupUpdateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "update_group_api",
                "commit transaction",
                err,
            )));
        }
        GroupUpdateResponses::Ok(Json(detail))
    }

    #[oai(path = "/group/", method = "delete", tag = "ApiGroupTags::Group")]
    async fn delete_group_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> GroupDeleteResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "delete_group_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return GroupDeleteResponses::Unauthorized(Json(UnauthorizedResponse::default()))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return GroupDeleteResponses::InternalServerError(Json(err))
                }
            };

        let Ok(group_id) = Uuid::parse_str(&id) else {
            return GroupDeleteResponses::NotFound(group_not_found(&id));
        };
        let mut group = match get_group_by_id(&mut tx, &group_id).await {
            Ok(Some(val)) => val,
            Ok(None) => return GroupDeleteResponses::NotFound(group_not_found(&id)),
            Err(err) => {
                return GroupDeleteResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "delete_group_api",
                    "get_group_by_id",
                    err,
                )))
            }
        };
        if let Err(err) = soft_delete_group(&mut tx, &mut group, &request_user, None).await {
            return GroupDeleteResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "delete_group_api",
                "soft_delete_group",
                err,
            )));
        }
        if let Err(err) = tx.commit().await {
            return GroupDeleteResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "delete_group_api",
                "commit transaction",
                err,
            )));
        }
        GroupDeleteResponses::NoContent
    }
}
