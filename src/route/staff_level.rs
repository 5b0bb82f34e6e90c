use std::sync::Arc;

use chrono::Local;
use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::{security::BearerAuthorization, utils::datetime_to_string_opt},
    model::staff_level::StaffLevel,
    repository::staff_level::{
        create_staff_level, get_dropdown_staff_level, get_staff_level_by_id, paginate_staff_level,
        soft_delete_staff_level, update_staff_level,
    },
    route::common::{audit_users, begin_authorized, internal_error, RequestError},
    schema::{
        common::{BadRequestResponse, NotFoundResponse, PaginateResponse, UnauthorizedResponse},
        staff_level::{
            PaginateStaffLevelResponses, StaffLevelCreateResponses, StaffLevelDeleteResponses,
            StaffLevelDetail, StaffLevelDetailResponses, StaffLevelDropdownResponse,
            StaffLevelDropdownResponses, StaffLevelRequest, StaffLevelUpdateResponses,
        },
    },
    AppState,
};

const LOCATION: &str = "route.staff_level";

#[derive(Tags)]
enum ApiStaffLevelTags {
    StaffLevel,
}

async fn staff_level_detail(
    tx: &mut Transaction<'_, Postgres>,
    staff_level: StaffLevel,
) -> anyhow::Result<StaffLevelDetail> {
    let (created_by, updated_by) =
        audit_users(tx, staff_level.created_by, staff_level.updated_by).await?;
    Ok(StaffLevelDetail {
        id: staff_level.id.to_string(),
        level_name: staff_level.level_name,
        description: staff_level.description,
        commission_rate: staff_level.commission_rate,
        is_active: staff_level.is_active,
        created_by,
        updated_by,
        created_date: datetime_to_string_opt(staff_level.created_date),
        updated_date: datetime_to_string_opt(staff_level.updated_date),
    })
}

struct ValidStaffLevel {
    level_name: String,
    commission_rate: i32,
}

/// `current_rate` is kept when the request omits `commission_rate`.
fn validate_staff_level_request(
    json: &StaffLevelRequest,
    current_rate: i32,
) -> Result<ValidStaffLevel, String> {
    let level_name = json.level_name.trim().to_string();
    if level_name.is_empty() {
        return Err("level_name is required".to_string());
    }
    let commission_rate = json.commission_rate.unwrap_or(current_rate);
    if !(0..=100).contains(&commission_rate) {
        return Err("commission_rate must be between 0 and 100".to_string());
    }
    Ok(ValidStaffLevel {
        level_name,
        commission_rate,
    })
}

fn staff_level_not_found(id: &str) -> Json<NotFoundResponse> {
    Json(NotFoundResponse {
        message: format!("staff level with id = {} not found", id),
    })
}

pub struct ApiStaffLevel;

#[OpenApi]
impl ApiStaffLevel {
    #[oai(path = "/staff-level/", method = "get", tag = "ApiStaffLevelTags::StaffLevel")]
    async fn paginate_staff_level_api(
        &self,
        Query(page): Query<Option<u32>>,
        Query(page_size): Query<Option<u32>>,
        Query(search): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PaginateStaffLevelResponses {
        let (mut tx, _) =
            match begin_authorized(&state, auth, LOCATION, "paginate_staff_level_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return PaginateStaffLevelResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return PaginateStaffLevelResponses::InternalServerError(Json(err))
                }
            };

        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(10);
        let (data, counts, page_count) =
            match paginate_staff_level(&mut tx, page, page_size, search).await {
                Ok(val) => val,
                Err(err) => {
                    return PaginateStaffLevelResponses::InternalServerError(Json(internal_error(
                        LOCATION,
                        "paginate_staff_level_api",
                        "paginate_staff_level",
                        err,
                    )))
                }
            };

        let mut results: Vec<StaffLevelDetail> = vec![];
        for item in data {
            match staff_level_detail(&mut tx, item).await {
                Ok(val) => results.push(val),
                Err(err) => {
                    return PaginateStaffLevelResponses::InternalServerError(Json(internal_error(
                        LOCATION,
                        "paginate_staff_level_api",
                        "staff_level_detail",
                        err,
                    )))
                }
            }
        }

        PaginateStaffLevelResponses::Ok(Json(PaginateResponse {
            counts,
            page: page.max(1),
            page_count,
            page_size,
            results,
        }))
    }

    #[oai(path = "/staff-level/dropdown/", method = "get", tag = "ApiStaffLevelTags::StaffLevel")]
    async fn dropdown_staff_level_api(
        &self,
        Query(limit): Query<Option<u32>>,
        Query(search): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> StaffLevelDropdownResponses {
        let (mut tx, _) =
            match begin_authorized(&state, auth, LOCATION, "dropdown_staff_level_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return StaffLevelDropdownResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return StaffLevelDropdownResponses::InternalServerError(Json(err))
                }
            };

        let data = match get_dropdown_staff_level(&mut tx, limit, search).await {
            Ok(val) => val,
            Err(err) => {
                return StaffLevelDropdownResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "dropdown_staff_level_api",
                    "get_dropdown_staff_level",
                    err,
                )))
            }
        };
        StaffLevelDropdownResponses::Ok(Json(
            data.into_iter()
                .map(|x| StaffLevelDropdownResponse {
                    id: x.id.to_string(),
                    level_name: x.level_name,
                    commission_rate: x.commission_rate,
                })
                .collect(),
        ))
    }

    #[oai(path = "/staff-level/detail/", method = "get", tag = "ApiStaffLevelTags::StaffLevel")]
    async fn detail_staff_level_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> StaffLevelDetailResponses {
        let (mut tx, _) =
            match begin_authorized(&state, auth, LOCATION, "detail_staff_level_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return StaffLevelDetailResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return StaffLevelDetailResponses::InternalServerError(Json(err))
                }
            };

        let Ok(staff_level_id) = Uuid::parse_str(&id) else {
            return StaffLevelDetailResponses::NotFound(staff_level_not_found(&id));
        };
        let staff_level = match get_staff_level_by_id(&mut tx, &staff_level_id).await {
            Ok(Some(val)) => val,
            Ok(None) => return StaffLevelDetailResponses::NotFound(staff_level_not_found(&id)),
            Err(err) => {
                return StaffLevelDetailResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "detail_staff_level_api",
                    "get_staff_level_by_id",
                    err,
                )))
            }
        };
        match staff_level_detail(&mut tx, staff_level).await {
            Ok(val) => StaffLevelDetailResponses::Ok(Json(val)),
            Err(err) => StaffLevelDetailResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "detail_staff_level_api",
                "staff_level_detail",
                err,
            ))),
        }
    }

    #[oai(path = "/staff-level/", method = "post", tag = "ApiStaffLevelTags::StaffLevel")]
    async fn create_staff_level_api(
        &self,
        Json(json): Json<StaffLevelRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> StaffLevelCreateResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "create_staff_level_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return StaffLevelCreateResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return StaffLevelCreateResponses::InternalServerError(Json(err))
                }
            };

        let valid = match validate_staff_level_request(&json, 0) {
            Ok(val) => val,
            Err(message) => {
                return StaffLevelCreateResponses::BadRequest(Json(BadRequestResponse { message }))
            }
        };
        let now = Local::now().fixed_offset();
        let staff_level = StaffLevel {
            id: Uuid::now_v7(),
            level_name: valid.level_name,
            description: json.description,
            commission_rate: valid.commission_rate,
            is_active: true,
            created_by: Some(request_user.id),
            updated_by: Some(request_user.id),
            created_date: Some(now),
            updated_date: Some(now),
        };
        if let Err(err) = create_staff_level(&mut tx, &staff_level).await {
            return StaffLevelCreateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "create_staff_level_api",
                "create_staff_level",
                err,
            )));
        }
        let detail = match staff_level_detail(&mut tx, staff_level).await {
            Ok(val) => val,
            Err(err) => {
                return StaffLevelCreateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "create_staff_level_api",
                    "staff_level_detail",
                    err,
                )))
            }
        };
        if let Err(err) = tx.commit().await {
            return StaffLevelCreateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "create_staff_level_api",
                "commit transaction",
                err,
            )));
        }
        StaffLevelCreateResponses::Ok(Json(detail))
    }

    #[oai(path = "/staff-level/", method = "put", tag = "ApiStaffLevelTags::StaffLevel")]
    async fn update_staff_level_api(
        &self,
        Query(id): Query<String>,
        Json(json): Json<StaffLevelRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> StaffLevelUpdateResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "update_staff_level_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return StaffLevelUpdateResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return StaffLevelUpdateResponses::InternalServerError(Json(err))
                }
            };

        let Ok(staff_level_id) = Uuid::parse_str(&id) else {
            return StaffLevelUpdateResponses::NotFound(staff_level_not_found(&id));
        };
        let mut staff_level = match get_staff_level_by_id(&mut tx, &staff_level_id).await {
            Ok(Some(val)) => val,
            Ok(None) => return StaffLevelUpdateResponses::NotFound(staff_level_not_found(&id)),
            Err(err) => {
                return StaffLevelUpdateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "update_staff_level_api",
                    "get_staff_level_by_id",
                    err,
                )))
            }
        };
        let valid = match validate_staff_level_request(&json, staff_level.commission_rate) {
            Ok(val) => val,
            Err(message) => {
                return StaffLevelUpdateResponses::BadRequest(Json(BadRequestResponse { message }))
            }
        };
        staff_level.level_name = valid.level_name;
        staff_level.description = json.description;
        staff_level.commission_rate = valid.commission_rate;

        let now = Local::now().fixed_offset();
        if let Err(err) = update_staff_level(&mut tx, &mut staff_level, &request_user, &now).await {
            return StaffLevelUpdateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "update_staff_level_api",
                "update_staff_level",
                err,
            )));
        }
        let detail = match staff_level_detail(&mut tx, staff_level).await {
            Ok(val) => val,
            Err(err) => {
                return StaffLevelUpdateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "update_staff_level_api",
                    "staff_level_detail",
                    err,
                )))
            }
        };
        if let Err(err) = tx.commit().await {
            return StaffLevelUpdateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "update_staff_level_api",
                "commit transaction",
                err,
            )));
        }
        StaffLevelUpdateResponses::Ok(Json(detail))
    }

    #[oai(path = "/staff-level/", method = "delete", tag = "ApiStaffLevelTags::StaffLevel")]
    async fn delete_staff_level_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> StaffLevelDeleteResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "delete_staff_level_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return StaffLevelDeleteResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return StaffLevelDeleteResponses::InternalServerError(Json(err))
                }
            };

        let Ok(staff_level_id) = Uuid::parse_str(&id) else {
            return StaffLevelDeleteResponses::NotFound(staff_level_not_found(&id));
        };
        let mut staff_level = match get_staff_level_by_id(&mut tx, &staff_level_id).await {
            Ok(Some(val)) => val,
            Ok(None) => return StaffLevelDeleteResponses::NotFound(staff_level_not_found(&id)),
            Err(err) => {
                return StaffLevelDeleteResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "delete_staff_level_api",
                    "get_staff_level_by_id",
                    err,
                )))
            }
        };
        let now = Local::now().fixed_offset();
        if let Err(err) =
            soft_delete_staff_level(&mut tx, &mut staff_level, &request_user, &now).await
        {
            return StaffLevelDeleteResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "delete_staff_level_api",
                "soft_delete_staff_level",
                err,
            )));
        }
        if let Err(err) = tx.commit().await {
            return StaffLevelDeleteResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "delete_staff_level_api",
                "commit transaction",
                err,
            )));
        }
        StaffLevelDeleteResponses::NoContent
    }
}
