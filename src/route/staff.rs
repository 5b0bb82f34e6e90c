use std::sync::Arc;

use chrono::{Local, NaiveDate};
use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::{
        security::BearerAuthorization,
        utils::{date_to_string, datetime_to_string_opt},
    },
    model::staff::Staff,
    repository::{
        staff::{
            create_staff, get_dropdown_staff, get_staff_by_id, paginate_staff, soft_delete_staff,
            update_staff,
        },
        staff_level::get_staff_level_by_id,
    },
    route::common::{
        audit_users, begin_authorized, internal_error, parse_date_param, parse_uuid_param,
        RequestError,
    },
    schema::{
        common::{BadRequestResponse, NotFoundResponse, PaginateResponse, UnauthorizedResponse},
        staff::{
            PaginateStaffResponses, StaffCreateResponses, StaffDeleteResponses, StaffDetail,
            StaffDetailResponses, StaffDropdownResponse, StaffDropdownResponses, StaffRequest,
            StaffUpdateResponses,
        },
        staff_level::StaffLevelDropdownResponse,
    },
    AppState,
};

const LOCATION: &str = "route.staff";

#[derive(Tags)]
enum ApiStaffTags {
    Staff,
}

async fn staff_detail(
    tx: &mut Transaction<'_, Postgres>,
    staff: Staff,
) -> anyhow::Result<StaffDetail> {
    let staff_level = match staff.staff_level_id {
        Some(id) => get_staff_level_by_id(tx, &id).await?,
        None => None,
    };
    let (created_by, updated_by) = audit_users(tx, staff.created_by, staff.updated_by).await?;
    Ok(StaffDetail {
        id: staff.id.to_string(),
        staff_name: staff.staff_name,
        phone: staff.phone,
        email: staff.email,
        address: staff.address,
        staff_level: staff_level.map(|x| StaffLevelDropdownResponse {
            id: x.id.to_string(),
            level_name: x.level_name,
            commission_rate: x.commission_rate,
        }),
        join_date: staff.join_date.map(date_to_string),
        is_active: staff.is_active,
        created_by,
        updated_by,
        created_date: datetime_to_string_opt(staff.created_date),
        updated_date: datetime_to_string_opt(staff.updated_date),
    })
}

struct ValidStaff {
    staff_name: String,
    staff_level_id: Option<Uuid>,
    join_date: Option<NaiveDate>,
}

/// The inner `Err` is a message for a 400.
async fn validate_staff_request(
    tx: &mut Transaction<'_, Postgres>,
    json: &StaffRequest,
) -> anyhow::Result<Result<ValidStaff, String>> {
    let staff_name = json.staff_name.trim().to_string();
    if staff_name.is_empty() {
        return Ok(Err("staff_name is required".to_string()));
    }
    let staff_level_id = match &json.staff_level_id {
        Some(staff_level_id) => {
            let not_found = format!("staff level with id = {} not found", staff_level_id);
            let Ok(id) = Uuid::parse_str(staff_level_id) else {
                return Ok(Err(not_found));
            };
            if get_staff_level_by_id(tx, &id).await?.is_none() {
                return Ok(Err(not_found));
            }
            Some(id)
        }
        None => None,
    };
    let join_date = match parse_date_param("join_date", json.join_date.clone()) {
        Ok(val) => val,
        Err(message) => return Ok(Err(message)),
    };
    Ok(Ok(ValidStaff {
        staff_name,
        staff_level_id,
        join_date,
    }))
}

fn staff_not_found(id: &str) -> Json<NotFoundResponse> {
    Json(NotFoundResponse {
        message: format!("staff with id = {} not found", id),
    })
}

pub struct ApiStaff;

#[OpenApi]
impl ApiStaff {
    #[oai(path = "/staff/", method = "get", tag = "ApiStaffTags::Staff")]
    async fn paginate_staff_api(
        &self,
        Query(page): Query<Option<u32>>,
        Query(page_size): Query<Option<u32>>,
        Query(search): Query<Option<String>>,
        Query(staff_level_id): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PaginateStaffResponses {
        let (mut tx, _) =
            match begin_authorized(&state, auth, LOCATION, "paginate_staff_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return PaginateStaffResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return PaginateStaffResponses::InternalServerError(Json(err))
                }
            };

        let staff_level_id = match parse_uuid_param("staff_level_id", staff_level_id) {
            Ok(val) => val,
            Err(message) => {
                return PaginateStaffResponses::BadRequest(Json(BadRequestResponse { message }))
            }
        };
        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(10);
        let (data, counts, page_count) =
            match paginate_staff(&mut tx, page, page_size, search, staff_level_id).await {
                Ok(val) => val,
                Err(err) => {
                    return PaginateStaffResponses::InternalServerError(Json(internal_error(
                        LOCATION,
                        "paginate_staff_api",
                        "paginate_staff",
                        err,
                    )))
                }
            };

        let mut results: Vec<StaffDetail> = vec![];
        for item in data {
            match staff_detail(&mut tx, item).await {
                Ok(val) => results.push(val),
                Err(err) => {
                    return PaginateStaffResponses::InternalServerError(Json(internal_error(
                        LOCATION,
                        "paginate_staff_api",
                        "staff_detail",
                        err,
                    )))
                }
            }
        }

        PaginateStaffResponses::Ok(Json(PaginateResponse {
            counts,
            page: page.max(1),
            page_count,
            page_size,
            results,
        }))
    }

    #[oai(path = "/staff/dropdown/", method = "get", tag = "ApiStaffTags::Staff")]
    async fn dropdown_staff_api(
        &self,
        Query(limit): Query<Option<u32>>,
        Query(search): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> StaffDropdownResponses {
        let (mut tx, _) =
            match begin_authorized(&state, auth, LOCATION, "dropdown_staff_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return StaffDropdownResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return StaffDropdownResponses::InternalServerError(Json(err))
                }
            };

        let data = match get_dropdown_staff(&mut tx, limit, search).await {
            Ok(val) => val,
            Err(err) => {
                return StaffDropdownResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "dropdown_staff_api",
                    "get_dropdown_staff",
                    err,
                )))
            }
        };
        StaffDropdownResponses::Ok(Json(
            data.into_iter()
                .map(|x| StaffDropdownResponse {
                    id: x.id.to_string(),
                    staff_name: x.staff_name,
                })
                .collect(),
        ))
    }

    #[oai(path = "/staff/detail/", method = "get", tag = "ApiStaffTags::Staff")]
    async fn detail_staff_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> StaffDetailResponses {
        let (mut tx, _) =
            match begin_authorized(&state, auth, LOCATION, "detail_staff_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return StaffDetailResponses::Unauthorized(Json(UnauthorizedResponse::default()))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return StaffDetailResponses::InternalServerError(Json(err))
                }
            };

        let Ok(staff_id) = Uuid::parse_str(&id) else {
            return StaffDetailResponses::NotFound(staff_not_found(&id));
        };
        let staff = match get_staff_by_id(&mut tx, &staff_id).await {
            Ok(Some(val)) => val,
            Ok(None) => return StaffDetailResponses::NotFound(staff_not_found(&id)),
            Err(err) => {
                return StaffDetailResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "detail_staff_api",
                    "get_staff_by_id",
                    err,
                )))
            }
        };
        match staff_detail(&mut tx, staff).await {
            Ok(val) => StaffDetailResponses::Ok(Json(val)),
            Err(err) => StaffDetailResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "detail_staff_api",
                "staff_detail",
                err,
            ))),
        }
    }

    #[oai(path = "/staff/", method = "post", tag = "ApiStaffTags::Staff")]
    async fn create_staff_api(
        &self,
        Json(json): Json<StaffRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> StaffCreateResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "create_staff_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return StaffCreateResponses::Unauthorized(Json(UnauthorizedResponse::default()))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return StaffCreateResponses::InternalServerError(Json(err))
                }
            };

        let valid = match validate_staff_request(&mut tx, &json).await {
            Ok(Ok(val)) => val,
            Ok(Err(message)) => {
                return StaffCreateResponses::BadRequest(Json(BadRequestResponse { message }))
            }
            Err(err) => {
                return StaffCreateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "create_staff_api",
                    "validate_staff_request",
                    err,
                )))
            }
        };
        let now = Local::now().fixed_offset();
        let staff = Staff {
            id: Uuid::now_v7(),
            staff_name: valid.staff_name,
            phone: json.phone,
            email: json.email,
            address: json.address,
            staff_level_id: valid.staff_level_id,
            join_date: valid.join_date,
            is_active: true,
            created_by: Some(request_user.id),
            updated_by: Some(request_user.id),
            created_date: Some(now),
            updated_date: Some(now),
        };
        if let Err(err) = create_staff(&mut tx, &staff).await {
            return StaffCreateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "create_staff_api",
                "create_staff",
                err,
            )));
        }
        let detail = match staff_detail(&mut tx, staff).await {
            Ok(val) => val,
            Err(err) => {
                return StaffCreateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "create_staff_api",
                    "staff_detail",
                    err,
                )))
            }
        };
        if let Err(err) = tx.commit().await {
            return StaffCreateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "create_staff_api",
                "commit transaction",
                err,
            )));
        }
        StaffCreateResponses::Ok(Json(detail))
    }

    #[oai(path = "/staff/", method = "put", tag = "ApiStaffTags::Staff")]
    async fn update_staff_api(
        &self,
        Query(id): Query<String>,
        Json(json): Json<StaffRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> StaffUpdateResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "update_staff_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return StaffUpdateResponses::Unauthorized(Json(UnauthorizedResponse::default()))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return StaffUpdateResponses::InternalServerError(Json(err))
                }
            };

        let Ok(staff_id) = Uuid::parse_str(&id) else {
            return StaffUpdateResponses::NotFound(staff_not_found(&id));
        };
        let mut staff = match get_staff_by_id(&mut tx, &staff_id).await {
            Ok(Some(val)) => val,
            Ok(None) => return StaffUpdateResponses::NotFound(staff_not_found(&id)),
            Err(err) => {
                return StaffUpdateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "update_staff_api",
                    "get_staff_by_id",
                    err,
                )))
            }
        };
        let valid = match validate_staff_request(&mut tx, &json).await {
            Ok(Ok(val)) => val,
            Ok(Err(message)) => {
                return StaffUpdateResponses::BadRequest(Json(BadRequestResponse { message }))
            }
            Err(err) => {
                return StaffUpdateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "update_staff_api",
                    "validate_staff_request",
                    err,
                )))
            }
        };
        staff.staff_name = valid.staff_name;
        staff.phone = json.phone;
        staff.email = json.email;
        staff.address = json.address;
        staff.staff_level_id = valid.staff_level_id;
        staff.join_date = valid.join_date;

        let now = Local::now().fixed_offset();
        if let Err(err) = update_staff(&mut tx, &mut staff, &request_user, &now).await {
            return StaffUpdateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "update_staff_api",
                "update_staff",
                err,
            )));
        }
        let detail = match staff_detail(&mut tx, staff).await {
            Ok(val) => val,
            Err(err) => {
                return StaffUpdateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "update_staff_api",
                    "staff_detail",
                    err,
                )))
            }
        };
        if let Err(err) = tx.commit().await {
            return StaffUpdateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "update_staff_api",
                "commit transaction",
                err,
            )));
        }
        StaffUpdateResponses::Ok(Json(detail))
    }

    #[oai(path = "/staff/", method = "delete", tag = "ApiStaffTags::Staff")]
    async fn delete_staff_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> StaffDeleteResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "delete_staff_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return StaffDeleteResponses::Unauthorized(Json(UnauthorizedResponse::default()))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return StaffDeleteResponses::InternalServerError(Json(err))
                }
            };

        let Ok(staff_id) = Uuid::parse_str(&id) else {
            return StaffDeleteResponses::NotFound(staff_not_found(&id));
        };
        let mut staff = match get_staff_by_id(&mut tx, &staff_id).await {
            Ok(Some(val)) => val,
            Ok(None) => return StaffDeleteResponses::NotFound(staff_not_found(&id)),
            Err(err) => {
                return StaffDeleteResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "delete_staff_api",
                    "get_staff_by_id",
                    err,
                )))
            }
        };
        let now = Local::now().fixed_offset();
        if let Err(err) = soft_delete_staff(&mut tx, &mut staff, &request_user, &now).await {
            return StaffDeleteResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "delete_staff_api",
                "soft_delete_staff",
                err,
            )));
        }
        if let Err(err) = tx.commit().await {
            return StaffDeleteResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "delete_staff_api",
                "commit transaction",
                err,
            )));
        }
        StaffDeleteResponses::NoContent
    }
}
