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
    model::operasional::Operasional,
    repository::operasional::{
        create_operasional, get_dropdown_operasional, get_operasional_by_id, paginate_operasional,
        soft_delete_operasional, update_operasional,
    },
    route::common::{
        audit_users, begin_authorized, internal_error, parse_date_param, RequestError,
    },
    schema::{
        common::{BadRequestResponse, NotFoundResponse, PaginateResponse, UnauthorizedResponse},
        operasional::{
            OperasionalCreateResponses, OperasionalDeleteResponses, OperasionalDetail,
            OperasionalDetailResponses, OperasionalDropdownResponse, OperasionalDropdownResponses,
            OperasionalRequest, OperasionalUpdateResponses, PaginateOperasionalResponses,
        },
    },
    AppState,
};

const LOCATION: &str = "route.operasional";

#[derive(Tags)]
enum ApiOperasionalTags {
    Operasional,
}

async fn operasional_detail(
    tx: &mut Transaction<'_, Postgres>,
    operasional: Operasional,
) -> anyhow::Result<OperasionalDetail> {
    let (created_by, updated_by) =
        audit_users(tx, operasional.created_by, operasional.updated_by).await?;
    Ok(OperasionalDetail {
        id: operasional.id.to_string(),
        description: operasional.description,
        category: operasional.category,
        amount: operasional.amount,
        expense_date: date_to_string(operasional.expense_date),
        is_active: operasional.is_active,
        created_by,
        updated_by,
        created_date: datetime_to_string_opt(operasional.created_date),
        updated_date: datetime_to_string_opt(operasional.updated_date),
    })
}

struct ValidOperasional {
    description: String,
    expense_date: NaiveDate,
}

fn validate_operasional_request(json: &OperasionalRequest) -> Result<ValidOperasional, String> {
    let description = json.description.trim().to_string();
    if description.is_empty() {
        return Err("description is required".to_string());
    }
    if json.amount < 0 {
        return Err("amount cannot be negative".to_string());
    }
    let Some(expense_date) = parse_date_param("expense_date", Some(json.expense_date.clone()))?
    else {
        return Err("expense_date is required".to_string());
    };
    Ok(ValidOperasional {
        description,
        expense_date,
    })
}

fn operasional_not_found(id: &str) -> Json<NotFoundResponse> {
    Json(NotFoundResponse {
        message: format!("operasional with id = {} not found", id),
    })
}

pub struct ApiOperasional;

#[OpenApi]
impl ApiOperasional {
    #[oai(path = "/operasional/", method = "get", tag = "ApiOperasionalTags::Operasional")]
    async fn paginate_operasional_api(
        &self,
        Query(page): Query<Option<u32>>,
        Query(page_size): Query<Option<u32>>,
        Query(search): Query<Option<String>>,
        Query(start_date): Query<Option<String>>,
        Query(end_date): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PaginateOperasionalResponses {
        let (mut tx, _) =
            match begin_authorized(&state, auth, LOCATION, "paginate_operasional_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return PaginateOperasionalResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return PaginateOperasionalResponses::InternalServerError(Json(err))
                }
            };

        let (start_date, end_date) = match (
            parse_date_param("start_date", start_date),
            parse_date_param("end_date", end_date),
        ) {
            (Ok(start_date), Ok(end_date)) => (start_date, end_date),
            (Err(message), _) | (_, Err(message)) => {
                return PaginateOperasionalResponses::BadRequest(Json(BadRequestResponse {
                    message,
                }))
            }
        };
        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(10);
        let (data, counts, page_count) = match paginate_operasional(
            &mut tx, page, page_size, search, start_date, end_date,
        )
        .await
        {
            Ok(val) => val,
            Err(err) => {
                return PaginateOperasionalResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "paginate_operasional_api",
                    "paginate_operasional",
                    err,
                )))
            }
        };

        let mut results: Vec<OperasionalDetail> = vec![];
        for item in data {
            match operasional_detail(&mut tx, item).await {
                Ok(val) => results.push(val),
                Err(err) => {
                    return PaginateOperasionalResponses::InternalServerError(Json(internal_error(
                        LOCATION,
                        "paginate_operasional_api",
                        "operasional_detail",
                        err,
                    )))
                }
            }
        }

        PaginateOperasionalResponses::Ok(Json(PaginateResponse {
            counts,
            page: page.max(1),
            page_count,
            page_size,
            results,
        }))
    }

    #[oai(path = "/operasional/dropdown/", method = "get", tag = "ApiOperasionalTags::Operasional")]
    async fn dropdown_operasional_api(
        &self,
        Query(limit): Query<Option<u32>>,
        Query(search): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> OperasionalDropdownResponses {
        let (mut tx, _) =
            match begin_authorized(&state, auth, LOCATION, "dropdown_operasional_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return OperasionalDropdownResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return OperasionalDropdownResponses::InternalServerError(Json(err))
                }
            };

        let data = match get_dropdown_operasional(&mut tx, limit, search).await {
            Ok(val) => val,
            Err(err) => {
                return OperasionalDropdownResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "dropdown_operasional_api",
                    "get_dropdown_operasional",
                    err,
                )))
            }
        };
        OperasionalDropdownResponses::Ok(Json(
            data.into_iter()
                .map(|x| OperasionalDropdownResponse {
                    id: x.id.to_string(),
                    description: x.description,
                    amount: x.amount,
                    expense_date: date_to_string(x.expense_date),
                })
                .collect(),
        ))
    }

    #[oai(path = "/operasional/detail/", method = "get", tag = "ApiOperasionalTags::Operasional")]
    async fn detail_operasional_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> OperasionalDetailResponses {
        let (mut tx, _) =
            match begin_authorized(&state, auth, LOCATION, "detail_operasional_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return OperasionalDetailResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return OperasionalDetailResponses::InternalServerError(Json(err))
                }
            };

        let Ok(operasional_id) = Uuid::parse_str(&id) else {
            return OperasionalDetailResponses::NotFound(operasional_not_found(&id));
        };
        let operasional = match get_operasional_by_id(&mut tx, &operasional_id).await {
            Ok(Some(val)) => val,
            Ok(None) => return OperasionalDetailResponses::NotFound(operasional_not_found(&id)),
            Err(err) => {
                return OperasionalDetailResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "detail_operasional_api",
                    "get_operasional_by_id",
                    err,
                )))
            }
        };
        match operasional_detail(&mut tx, operasional).await {
            Ok(val) => OperasionalDetailResponses::Ok(Json(val)),
            Err(err) => OperasionalDetailResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "detail_operasional_api",
                "operasional_detail",
                err,
            ))),
        }
    }

    #[oai(path = "/operasional/", method = "post", tag = "ApiOperasionalTags::Operasional")]
    async fn create_operasional_api(
        &self,
        Json(json): Json<OperasionalRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> OperasionalCreateResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "create_operasional_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return OperasionalCreateResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return OperasionalCreateResponses::InternalServerError(Json(err))
                }
            };

        let valid = match validate_operasional_request(&json) {
            Ok(val) => val,
            Err(message) => {
                return OperasionalCreateResponses::BadRequest(Json(BadRequestResponse { message }))
            }
        };
        let now = Local::now().fixed_offset();
        let operasional = Operasional {
            id: Uuid::now_v7(),
            description: valid.description,
            category: json.category,
            amount: json.amount,
            expense_date: valid.expense_date,
            is_active: true,
            created_by: Some(request_user.id),
            updated_by: Some(request_user.id),
            created_date: Some(now),
            updated_date: Some(now),
        };
        if let Err(err) = create_operasional(&mut tx, &operasional).await {
            return OperasionalCreateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "create_operasional_api",
                "create_operasional",
                err,
            )));
        }
        let detail = match operasional_detail(&mut tx, operasional).await {
            Ok(val) => val,
            Err(err) => {
                return OperasionalCreateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "create_operasional_api",
                    "operasional_detail",
                    err,
                )))
            }
        };
        if let Err(err) = tx.commit().await {
            return OperasionalCreateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "create_operasional_api",
                "commit transaction",
                err,
            )));
        }
        OperasionalCreateResponses::Ok(Json(detail))
    }

    #[oai(path = "/operasional/", method = "put", tag = "ApiOperasionalTags::Operasional")]
    async fn update_operasional_api(
        &self,
        Query(id): Query<String>,
        Json(json): Json<OperasionalRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> OperasionalUpdateResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "update_operasional_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return OperasionalUpdateResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return OperasionalUpdateResponses::InternalServerError(Json(err))
                }
            };

        let Ok(operasional_id) = Uuid::parse_str(&id) else {
            return OperasionalUpdateResponses::NotFound(operasional_not_found(&id));
        };
        let mut operasional = match get_operasional_by_id(&mut tx, &operasional_id).await {
            Ok(Some(val)) => val,
            Ok(None) => return OperasionalUpdateResponses::NotFound(operasional_not_found(&id)),
            Err(err) => {
                return OperasionalUpdateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "update_operasional_api",
                    "get_operasional_by_id",
                    err,
                )))
            }
        };
        let valid = match validate_operasional_request(&json) {
            Ok(val) => val,
            Err(message) => {
                return OperasionalUpdateResponses::BadRequest(Json(BadRequestResponse { message }))
            }
        };
        operasional.description = valid.description;
        operasional.category = json.category;
        operasional.amount = json.amount;
        operasional.expense_date = valid.expense_date;

        let now = Local::now().fixed_offset();
        if let Err(err) = update_operasional(&mut tx, &mut operasional, &request_user, &now).await {
            return OperasionalUpdateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "update_operasional_api",
                "update_operasional",
                err,
            )));
        }
        let detail = match operasional_detail(&mut tx, operasional).await {
            Ok(val) => val,
            Err(err) => {
                return OperasionalUpdateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "update_operasional_api",
                    "operasional_detail",
                    err,
                )))
            }
        };
        if let Err(err) = tx.commit().await {
            return OperasionalUpdateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "update_operasional_api",
                "commit transaction",
                err,
            )));
        }
        OperasionalUpdateResponses::Ok(Json(detail))
    }

    #[oai(path = "/operasional/", method = "delete", tag = "ApiOperasionalTags::Operasional")]
    async fn delete_operasional_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> OperasionalDeleteResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "delete_operasional_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return OperasionalDeleteResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return OperasionalDeleteResponses::InternalServerError(Json(err))
                }
            };

        let Ok(operasional_id) = Uuid::parse_str(&id) else {
            return OperasionalDeleteResponses::NotFound(operasional_not_found(&id));
        };
        let mut operasional = match get_operasional_by_id(&mut tx, &operasional_id).await {
            Ok(Some(val)) => val,
            Ok(None) => return OperasionalDeleteResponses::NotFound(operasional_not_found(&id)),
            Err(err) => {
                return OperasionalDeleteResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "delete_operasional_api",
                    "get_operasional_by_id",
                    err,
                )))
            }
        };
        let now = Local::now().fixed_offset();
        if let Err(err) =
            soft_delete_operasional(&mut tx, &mut operasional, &request_user, &now).await
        {
            return OperasionalDeleteResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "delete_operasional_api",
                "soft_delete_operasional",
                err,
            )));
        }
        if let Err(err) = tx.commit().await {
            return OperasionalDeleteResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "delete_operasional_api",
                "commit transaction",
                err,
            )));
        }
        OperasionalDeleteResponses::NoContent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_operasional_request() {
        let mut json = OperasionalRequest {
            description: "Electricity".to_string(),
            category: Some("utility".to_string()),
            amount: 350000,
            expense_date: "2025-03-01".to_string(),
        };
        let valid = validate_operasional_request(&json).unwrap();
        assert_eq!(valid.description, "Electricity");
        assert_eq!(valid.expense_date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());

        json.expense_date = "March 1st".to_string();
        assert!(validate_operasional_request(&json).is_err());

        json.expense_date = "2025-03-01".to_string();
        json.amount = -1;
        assert!(validate_operasional_request(&json).is_err());
    }
}
