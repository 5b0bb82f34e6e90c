use std::sync::Arc;

use chrono::Local;
use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::{security::BearerAuthorization, utils::datetime_to_string_opt},
    model::service::Service,
    repository::service::{
        create_service, get_dropdown_service, get_service_by_id, paginate_service,
        soft_delete_service, update_service,
    },
    route::common::{audit_users, begin_authorized, internal_error, RequestError},
    schema::{
        common::{BadRequestResponse, NotFoundResponse, PaginateResponse, UnauthorizedResponse},
        service::{
            PaginateServiceResponses, ServiceCreateResponses, ServiceDeleteResponses, ServiceDetail,
            ServiceDetailResponses, ServiceDropdownResponse, ServiceDropdownResponses,
            ServiceRequest, ServiceUpdateResponses,
        },
    },
    AppState,
};

const LOCATION: &str = "route.service";

#[derive(Tags)]
enum ApiServiceTags {
    Service,
}

async fn service_detail(
    tx: &mut Transaction<'_, Postgres>,
    service: Service,
) -> anyhow::Result<ServiceDetail> {
    let (created_by, updated_by) = audit_users(tx, service.created_by, service.updated_by).await?;
    Ok(ServiceDetail {
        id: service.id.to_string(),
        service_name: service.service_name,
        description: service.description,
        price: service.price,
        duration_minutes: service.duration_minutes,
        is_active: service.is_active,
        created_by,
        updated_by,
        created_date: datetime_to_string_opt(service.created_date),
        updated_date: datetime_to_string_opt(service.updated_date),
    })
}

fn validate_service_request(json: &ServiceRequest) -> Result<String, String> {
    let service_name = json.service_name.trim().to_string();
    if service_name.is_empty() {
        return Err("service_name is required".to_string());
    }
    if json.price < 0 {
        return Err("price cannot be negative".to_string());
    }
    if json.duration_minutes.is_some_and(|x| x < 0) {
        return Err("duration_minutes cannot be negative".to_string());
    }
    Ok(service_name)
}

fn service_not_found(id: &str) -> Json<NotFoundResponse> {
    Json(NotFoundResponse {
        message: format!("service with id = {} not found", id),
    })
}

pub struct ApiService;

#[OpenApi]
impl ApiService {
    #[oai(path = "/service/", method = "get", tag = "ApiServiceTags::Service")]
    async fn paginate_service_api(
        &self,
        Query(page): Query<Option<u32>>,
        Query(page_size): Query<Option<u32>>,
        Query(search): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PaginateServiceResponses {
        let (mut tx, _) =
            match begin_authorized(&state, auth, LOCATION, "paginate_service_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return PaginateServiceResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return PaginateServiceResponses::InternalServerError(Json(err))
                }
            };

        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(10);
        let (data, counts, page_count) =
            match paginate_service(&mut tx, page, page_size, search).await {
                Ok(val) => val,
                Err(err) => {
                    return PaginateServiceResponses::InternalServerError(Json(internal_error(
                        LOCATION,
                        "paginate_service_api",
                        "paginate_service",
                        err,
                    )))
                }
            };

        let mut results: Vec<ServiceDetail> = vec![];
        for item in data {
            match service_detail(&mut tx, item).await {
                Ok(val) => results.push(val),
                Err(err) => {
                    return PaginateServiceResponses::InternalServerError(Json(internal_error(
                        LOCATION,
                        "paginate_service_api",
                        "service_detail",
                        err,
                    )))
                }
            }
        }

        PaginateServiceResponses::Ok(Json(PaginateResponse {
            counts,
            page: page.max(1),
            page_count,
            page_size,
            results,
        }))
    }

    #[oai(path = "/service/dropdown/", method = "get", tag = "ApiServiceTags::Service")]
    async fn dropdown_service_api(
        &self,
        Query(limit): Query<Option<u32>>,
        Query(search): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ServiceDropdownResponses {
        let (mut tx, _) =
            match begin_authorized(&state, auth, LOCATION, "dropdown_service_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return ServiceDropdownResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return ServiceDropdownResponses::InternalServerError(Json(err))
                }
            };

        let data = match get_dropdown_service(&mut tx, limit, search).await {
            Ok(val) => val,
            Err(err) => {
                return ServiceDropdownResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "dropdown_service_api",
                    "get_dropdown_service",
                    err,
                )))
            }
        };
        ServiceDropdownResponses::Ok(Json(
            data.into_iter()
                .map(|x| ServiceDropdownResponse {
                    id: x.id.to_string(),
                    service_name: x.service_name,
                    price: x.price,
                    duration_minutes: x.duration_minutes,
                })
                .collect(),
        ))
    }

    #[oai(path = "/service/detail/", method = "get", tag = "ApiServiceTags::Service")]
    async fn detail_service_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ServiceDetailResponses {
        let (mut tx, _) =
            match begin_authorized(&state, auth, LOCATION, "detail_service_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return ServiceDetailResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return ServiceDetailResponses::InternalServerError(Json(err))
                }
            };

        let Ok(service_id) = Uuid::parse_str(&id) else {
            return ServiceDetailResponses::NotFound(service_not_found(&id));
        };
        let service = match get_service_by_id(&mut tx, &service_id).await {
            Ok(Some(val)) => val,
            Ok(None) => return ServiceDetailResponses::NotFound(service_not_found(&id)),
            Err(err) => {
                return ServiceDetailResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "detail_service_api",
                    "get_service_by_id",
                    err,
                )))
            }
        };
        match service_detail(&mut tx, service).await {
            Ok(val) => ServiceDetailResponses::Ok(Json(val)),
            Err(err) => ServiceDetailResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "detail_service_api",
                "service_detail",
                err,
            ))),
        }
    }

    #[oai(path = "/service/", method = "post", tag = "ApiServiceTags::Service")]
    async fn create_service_api(
        &self,
        Json(json): Json<ServiceRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ServiceCreateResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "create_service_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return ServiceCreateResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return ServiceCreateResponses::InternalServerError(Json(err))
                }
            };

        let service_name = match validate_service_request(&json) {
            Ok(val) => val,
            Err(message) => {
                return ServiceCreateResponses::BadRequest(Json(BadRequestResponse { message }))
            }
        };
        let now = Local::now().fixed_offset();
        let service = Service {
            id: Uuid::now_v7(),
            service_name,
            description: json.description,
            price: json.price,
            duration_minutes: json.duration_minutes.unwrap_or(0),
            is_active: true,
            created_by: Some(request_user.id),
            updated_by: Some(request_user.id),
            created_date: Some(now),
            updated_date: Some(now),
        };
        if let Err(err) = create_service(&mut tx, &service).await {
            return ServiceCreateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "create_service_api",
                "create_service",
                err,
            )));
        }
        let detail = match service_detail(&mut tx, service).await {
            Ok(val) => val,
            Err(err) => {
                return ServiceCreateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "create_service_api",
                    "service_detail",
                    err,
                )))
            }
        };
        if let Err(err) = tx.commit().await {
            return ServiceCreateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "create_service_api",
                "commit transaction",
                err,
            )));
        }
        ServiceCreateResponses::Ok(Json(detail))
    }

    #[oai(path = "/service/", method = "put", tag = "ApiServiceTags::Service")]
    async fn update_service_api(
        &self,
        Query(id): Query<String>,
        Json(json): Json<ServiceRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ServiceUpdateResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "update_service_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return ServiceUpdateResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return ServiceUpdateResponses::InternalServerError(Json(err))
                }
            };

        let Ok(service_id) = Uuid::parse_str(&id) else {
            return ServiceUpdateResponses::NotFound(service_not_found(&id));
        };
        let mut service = match get_service_by_id(&mut tx, &service_id).await {
            Ok(Some(val)) => val,
            Ok(None) => return ServiceUpdateResponses::NotFound(service_not_found(&id)),
            Err(err) => {
                return ServiceUpdateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "update_service_api",
                    "get_service_by_id",
                    err,
                )))
            }
        };
        let service_name = match validate_service_request(&json) {
            Ok(val) => val,
            Err(message) => {
                return ServiceUpdateResponses::BadRequest(Json(BadRequestResponse { message }))
            }
        };
        service.service_name = service_name;
        service.description = json.description;
        service.price = json.price;
        service.duration_minutes = json.duration_minutes.unwrap_or(service.duration_minutes);

        let now = Local::now().fixed_offset();
        if let Err(err) = update_service(&mut tx, &mut service, &request_user, &now).await {
            return ServiceUpdateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "update_service_api",
                "update_service",
                err,
            )));
        }
        let detail = match service_detail(&mut tx, service).await {
            Ok(val) => val,
            Err(err) => {
                return ServiceUpdateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "update_service_api",
                    "service_detail",
                    err,
                )))
            }
        };
        if let Err(err) = tx.commit().await {
            return ServiceUpdateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "update_service_api",
                "commit transaction",
                err,
            )));
        }
        ServiceUpdateResponses::Ok(Json(detail))
    }

    #[oai(path = "/service/", method = "delete", tag = "ApiServiceTags::Service")]
    async fn delete_service_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ServiceDeleteResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "delete_service_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return ServiceDeleteResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return ServiceDeleteResponses::InternalServerError(Json(err))
                }
            };

        let Ok(service_id) = Uuid::parse_str(&id) else {
            return ServiceDeleteResponses::NotFound(service_not_found(&id));
        };
        let mut service = match get_service_by_id(&mut tx, &service_id).await {
            Ok(Some(val)) => val,
            Ok(None) => return ServiceDeleteResponses::NotFound(service_not_found(&id)),
            Err(err) => {
                return ServiceDeleteResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "delete_service_api",
                    "get_service_by_id",
                    err,
                )))
            }
        };
        let now = Local::now().fixed_offset();
        if let Err(err) = soft_delete_service(&mut tx, &mut service, &request_user, &now).await {
            return ServiceDeleteResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "delete_service_api",
                "soft_delete_service",
                err,
            )));
        }
        if let Err(err) = tx.commit().await {
            return ServiceDeleteResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "delete_service_api",
                "commit transaction",
                err,
            )));
        }
        ServiceDeleteResponses::NoContent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_service_request() {
        let mut json = ServiceRequest {
            service_name: "Hair Cut ".to_string(),
            description: None,
            price: 25000,
            duration_minutes: Some(30),
        };
        assert_eq!(validate_service_request(&json), Ok("Hair Cut".to_string()));

        json.price = -1;
        assert!(validate_service_request(&json).is_err());

        json.price = 0;
        json.duration_minutes = Some(-5);
        assert!(validate_service_request(&json).is_err());

        json.duration_minutes = None;
        json.service_name = "".to_string();
        assert!(validate_service_request(&json).is_err());
    }
}
