use std::sync::Arc;

use chrono::Local;
use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::{security::BearerAuthorization, utils::datetime_to_string_opt},
    model::customer::Customer,
    repository::customer::{
        create_customer, get_customer_by_id, get_dropdown_customer, paginate_customer,
        soft_delete_customer, update_customer,
    },
    route::common::{audit_users, begin_authorized, internal_error, RequestError},
    schema::{
        common::{BadRequestResponse, NotFoundResponse, PaginateResponse, UnauthorizedResponse},
        customer::{
            CustomerCreateResponses, CustomerDeleteResponses, CustomerDetail,
            CustomerDetailResponses, CustomerDropdownResponse, CustomerDropdownResponses,
            CustomerRequest, CustomerUpdateResponses, PaginateCustomerResponses,
        },
    },
    AppState,
};

const LOCATION: &str = "route.customer";

#[derive(Tags)]
enum ApiCustomerTags {
    Customer,
}

async fn customer_detail(
    tx: &mut Transaction<'_, Postgres>,
    customer: Customer,
) -> anyhow::Result<CustomerDetail> {
    let (created_by, updated_by) =
        audit_users(tx, customer.created_by, customer.updated_by).await?;
    Ok(CustomerDetail {
        id: customer.id.to_string(),
        customer_name: customer.customer_name,
        phone: customer.phone,
        email: customer.email,
        notes: customer.notes,
        is_active: customer.is_active,
        created_by,
        updated_by,
        created_date: datetime_to_string_opt(customer.created_date),
        updated_date: datetime_to_string_opt(customer.updated_date),
    })
}

fn customer_not_found(id: &str) -> Json<NotFoundResponse> {
    Json(NotFoundResponse {
        message: format!("customer with id = {} not found", id),
    })
}

pub struct ApiCustomer;

#[OpenApi]
impl ApiCustomer {
    #[oai(path = "/customer/", method = "get", tag = "ApiCustomerTags::Customer")]
    async fn paginate_customer_api(
        &self,
        Query(page): Query<Option<u32>>,
        Query(page_size): Query<Option<u32>>,
        Query(search): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PaginateCustomerResponses {
        let (mut tx, _) =
            match begin_authorized(&state, auth, LOCATION, "paginate_customer_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return PaginateCustomerResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return PaginateCustomerResponses::InternalServerError(Json(err))
                }
            };

        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(10);
        let (data, counts, page_count) =
            match paginate_customer(&mut tx, page, page_size, search).await {
                Ok(val) => val,
                Err(err) => {
                    return PaginateCustomerResponses::InternalServerError(Json(internal_error(
                        LOCATION,
                        "paginate_customer_api",
                        "paginate_customer",
                        err,
                    )))
                }
            };

        let mut results: Vec<CustomerDetail> = vec![];
        for item in data {
            match customer_detail(&mut tx, item).await {
                Ok(val) => results.push(val),
                Err(err) => {
                    return PaginateCustomerResponses::InternalServerError(Json(internal_error(
                        LOCATION,
                        "paginate_customer_api",
                        "customer_detail",
                        err,
                    )))
                }
            }
        }

        PaginateCustomerResponses::Ok(Json(PaginateResponse {
            counts,
            page: page.max(1),
            page_count,
            page_size,
            results,
        }))
    }

    #[oai(path = "/customer/dropdown/", method = "get", tag = "ApiCustomerTags::Customer")]
    async fn dropdown_customer_api(
        &self,
        Query(limit): Query<Option<u32>>,
        Query(search): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> CustomerDropdownResponses {
        let (mut tx, _) =
            match begin_authorized(&state, auth, LOCATION, "dropdown_customer_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return CustomerDropdownResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return CustomerDropdownResponses::InternalServerError(Json(err))
                }
            };

        let data = match get_dropdown_customer(&mut tx, limit, search).await {
            Ok(val) => val,
            Err(err) => {
                return CustomerDropdownResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "dropdown_customer_api",
                    "get_dropdown_customer",
                    err,
                )))
            }
        };
        CustomerDropdownResponses::Ok(Json(
            data.into_iter()
                .map(|x| CustomerDropdownResponse {
                    id: x.id.to_string(),
                    customer_name: x.customer_name,
                    phone: x.phone,
                })
                .collect(),
        ))
    }

    #[oai(path = "/customer/detail/", method = "get", tag = "ApiCustomerTags::Customer")]
    async fn detail_customer_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> CustomerDetailResponses {
        let (mut tx, _) =
            match begin_authorized(&state, auth, LOCATION, "detail_customer_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return CustomerDetailResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return CustomerDetailResponses::InternalServerError(Json(err))
                }
            };

        let Ok(customer_id) = Uuid::parse_str(&id) else {
            return CustomerDetailResponses::NotFound(customer_not_found(&id));
        };
        let customer = match get_customer_by_id(&mut tx, &customer_id).await {
            Ok(Some(val)) => val,
            Ok(None) => return CustomerDetailResponses::NotFound(customer_not_found(&id)),
            Err(err) => {
                return CustomerDetailResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "detail_customer_api",
                    "get_customer_by_id",
                    err,
                )))
            }
        };
        match customer_detail(&mut tx, customer).await {
            Ok(val) => CustomerDetailResponses::Ok(Json(val)),
            Err(err) => CustomerDetailResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "detail_customer_api",
                "customer_detail",
                err,
            ))),
        }
    }

    #[oai(path = "/customer/", method = "post", tag = "ApiCustomerTags::Customer")]
    async fn create_customer_api(
        &self,
        Json(json): Json<CustomerRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> CustomerCreateResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "create_customer_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return CustomerCreateResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return CustomerCreateResponses::InternalServerError(Json(err))
                }
            };

        let customer_name = json.customer_name.trim().to_string();
        if customer_name.is_empty() {
            return CustomerCreateResponses::BadRequest(Json(BadRequestResponse {
                message: "customer_name is required".to_string(),
            }));
        }
        let now = Local::now().fixed_offset();
        let customer = Customer {
            id: Uuid::now_v7(),
            customer_name,
            phone: json.phone,
            email: json.email,
            notes: json.notes,
            is_active: true,
            created_by: Some(request_user.id),
            updated_by: Some(request_user.id),
            created_date: Some(now),
            updated_date: Some(now),
        };
        if let Err(err) = create_customer(&mut tx, &customer).await {
            return CustomerCreateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "create_customer_api",
                "create_customer",
                err,
            )));
        }
        let detail = match customer_detail(&mut tx, customer).await {
            Ok(val) => val,
            Err(err) => {
                return CustomerCreateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "create_customer_api",
                    "customer_detail",
                    err,
                )))
            }
        };
        if let Err(err) = tx.commit().await {
            return CustomerCreateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "create_customer_api",
                "commit transaction",
                err,
            )));
        }
        CustomerCreateResponses::Ok(Json(detail))
    }

    #[oai(path = "/customer/", method = "put", tag = "ApiCustomerTags::Customer")]
    async fn update_customer_api(
        &self,
        Query(id): Query<String>,
        Json(json): Json<CustomerRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> CustomerUpdateResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "update_customer_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return CustomerUpdateResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return CustomerUpdateResponses::InternalServerError(Json(err))
                }
            };

        let Ok(customer_id) = Uuid::parse_str(&id) else {
            return CustomerUpdateResponses::NotFound(customer_not_found(&id));
        };
        let mut customer = match get_customer_by_id(&mut tx, &customer_id).await {
            Ok(Some(val)) => val,
            Ok(None) => return CustomerUpdateResponses::NotFound(customer_not_found(&id)),
            Err(err) => {
                return CustomerUpdateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "update_customer_api",
                    "get_customer_by_id",
                    err,
                )))
            }
        };
        let customer_name = json.customer_name.trim().to_string();
        if customer_name.is_empty() {
            return CustomerUpdateResponses::BadRequest(Json(BadRequestResponse {
                message: "customer_name is required".to_string(),
            }));
        }
        customer.customer_name = customer_name;
        customer.phone = json.phone;
        customer.email = json.email;
        customer.notes = json.notes;

        let now = Local::now().fixed_offset();
        if let Err(err) = update_customer(&mut tx, &mut customer, &request_user, &now).await {
            return CustomerUpdateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "update_customer_api",
                "update_customer",
                err,
            )));
        }
        let detail = match customer_detail(&mut tx, customer).await {
            Ok(val) => val,
            Err(err) => {
                return CustomerUpdateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "update_customer_api",
                    "customer_detail",
                    err,
                )))
            }
        };
        if let Err(err) = tx.commit().await {
            return CustomerUpdateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "update_customer_api",
                "commit transaction",
                err,
            )));
        }
        CustomerUpdateResponses::Ok(Json(detail))
    }

    #[oai(path = "/customer/", method = "delete", tag = "ApiCustomerTags::Customer")]
    async fn delete_customer_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> CustomerDeleteResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "delete_customer_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return CustomerDeleteResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return CustomerDeleteResponses::InternalServerError(Json(err))
                }
            };

        let Ok(customer_id) = Uuid::parse_str(&id) else {
            return CustomerDeleteResponses::NotFound(customer_not_found(&id));
        };
        let mut customer = match get_customer_by_id(&mut tx, &customer_id).await {
            Ok(Some(val)) => val,
            Ok(None) => return CustomerDeleteResponses::NotFound(customer_not_found(&id)),
            Err(err) => {
                return CustomerDeleteResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "delete_customer_api",
                    "get_customer_by_id",
                    err,
                )))
            }
        };
        let now = Local::now().fixed_offset();
        if let Err(err) = soft_delete_customer(&mut tx, &mut customer, &request_user, &now).await {
            return CustomerDeleteResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "delete_customer_api",
                "soft_delete_customer",
                err,
            )));
        }
        if let Err(err) = tx.commit().await {
            return CustomerDeleteResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "delete_customer_api",
                "commit transaction",
                err,
            )));
        }
        CustomerDeleteResponses::NoContent
    }
}
