use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};
use sqlx::{Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::{
    core::{
        security::BearerAuthorization,
        utils::{datetime_to_string, datetime_to_string_opt},
    },
    model::{transaction::Transaction as SalesTransaction, transaction_item::TransactionItem},
    repository::{
        customer::get_customer_by_id,
        staff::get_staff_by_id,
        transaction::{
            get_items_by_transaction, get_transaction_by_id, paginate_transaction,
            record_transaction, NewTransaction, NewTransactionItem,
        },
    },
    route::{
        common::{
            audit_users, begin_authorized, internal_error, parse_date_param, parse_uuid_param,
            RequestError,
        },
        daily_sales::daily_sales_detail,
    },
    schema::{
        common::{BadRequestResponse, NotFoundResponse, PaginateResponse, UnauthorizedResponse},
        transaction::{
            PaginateTransactionResponses, TransactionCreateRequest, TransactionCreateResponses,
            TransactionDetail, TransactionDetailResponses, TransactionItemDetail,
            TransactionRecordedResponse,
        },
    },
    settings::get_config,
    AppState,
};

const LOCATION: &str = "route.transaction";

#[derive(Tags)]
enum ApiTransactionTags {
    Transaction,
}

/// `items` are loaded when not given.
async fn transaction_detail(
    tx: &mut Transaction<'_, Postgres>,
    transaction: SalesTransaction,
    items: Option<Vec<TransactionItem>>,
) -> anyhow::Result<TransactionDetail> {
    let items = match items {
        Some(items) => items,
        None => get_items_by_transaction(tx, &transaction.id).await?,
    };
    let staff = get_staff_by_id(tx, &transaction.staff_id).await?;
    let customer = match transaction.customer_id {
        Some(id) => get_customer_by_id(tx, &id).await?,
        None => None,
    };
    let (created_by, updated_by) =
        audit_users(tx, transaction.created_by, transaction.updated_by).await?;
    Ok(TransactionDetail {
        id: transaction.id.to_string(),
        transaction_number: transaction.transaction_number,
        staff_id: transaction.staff_id.to_string(),
        staff_name: staff.map(|x| x.staff_name),
        customer_id: transaction.customer_id.map(|x| x.to_string()),
        customer_name: customer.map(|x| x.customer_name),
        transaction_type: transaction.transaction_type,
        subtotal: transaction.subtotal,
        tax_amount: transaction.tax_amount,
        discount_amount: transaction.discount_amount,
        total_amount: transaction.total_amount,
        payment_method: transaction.payment_method,
        notes: transaction.notes,
        transaction_date: datetime_to_string(transaction.transaction_date),
        items: items
            .into_iter()
            .map(|x| TransactionItemDetail {
                id: x.id.to_string(),
                item_type: x.item_type,
                service_id: x.service_id.map(|x| x.to_string()),
                product_id: x.product_id.map(|x| x.to_string()),
                item_name: x.item_name,
                unit_price: x.unit_price,
                quantity: x.quantity,
                total_price: x.total_price,
            })
            .collect(),
        created_by,
        updated_by,
        created_date: datetime_to_string_opt(transaction.created_date),
        updated_date: datetime_to_string_opt(transaction.updated_date),
    })
}

/// Request ids to a `NewTransaction`. The `Err` is a message for a 400.
fn parse_transaction_request(json: TransactionCreateRequest) -> Result<NewTransaction, String> {
    let Ok(staff_id) = Uuid::parse_str(&json.staff_id) else {
        return Err(format!("staff_id {} is not a valid id", json.staff_id));
    };
    let customer_id = parse_uuid_param("customer_id", json.customer_id)?;
    let mut items: Vec<NewTransactionItem> = vec![];
    for (idx, item) in json.items.into_iter().enumerate() {
        let Ok(item_id) = Uuid::parse_str(&item.item_id) else {
            return Err(format!("item {} item_id is not a valid id", idx));
        };
        items.push(NewTransactionItem {
            item_type: item.item_type,
            item_id,
            unit_price: item.unit_price,
            quantity: item.quantity,
        });
    }
    Ok(NewTransaction {
        staff_id,
        customer_id,
        payment_method: json.payment_method,
        notes: json.notes,
        items,
    })
}

fn transaction_not_found(id: &str) -> Json<NotFoundResponse> {
    Json(NotFoundResponse {
        message: format!("transaction with id = {} not found", id),
    })
}

pub struct ApiTransaction;

#[OpenApi]
impl ApiTransaction {
    /// Record a sale and update the staff's daily sales
    #[oai(
        path = "/transaction/",
        method = "post",
        tag = "ApiTransactionTags::Transaction"
    )]
    async fn create_transaction_api(
        &self,
        Json(json): Json<TransactionCreateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> TransactionCreateResponses {
        let (auth_tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "create_transaction_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return TransactionCreateResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return TransactionCreateResponses::InternalServerError(Json(err))
                }
            };

        let new_transaction = match parse_transaction_request(json) {
            Ok(val) => val,
            Err(message) => {
                return TransactionCreateResponses::BadRequest(Json(BadRequestResponse {
                    message,
                }))
            }
        };

        // release the auth connection, recording takes its own from the pool
        if let Err(err) = auth_tx.commit().await {
            return TransactionCreateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "create_transaction_api",
                "commit auth transaction",
                err,
            )));
        }

        // recorded in its own db transaction, committed before returning
        let config = get_config();
        let recorded =
            match record_transaction(&state.db, &config, &request_user, &new_transaction).await {
                Ok(val) => val,
                Err(err) if err.is_invalid() => {
                    return TransactionCreateResponses::BadRequest(Json(BadRequestResponse {
                        message: err.to_string(),
                    }))
                }
                Err(err) if err.is_not_found() => {
                    return TransactionCreateResponses::NotFound(Json(NotFoundResponse {
                        message: err.to_string(),
                    }))
                }
                Err(err) => {
                    return TransactionCreateResponses::InternalServerError(Json(internal_error(
                        LOCATION,
                        "create_transaction_api",
                        "record_transaction",
                        err,
                    )))
                }
            };
        info!(
            "transaction {} recorded for staff {} by {}",
            recorded.transaction.transaction_number,
            recorded.transaction.staff_id,
            request_user.user_name
        );

        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return TransactionCreateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "create_transaction_api",
                    "begin transaction",
                    err,
                )))
            }
        };
        let transaction = match transaction_detail(
            &mut tx,
            recorded.transaction,
            Some(recorded.items),
        )
        .await
        {
            Ok(val) => val,
            Err(err) => {
                return TransactionCreateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "create_transaction_api",
                    "transaction_detail",
                    err,
                )))
            }
        };
        let daily_sales = match daily_sales_detail(&mut tx, recorded.daily_sales).await {
            Ok(val) => val,
            Err(err) => {
                return TransactionCreateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "create_transaction_api",
                    "daily_sales_detail",
                    err,
                )))
            }
        };
        TransactionCreateResponses::Ok(Json(TransactionRecordedResponse {
            transaction,
            daily_sales,
        }))
    }

    #[oai(
        path = "/transaction/",
        method = "get",
        tag = "ApiTransactionTags::Transaction"
    )]
    async fn paginate_transaction_api(
        &self,
        Query(page): Query<Option<u32>>,
        Query(page_size): Query<Option<u32>>,
        Query(search): Query<Option<String>>,
        Query(staff_id): Query<Option<String>>,
        Query(start_date): Query<Option<String>>,
        Query(end_date): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PaginateTransactionResponses {
        let (mut tx, _) =
            match begin_authorized(&state, auth, LOCATION, "paginate_transaction_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return PaginateTransactionResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return PaginateTransactionResponses::InternalServerError(Json(err))
                }
            };

        let filters = parse_uuid_param("staff_id", staff_id).and_then(|staff_id| {
            Ok((
                staff_id,
                parse_date_param("start_date", start_date)?,
                parse_date_param("end_date", end_date)?,
            ))
        });
        let (staff_id, start_date, end_date) = match filters {
            Ok(val) => val,
            Err(message) => {
                return PaginateTransactionResponses::BadRequest(Json(BadRequestResponse {
                    message,
                }))
            }
        };

        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(10);
        let (data, counts, page_count) = match paginate_transaction(
            &mut tx, page, page_size, search, staff_id, start_date, end_date,
        )
        .await
        {
            Ok(val) => val,
            Err(err) => {
                return PaginateTransactionResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "paginate_transaction_api",
                    "paginate_transaction",
                    err,
                )))
            }
        };

        let mut results: Vec<TransactionDetail> = vec![];
        for item in data {
            match transaction_detail(&mut tx, item, None).await {
                Ok(val) => results.push(val),
                Err(err) => {
                    return PaginateTransactionResponses::InternalServerError(Json(
                        internal_error(
                            LOCATION,
                            "paginate_transaction_api",
                            "transaction_detail",
                            err,
                        ),
                    ))
                }
            }
        }

        PaginateTransactionResponses::Ok(Json(PaginateResponse {
            counts,
            page: page.max(1),
            page_count,
            page_size,
            results,
        }))
    }

    #[oai(
        path = "/transaction/detail/",
        method = "get",
        tag = "ApiTransactionTags::Transaction"
    )]
    async fn detail_transaction_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> TransactionDetailResponses {
        let (mut tx, _) =
            match begin_authorized(&state, auth, LOCATION, "detail_transaction_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return TransactionDetailResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return TransactionDetailResponses::InternalServerError(Json(err))
                }
            };

        let Ok(transaction_id) = Uuid::parse_str(&id) else {
            return TransactionDetailResponses::NotFound(transaction_not_found(&id));
        };
        let transaction = match get_transaction_by_id(&mut tx, &transaction_id).await {
            Ok(Some(val)) => val,
            Ok(None) => return TransactionDetailResponses::NotFound(transaction_not_found(&id)),
            Err(err) => {
                return TransactionDetailResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "detail_transaction_api",
                    "get_transaction_by_id",
                    err,
                )))
            }
        };
        match transaction_detail(&mut tx, transaction, None).await {
            Ok(val) => TransactionDetailResponses::Ok(Json(val)),
            Err(err) => TransactionDetailResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "detail_transaction_api",
                "transaction_detail",
                err,
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{model::transaction_item::ItemType, schema::transaction::TransactionItemRequest};

    use super::*;

    fn request(staff_id: String, item_id: String) -> TransactionCreateRequest {
        TransactionCreateRequest {
            staff_id,
            customer_id: None,
            payment_method: "cash".to_string(),
            notes: None,
            items: vec![TransactionItemRequest {
                item_type: ItemType::Service,
                item_id,
                unit_price: 25000,
                quantity: 1,
            }],
        }
    }

    #[test]
    fn test_parse_transaction_request() {
        let staff_id = Uuid::now_v7();
        let item_id = Uuid::now_v7();
        let parsed =
            parse_transaction_request(request(staff_id.to_string(), item_id.to_string())).unwrap();
        assert_eq!(parsed.staff_id, staff_id);
        assert_eq!(parsed.customer_id, None);
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.items[0].item_id, item_id);
        assert_eq!(parsed.items[0].item_type, ItemType::Service);
    }

    #[test]
    fn test_parse_transaction_request_rejects_bad_ids() {
        let id = Uuid::now_v7().to_string();
        assert!(parse_transaction_request(request("staff".to_string(), id.clone())).is_err());
        assert!(parse_transaction_request(request(id, "item".to_string())).is_err());
    }
}
