use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use crate::model::transaction_item::ItemType;

use super::{
    common::{
        BadRequestResponse, DetailUser, InternalServerErrorResponse, NotFoundResponse,
        PaginateResponse, UnauthorizedResponse,
    },
    daily_sales::DailySalesDetail,
};

#[derive(Object, Deserialize, Serialize)]
pub struct TransactionItemRequest {
    pub item_type: ItemType,
    /// service or product id, depending on `item_type`
    pub item_id: String,
    pub unit_price: i64,
    pub quantity: i32,
}

#[derive(Object, Deserialize, Serialize)]
pub struct TransactionCreateRequest {
    pub staff_id: String,
    pub customer_id: Option<String>,
    pub payment_method: String,
    pub notes: Option<String>,
    pub items: Vec<TransactionItemRequest>,
}

#[derive(Object, Deserialize, Serialize)]
pub struct TransactionItemDetail {
    pub id: String,
    pub item_type: String,
    pub service_id: Option<String>,
    pub product_id: Option<String>,
    pub item_name: String,
    pub unit_price: i64,
    pub quantity: i32,
    pub total_price: i64,
}

#[derive(Object, Deserialize, Serialize)]
pub struct TransactionDetail {
    pub id: String,
    pub transaction_number: String,
    pub staff_id: String,
    pub staff_name: Option<String>,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub transaction_type: String,
    pub subtotal: i64,
    pub tax_amount: i64,
    pub discount_amount: i64,
    pub total_amount: i64,
    pub payment_method: String,
    pub notes: Option<String>,
    pub transaction_date: String,
    pub items: Vec<TransactionItemDetail>,
    pub created_by: Option<DetailUser>,
    pub updated_by: Option<DetailUser>,
    pub created_date: Option<String>,
    pub updated_date: Option<String>,
}

#[derive(Object, Deserialize, Serialize)]
pub struct TransactionRecordedResponse {
    pub transaction: TransactionDetail,
    /// the staff's row for the business day after this transaction
    pub daily_sales: DailySalesDetail,
}

#[derive(ApiResponse)]
pub enum TransactionCreateResponses {
    #[oai(status = 201)]
    Ok(Json<TransactionRecordedResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum PaginateTransactionResponses {
    #[oai(status = 200)]
    Ok(Json<PaginateResponse<TransactionDetail>>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum TransactionDetailResponses {
    #[oai(status = 200)]
    Ok(Json<TransactionDetail>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
