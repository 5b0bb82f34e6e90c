use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    BadRequestResponse, InternalServerErrorResponse, PaginateResponse, UnauthorizedResponse,
};

#[derive(Object, Deserialize, Serialize)]
pub struct DailySalesDetail {
    pub id: String,
    pub sales_date: String,
    pub staff_id: String,
    pub staff_name: Option<String>,
    pub total_transactions: i32,
    pub total_services: i32,
    pub total_products: i32,
    pub gross_sales: i64,
    pub net_sales: i64,
    pub updated_date: Option<String>,
}

#[derive(ApiResponse)]
pub enum PaginateDailySalesResponses {
    #[oai(status = 200)]
    Ok(Json<PaginateResponse<DailySalesDetail>>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
