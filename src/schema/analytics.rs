use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{BadRequestResponse, InternalServerErrorResponse, UnauthorizedResponse};

#[derive(Object, Deserialize, Serialize)]
pub struct SalesSummaryResponse {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub total_transactions: i64,
    pub total_services: i64,
    pub total_products: i64,
    pub gross_sales: i64,
    pub net_sales: i64,
    pub total_expenses: i64,
    pub profit: i64,
}

#[derive(Object, Deserialize, Serialize)]
pub struct DailySalesPointResponse {
    pub sales_date: String,
    pub total_transactions: i64,
    pub total_services: i64,
    pub total_products: i64,
    pub gross_sales: i64,
    pub net_sales: i64,
}

#[derive(Object, Deserialize, Serialize)]
pub struct StaffPerformanceResponse {
    pub staff_id: String,
    pub staff_name: String,
    pub level_name: Option<String>,
    pub commission_rate: i32,
    pub total_transactions: i64,
    pub total_services: i64,
    pub total_products: i64,
    pub gross_sales: i64,
    pub net_sales: i64,
    pub commission: i64,
}

#[derive(Object, Deserialize, Serialize)]
pub struct TopItemResponse {
    pub item_type: String,
    pub item_id: Option<String>,
    pub item_name: String,
    pub total_quantity: i64,
    pub total_sales: i64,
}

#[derive(ApiResponse)]
pub enum SalesSummaryResponses {
    #[oai(status = 200)]
    Ok(Json<SalesSummaryResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum DailySeriesResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<DailySalesPointResponse>>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum StaffPerformanceResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<StaffPerformanceResponse>>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum TopItemResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<TopItemResponse>>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
