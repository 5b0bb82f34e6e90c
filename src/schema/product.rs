use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    BadRequestResponse, DetailUser, InternalServerErrorResponse, NotFoundResponse,
    PaginateResponse, UnauthorizedResponse,
};

#[derive(Object, Deserialize, Serialize)]
pub struct ProductDetail {
    pub id: String,
    pub product_name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: i64,
    pub stock: i32,
    pub is_active: bool,
    pub created_by: Option<DetailUser>,
    pub updated_by: Option<DetailUser>,
    pub created_date: Option<String>,
    pub updated_date: Option<String>,
}

#[derive(Object, Deserialize, Serialize)]
pub struct ProductDropdownResponse {
    pub id: String,
    pub product_name: String,
    pub price: i64,
    pub stock: i32,
}

#[derive(ApiResponse)]
pub enum PaginateProductResponses {
    #[oai(status = 200)]
    Ok(Json<PaginateResponse<ProductDetail>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum ProductDropdownResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<ProductDropdownResponse>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum ProductDetailResponses {
    #[oai(status = 200)]
    Ok(Json<ProductDetail>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize, Serialize)]
pub struct ProductCreateRequest {
    pub product_name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: i64,
    pub stock: Option<i32>,
}

/// Stock is changed through `/product/stock/` only.
#[derive(Object, Deserialize, Serialize)]
pub struct ProductUpdateRequest {
    pub product_name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: i64,
}

#[derive(ApiResponse)]
pub enum ProductCreateResponses {
    #[oai(status = 201)]
    Ok(Json<ProductDetail>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum ProductUpdateResponses {
    #[oai(status = 200)]
    Ok(Json<ProductDetail>),

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
pub enum ProductDeleteResponses {
    #[oai(status = 204)]
    NoContent,

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize, Serialize)]
pub struct ProductStockRequest {
    pub product_id: String,
    /// negative to take stock out
    pub delta: i32,
}

#[derive(ApiResponse)]
pub enum ProductStockResponses {
    #[oai(status = 200)]
    Ok(Json<ProductDetail>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
