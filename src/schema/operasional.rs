use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    BadRequestResponse, DetailUser, InternalServerErrorResponse, NotFoundResponse,
    PaginateResponse, UnauthorizedResponse,
};

#[derive(Object, Deserialize, Serialize)]
pub struct OperasionalDetail {
    pub id: String,
    pub description: String,
    pub category: Option<String>,
    pub amount: i64,
    pub expense_date: String,
    pub is_active: bool,
    pub created_by: Option<DetailUser>,
    pub updated_by: Option<DetailUser>,
    pub created_date: Option<String>,
    pub updated_date: Option<String>,
}

#[derive(Object, Deserialize, Serialize)]
pub struct OperasionalDropdownResponse {
    pub id: String,
    pub description: String,
    pub amount: i64,
    pub expense_date: String,
}

#[derive(ApiResponse)]
pub enum PaginateOperasionalResponses {
    #[oai(status = 200)]
    Ok(Json<PaginateResponse<OperasionalDetail>>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum OperasionalDropdownResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<OperasionalDropdownResponse>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum OperasionalDetailResponses {
    #[oai(status = 200)]
    Ok(Json<OperasionalDetail>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize, Serialize)]
pub struct OperasionalRequest {
    pub description: String,
    pub category: Option<String>,
    pub amount: i64,
    /// YYYY-MM-DD
    pub expense_date: String,
}

#[derive(ApiResponse)]
pub enum OperasionalCreateResponses {
    #[oai(status = 201)]
    Ok(Json<OperasionalDetail>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum OperasionalUpdateResponses {
    #[oai(status = 200)]
    Ok(Json<OperasionalDetail>),

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
pub enum OperasionalDeleteResponses {
    #[oai(status = 204)]
    NoContent,

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
