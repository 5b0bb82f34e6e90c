use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    BadRequestResponse, DetailUser, InternalServerErrorResponse, NotFoundResponse,
    PaginateResponse, UnauthorizedResponse,
};

#[derive(Object, Deserialize, Serialize)]
pub struct GroupDetail {
    pub id: String,
    pub group_name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_by: Option<DetailUser>,
    pub updated_by: Option<DetailUser>,
    pub created_date: Option<String>,
    pub updated_date: Option<String>,
}

#[derive(ApiResponse)]
pub enum PaginateGroupResponses {
    #[oai(status = 200)]
    Ok(Json<PaginateResponse<GroupDetail>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize, Serialize)]
pub struct GroupDropdownResponse {
    pub id: String,
    pub group_name: String,
}

#[derive(ApiResponse)]
pub enum GroupDropdownResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<GroupDropdownResponse>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum GroupDetailResponses {
    #[oai(status = 200)]
    Ok(Json<GroupDetail>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize, Serialize)]
pub struct GroupCreateRequest {
    pub group_name: String,
    pub description: Option<String>,
}

#[derive(ApiResponse)]
pub enum GroupCreateResponses {
    #[oai(status = 201)]
    Ok(Json<GroupDetail>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize, Serialize)]
pub struct GroupUpdateRequest {
    pub group_name: String,
    pub description: Option<String>,
}

#[derive(ApiResponse)]
pub enum GroupUpdateResponses {
    #[oai(status = 200)]
    Ok(Json<GroupDetail>),

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
pub enum GroupDeleteResponses {
    #[oai(status = 204)]
    NoContent,

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
