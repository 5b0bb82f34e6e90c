use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    BadRequestResponse, DetailUser, InternalServerErrorResponse, NotFoundResponse,
    UnauthorizedResponse,
};

#[derive(Object, Deserialize, Serialize)]
pub struct MenuRoleDetail {
    pub id: String,
    pub menu_id: String,
    pub menu_name: Option<String>,
    pub menu_url: Option<String>,
    pub group_id: String,
    pub can_read: bool,
    pub can_write: bool,
    pub can_update: bool,
    pub can_delete: bool,
    pub created_by: Option<DetailUser>,
    pub updated_by: Option<DetailUser>,
    pub created_date: Option<String>,
    pub updated_date: Option<String>,
}

#[derive(ApiResponse)]
pub enum MenuRoleListResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<MenuRoleDetail>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

/// Flags left out are not granted.
#[derive(Object, Deserialize, Serialize)]
pub struct MenuRoleUpsertRequest {
    pub menu_id: String,
    pub group_id: String,
    pub can_read: Option<bool>,
    pub can_write: Option<bool>,
    pub can_update: Option<bool>,
    pub can_delete: Option<bool>,
}

#[derive(ApiResponse)]
pub enum MenuRoleUpsertResponses {
    #[oai(status = 200)]
    Ok(Json<MenuRoleDetail>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum MenuRoleDeleteResponses {
    #[oai(status = 204)]
    NoContent,

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
