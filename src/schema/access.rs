use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{InternalServerErrorResponse, UnauthorizedResponse};

#[derive(Object, Deserialize, Serialize)]
pub struct MenuAccessResponse {
    pub menu_id: String,
    pub menu_name: String,
    pub menu_url: String,
    pub icon: Option<String>,
    pub parent_id: Option<String>,
    pub sort_order: i32,
    pub can_read: bool,
    pub can_write: bool,
    pub can_update: bool,
    pub can_delete: bool,
}

#[derive(ApiResponse)]
pub enum MenuAccessResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<MenuAccessResponse>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize, Serialize)]
pub struct AccessCheckResponse {
    pub menu_url: String,
    pub action: String,
    pub allowed: bool,
}

#[derive(ApiResponse)]
pub enum AccessCheckResponses {
    #[oai(status = 200)]
    Ok(Json<AccessCheckResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
