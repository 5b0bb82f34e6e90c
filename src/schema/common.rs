use poem_openapi::{
    types::{ParseFromJSON, ToJSON},
    Object,
};
use serde::{Deserialize, Serialize};

use crate::model::user::User;

#[derive(Object, Deserialize, Serialize)]
pub struct PaginateResponse<T: ParseFromJSON + ToJSON + Send + Sync> {
    pub counts: u32,
    pub page: u32,
    pub page_count: u32,
    pub page_size: u32,
    pub results: Vec<T>,
}

#[derive(Object, Deserialize, Serialize)]
pub struct BadRequestResponse {
    pub message: String,
}

#[derive(Object, Deserialize, Serialize)]
pub struct UnauthorizedResponse {
    pub message: String,
}

impl Default for UnauthorizedResponse {
    fn default() -> Self {
        Self {
            message: "Unauthorized".to_string(),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct NotFoundResponse {
    pub message: String,
}

#[derive(Object, Deserialize, Serialize)]
pub struct InternalServerErrorResponse {
    pub message: String,
    pub location: String,
    pub function: String,
    pub step: String,
    pub detail: String,
}

impl InternalServerErrorResponse {
    /// Build the 500 body and log it.
    pub fn new(location: &str, function: &str, step: &str, detail: &str) -> Self {
        tracing::error!(location, function, step, detail, "internal server error");
        Self {
            message: "Internal Server Error".to_string(),
            location: location.to_string(),
            function: function.to_string(),
            step: step.to_string(),
            detail: detail.to_string(),
        }
    }
}

/// `created_by` / `updated_by` shown on every detail response.
#[derive(Object, Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct DetailUser {
    pub id: String,
    pub user_name: String,
}

impl From<User> for DetailUser {
    fn from(value: User) -> Self {
        Self {
            id: value.id.to_string(),
            user_name: value.user_name,
        }
    }
}
