use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{BadRequestResponse, InternalServerErrorResponse, UnauthorizedResponse};

#[derive(Object, Deserialize, Serialize, Clone, Debug)]
pub struct WebhookEmailAddress {
    pub email_address: String,
}

#[derive(Object, Deserialize, Serialize, Clone, Debug)]
pub struct WebhookUserData {
    /// identity provider user id, stored as `external_id`
    pub id: String,
    pub username: Option<String>,
    pub email_addresses: Option<Vec<WebhookEmailAddress>>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl WebhookUserData {
    pub fn primary_email(&self) -> Option<String> {
        self.email_addresses
            .as_ref()
            .and_then(|x| x.first())
            .map(|x| x.email_address.clone())
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct WebhookUserEvent {
    /// `user.created`, `user.updated` or `user.deleted`
    #[oai(rename = "type")]
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookUserData,
}

#[derive(Object, Deserialize, Serialize)]
pub struct WebhookResponse {
    pub event_type: String,
    /// false for unknown events and deletes of unknown users
    pub handled: bool,
    pub user_id: Option<String>,
}

#[derive(ApiResponse)]
pub enum WebhookResponses {
    #[oai(status = 200)]
    Ok(Json<WebhookResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
