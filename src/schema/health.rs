use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

#[derive(Object, Deserialize, Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub ok: bool,
    pub detail: Option<String>,
}

#[derive(Object, Deserialize, Serialize)]
pub struct HealthResponse {
    /// `ok` when every check passed
    pub status: String,
    pub checks: Vec<HealthCheck>,
}

#[derive(ApiResponse)]
pub enum HealthResponses {
    #[oai(status = 200)]
    Ok(Json<HealthResponse>),

    #[oai(status = 503)]
    ServiceUnavailable(Json<HealthResponse>),
}
