use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{payload::Json, OpenApi, Tags};
use tracing::error;

use crate::{
    core::session::ping,
    schema::health::{HealthCheck, HealthResponse, HealthResponses},
    AppState,
};

#[derive(Tags)]
enum ApiHealthTags {
    Health,
}

fn check(name: &str, result: anyhow::Result<()>) -> HealthCheck {
    match result {
        Ok(()) => HealthCheck {
            name: name.to_string(),
            ok: true,
            detail: None,
        },
        Err(err) => {
            error!("health check {} failed: {}", name, err);
            HealthCheck {
                name: name.to_string(),
                ok: false,
                detail: Some(err.to_string()),
            }
        }
    }
}

async fn check_database(state: &AppState) -> anyhow::Result<()> {
    let row: (i32,) = sqlx::query_as("SELECT 1").fetch_one(&state.db).await?;
    anyhow::ensure!(row.0 == 1, "unexpected result {}", row.0);
    Ok(())
}

fn check_redis(state: &AppState) -> anyhow::Result<()> {
    let mut redis_conn = state.redis_conn.get()?;
    let reply = ping(&mut redis_conn)?;
    anyhow::ensure!(reply == "PONG", "unexpected reply {}", reply);
    Ok(())
}

pub struct ApiHealth;

#[OpenApi]
impl ApiHealth {
    /// Database and redis round trip
    #[oai(path = "/health/", method = "get", tag = "ApiHealthTags::Health")]
    async fn health_api(&self, state: Data<&Arc<AppState>>) -> HealthResponses {
        let checks = vec![
            check("database", check_database(&state).await),
            check("redis", check_redis(&state)),
        ];
        if checks.iter().all(|x| x.ok) {
            HealthResponses::Ok(Json(HealthResponse {
                status: "ok".to_string(),
                checks,
            }))
        } else {
            HealthResponses::ServiceUnavailable(Json(HealthResponse {
                status: "unavailable".to_string(),
                checks,
            }))
        }
    }
}
