use std::sync::Arc;

use poem::test::TestClient;
use sqlx::PgPool;

use crate::{init_openapi_route, settings::get_config, AppState};

#[sqlx::test]
async fn test_health_api(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let client = redis::Client::open(config.redis_url.clone()).unwrap();
    let redis_pool = r2d2::Pool::builder().build(client).unwrap();
    let app_state = Arc::new(AppState {
        db: pool,
        redis_conn: redis_pool,
    });
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli.get("/api/health/").send().await;

    // Expect no token is needed
    resp.assert_status_is_ok();
    let json = resp.json().await;
    json.value().object().get("status").assert_string("ok");
    let checks = json.value().object().get("checks").array();
    checks.assert_len(2);
    checks.get(0).object().get("name").assert_string("database");
    checks.get(0).object().get("ok").assert_bool(true);
    checks.get(1).object().get("name").assert_string("redis");
    checks.get(1).object().get("ok").assert_bool(true);
    Ok(())
}
