use std::sync::Arc;

use chrono::Local;
use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    core::{
        test_utils::generate_test_user,
        utils::{business_date, date_to_string},
    },
    factory::{service::ServiceFactory, staff::StaffFactory, staff_level::StaffLevelFactory},
    init_openapi_route,
    model::{staff::Staff, staff_level::StaffLevel},
    settings::get_config,
    AppState,
};

#[sqlx::test]
async fn test_sales_summary_and_commission(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let client = redis::Client::open(config.redis_url.clone()).unwrap();
    let redis_pool = r2d2::Pool::builder().build(client).unwrap();
    let app_state = Arc::new(AppState {
        db: pool,
        redis_conn: redis_pool,
    });
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    let test_user =
        generate_test_user(&mut db, &mut redis_conn, config.clone(), "owner", "password").await?;
    let mut level_factory = StaffLevelFactory::<()>::new();
    level_factory.modified_one(|data, _| StaffLevel {
        commission_rate: 10,
        ..data.clone()
    });
    let level = level_factory.generate_one(&app_state.db, ()).await?;
    let mut staff_factory = StaffFactory::<Uuid>::new();
    staff_factory.modified_one(|data, ext| Staff {
        staff_name: "Budi".to_string(),
        staff_level_id: Some(ext),
        ..data.clone()
    });
    let budi = staff_factory.generate_one(&app_state.db, level.id).await?;
    let mut idle_factory = StaffFactory::<()>::new();
    idle_factory.modified_one(|data, _| Staff {
        staff_name: "Andi".to_string(),
        ..data.clone()
    });
    idle_factory.generate_one(&app_state.db, ()).await?;
    let haircut = ServiceFactory::new().generate_one(&app_state.db, ()).await?;
    let today = date_to_string(business_date(&Local::now().fixed_offset()));
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);
    for _ in 0..2 {
        let resp = cli
            .post("/api/transaction/")
            .body_json(&json!({
                "staff_id": budi.id.to_string(),
                "payment_method": "cash",
                "items": [{
                    "item_type": "service",
                    "item_id": haircut.id.to_string(),
                    "unit_price": 25000,
                    "quantity": 1
                }]
            }))
            .header("authorization", format!("Bearer {}", test_user.token))
            .send()
            .await;
        resp.assert_status(StatusCode::CREATED);
    }
    let resp = cli
        .post("/api/operasional/")
        .body_json(&json!({
            "description": "listrik",
            "category": "utilitas",
            "amount": 20000,
            "expense_date": today
        }))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;
    resp.assert_status(StatusCode::CREATED);

    // When summary
    let resp = cli
        .get("/api/analytics/summary/")
        .query("start_date", &today)
        .query("end_date", &today)
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let summary = json.value().object();
    summary.get("total_transactions").assert_i64(2);
    summary.get("total_services").assert_i64(2);
    summary.get("gross_sales").assert_i64(50000);
    summary.get("net_sales").assert_i64(55000);
    summary.get("total_expenses").assert_i64(20000);
    summary.get("profit").assert_i64(35000);

    // When staff performance
    let resp = cli
        .get("/api/analytics/staff/")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect staff without sales are listed after
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let staff = json.value().array();
    staff.assert_len(2);
    let top = staff.get(0).object();
    top.get("staff_name").assert_string("Budi");
    top.get("commission_rate").assert_i64(10);
    top.get("gross_sales").assert_i64(50000);
    top.get("commission").assert_i64(5000);
    let idle = staff.get(1).object();
    idle.get("staff_name").assert_string("Andi");
    idle.get("gross_sales").assert_i64(0);
    idle.get("commission").assert_i64(0);

    // When top items
    let resp = cli
        .get("/api/analytics/top-items/")
        .query("item_type", &"service")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let items = json.value().array();
    items.assert_len(1);
    items.get(0).object().get("total_quantity").assert_i64(2);
    items.get(0).object().get("total_sales").assert_i64(50000);

    // When daily series
    let resp = cli
        .get("/api/analytics/daily/")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let series = json.value().array();
    series.assert_len(1);
    series.get(0).object().get("sales_date").assert_string(&today);
    Ok(())
}

#[sqlx::test]
async fn test_analytics_invalid_range(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let client = redis::Client::open(config.redis_url.clone()).unwrap();
    let redis_pool = r2d2::Pool::builder().build(client).unwrap();
    let app_state = Arc::new(AppState {
        db: pool,
        redis_conn: redis_pool,
    });
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    let test_user =
        generate_test_user(&mut db, &mut redis_conn, config.clone(), "owner", "password").await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When start is after end
    let resp = cli
        .get("/api/analytics/summary/")
        .query("start_date", &"2025-02-01")
        .query("end_date", &"2025-01-01")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);

    // When empty range
    let resp = cli
        .get("/api/analytics/summary/")
        .query("start_date", &"2025-01-01")
        .query("end_date", &"2025-01-31")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect zeros
    resp.assert_status_is_ok();
    let json = resp.json().await;
    json.value().object().get("gross_sales").assert_i64(0);
    json.value().object().get("profit").assert_i64(0);
    Ok(())
}
