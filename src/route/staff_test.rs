use std::sync::Arc;

use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    core::test_utils::generate_test_user,
    factory::{staff::StaffFactory, staff_level::StaffLevelFactory},
    init_openapi_route,
    model::{staff::Staff, staff_level::StaffLevel},
    settings::get_config,
    AppState,
};

#[sqlx::test]
async fn test_create_staff_embeds_level(pool: PgPool) -> anyhow::Result<()> {
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
        level_name: "Senior Barber".to_string(),
        commission_rate: 40,
        ..data.clone()
    });
    let level = level_factory.generate_one(&app_state.db, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .post("/api/staff/")
        .body_json(&json!({
            "staff_name": "Budi",
            "phone": "08123456789",
            "staff_level_id": level.id.to_string(),
            "join_date": "2024-03-01"
        }))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::CREATED);
    let json = resp.json().await;
    let body = json.value().object();
    body.get("staff_name").assert_string("Budi");
    body.get("join_date").assert_string("2024-03-01");
    let staff_level = body.get("staff_level").object();
    staff_level.get("id").assert_string(&level.id.to_string());
    staff_level.get("level_name").assert_string("Senior Barber");
    staff_level.get("commission_rate").assert_i64(40);

    // When the level does not exist
    let resp = cli
        .post("/api/staff/")
        .body_json(&json!({
            "staff_name": "Andi",
            "staff_level_id": Uuid::now_v7().to_string()
        }))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);

    // When join_date is malformed
    let resp = cli
        .post("/api/staff/")
        .body_json(&json!({
            "staff_name": "Andi",
            "join_date": "01/03/2024"
        }))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({"message": "join_date must be a date in YYYY-MM-DD format"}))
        .await;
    Ok(())
}

#[sqlx::test]
async fn test_paginate_staff_by_level(pool: PgPool) -> anyhow::Result<()> {
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
    let level = StaffLevelFactory::new().generate_one(&app_state.db, ()).await?;
    let mut staff_factory = StaffFactory::<Uuid>::new();
    staff_factory.modified_many(|data, idx, ext| Staff {
        staff_level_id: (idx % 2 == 0).then_some(ext),
        ..data.clone()
    });
    staff_factory.generate_many(&app_state.db, 5, level.id).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .get("/api/staff/")
        .query("staff_level_id", &level.id.to_string())
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    json.value().object().get("counts").assert_i64(3);

    // When the filter is not an id
    let resp = cli
        .get("/api/staff/")
        .query("staff_level_id", &"senior")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);

    // When the level is deleted
    let resp = cli
        .delete("/api/staff-level/")
        .query("id", &level.id.to_string())
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::NO_CONTENT);
    let resp = cli
        .get("/api/staff-level/dropdown/")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;
    resp.assert_status_is_ok();
    resp.json().await.value().array().assert_len(0);
    Ok(())
}
