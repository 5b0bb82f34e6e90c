use std::sync::Arc;

use chrono::Local;
use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    core::test_utils::generate_test_user,
    factory::{group::GroupFactory, menu::MenuFactory},
    init_openapi_route,
    model::{
        group::{Group, TABLE_NAME},
        menu_role::TABLE_NAME as MENU_ROLE_TABLE_NAME,
    },
    repository::group_role::replace_user_groups,
    settings::get_config,
    AppState,
};

#[sqlx::test]
async fn test_paginate_group_api(pool: PgPool) -> anyhow::Result<()> {
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
    let mut group_factory = GroupFactory::<()>::new();
    group_factory.modified_many(|data, idx, _| Group {
        group_name: format!("group {}", idx),
        is_active: idx < 12,
        ..data.clone()
    });
    group_factory.generate_many(&app_state.db, 15, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .get("/api/group/")
        .query("page", &2)
        .query("page_size", &5)
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let body = json.value().object();
    body.get("counts").assert_i64(12);
    body.get("page").assert_i64(2);
    body.get("page_count").assert_i64(3);
    body.get("results").array().assert_len(5);

    // When search
    let resp = cli
        .get("/api/group/")
        .query("search", &"group 1")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect search: group 1, group 10, group 11
    resp.assert_status_is_ok();
    let json = resp.json().await;
    json.value().object().get("counts").assert_i64(3);

    // When the page is far past the end
    let resp = cli
        .get("/api/group/")
        .query("page", &u32::MAX)
        .query("page_size", &10)
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect an empty page
    resp.assert_status_is_ok();
    let json = resp.json().await;
    json.value().object().get("counts").assert_i64(12);
    json.value().object().get("results").array().assert_len(0);

    // When without token
    let resp = cli.get("/api/group/").send().await;

    // Expect
    resp.assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}

#[sqlx::test]
async fn test_group_crud_api(pool: PgPool) -> anyhow::Result<()> {
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

    // When create
    let resp = cli
        .post("/api/group/")
        .body_json(&json!({
            "group_name": "Kasir",
            "description": "front desk"
        }))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect create
    resp.assert_status(StatusCode::CREATED);
    let json = resp.json().await;
    let body = json.value().object();
    body.get("group_name").assert_string("Kasir");
    body.get("is_active").assert_bool(true);
    body.get("created_by")
        .object()
        .get("user_name")
        .assert_string("owner");
    let group_id: String = body.get("id").deserialize();

    // When create without name
    let resp = cli
        .post("/api/group/")
        .body_json(&json!({ "group_name": "  " }))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);

    // When update
    let resp = cli
        .put("/api/group/")
        .query("id", &group_id)
        .body_json(&json!({
            "group_name": "Kasir Senior",
            "description": null
        }))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect update
    resp.assert_status_is_ok();
    let json = resp.json().await;
    json.value()
        .object()
        .get("group_name")
        .assert_string("Kasir Senior");
    json.value().object().get("description").assert_null();

    // When detail
    let resp = cli
        .get("/api/group/detail/")
        .query("id", &group_id)
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect detail
    resp.assert_status_is_ok();

    // When delete
    let resp = cli
        .delete("/api/group/")
        .query("id", &group_id)
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect delete is soft
    resp.assert_status(StatusCode::NO_CONTENT);
    let row: (bool,) =
        sqlx::query_as(format!(r#"SELECT is_active FROM {} WHERE id = $1"#, TABLE_NAME).as_str())
            .bind(Uuid::parse_str(&group_id)?)
            .fetch_one(&app_state.db)
            .await?;
    assert!(!row.0);
    let resp = cli
        .get("/api/group/detail/")
        .query("id", &group_id)
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);

    // When malformed id
    let resp = cli
        .delete("/api/group/")
        .query("id", &"not-an-id")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::NOT_FOUND);
    Ok(())
}

#[sqlx::test]
async fn test_delete_group_keeps_grants(pool: PgPool) -> anyhow::Result<()> {
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
        generate_test_user(&mut db, &mut redis_conn, config.clone(), "kasir", "password").await?;
    let group = GroupFactory::new().generate_one(&app_state.db, ()).await?;
    let menu = MenuFactory::new().generate_one(&app_state.db, ()).await?;
    let mut tx = app_state.db.begin().await?;
    replace_user_groups(
        &mut tx,
        &test_user.user.id,
        &[group.id],
        &Local::now().fixed_offset(),
    )
    .await?;
    tx.commit().await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);
    let resp = cli
        .post("/api/menu-role/")
        .body_json(&json!({
            "menu_id": menu.id.to_string(),
            "group_id": group.id.to_string(),
            "can_read": true,
            "can_write": true
        }))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;
    resp.assert_status_is_ok();
    let resp = cli
        .get("/api/access/menu/")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;
    resp.assert_status_is_ok();
    resp.json().await.value().array().assert_len(1);

    // When
    let resp = cli
        .delete("/api/group/")
        .query("id", &group.id.to_string())
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect the grant row survives but confers nothing
    resp.assert_status(StatusCode::NO_CONTENT);
    let row: (i64,) = sqlx::query_as(
        format!(
            r#"SELECT COUNT(*) FROM {} WHERE group_id = $1 AND is_active = true"#,
            MENU_ROLE_TABLE_NAME
        )
        .as_str(),
    )
    .bind(group.id)
    .fetch_one(&app_state.db)
    .await?;
    assert_eq!(row.0, 1);
    let resp = cli
        .get("/api/access/menu/")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;
    resp.assert_status_is_ok();
    resp.json().await.value().array().assert_len(0);
    let resp = cli
        .get("/api/access/check/")
        .query("menu_url", &menu.menu_url)
        .query("action", &"write")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;
    resp.assert_status_is_ok();
    resp.json()
        .await
        .value()
        .object()
        .get("allowed")
        .assert_bool(false);
    Ok(())
}
