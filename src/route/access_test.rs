use std::sync::Arc;

use chrono::Local;
use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::PgPool;

use crate::{
    core::test_utils::generate_test_user,
    factory::{group::GroupFactory, menu::MenuFactory},
    init_openapi_route,
    model::menu::Menu,
    repository::group_role::replace_user_groups,
    settings::get_config,
    AppState,
};

#[sqlx::test]
async fn test_menu_access_unions_groups(pool: PgPool) -> anyhow::Result<()> {
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
    let mut group_factory = GroupFactory::new();
    let front_desk = group_factory.generate_one(&app_state.db, ()).await?;
    let auditor = group_factory.generate_one(&app_state.db, ()).await?;
    let mut menu_factory = MenuFactory::<&'static str>::new();
    menu_factory.modified_one(|data, ext| Menu {
        menu_url: ext.to_string(),
        ..data.clone()
    });
    let cashier_menu = menu_factory.generate_one(&app_state.db, "/kasir").await?;
    let report_menu = menu_factory.generate_one(&app_state.db, "/laporan").await?;
    let mut tx = app_state.db.begin().await?;
    replace_user_groups(
        &mut tx,
        &test_user.user.id,
        &[front_desk.id, auditor.id],
        &Local::now().fixed_offset(),
    )
    .await?;
    tx.commit().await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);
    let grants = [
        json!({
            "menu_id": cashier_menu.id.to_string(),
            "group_id": front_desk.id.to_string(),
            "can_read": true,
            "can_write": true
        }),
        json!({
            "menu_id": cashier_menu.id.to_string(),
            "group_id": auditor.id.to_string(),
            "can_delete": true
        }),
        json!({
            "menu_id": report_menu.id.to_string(),
            "group_id": auditor.id.to_string(),
            "can_update": true
        }),
    ];
    for grant in grants.iter() {
        let resp = cli
            .post("/api/menu-role/")
            .body_json(grant)
            .header("authorization", format!("Bearer {}", test_user.token))
            .send()
            .await;
        resp.assert_status_is_ok();
    }

    // When
    let resp = cli
        .get("/api/access/menu/")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect only the readable menu, flags unioned over both groups
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let menus = json.value().array();
    menus.assert_len(1);
    let menu = menus.get(0).object();
    menu.get("menu_url").assert_string("/kasir");
    menu.get("can_read").assert_bool(true);
    menu.get("can_write").assert_bool(true);
    menu.get("can_update").assert_bool(false);
    menu.get("can_delete").assert_bool(true);

    // When checking actions
    let resp = cli
        .get("/api/access/check/")
        .query("menu_url", &"/kasir")
        .query("action", &"delete")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    resp.assert_json(&json!({
        "menu_url": "/kasir",
        "action": "delete",
        "allowed": true
    }))
    .await;
    let resp = cli
        .get("/api/access/check/")
        .query("menu_url", &"/laporan")
        .query("action", &"update")
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

    // When the read grant is revoked
    let resp = cli
        .delete("/api/menu-role/")
        .query("menu_id", &cashier_menu.id.to_string())
        .query("group_id", &front_desk.id.to_string())
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect the menu is hidden
    resp.assert_status(StatusCode::NO_CONTENT);
    let resp = cli
        .get("/api/access/check/")
        .query("menu_url", &"/kasir")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;
    resp.assert_status_is_ok();
    resp.assert_json(&json!({
        "menu_url": "/kasir",
        "action": "read",
        "allowed": false
    }))
    .await;
    let resp = cli
        .get("/api/menu-role/")
        .query("group_id", &auditor.id.to_string())
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;
    resp.assert_status_is_ok();
    resp.json().await.value().array().assert_len(2);
    Ok(())
}

#[sqlx::test]
async fn test_upsert_menu_role_unknown_menu(pool: PgPool) -> anyhow::Result<()> {
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
    let group = GroupFactory::new().generate_one(&app_state.db, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .post("/api/menu-role/")
        .body_json(&json!({
            "menu_id": "0190b6c4-0000-7000-8000-000000000000",
            "group_id": group.id.to_string(),
            "can_read": true
        }))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);

    // When listing an unknown group
    let resp = cli
        .get("/api/menu-role/")
        .query("group_id", &"0190b6c4-0000-7000-8000-000000000000")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::NOT_FOUND);
    Ok(())
}

#[sqlx::test]
async fn test_inactive_menu_is_hidden(pool: PgPool) -> anyhow::Result<()> {
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
    let mut menu_factory = MenuFactory::<&'static str>::new();
    menu_factory.modified_one(|data, ext| Menu {
        menu_url: ext.to_string(),
        ..data.clone()
    });
    let cashier_menu = menu_factory.generate_one(&app_state.db, "/kasir").await?;
    let stock_menu = menu_factory.generate_one(&app_state.db, "/stok").await?;
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
    for menu_id in [cashier_menu.id, stock_menu.id] {
        let resp = cli
            .post("/api/menu-role/")
            .body_json(&json!({
                "menu_id": menu_id.to_string(),
                "group_id": group.id.to_string(),
                "can_read": true
            }))
            .header("authorization", format!("Bearer {}", test_user.token))
            .send()
            .await;
        resp.assert_status_is_ok();
    }

    // When the stock menu is deactivated
    let resp = cli
        .delete("/api/menu/")
        .query("id", &stock_menu.id.to_string())
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect its read grant no longer shows it
    resp.assert_status(StatusCode::NO_CONTENT);
    let resp = cli
        .get("/api/access/menu/")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let menus = json.value().array();
    menus.assert_len(1);
    menus.get(0).object().get("menu_url").assert_string("/kasir");
    let resp = cli
        .get("/api/access/check/")
        .query("menu_url", &"/stok")
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
