use std::sync::Arc;

use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::PgPool;

use crate::{
    core::test_utils::generate_test_user,
    factory::menu::MenuFactory,
    init_openapi_route,
    model::menu::Menu,
    settings::get_config,
    AppState,
};

#[sqlx::test]
async fn test_create_menu_api(pool: PgPool) -> anyhow::Result<()> {
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
    let mut menu_factory = MenuFactory::<()>::new();
    menu_factory.modified_one(|data, _| Menu {
        menu_name: "Master Data".to_string(),
        menu_url: "/master".to_string(),
        ..data.clone()
    });
    let parent = menu_factory.generate_one(&app_state.db, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .post("/api/menu/")
        .body_json(&json!({
            "menu_name": "Staff",
            "menu_url": "/master/staff",
            "parent_id": parent.id.to_string(),
            "sort_order": 2
        }))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::CREATED);
    let json = resp.json().await;
    let body = json.value().object();
    body.get("menu_url").assert_string("/master/staff");
    body.get("parent_id").assert_string(&parent.id.to_string());
    body.get("sort_order").assert_i64(2);

    // When duplicate url
    let resp = cli
        .post("/api/menu/")
        .body_json(&json!({
            "menu_name": "Master",
            "menu_url": "/master"
        }))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({"message": "menu_url /master already exists"}))
        .await;

    // When unknown parent
    let resp = cli
        .post("/api/menu/")
        .body_json(&json!({
            "menu_name": "Produk",
            "menu_url": "/master/product",
            "parent_id": "bukan-id"
        }))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    Ok(())
}

#[sqlx::test]
async fn test_update_menu_own_parent(pool: PgPool) -> anyhow::Result<()> {
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
    let menu = MenuFactory::new().generate_one(&app_state.db, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .put("/api/menu/")
        .query("id", &menu.id.to_string())
        .body_json(&json!({
            "menu_name": menu.menu_name,
            "menu_url": menu.menu_url,
            "parent_id": menu.id.to_string()
        }))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({"message": "menu cannot be its own parent"}))
        .await;

    // When keeping its own url
    let resp = cli
        .put("/api/menu/")
        .query("id", &menu.id.to_string())
        .body_json(&json!({
            "menu_name": "Dashboard",
            "menu_url": menu.menu_url
        }))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    resp.json()
        .await
        .value()
        .object()
        .get("menu_name")
        .assert_string("Dashboard");
    Ok(())
}
