use std::sync::Arc;

use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::PgPool;

use crate::{
    core::test_utils::generate_test_user,
    factory::product::ProductFactory,
    init_openapi_route,
    model::product::Product,
    settings::get_config,
    AppState,
};

#[sqlx::test]
async fn test_adjust_product_stock_api(pool: PgPool) -> anyhow::Result<()> {
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
    let mut product_factory = ProductFactory::<()>::new();
    product_factory.modified_one(|data, _| Product {
        product_name: "Pomade".to_string(),
        stock: 5,
        ..data.clone()
    });
    let product = product_factory.generate_one(&app_state.db, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When restock
    let resp = cli
        .post("/api/product/stock/")
        .body_json(&json!({
            "product_id": product.id.to_string(),
            "delta": 10
        }))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    json.value().object().get("stock").assert_i64(15);
    json.value()
        .object()
        .get("updated_by")
        .object()
        .get("user_name")
        .assert_string("owner");

    // When below zero
    let resp = cli
        .post("/api/product/stock/")
        .body_json(&json!({
            "product_id": product.id.to_string(),
            "delta": -16
        }))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect stock is untouched
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({"message": "stock of Pomade cannot go below zero (current 15)"}))
        .await;
    let row: (i32,) = sqlx::query_as(r#"SELECT stock FROM public.product WHERE id = $1"#)
        .bind(product.id)
        .fetch_one(&app_state.db)
        .await?;
    assert_eq!(row.0, 15);

    // When unknown product
    let resp = cli
        .post("/api/product/stock/")
        .body_json(&json!({
            "product_id": "0190b6c4-0000-7000-8000-000000000000",
            "delta": 1
        }))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::NOT_FOUND);
    Ok(())
}

#[sqlx::test]
async fn test_create_product_api(pool: PgPool) -> anyhow::Result<()> {
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

    // When
    let resp = cli
        .post("/api/product/")
        .body_json(&json!({
            "product_name": " Hair Tonic ",
            "category": "perawatan",
            "price": 45000
        }))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::CREATED);
    let json = resp.json().await;
    let body = json.value().object();
    body.get("product_name").assert_string("Hair Tonic");
    body.get("price").assert_i64(45000);
    body.get("stock").assert_i64(0);

    // When negative stock
    let resp = cli
        .post("/api/product/")
        .body_json(&json!({
            "product_name": "Sisir",
            "price": 10000,
            "stock": -1
        }))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);

    // When filtering by category
    let resp = cli
        .get("/api/product/")
        .query("category", &"perawatan")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    resp.json()
        .await
        .value()
        .object()
        .get("counts")
        .assert_i64(1);
    Ok(())
}
