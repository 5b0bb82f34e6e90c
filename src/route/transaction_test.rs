use std::{sync::Arc, time::Duration};

use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use uuid::Uuid;

use crate::{
    core::test_utils::generate_test_user,
    factory::{product::ProductFactory, service::ServiceFactory, staff::StaffFactory},
    init_openapi_route,
    model::{product::Product, service::Service},
    settings::get_config,
    AppState,
};

#[sqlx::test]
async fn test_create_transaction_updates_daily_sales(pool: PgPool) -> anyhow::Result<()> {
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
    let staff = StaffFactory::new().generate_one(&app_state.db, ()).await?;
    let mut service_factory = ServiceFactory::<()>::new();
    service_factory.modified_one(|data, _| Service {
        service_name: "Hair Cut".to_string(),
        price: 25000,
        ..data.clone()
    });
    let haircut = service_factory.generate_one(&app_state.db, ()).await?;
    let mut product_factory = ProductFactory::<()>::new();
    product_factory.modified_one(|data, _| Product {
        product_name: "Pomade".to_string(),
        price: 15000,
        stock: 10,
        ..data.clone()
    });
    let pomade = product_factory.generate_one(&app_state.db, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .post("/api/transaction/")
        .body_json(&json!({
            "staff_id": staff.id.to_string(),
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

    // Expect
    resp.assert_status(StatusCode::CREATED);
    let json = resp.json().await;
    let transaction = json.value().object().get("transaction").object();
    transaction.get("transaction_type").assert_string("service");
    transaction.get("subtotal").assert_i64(25000);
    transaction.get("tax_amount").assert_i64(2500);
    transaction.get("discount_amount").assert_i64(0);
    transaction.get("total_amount").assert_i64(27500);
    transaction.get("staff_name").assert_string(&staff.staff_name);
    let transaction_number: String = transaction.get("transaction_number").deserialize();
    assert!(transaction_number.starts_with("TRX"));
    assert_eq!(transaction_number.len(), 17);
    let items = transaction.get("items").array();
    items.assert_len(1);
    items.get(0).object().get("item_name").assert_string("Hair Cut");
    let daily_sales = json.value().object().get("daily_sales").object();
    daily_sales.get("total_transactions").assert_i64(1);
    daily_sales.get("total_services").assert_i64(1);
    daily_sales.get("total_products").assert_i64(0);
    daily_sales.get("gross_sales").assert_i64(25000);
    daily_sales.get("net_sales").assert_i64(27500);

    // When a second mixed sale on the same day
    let resp = cli
        .post("/api/transaction/")
        .body_json(&json!({
            "staff_id": staff.id.to_string(),
            "payment_method": "qris",
            "items": [
                {
                    "item_type": "service",
                    "item_id": haircut.id.to_string(),
                    "unit_price": 25000,
                    "quantity": 1
                },
                {
                    "item_type": "product",
                    "item_id": pomade.id.to_string(),
                    "unit_price": 15000,
                    "quantity": 2
                }
            ]
        }))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect the same daily row is incremented
    resp.assert_status(StatusCode::CREATED);
    let json = resp.json().await;
    let transaction = json.value().object().get("transaction").object();
    transaction.get("transaction_type").assert_string("mixed");
    transaction.get("subtotal").assert_i64(55000);
    transaction.get("tax_amount").assert_i64(5500);
    transaction.get("total_amount").assert_i64(60500);
    let transaction_id: String = transaction.get("id").deserialize();
    let daily_sales = json.value().object().get("daily_sales").object();
    daily_sales.get("total_transactions").assert_i64(2);
    daily_sales.get("total_services").assert_i64(2);
    daily_sales.get("total_products").assert_i64(2);
    daily_sales.get("gross_sales").assert_i64(80000);
    daily_sales.get("net_sales").assert_i64(88000);
    let rows: (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM public.daily_sales"#)
        .fetch_one(&app_state.db)
        .await?;
    assert_eq!(rows.0, 1);

    // When detail
    let resp = cli
        .get("/api/transaction/detail/")
        .query("id", &transaction_id)
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect items are loaded
    resp.assert_status_is_ok();
    let json = resp.json().await;
    json.value()
        .object()
        .get("items")
        .array()
        .assert_len(2);

    // When paginate by staff
    let resp = cli
        .get("/api/transaction/")
        .query("staff_id", &staff.id.to_string())
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
        .assert_i64(2);
    Ok(())
}

#[sqlx::test]
async fn test_create_transaction_rejected(pool: PgPool) -> anyhow::Result<()> {
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
    let staff = StaffFactory::new().generate_one(&app_state.db, ()).await?;
    let service = ServiceFactory::new().generate_one(&app_state.db, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When no items
    let resp = cli
        .post("/api/transaction/")
        .body_json(&json!({
            "staff_id": staff.id.to_string(),
            "payment_method": "cash",
            "items": []
        }))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);

    // When zero quantity
    let resp = cli
        .post("/api/transaction/")
        .body_json(&json!({
            "staff_id": staff.id.to_string(),
            "payment_method": "cash",
            "items": [{
                "item_type": "service",
                "item_id": service.id.to_string(),
                "unit_price": 25000,
                "quantity": 0
            }]
        }))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);

    // When unknown staff
    let resp = cli
        .post("/api/transaction/")
        .body_json(&json!({
            "staff_id": Uuid::now_v7().to_string(),
            "payment_method": "cash",
            "items": [{
                "item_type": "service",
                "item_id": service.id.to_string(),
                "unit_price": 25000,
                "quantity": 1
            }]
        }))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::NOT_FOUND);

    // When a service id is sent as product
    let resp = cli
        .post("/api/transaction/")
        .body_json(&json!({
            "staff_id": staff.id.to_string(),
            "payment_method": "cash",
            "items": [{
                "item_type": "product",
                "item_id": service.id.to_string(),
                "unit_price": 25000,
                "quantity": 1
            }]
        }))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::NOT_FOUND);

    // When free items push the quantity counters past their range
    let product = ProductFactory::new().generate_one(&app_state.db, ()).await?;
    let free_item = json!({
        "item_type": "product",
        "item_id": product.id.to_string(),
        "unit_price": 0,
        "quantity": i32::MAX
    });
    let resp = cli
        .post("/api/transaction/")
        .body_json(&json!({
            "staff_id": staff.id.to_string(),
            "payment_method": "cash",
            "items": [free_item.clone(), free_item]
        }))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect nothing is written
    resp.assert_status(StatusCode::BAD_REQUEST);
    let rows: (i64, i64) = sqlx::query_as(
        r#"SELECT (SELECT COUNT(*) FROM public.transaction),
        (SELECT COUNT(*) FROM public.daily_sales)"#,
    )
    .fetch_one(&app_state.db)
    .await?;
    assert_eq!(rows, (0, 0));
    Ok(())
}

#[sqlx::test]
async fn test_create_transaction_single_connection_pool(
    pool_options: PgPoolOptions,
    connect_options: PgConnectOptions,
) -> anyhow::Result<()> {
    // Given a pool that can hand out one connection only
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let pool = pool_options
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(connect_options)
        .await?;
    let client = redis::Client::open(config.redis_url.clone()).unwrap();
    let redis_pool = r2d2::Pool::builder().build(client).unwrap();
    let app_state = Arc::new(AppState {
        db: pool,
        redis_conn: redis_pool,
    });
    let mut redis_conn = app_state.redis_conn.get()?;
    let test_user = {
        let mut db = app_state.db.acquire().await?;
        generate_test_user(&mut db, &mut redis_conn, config.clone(), "kasir", "password").await?
    };
    let staff = StaffFactory::new().generate_one(&app_state.db, ()).await?;
    let service = ServiceFactory::new().generate_one(&app_state.db, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .post("/api/transaction/")
        .body_json(&json!({
            "staff_id": staff.id.to_string(),
            "payment_method": "cash",
            "items": [{
                "item_type": "service",
                "item_id": service.id.to_string(),
                "unit_price": 25000,
                "quantity": 1
            }]
        }))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect the auth connection was released before recording
    resp.assert_status(StatusCode::CREATED);
    resp.json()
        .await
        .value()
        .object()
        .get("daily_sales")
        .object()
        .get("total_transactions")
        .assert_i64(1);
    Ok(())
}

#[sqlx::test]
async fn test_transaction_kept_after_catalog_delete(pool: PgPool) -> anyhow::Result<()> {
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
    let staff = StaffFactory::new().generate_one(&app_state.db, ()).await?;
    let mut service_factory = ServiceFactory::<()>::new();
    service_factory.modified_one(|data, _| Service {
        service_name: "Hair Cut".to_string(),
        ..data.clone()
    });
    let haircut = service_factory.generate_one(&app_state.db, ()).await?;
    let mut product_factory = ProductFactory::<()>::new();
    product_factory.modified_one(|data, _| Product {
        product_name: "Pomade".to_string(),
        ..data.clone()
    });
    let pomade = product_factory.generate_one(&app_state.db, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);
    let resp = cli
        .post("/api/transaction/")
        .body_json(&json!({
            "staff_id": staff.id.to_string(),
            "payment_method": "cash",
            "items": [
                {
                    "item_type": "service",
                    "item_id": haircut.id.to_string(),
                    "unit_price": 25000,
                    "quantity": 1
                },
                {
                    "item_type": "product",
                    "item_id": pomade.id.to_string(),
                    "unit_price": 15000,
                    "quantity": 1
                }
            ]
        }))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;
    resp.assert_status(StatusCode::CREATED);
    let json = resp.json().await;
    let transaction_id: String = json
        .value()
        .object()
        .get("transaction")
        .object()
        .get("id")
        .deserialize();

    // When staff, service and product are soft deleted
    let deletes = [
        ("/api/staff/", staff.id),
        ("/api/service/", haircut.id),
        ("/api/product/", pomade.id),
    ];
    for (path, id) in deletes.iter() {
        let resp = cli
            .delete(*path)
            .query("id", &id.to_string())
            .header("authorization", format!("Bearer {}", test_user.token))
            .send()
            .await;
        resp.assert_status(StatusCode::NO_CONTENT);
    }

    // Expect the history is intact
    let rows: (i64, i64) = sqlx::query_as(
        r#"SELECT (SELECT COUNT(*) FROM public.transaction),
        (SELECT COUNT(*) FROM public.transaction_item)"#,
    )
    .fetch_one(&app_state.db)
    .await?;
    assert_eq!(rows, (1, 2));
    let resp = cli
        .get("/api/transaction/detail/")
        .query("id", &transaction_id)
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let detail = json.value().object();
    detail.get("total_amount").assert_i64(44000);
    detail.get("staff_name").assert_null();
    let items = detail.get("items").array();
    items.assert_len(2);
    items.get(0).object().get("item_name").assert_string("Hair Cut");
    items.get(1).object().get("item_name").assert_string("Pomade");
    let resp = cli
        .get("/api/transaction/")
        .query("staff_id", &staff.id.to_string())
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;
    resp.assert_status_is_ok();
    resp.json()
        .await
        .value()
        .object()
        .get("counts")
        .assert_i64(1);
    Ok(())
}
