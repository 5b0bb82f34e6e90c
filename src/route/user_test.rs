use std::sync::Arc;

use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::PgPool;

use crate::{
    core::test_utils::generate_test_user,
    factory::{group::GroupFactory, user::UserFactory},
    init_openapi_route,
    model::user::User,
    settings::get_config,
    AppState,
};

#[sqlx::test]
async fn test_create_user_with_groups_then_login(pool: PgPool) -> anyhow::Result<()> {
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
        .post("/api/user/")
        .body_json(&json!({
            "user_name": "kasir",
            "password": "rahasia",
            "email": "kasir@barbershop.test",
            "group_ids": [group.id.to_string(), group.id.to_string()]
        }))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::CREATED);
    let json = resp.json().await;
    let body = json.value().object();
    body.get("user_name").assert_string("kasir");
    body.get("is_active").assert_bool(true);
    let groups = body.get("groups").array();
    groups.assert_len(1);
    groups
        .get(0)
        .object()
        .get("id")
        .assert_string(&group.id.to_string());
    assert!(body.get_opt("password").is_none());
    let resp = cli
        .post("/api/auth/login")
        .body_json(&json!({
            "user_name": "kasir",
            "password": "rahasia"
        }))
        .send()
        .await;
    resp.assert_status_is_ok();

    // When duplicate user_name
    let resp = cli
        .post("/api/user/")
        .body_json(&json!({
            "user_name": "kasir",
            "password": "rahasia"
        }))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({"message": "user_name kasir already exists"}))
        .await;

    // When unknown group
    let resp = cli
        .post("/api/user/")
        .body_json(&json!({
            "user_name": "barber",
            "password": "rahasia",
            "group_ids": ["0190b6c4-0000-7000-8000-000000000000"]
        }))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    Ok(())
}

#[sqlx::test]
async fn test_delete_user_api(pool: PgPool) -> anyhow::Result<()> {
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
    let mut user_factory = UserFactory::<()>::new();
    user_factory.modified_one(|data, _| User {
        user_name: "barber".to_string(),
        ..data.clone()
    });
    let other = user_factory.generate_one(&app_state.db, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When deleting self
    let resp = cli
        .delete("/api/user/")
        .query("id", &test_user.user.id.to_string())
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);

    // When
    let resp = cli
        .delete("/api/user/")
        .query("id", &other.id.to_string())
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::NO_CONTENT);
    let row: (bool, Option<uuid::Uuid>) =
        sqlx::query_as(r#"SELECT is_active, updated_by FROM public.user WHERE id = $1"#)
            .bind(other.id)
            .fetch_one(&app_state.db)
            .await?;
    assert!(!row.0);
    assert_eq!(row.1, Some(test_user.user.id));
    let resp = cli
        .get("/api/user/")
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
