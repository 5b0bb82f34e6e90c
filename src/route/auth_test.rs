use std::sync::Arc;

use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    core::security::{get_user_from_token, hash_password},
    factory::user::UserFactory,
    init_openapi_route,
    model::user::User,
    settings::get_config,
    AppState,
};

#[sqlx::test]
async fn test_login_then_logout(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let client = redis::Client::open(config.redis_url.clone()).unwrap();
    let redis_pool = r2d2::Pool::builder().build(client).unwrap();
    let app_state = Arc::new(AppState {
        db: pool,
        redis_conn: redis_pool,
    });
    let mut user_factory = UserFactory::<Uuid>::new();
    user_factory.modified_one(|data, ext| User {
        id: ext,
        user_name: "kasir".to_string(),
        password: hash_password("password").unwrap(),
        ..data.clone()
    });
    let user_id = Uuid::now_v7();
    user_factory.generate_one(&app_state.db, user_id).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When login
    let json_payload = json!({
        "user_name": "kasir",
        "password": "password"
    });
    let resp = cli
        .post("/api/auth/login")
        .body_json(&json_payload)
        .send()
        .await;

    // Expect login
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let token = json.value().object().get_opt("token");
    assert!(token.is_some());
    let token: String = token.unwrap().deserialize();
    json.value().object().get("token_type").assert_string("Bearer");
    let mut tx = app_state.db.begin().await?;
    let mut redis_conn = app_state.redis_conn.get().unwrap();
    let user_in_token = get_user_from_token(&mut tx, &mut redis_conn, Some(token.clone())).await?;
    assert!(user_in_token.is_some());
    assert_eq!(user_in_token.unwrap().id, user_id);
    let res: Option<String> = redis::cmd("GET").arg(&token).query(&mut redis_conn)?;
    assert!(res.is_some());

    // When logout
    let resp = cli
        .post("/api/auth/logout")
        .header("authorization", format!("Bearer {}", token))
        .send()
        .await;

    // Expect logout
    resp.assert_status(StatusCode::NO_CONTENT);
    let res: Option<String> = redis::cmd("GET").arg(&token).query(&mut redis_conn)?;
    assert!(res.is_none());

    // When second logout
    let resp = cli
        .post("/api/auth/logout")
        .header("authorization", format!("Bearer {}", token))
        .send()
        .await;

    // Expect second logout
    resp.assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}

#[sqlx::test]
async fn test_login_wrong_password(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let client = redis::Client::open(config.redis_url.clone()).unwrap();
    let redis_pool = r2d2::Pool::builder().build(client).unwrap();
    let app_state = Arc::new(AppState {
        db: pool,
        redis_conn: redis_pool,
    });
    let mut user_factory = UserFactory::<()>::new();
    user_factory.modified_one(|data, _| User {
        user_name: "kasir".to_string(),
        password: hash_password("password").unwrap(),
        ..data.clone()
    });
    user_factory.generate_one(&app_state.db, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .post("/api/auth/login")
        .body_json(&json!({
            "user_name": "kasir",
            "password": "not the password"
        }))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({"message": "Invalid credentials"}))
        .await;

    // When unknown user
    let resp = cli
        .post("/api/auth/login")
        .body_json(&json!({
            "user_name": "nobody",
            "password": "password"
        }))
        .send()
        .await;

    // Expect unknown user
    resp.assert_status(StatusCode::BAD_REQUEST);
    Ok(())
}

#[sqlx::test]
async fn test_login_inactive_user(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let client = redis::Client::open(config.redis_url.clone()).unwrap();
    let redis_pool = r2d2::Pool::builder().build(client).unwrap();
    let app_state = Arc::new(AppState {
        db: pool,
        redis_conn: redis_pool,
    });
    let mut user_factory = UserFactory::<()>::new();
    user_factory.modified_one(|data, _| User {
        user_name: "mantan_kasir".to_string(),
        password: hash_password("password").unwrap(),
        is_active: false,
        ..data.clone()
    });
    user_factory.generate_one(&app_state.db, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .post("/api/auth/login")
        .body_json(&json!({
            "user_name": "mantan_kasir",
            "password": "password"
        }))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    Ok(())
}

#[sqlx::test]
async fn test_login_then_refresh(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let client = redis::Client::open(config.redis_url.clone()).unwrap();
    let redis_pool = r2d2::Pool::builder().build(client).unwrap();
    let app_state = Arc::new(AppState {
        db: pool,
        redis_conn: redis_pool,
    });
    let mut user_factory = UserFactory::<()>::new();
    user_factory.modified_one(|data, _| User {
        user_name: "kasir".to_string(),
        password: hash_password("password").unwrap(),
        ..data.clone()
    });
    user_factory.generate_one(&app_state.db, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);
    let resp = cli
        .post("/api/auth/login")
        .body_json(&json!({
            "user_name": "kasir",
            "password": "password"
        }))
        .send()
        .await;
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let refresh_token: String = json.value().object().get("refresh_token").deserialize();
    let token: String = json.value().object().get("token").deserialize();

    // When
    let resp = cli
        .post("/api/auth/refresh-token")
        .body_json(&json!({ "refresh_token": refresh_token }))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let new_token: String = json.value().object().get("token").deserialize();
    assert!(!new_token.is_empty());

    // When an access token is used as refresh token
    let resp = cli
        .post("/api/auth/refresh-token")
        .body_json(&json!({ "refresh_token": token }))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}
