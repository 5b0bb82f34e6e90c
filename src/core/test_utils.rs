use super::security::{generate_refresh_token_from_user, generate_token_from_user};
use crate::core::security::hash_password;
use crate::core::session::add_session;
use crate::model::user::User;
use crate::settings::Config;
use chrono::Local;
use redis::ConnectionLike;
use sqlx::pool::PoolConnection;
use sqlx::Postgres;
use uuid::Uuid;

pub struct TestUser {
    pub user: User,
    pub token: String,
    pub refresh_token: String,
}

pub async fn generate_test_user<C: ConnectionLike>(
    db: &mut PoolConnection<Postgres>,
    redis_conn: &mut C,
    config: Config,
    username: &str,
    password: &str,
) -> anyhow::Result<TestUser> {
    // Prepare user
    let hashed_password = hash_password(password).unwrap();
    let now = Local::now().fixed_offset();
    let user = User {
        id: Uuid::now_v7(),
        user_name: username.to_string(),
        password: hashed_password,
        email: Some(format!("{}@barbershop.test", username)),
        first_name: Some(username.to_string()),
        last_name: None,
        external_id: None,
        is_active: true,
        created_by: None,
        updated_by: None,
        created_date: Some(now),
        updated_date: Some(now),
    };

    // create user on db
    sqlx::query(
        r#"
        INSERT INTO public.user (id, user_name, password, email, first_name, last_name,
        external_id, is_active, created_date, updated_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(user.id)
    .bind(&user.user_name)
    .bind(&user.password)
    .bind(&user.email)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.external_id)
    .bind(user.is_active)
    .bind(user.created_date)
    .bind(user.updated_date)
    .execute(&mut **db)
    .await?;

    // Generate token
    let token = generate_token_from_user(user.clone(), config.clone()).await?;
    let refresh_token = generate_refresh_token_from_user(user.clone(), config.clone()).await?;
    add_session(
        redis_conn,
        &user,
        &config,
        token.clone(),
        refresh_token.clone(),
    )?;

    Ok(TestUser {
        user,
        token,
        refresh_token,
    })
}

#[cfg(test)]
mod tests {
    use sqlx::{Acquire, PgPool};
    use uuid::Uuid;

    use crate::{
        core::{
            security::get_user_from_token, session::get_session, test_utils::generate_test_user,
        },
        settings::get_config,
    };

    #[sqlx::test]
    async fn test_generate_test_user(pool: PgPool) -> anyhow::Result<()> {
        // Given
        let config = get_config();
        let client = redis::Client::open(config.redis_url.clone()).unwrap();
        let mut redis_conn = client.get_connection().unwrap();

        // When
        let mut db = pool.acquire().await?;
        let res = generate_test_user(
            &mut db,
            &mut redis_conn,
            config.clone(),
            "testuser",
            "testpassword",
        )
        .await?;

        // Expect
        // is user exists on db
        let user: Option<(Uuid, String, bool)> =
            sqlx::query_as("SELECT id, user_name, is_active FROM public.user WHERE id = $1")
                .bind(&res.user.id)
                .fetch_optional(&mut *db)
                .await?;
        assert!(user.is_some());
        assert!(user.unwrap().2);

        // is jwt token valid
        let mut tx = db.begin().await?;
        let user_token =
            get_user_from_token(&mut tx, &mut redis_conn, Some(res.token.clone())).await?;
        assert!(user_token.is_some());
        assert_eq!(user_token.unwrap().user_name, "testuser".to_string());

        // is user exists on redis
        let session = get_session(&mut redis_conn, res.token)?;
        assert!(session.is_some());
        Ok(())
    }
}
