use chrono::Local;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{core::security::hash_password, model::user::User, repository};

/// Create an active back-office user. Fails when the user name is taken.
pub async fn create_user(
    pool: &PgPool,
    username: &str,
    password: &str,
    email: Option<&str>,
) -> anyhow::Result<User> {
    let mut tx = pool.begin().await?;
    if repository::user::is_user_name_taken(&mut tx, username, None).await? {
        anyhow::bail!("user_name {} already exists", username);
    }

    let hashed_password =
        hash_password(password).map_err(|err| anyhow::anyhow!("hash password: {}", err))?;
    let now = Local::now().fixed_offset();
    let user = User {
        id: Uuid::now_v7(),
        user_name: username.to_string(),
        password: hashed_password,
        email: email.map(|email| email.to_string()),
        first_name: None,
        last_name: None,
        external_id: None,
        is_active: true,
        created_by: None,
        updated_by: None,
        created_date: Some(now),
        updated_date: Some(now),
    };
    repository::user::create_user(&mut tx, &user).await?;
    tx.commit().await?;
    Ok(user)
}
