use chrono::{DateTime, FixedOffset};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, paginate, push_search_filter, query_builder, SqlxBinds},
    model::user::{User, TABLE_NAME},
};

pub async fn paginate_user(
    tx: &mut Transaction<'_, Postgres>,
    page: u32,
    page_size: u32,
    search: Option<String>,
) -> anyhow::Result<(Vec<User>, u32, u32)> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec!["is_active = true".to_string()];
    push_search_filter(&mut binds, &mut filters, "user_name", search);

    paginate(
        tx,
        TABLE_NAME,
        &filters,
        binds,
        vec!["updated_date DESC".to_string()],
        page,
        page_size,
    )
    .await
}

/// `exclude_inactive` defaults to true.
pub async fn get_user_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
    exclude_inactive: Option<bool>,
) -> anyhow::Result<Option<User>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*id)];
    let mut filters: Vec<String> = vec!["id = $1".to_string()];
    if exclude_inactive.unwrap_or(true) {
        filters.push("is_active = true".to_string());
    }
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![], None, None);
    let data = binds_query_as::<User>(&stmt, binds)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(data)
}

pub async fn get_user_by_username(
    tx: &mut Transaction<'_, Postgres>,
    username: &str,
) -> anyhow::Result<Option<User>> {
    Ok(sqlx::query_as(
        format!(
            r#"SELECT *
        FROM {}
        WHERE user_name = $1 AND is_active = true"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(username)
    .fetch_optional(&mut **tx)
    .await?)
}

/// Includes deactivated users so provisioning can reactivate them.
pub async fn get_user_by_external_id(
    tx: &mut Transaction<'_, Postgres>,
    external_id: &str,
) -> anyhow::Result<Option<User>> {
    Ok(sqlx::query_as(
        format!("SELECT * FROM {} WHERE external_id = $1", TABLE_NAME).as_str(),
    )
    .bind(external_id)
    .fetch_optional(&mut **tx)
    .await?)
}

/// Resolve `created_by` / `updated_by` of a row, deactivated users included.
pub async fn get_audit_users(
    tx: &mut Transaction<'_, Postgres>,
    created_by: Option<Uuid>,
    updated_by: Option<Uuid>,
) -> anyhow::Result<(Option<User>, Option<User>)> {
    let mut created: Option<User> = None;
    if let Some(id) = created_by {
        created = get_user_by_id(tx, &id, Some(false)).await?;
    }
    let mut updated: Option<User> = None;
    if let Some(id) = updated_by {
        updated = match (&created, created_by == updated_by) {
            (Some(val), true) => Some(val.clone()),
            _ => get_user_by_id(tx, &id, Some(false)).await?,
        };
    }
    Ok((created, updated))
}

pub async fn create_user(tx: &mut Transaction<'_, Postgres>, user: &User) -> anyhow::Result<()> {
    sqlx::query(
        format!(r#"
        INSERT INTO {} (id, user_name, password, email, first_name, last_name, external_id,
        is_active, created_by, updated_by, created_date, updated_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#, TABLE_NAME).as_str(),
    )
    .bind(user.id)
    .bind(&user.user_name)
    .bind(&user.password)
    .bind(&user.email)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.external_id)
    .bind(user.is_active)
    .bind(user.created_by)
    .bind(user.updated_by)
    .bind(user.created_date)
    .bind(user.updated_date)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Persist the current field values of `user`. `request_user` is `None` for
/// changes made by the provisioning webhook.
pub async fn update_user(
    tx: &mut Transaction<'_, Postgres>,
    user: &mut User,
    request_user: Option<&User>,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    user.updated_by = request_user.map(|x| x.id);
    user.updated_date = Some(*now);
    sqlx::query(
        format!(
            r#"UPDATE {}
            SET user_name = $1, password = $2, email = $3, first_name = $4, last_name = $5,
            is_active = $6, updated_by = $7, updated_date = $8
            WHERE id = $9"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&user.user_name)
    .bind(&user.password)
    .bind(&user.email)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(user.is_active)
    .bind(user.updated_by)
    .bind(user.updated_date)
    .bind(user.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn soft_delete_user(
    tx: &mut Transaction<'_, Postgres>,
    user: &mut User,
    request_user: Option<&User>,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    user.is_active = false;
    user.updated_by = request_user.map(|x| x.id);
    user.updated_date = Some(*now);
    sqlx::query(
        format!(
            r#"UPDATE {} SET is_active = false, updated_by = $1, updated_date = $2
            WHERE id = $3"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(user.updated_by)
    .bind(user.updated_date)
    .bind(user.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Whether `user_name` belongs to another user, deactivated users included.
pub async fn is_user_name_taken(
    tx: &mut Transaction<'_, Postgres>,
    user_name: &str,
    exclude_id: Option<Uuid>,
) -> anyhow::Result<bool> {
    let count: (i64,) = sqlx::query_as(
        format!(
            "SELECT count(id) FROM {} WHERE user_name = $1 AND ($2::UUID IS NULL OR id <> $2)",
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(user_name)
    .bind(exclude_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(count.0 > 0)
}
