use chrono::{DateTime, FixedOffset, Local};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{
        binds_query_as, page_count, page_window, push_search_filter, query_builder, SqlxBinds,
    },
    model::{
        group::{Group, TABLE_NAME},
        user::User,
    },
};

pub async fn paginate_group(
    tx: &mut Transaction<'_, Postgres>,
    page: u32,
    page_size: u32,
    search: Option<String>,
) -> anyhow::Result<(Vec<Group>, u32, u32)> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec!["is_active = true".to_string()];
    push_search_filter(&mut binds, &mut filters, "group_name", search);

    let (limit, offset) = page_window(page, page_size);
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &filters,
        vec!["updated_date DESC".to_string()],
        Some(limit),
        Some(offset),
    );
    let stmt_count = query_builder(
        Some("count(id)".to_string()),
        TABLE_NAME,
        &filters,
        vec![],
        None,
        None,
    );

    let q = binds_query_as::<Group>(&stmt, binds.clone());
    let q_count = binds_query_as::<(i64,)>(&stmt_count, binds);
    let data = q.fetch_all(&mut **tx).await?;
    let count = q_count.fetch_one(&mut **tx).await?;
    Ok((data, count.0 as u32, page_count(count.0 as u32, limit)))
}

pub async fn get_dropdown_group(
    tx: &mut Transaction<'_, Postgres>,
    limit: Option<u32>,
    search: Option<String>,
) -> anyhow::Result<Vec<Group>> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec!["is_active = true".to_string()];
    push_search_filter(&mut binds, &mut filters, "group_name", search);

    let stmt = query_builder(
        None,
        TABLE_NAME,
        &filters,
        vec!["updated_date DESC".to_string()],
        Some(limit.unwrap_or(10)),
        None,
    );
    let data = binds_query_as::<Group>(&stmt, binds)
        .fetch_all(&mut **tx)
        .await?;
    Ok(data)
}

pub async fn get_group_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<Group>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*id)];
    let filters: Vec<String> = vec!["id = $1".to_string(), "is_active = true".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![], None, None);
    let data = binds_query_as::<Group>(&stmt, binds)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(data)
}

pub async fn create_group(
    tx: &mut Transaction<'_, Postgres>,
    id: Option<Uuid>,
    group_name: String,
    description: Option<String>,
    request_user: &User,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<Group> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    let new_group = Group {
        id: id.unwrap_or(Uuid::now_v7()),
        group_name,
        description,
        is_active: true,
        created_by: Some(request_user.id),
        updated_by: Some(request_user.id),
        created_date: Some(now),
        updated_date: Some(now),
    };
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, group_name, description, is_active, created_by,
    updated_by, created_date, updated_date)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(new_group.id)
    .bind(&new_group.group_name)
    .bind(&new_group.description)
    .bind(new_group.is_active)
    .bind(new_group.created_by)
    .bind(new_group.updated_by)
    .bind(new_group.created_date)
    .bind(new_group.updated_date)
    .execute(&mut **tx)
    .await?;
    Ok(new_group)
}

pub async fn update_group(
    tx: &mut Transaction<'_, Postgres>,
    group: &mut Group,
    group_name: String,
    description: Option<String>,
    request_user: &User,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<()> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    group.group_name = group_name;
    group.description = description;
    group.updated_by = Some(request_user.id);
    group.updated_date = Some(now);
    sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET group_name = $1, description = $2, updated_by = $3, updated_date = $4
        WHERE id = $5"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&group.group_name)
    .bind(&group.description)
    .bind(group.updated_by)
    .bind(group.updated_date)
    .bind(group.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Memberships and menu grants of the group are kept for history.
pub async fn soft_delete_group(
    tx: &mut Transaction<'_, Postgres>,
    group: &mut Group,
    request_user: &User,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<()> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    group.is_active = false;
    group.updated_by = Some(request_user.id);
    group.updated_date = Some(now);
    sqlx::query(
        format!(
            r#"UPDATE {}
    SET is_active = false, updated_by = $1, updated_date = $2
    WHERE id = $3"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(group.updated_by)
    .bind(group.updated_date)
    .bind(group.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
