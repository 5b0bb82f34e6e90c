use chrono::{DateTime, FixedOffset};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{
        binds_query_as, paginate, push_search_filter, query_builder, soft_delete_by_id, SqlxBinds,
    },
    model::{
        staff_level::{StaffLevel, TABLE_NAME},
        user::User,
    },
};

pub async fn paginate_staff_level(
    tx: &mut Transaction<'_, Postgres>,
    page: u32,
    page_size: u32,
    search: Option<String>,
) -> anyhow::Result<(Vec<StaffLevel>, u32, u32)> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec!["is_active = true".to_string()];
    push_search_filter(&mut binds, &mut filters, "level_name", search);
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

pub async fn get_dropdown_staff_level(
    tx: &mut Transaction<'_, Postgres>,
    limit: Option<u32>,
    search: Option<String>,
) -> anyhow::Result<Vec<StaffLevel>> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec!["is_active = true".to_string()];
    push_search_filter(&mut binds, &mut filters, "level_name", search);
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &filters,
        vec!["level_name ASC".to_string()],
        Some(limit.unwrap_or(10)),
        None,
    );
    Ok(binds_query_as::<StaffLevel>(&stmt, binds)
        .fetch_all(&mut **tx)
        .await?)
}

pub async fn get_staff_level_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<StaffLevel>> {
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &["id = $1".to_string(), "is_active = true".to_string()],
        vec![],
        None,
        None,
    );
    Ok(binds_query_as::<StaffLevel>(&stmt, vec![SqlxBinds::Uuid(*id)])
        .fetch_optional(&mut **tx)
        .await?)
}

pub async fn create_staff_level(
    tx: &mut Transaction<'_, Postgres>,
    staff_level: &StaffLevel,
) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"INSERT INTO {} (id, level_name, description, commission_rate, is_active,
            created_by, updated_by, created_date, updated_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(staff_level.id)
    .bind(&staff_level.level_name)
    .bind(&staff_level.description)
    .bind(staff_level.commission_rate)
    .bind(staff_level.is_active)
    .bind(staff_level.created_by)
    .bind(staff_level.updated_by)
    .bind(staff_level.created_date)
    .bind(staff_level.updated_date)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn update_staff_level(
    tx: &mut Transaction<'_, Postgres>,
    staff_level: &mut StaffLevel,
    request_user: &User,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    staff_level.updated_by = Some(request_user.id);
    staff_level.updated_date = Some(*now);
    sqlx::query(
        format!(
            r#"UPDATE {}
            SET level_name = $1, description = $2, commission_rate = $3,
            updated_by = $4, updated_date = $5
            WHERE id = $6"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&staff_level.level_name)
    .bind(&staff_level.description)
    .bind(staff_level.commission_rate)
    .bind(staff_level.updated_by)
    .bind(staff_level.updated_date)
    .bind(staff_level.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn soft_delete_staff_level(
    tx: &mut Transaction<'_, Postgres>,
    staff_level: &mut StaffLevel,
    request_user: &User,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    staff_level.is_active = false;
    staff_level.updated_by = Some(request_user.id);
    staff_level.updated_date = Some(*now);
    soft_delete_by_id(tx, TABLE_NAME, &staff_level.id, &request_user.id, now).await
}
