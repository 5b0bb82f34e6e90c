use chrono::{DateTime, FixedOffset};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{
        binds_query_as, paginate, push_search_filter, query_builder, soft_delete_by_id, SqlxBinds,
    },
    model::{
        staff::{Staff, TABLE_NAME},
        user::User,
    },
};

pub async fn paginate_staff(
    tx: &mut Transaction<'_, Postgres>,
    page: u32,
    page_size: u32,
    search: Option<String>,
    staff_level_id: Option<Uuid>,
) -> anyhow::Result<(Vec<Staff>, u32, u32)> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec!["is_active = true".to_string()];
    push_search_filter(&mut binds, &mut filters, "staff_name", search);
    if let Some(staff_level_id) = staff_level_id {
        binds.push(SqlxBinds::Uuid(staff_level_id));
        filters.push(format!("staff_level_id = ${}", binds.len()));
    }
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

pub async fn get_dropdown_staff(
    tx: &mut Transaction<'_, Postgres>,
    limit: Option<u32>,
    search: Option<String>,
) -> anyhow::Result<Vec<Staff>> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec!["is_active = true".to_string()];
    push_search_filter(&mut binds, &mut filters, "staff_name", search);
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &filters,
        vec!["staff_name ASC".to_string()],
        Some(limit.unwrap_or(10)),
        None,
    );
    Ok(binds_query_as::<Staff>(&stmt, binds)
        .fetch_all(&mut **tx)
        .await?)
}

pub async fn get_staff_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<Staff>> {
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &["id = $1".to_string(), "is_active = true".to_string()],
        vec![],
        None,
        None,
    );
    Ok(binds_query_as::<Staff>(&stmt, vec![SqlxBinds::Uuid(*id)])
        .fetch_optional(&mut **tx)
        .await?)
}

pub async fn create_staff(tx: &mut Transaction<'_, Postgres>, staff: &Staff) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"INSERT INTO {} (id, staff_name, phone, email, address, staff_level_id, join_date,
            is_active, created_by, updated_by, created_date, updated_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(staff.id)
    .bind(&staff.staff_name)
    .bind(&staff.phone)
    .bind(&staff.email)
    .bind(&staff.address)
    .bind(staff.staff_level_id)
    .bind(staff.join_date)
    .bind(staff.is_active)
    .bind(staff.created_by)
    .bind(staff.updated_by)
    .bind(staff.created_date)
    .bind(staff.updated_date)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn update_staff(
    tx: &mut Transaction<'_, Postgres>,
    staff: &mut Staff,
    request_user: &User,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    staff.updated_by = Some(request_user.id);
    staff.updated_date = Some(*now);
    sqlx::query(
        format!(
            r#"UPDATE {}
            SET staff_name = $1, phone = $2, email = $3, address = $4, staff_level_id = $5,
            join_date = $6, updated_by = $7, updated_date = $8
            WHERE id = $9"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&staff.staff_name)
    .bind(&staff.phone)
    .bind(&staff.email)
    .bind(&staff.address)
    .bind(staff.staff_level_id)
    .bind(staff.join_date)
    .bind(staff.updated_by)
    .bind(staff.updated_date)
    .bind(staff.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Transactions and daily sales of the staff stay untouched.
pub async fn soft_delete_staff(
    tx: &mut Transaction<'_, Postgres>,
    staff: &mut Staff,
    request_user: &User,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    staff.is_active = false;
    staff.updated_by = Some(request_user.id);
    staff.updated_date = Some(*now);
    soft_delete_by_id(tx, TABLE_NAME, &staff.id, &request_user.id, now).await
}
