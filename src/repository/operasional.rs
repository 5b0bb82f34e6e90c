use chrono::{DateTime, FixedOffset, NaiveDate};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{
        binds_query_as, paginate, push_search_filter, query_builder, soft_delete_by_id, SqlxBinds,
    },
    model::{
        operasional::{Operasional, TABLE_NAME},
        user::User,
    },
};

pub async fn paginate_operasional(
    tx: &mut Transaction<'_, Postgres>,
    page: u32,
    page_size: u32,
    search: Option<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> anyhow::Result<(Vec<Operasional>, u32, u32)> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec!["is_active = true".to_string()];
    push_search_filter(&mut binds, &mut filters, "description", search);
    if let Some(start_date) = start_date {
        binds.push(SqlxBinds::Date(start_date));
        filters.push(format!("expense_date >= ${}", binds.len()));
    }
    if let Some(end_date) = end_date {
        binds.push(SqlxBinds::Date(end_date));
        filters.push(format!("expense_date <= ${}", binds.len()));
    }
    paginate(
        tx,
        TABLE_NAME,
        &filters,
        binds,
        vec!["expense_date DESC".to_string(), "updated_date DESC".to_string()],
        page,
        page_size,
    )
    .await
}

pub async fn get_dropdown_operasional(
    tx: &mut Transaction<'_, Postgres>,
    limit: Option<u32>,
    search: Option<String>,
) -> anyhow::Result<Vec<Operasional>> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec!["is_active = true".to_string()];
    push_search_filter(&mut binds, &mut filters, "description", search);
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &filters,
        vec!["expense_date DESC".to_string()],
        Some(limit.unwrap_or(10)),
        None,
    );
    Ok(binds_query_as::<Operasional>(&stmt, binds)
        .fetch_all(&mut **tx)
        .await?)
}

pub async fn get_operasional_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<Operasional>> {
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &["id = $1".to_string(), "is_active = true".to_string()],
        vec![],
        None,
        None,
    );
    Ok(binds_query_as::<Operasional>(&stmt, vec![SqlxBinds::Uuid(*id)])
        .fetch_optional(&mut **tx)
        .await?)
}

pub async fn create_operasional(
    tx: &mut Transaction<'_, Postgres>,
    operasional: &Operasional,
) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"INSERT INTO {} (id, description, category, amount, expense_date, is_active,
            created_by, updated_by, created_date, updated_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(operasional.id)
    .bind(&operasional.description)
    .bind(&operasional.category)
    .bind(operasional.amount)
    .bind(operasional.expense_date)
    .bind(operasional.is_active)
    .bind(operasional.created_by)
    .bind(operasional.updated_by)
    .bind(operasional.created_date)
    .bind(operasional.updated_date)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn update_operasional(
    tx: &mut Transaction<'_, Postgres>,
    operasional: &mut Operasional,
    request_user: &User,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    operasional.updated_by = Some(request_user.id);
    operasional.updated_date = Some(*now);
    sqlx::query(
        format!(
            r#"UPDATE {}
            SET description = $1, category = $2, amount = $3, expense_date = $4,
            updated_by = $5, updated_date = $6
            WHERE id = $7"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&operasional.description)
    .bind(&operasional.category)
    .bind(operasional.amount)
    .bind(operasional.expense_date)
    .bind(operasional.updated_by)
    .bind(operasional.updated_date)
    .bind(operasional.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn soft_delete_operasional(
    tx: &mut Transaction<'_, Postgres>,
    operasional: &mut Operasional,
    request_user: &User,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    operasional.is_active = false;
    operasional.updated_by = Some(request_user.id);
    operasional.updated_date = Some(*now);
    soft_delete_by_id(tx, TABLE_NAME, &operasional.id, &request_user.id, now).await
}
