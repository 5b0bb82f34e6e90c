use chrono::{DateTime, FixedOffset, NaiveDate};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{paginate, SqlxBinds},
    model::daily_sales::{DailySales, DailySalesIncrement, TABLE_NAME},
};

pub async fn paginate_daily_sales(
    tx: &mut Transaction<'_, Postgres>,
    page: u32,
    page_size: u32,
    staff_id: Option<Uuid>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> anyhow::Result<(Vec<DailySales>, u32, u32)> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec!["is_active = true".to_string()];
    if let Some(staff_id) = staff_id {
        binds.push(SqlxBinds::Uuid(staff_id));
        filters.push(format!("staff_id = ${}", binds.len()));
    }
    if let Some(start_date) = start_date {
        binds.push(SqlxBinds::Date(start_date));
        filters.push(format!("sales_date >= ${}", binds.len()));
    }
    if let Some(end_date) = end_date {
        binds.push(SqlxBinds::Date(end_date));
        filters.push(format!("sales_date <= ${}", binds.len()));
    }
    paginate(
        tx,
        TABLE_NAME,
        &filters,
        binds,
        vec!["sales_date DESC".to_string(), "staff_id".to_string()],
        page,
        page_size,
    )
    .await
}

/// Add one transaction to the `(sales_date, staff_id)` row, creating it when
/// absent. Concurrent writers serialize on the row lock of the conflict target.
pub async fn increment_daily_sales(
    tx: &mut Transaction<'_, Postgres>,
    sales_date: &NaiveDate,
    staff_id: &Uuid,
    increment: &DailySalesIncrement,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<DailySales> {
    Ok(sqlx::query_as(
        format!(
            r#"INSERT INTO {0} AS ds (id, sales_date, staff_id, total_transactions, total_services,
            total_products, gross_sales, net_sales, is_active, created_date, updated_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, true, $9, $9)
            ON CONFLICT (sales_date, staff_id) DO UPDATE
            SET total_transactions = ds.total_transactions + EXCLUDED.total_transactions,
            total_services = ds.total_services + EXCLUDED.total_services,
            total_products = ds.total_products + EXCLUDED.total_products,
            gross_sales = ds.gross_sales + EXCLUDED.gross_sales,
            net_sales = ds.net_sales + EXCLUDED.net_sales,
            is_active = true,
            updated_date = EXCLUDED.updated_date
            RETURNING *"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(Uuid::now_v7())
    .bind(sales_date)
    .bind(staff_id)
    .bind(increment.total_transactions)
    .bind(increment.total_services)
    .bind(increment.total_products)
    .bind(increment.gross_sales)
    .bind(increment.net_sales)
    .bind(now)
    .fetch_one(&mut **tx)
    .await?)
}
