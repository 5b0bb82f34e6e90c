use chrono::NaiveDate;
use sqlx::{Postgres, Transaction};

use crate::{
    core::{
        sqlx_utils::{binds_query_as, SqlxBinds},
        utils::start_of_business_day,
    },
    model::{
        analytics::{DailySalesPoint, SalesSummary, StaffPerformance, TopItem},
        daily_sales::TABLE_NAME as DAILY_SALES_TABLE_NAME,
        operasional::TABLE_NAME as OPERASIONAL_TABLE_NAME,
        staff::TABLE_NAME as STAFF_TABLE_NAME,
        staff_level::TABLE_NAME as STAFF_LEVEL_TABLE_NAME,
        transaction::TABLE_NAME as TRANSACTION_TABLE_NAME,
        transaction_item::{ItemType, TABLE_NAME as TRANSACTION_ITEM_TABLE_NAME},
    },
};

/// Push inclusive `column` bounds for a date range.
fn push_date_range(
    binds: &mut Vec<SqlxBinds>,
    filters: &mut Vec<String>,
    column: &str,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) {
    if let Some(start_date) = start_date {
        binds.push(SqlxBinds::Date(start_date));
        filters.push(format!("{} >= ${}", column, binds.len()));
    }
    if let Some(end_date) = end_date {
        binds.push(SqlxBinds::Date(end_date));
        filters.push(format!("{} <= ${}", column, binds.len()));
    }
}

fn and_filters(filters: &[String]) -> String {
    filters.join(" AND ")
}

pub async fn get_sales_summary(
    tx: &mut Transaction<'_, Postgres>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> anyhow::Result<SalesSummary> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut sales_filters: Vec<String> = vec!["is_active = true".to_string()];
    push_date_range(&mut binds, &mut sales_filters, "sales_date", start_date, end_date);
    let mut expense_filters: Vec<String> = vec!["is_active = true".to_string()];
    push_date_range(&mut binds, &mut expense_filters, "expense_date", start_date, end_date);
    let stmt = format!(
        r#"SELECT
        COALESCE(SUM(total_transactions), 0)::BIGINT AS total_transactions,
        COALESCE(SUM(total_services), 0)::BIGINT AS total_services,
        COALESCE(SUM(total_products), 0)::BIGINT AS total_products,
        COALESCE(SUM(gross_sales), 0)::BIGINT AS gross_sales,
        COALESCE(SUM(net_sales), 0)::BIGINT AS net_sales,
        (SELECT COALESCE(SUM(amount), 0)::BIGINT FROM {} WHERE {}) AS total_expenses
        FROM {} WHERE {}"#,
        OPERASIONAL_TABLE_NAME,
        and_filters(&expense_filters),
        DAILY_SALES_TABLE_NAME,
        and_filters(&sales_filters),
    );
    Ok(binds_query_as::<SalesSummary>(&stmt, binds)
        .fetch_one(&mut **tx)
        .await?)
}

pub async fn get_daily_series(
    tx: &mut Transaction<'_, Postgres>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> anyhow::Result<Vec<DailySalesPoint>> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec!["is_active = true".to_string()];
    push_date_range(&mut binds, &mut filters, "sales_date", start_date, end_date);
    let stmt = format!(
        r#"SELECT sales_date,
        SUM(total_transactions)::BIGINT AS total_transactions,
        SUM(total_services)::BIGINT AS total_services,
        SUM(total_products)::BIGINT AS total_products,
        SUM(gross_sales)::BIGINT AS gross_sales,
        SUM(net_sales)::BIGINT AS net_sales
        FROM {} WHERE {}
        GROUP BY sales_date
        ORDER BY sales_date ASC"#,
        DAILY_SALES_TABLE_NAME,
        and_filters(&filters),
    );
    Ok(binds_query_as::<DailySalesPoint>(&stmt, binds)
        .fetch_all(&mut **tx)
        .await?)
}

/// Every active staff with their totals in the range, including staff
/// without sales.
pub async fn get_staff_performance(
    tx: &mut Transaction<'_, Postgres>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> anyhow::Result<Vec<StaffPerformance>> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut join_filters: Vec<String> = vec![
        "ds.staff_id = s.id".to_string(),
        "ds.is_active = true".to_string(),
    ];
    push_date_range(&mut binds, &mut join_filters, "ds.sales_date", start_date, end_date);
    let stmt = format!(
        r#"SELECT s.id AS staff_id, s.staff_name, sl.level_name,
        COALESCE(sl.commission_rate, 0) AS commission_rate,
        COALESCE(SUM(ds.total_transactions), 0)::BIGINT AS total_transactions,
        COALESCE(SUM(ds.total_services), 0)::BIGINT AS total_services,
        COALESCE(SUM(ds.total_products), 0)::BIGINT AS total_products,
        COALESCE(SUM(ds.gross_sales), 0)::BIGINT AS gross_sales,
        COALESCE(SUM(ds.net_sales), 0)::BIGINT AS net_sales
        FROM {} s
        LEFT JOIN {} sl ON sl.id = s.staff_level_id
        LEFT JOIN {} ds ON {}
        WHERE s.is_active = true
        GROUP BY s.id, s.staff_name, sl.level_name, sl.commission_rate
        ORDER BY gross_sales DESC, s.staff_name ASC"#,
        STAFF_TABLE_NAME,
        STAFF_LEVEL_TABLE_NAME,
        DAILY_SALES_TABLE_NAME,
        and_filters(&join_filters),
    );
    Ok(binds_query_as::<StaffPerformance>(&stmt, binds)
        .fetch_all(&mut **tx)
        .await?)
}

pub async fn get_top_items(
    tx: &mut Transaction<'_, Postgres>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    item_type: Option<ItemType>,
    limit: Option<u32>,
) -> anyhow::Result<Vec<TopItem>> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec!["t.is_active = true".to_string()];
    if let Some(start) = start_date.and_then(start_of_business_day) {
        binds.push(SqlxBinds::DateTimeFixedOffset(start));
        filters.push(format!("t.transaction_date >= ${}", binds.len()));
    }
    if let Some(end) = end_date
        .and_then(|x| x.succ_opt())
        .and_then(start_of_business_day)
    {
        binds.push(SqlxBinds::DateTimeFixedOffset(end));
        filters.push(format!("t.transaction_date < ${}", binds.len()));
    }
    if let Some(item_type) = item_type {
        binds.push(SqlxBinds::String(item_type.as_str().to_string()));
        filters.push(format!("ti.item_type = ${}", binds.len()));
    }
    let stmt = format!(
        r#"SELECT ti.item_type, COALESCE(ti.service_id, ti.product_id) AS item_id,
        MAX(ti.item_name) AS item_name,
        SUM(ti.quantity)::BIGINT AS total_quantity,
        SUM(ti.total_price)::BIGINT AS total_sales
        FROM {} ti
        JOIN {} t ON t.id = ti.transaction_id
        WHERE {}
        GROUP BY ti.item_type, COALESCE(ti.service_id, ti.product_id)
        ORDER BY total_quantity DESC, total_sales DESC
        LIMIT {}"#,
        TRANSACTION_ITEM_TABLE_NAME,
        TRANSACTION_TABLE_NAME,
        and_filters(&filters),
        limit.unwrap_or(10),
    );
    Ok(binds_query_as::<TopItem>(&stmt, binds)
        .fetch_all(&mut **tx)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_date_range() {
        let mut binds: Vec<SqlxBinds> = vec![];
        let mut filters: Vec<String> = vec!["is_active = true".to_string()];
        push_date_range(&mut binds, &mut filters, "sales_date", None, None);
        assert_eq!(and_filters(&filters), "is_active = true");
        push_date_range(
            &mut binds,
            &mut filters,
            "sales_date",
            NaiveDate::from_ymd_opt(2024, 3, 1),
            NaiveDate::from_ymd_opt(2024, 3, 31),
        );
        assert_eq!(
            and_filters(&filters),
            "is_active = true AND sales_date >= $1 AND sales_date <= $2"
        );
        assert_eq!(binds.len(), 2);
    }
}
