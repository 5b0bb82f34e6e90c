use chrono::{DateTime, FixedOffset};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{
        binds_query_as, paginate, push_search_filter, query_builder, soft_delete_by_id, SqlxBinds,
    },
    model::{
        product::{Product, TABLE_NAME},
        user::User,
    },
};

pub async fn paginate_product(
    tx: &mut Transaction<'_, Postgres>,
    page: u32,
    page_size: u32,
    search: Option<String>,
    category: Option<String>,
) -> anyhow::Result<(Vec<Product>, u32, u32)> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec!["is_active = true".to_string()];
    push_search_filter(&mut binds, &mut filters, "product_name", search);
    if let Some(category) = category {
        binds.push(SqlxBinds::String(category));
        filters.push(format!("category = ${}", binds.len()));
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

pub async fn get_dropdown_product(
    tx: &mut Transaction<'_, Postgres>,
    limit: Option<u32>,
    search: Option<String>,
) -> anyhow::Result<Vec<Product>> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec!["is_active = true".to_string()];
    push_search_filter(&mut binds, &mut filters, "product_name", search);
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &filters,
        vec!["product_name ASC".to_string()],
        Some(limit.unwrap_or(10)),
        None,
    );
    Ok(binds_query_as::<Product>(&stmt, binds)
        .fetch_all(&mut **tx)
        .await?)
}

pub async fn get_product_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<Product>> {
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &["id = $1".to_string(), "is_active = true".to_string()],
        vec![],
        None,
        None,
    );
    Ok(binds_query_as::<Product>(&stmt, vec![SqlxBinds::Uuid(*id)])
        .fetch_optional(&mut **tx)
        .await?)
}

pub async fn create_product(
    tx: &mut Transaction<'_, Postgres>,
    product: &Product,
) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"INSERT INTO {} (id, product_name, description, category, price, stock, is_active,
            created_by, updated_by, created_date, updated_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(product.id)
    .bind(&product.product_name)
    .bind(&product.description)
    .bind(&product.category)
    .bind(product.price)
    .bind(product.stock)
    .bind(product.is_active)
    .bind(product.created_by)
    .bind(product.updated_by)
    .bind(product.created_date)
    .bind(product.updated_date)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Stock is only changed through [`adjust_product_stock`].
pub async fn update_product(
    tx: &mut Transaction<'_, Postgres>,
    product: &mut Product,
    request_user: &User,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    product.updated_by = Some(request_user.id);
    product.updated_date = Some(*now);
    sqlx::query(
        format!(
            r#"UPDATE {}
            SET product_name = $1, description = $2, category = $3, price = $4,
            updated_by = $5, updated_date = $6
            WHERE id = $7"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&product.product_name)
    .bind(&product.description)
    .bind(&product.category)
    .bind(product.price)
    .bind(product.updated_by)
    .bind(product.updated_date)
    .bind(product.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Add `delta` (may be negative) to the stock of an active product in a single
/// statement. Returns the updated row, or `None` when the product is missing or
/// the result would drop below zero.
pub async fn adjust_product_stock(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
    delta: i32,
    request_user: &User,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<Option<Product>> {
    Ok(sqlx::query_as(
        format!(
            r#"UPDATE {}
            SET stock = stock + $1, updated_by = $2, updated_date = $3
            WHERE id = $4 AND is_active = true AND stock + $1 >= 0
            RETURNING *"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(delta)
    .bind(request_user.id)
    .bind(now)
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?)
}

pub async fn soft_delete_product(
    tx: &mut Transaction<'_, Postgres>,
    product: &mut Product,
    request_user: &User,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    product.is_active = false;
    product.updated_by = Some(request_user.id);
    product.updated_date = Some(*now);
    soft_delete_by_id(tx, TABLE_NAME, &product.id, &request_user.id, now).await
}
