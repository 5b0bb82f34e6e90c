use chrono::{DateTime, FixedOffset};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{
        binds_query_as, paginate, push_search_filter, query_builder, soft_delete_by_id, SqlxBinds,
    },
    model::{
        customer::{Customer, TABLE_NAME},
        user::User,
    },
};

pub async fn paginate_customer(
    tx: &mut Transaction<'_, Postgres>,
    page: u32,
    page_size: u32,
    search: Option<String>,
) -> anyhow::Result<(Vec<Customer>, u32, u32)> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec!["is_active = true".to_string()];
    if let Some(search) = search {
        binds.push(SqlxBinds::String(format!("%{}%", search)));
        filters.push(format!(
            "(customer_name ILIKE ${0} OR phone ILIKE ${0})",
            binds.len()
        ));
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

pub async fn get_dropdown_customer(
    tx: &mut Transaction<'_, Postgres>,
    limit: Option<u32>,
    search: Option<String>,
) -> anyhow::Result<Vec<Customer>> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec!["is_active = true".to_string()];
    push_search_filter(&mut binds, &mut filters, "customer_name", search);
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &filters,
        vec!["customer_name ASC".to_string()],
        Some(limit.unwrap_or(10)),
        None,
    );
    Ok(binds_query_as::<Customer>(&stmt, binds)
        .fetch_all(&mut **tx)
        .await?)
}

pub async fn get_customer_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<Customer>> {
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &["id = $1".to_string(), "is_active = true".to_string()],
        vec![],
        None,
        None,
    );
    Ok(binds_query_as::<Customer>(&stmt, vec![SqlxBinds::Uuid(*id)])
        .fetch_optional(&mut **tx)
        .await?)
}

pub async fn create_customer(
    tx: &mut Transaction<'_, Postgres>,
    customer: &Customer,
) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"INSERT INTO {} (id, customer_name, phone, email, notes, is_active,
            created_by, updated_by, created_date, updated_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(customer.id)
    .bind(&customer.customer_name)
    .bind(&customer.phone)
    .bind(&customer.email)
    .bind(&customer.notes)
    .bind(customer.is_active)
    .bind(customer.created_by)
    .bind(customer.updated_by)
    .bind(customer.created_date)
    .bind(customer.updated_date)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn update_customer(
    tx: &mut Transaction<'_, Postgres>,
    customer: &mut Customer,
    request_user: &User,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    customer.updated_by = Some(request_user.id);
    customer.updated_date = Some(*now);
    sqlx::query(
        format!(
            r#"UPDATE {}
            SET customer_name = $1, phone = $2, email = $3, notes = $4,
            updated_by = $5, updated_date = $6
            WHERE id = $7"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&customer.customer_name)
    .bind(&customer.phone)
    .bind(&customer.email)
    .bind(&customer.notes)
    .bind(customer.updated_by)
    .bind(customer.updated_date)
    .bind(customer.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn soft_delete_customer(
    tx: &mut Transaction<'_, Postgres>,
    customer: &mut Customer,
    request_user: &User,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    customer.is_active = false;
    customer.updated_by = Some(request_user.id);
    customer.updated_date = Some(*now);
    soft_delete_by_id(tx, TABLE_NAME, &customer.id, &request_user.id, now).await
}
