use chrono::{DateTime, FixedOffset};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{
        binds_query_as, paginate, push_search_filter, query_builder, soft_delete_by_id, SqlxBinds,
    },
    model::{
        service::{Service, TABLE_NAME},
        user::User,
    },
};

pub async fn paginate_service(
    tx: &mut Transaction<'_, Postgres>,
    page: u32,
    page_size: u32,
    search: Option<String>,
) -> anyhow::Result<(Vec<Service>, u32, u32)> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec!["is_active = true".to_string()];
    push_search_filter(&mut binds, &mut filters, "service_name", search);
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

pub async fn get_dropdown_service(
    tx: &mut Transaction<'_, Postgres>,
    limit: Option<u32>,
    search: Option<String>,
) -> anyhow::Result<Vec<Service>> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec!["is_active = true".to_string()];
    push_search_filter(&mut binds, &mut filters, "service_name", search);
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &filters,
        vec!["service_name ASC".to_string()],
        Some(limit.unwrap_or(10)),
        None,
    );
    Ok(binds_query_as::<Service>(&stmt, binds)
        .fetch_all(&mut **tx)
        .await?)
}

pub async fn get_service_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<Service>> {
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &["id = $1".to_string(), "is_active = true".to_string()],
        vec![],
        None,
        None,
    );
    Ok(binds_query_as::<Service>(&stmt, vec![SqlxBinds::Uuid(*id)])
        .fetch_optional(&mut **tx)
        .await?)
}

pub async fn create_service(
    tx: &mut Transaction<'_, Postgres>,
    service: &Service,
) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"INSERT INTO {} (id, service_name, description, price, duration_minutes, is_active,
            created_by, updated_by, created_date, updated_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(service.id)
    .bind(&service.service_name)
    .bind(&service.description)
    .bind(service.price)
    .bind(service.duration_minutes)
    .bind(service.is_active)
    .bind(service.created_by)
    .bind(service.updated_by)
    .bind(service.created_date)
    .bind(service.updated_date)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn update_service(
    tx: &mut Transaction<'_, Postgres>,
    service: &mut Service,
    request_user: &User,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    service.updated_by = Some(request_user.id);
    service.updated_date = Some(*now);
    sqlx::query(
        format!(
            r#"UPDATE {}
            SET service_name = $1, description = $2, price = $3, duration_minutes = $4,
            updated_by = $5, updated_date = $6
            WHERE id = $7"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&service.service_name)
    .bind(&service.description)
    .bind(service.price)
    .bind(service.duration_minutes)
    .bind(service.updated_by)
    .bind(service.updated_date)
    .bind(service.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn soft_delete_service(
    tx: &mut Transaction<'_, Postgres>,
    service: &mut Service,
    request_user: &User,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    service.is_active = false;
    service.updated_by = Some(request_user.id);
    service.updated_date = Some(*now);
    soft_delete_by_id(tx, TABLE_NAME, &service.id, &request_user.id, now).await
}
