use chrono::{DateTime, FixedOffset};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{
        binds_query_as, paginate, push_search_filter, query_builder, soft_delete_by_id, SqlxBinds,
    },
    model::{
        menu::{Menu, TABLE_NAME},
        user::User,
    },
};

pub async fn paginate_menu(
    tx: &mut Transaction<'_, Postgres>,
    page: u32,
    page_size: u32,
    search: Option<String>,
) -> anyhow::Result<(Vec<Menu>, u32, u32)> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec!["is_active = true".to_string()];
    push_search_filter(&mut binds, &mut filters, "menu_name", search);
    paginate(
        tx,
        TABLE_NAME,
        &filters,
        binds,
        vec!["sort_order ASC".to_string(), "menu_name ASC".to_string()],
        page,
        page_size,
    )
    .await
}

pub async fn get_dropdown_menu(
    tx: &mut Transaction<'_, Postgres>,
    limit: Option<u32>,
    search: Option<String>,
) -> anyhow::Result<Vec<Menu>> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec!["is_active = true".to_string()];
    push_search_filter(&mut binds, &mut filters, "menu_name", search);
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &filters,
        vec!["sort_order ASC".to_string(), "menu_name ASC".to_string()],
        Some(limit.unwrap_or(10)),
        None,
    );
    Ok(binds_query_as::<Menu>(&stmt, binds)
        .fetch_all(&mut **tx)
        .await?)
}

pub async fn get_menu_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<Menu>> {
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &["id = $1".to_string(), "is_active = true".to_string()],
        vec![],
        None,
        None,
    );
    Ok(binds_query_as::<Menu>(&stmt, vec![SqlxBinds::Uuid(*id)])
        .fetch_optional(&mut **tx)
        .await?)
}

pub async fn create_menu(tx: &mut Transaction<'_, Postgres>, menu: &Menu) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"INSERT INTO {} (id, menu_name, menu_url, icon, parent_id, sort_order, is_active,
            created_by, updated_by, created_date, updated_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(menu.id)
    .bind(&menu.menu_name)
    .bind(&menu.menu_url)
    .bind(&menu.icon)
    .bind(menu.parent_id)
    .bind(menu.sort_order)
    .bind(menu.is_active)
    .bind(menu.created_by)
    .bind(menu.updated_by)
    .bind(menu.created_date)
    .bind(menu.updated_date)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn update_menu(
    tx: &mut Transaction<'_, Postgres>,
    menu: &mut Menu,
    request_user: &User,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    menu.updated_by = Some(request_user.id);
    menu.updated_date = Some(*now);
    sqlx::query(
        format!(
            r#"UPDATE {}
            SET menu_name = $1, menu_url = $2, icon = $3, parent_id = $4, sort_order = $5,
            updated_by = $6, updated_date = $7
            WHERE id = $8"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&menu.menu_name)
    .bind(&menu.menu_url)
    .bind(&menu.icon)
    .bind(menu.parent_id)
    .bind(menu.sort_order)
    .bind(menu.updated_by)
    .bind(menu.updated_date)
    .bind(menu.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn soft_delete_menu(
    tx: &mut Transaction<'_, Postgres>,
    menu: &mut Menu,
    request_user: &User,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    menu.is_active = false;
    menu.updated_by = Some(request_user.id);
    menu.updated_date = Some(*now);
    soft_delete_by_id(tx, TABLE_NAME, &menu.id, &request_user.id, now).await
}

/// Whether `menu_url` belongs to another menu, deactivated menus included.
pub async fn is_menu_url_taken(
    tx: &mut Transaction<'_, Postgres>,
    menu_url: &str,
    exclude_id: Option<Uuid>,
) -> anyhow::Result<bool> {
    let count: (i64,) = sqlx::query_as(
        format!(
            "SELECT count(id) FROM {} WHERE menu_url = $1 AND ($2::UUID IS NULL OR id <> $2)",
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(menu_url)
    .bind(exclude_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(count.0 > 0)
}
