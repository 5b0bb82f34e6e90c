use chrono::{DateTime, FixedOffset};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::soft_delete_by_id,
    model::{
        menu_role::{MenuRole, TABLE_NAME},
        user::User,
    },
};

/// Active grants attached to a group.
pub async fn get_menu_role_by_group(
    tx: &mut Transaction<'_, Postgres>,
    group_id: &Uuid,
) -> anyhow::Result<Vec<MenuRole>> {
    Ok(sqlx::query_as(
        format!(
            r#"SELECT * FROM {}
            WHERE group_id = $1 AND is_active = true
            ORDER BY created_date"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(group_id)
    .fetch_all(&mut **tx)
    .await?)
}

pub async fn get_menu_role(
    tx: &mut Transaction<'_, Postgres>,
    menu_id: &Uuid,
    group_id: &Uuid,
) -> anyhow::Result<Option<MenuRole>> {
    Ok(sqlx::query_as(
        format!(
            r#"SELECT * FROM {}
            WHERE menu_id = $1 AND group_id = $2 AND is_active = true"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(menu_id)
    .bind(group_id)
    .fetch_optional(&mut **tx)
    .await?)
}

/// Create or replace the grant for (menu, group). Reactivates a removed grant.
#[allow(clippy::too_many_arguments)]
pub async fn upsert_menu_role(
    tx: &mut Transaction<'_, Postgres>,
    menu_id: &Uuid,
    group_id: &Uuid,
    can_read: bool,
    can_write: bool,
    can_update: bool,
    can_delete: bool,
    request_user: &User,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<MenuRole> {
    Ok(sqlx::query_as(
        format!(
            r#"INSERT INTO {} (id, menu_id, group_id, can_read, can_write, can_update, can_delete,
            is_active, created_by, updated_by, created_date, updated_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, true, $8, $8, $9, $9)
            ON CONFLICT (menu_id, group_id) DO UPDATE
            SET can_read = EXCLUDED.can_read, can_write = EXCLUDED.can_write,
            can_update = EXCLUDED.can_update, can_delete = EXCLUDED.can_delete,
            is_active = true, updated_by = EXCLUDED.updated_by,
            updated_date = EXCLUDED.updated_date
            RETURNING *"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(Uuid::now_v7())
    .bind(menu_id)
    .bind(group_id)
    .bind(can_read)
    .bind(can_write)
    .bind(can_update)
    .bind(can_delete)
    .bind(request_user.id)
    .bind(now)
    .fetch_one(&mut **tx)
    .await?)
}

pub async fn soft_delete_menu_role(
    tx: &mut Transaction<'_, Postgres>,
    menu_role: &mut MenuRole,
    request_user: &User,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    menu_role.is_active = false;
    menu_role.updated_by = Some(request_user.id);
    menu_role.updated_date = Some(*now);
    soft_delete_by_id(tx, TABLE_NAME, &menu_role.id, &request_user.id, now).await
}
