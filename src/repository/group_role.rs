use chrono::{DateTime, FixedOffset};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::model::{
    group::{Group, TABLE_NAME as GROUP_TABLE_NAME},
    group_role::TABLE_NAME,
};

/// Active groups the user is an active member of.
pub async fn get_groups_by_user(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
) -> anyhow::Result<Vec<Group>> {
    Ok(sqlx::query_as(
        format!(
            r#"SELECT g.* FROM {} g
            JOIN {} gr ON gr.group_id = g.id
            WHERE gr.user_id = $1 AND gr.is_active = true AND g.is_active = true
            ORDER BY g.group_name"#,
            GROUP_TABLE_NAME, TABLE_NAME
        )
        .as_str(),
    )
    .bind(user_id)
    .fetch_all(&mut **tx)
    .await?)
}

/// Make `group_ids` the user's exact set of memberships. Rows for groups left
/// out are deactivated, not deleted.
pub async fn replace_user_groups(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
    group_ids: &[Uuid],
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"UPDATE {} SET is_active = false, updated_date = $1
            WHERE user_id = $2 AND is_active = true AND NOT (group_id = ANY($3))"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(now)
    .bind(user_id)
    .bind(group_ids)
    .execute(&mut **tx)
    .await?;

    for group_id in group_ids {
        sqlx::query(
            format!(
                r#"INSERT INTO {} (id, user_id, group_id, is_active, created_date, updated_date)
                VALUES ($1, $2, $3, true, $4, $4)
                ON CONFLICT (user_id, group_id)
                DO UPDATE SET is_active = true, updated_date = EXCLUDED.updated_date"#,
                TABLE_NAME
            )
            .as_str(),
        )
        .bind(Uuid::now_v7())
        .bind(user_id)
        .bind(group_id)
        .bind(now)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
