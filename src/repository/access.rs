use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::model::{
    group::TABLE_NAME as GROUP_TABLE_NAME,
    group_role::TABLE_NAME as GROUP_ROLE_TABLE_NAME,
    menu::TABLE_NAME as MENU_TABLE_NAME,
    menu_role::{MenuAccess, MenuAction, TABLE_NAME as MENU_ROLE_TABLE_NAME},
};

/// Menus visible to the user: active menus where at least one of the user's
/// active groups grants `can_read`. Each flag is OR-ed over all those groups.
pub async fn get_user_menu_access(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
) -> anyhow::Result<Vec<MenuAccess>> {
    Ok(sqlx::query_as(
        format!(
            r#"SELECT m.id AS menu_id, m.menu_name, m.menu_url, m.icon, m.parent_id, m.sort_order,
            bool_or(mr.can_read) AS can_read,
            bool_or(mr.can_write) AS can_write,
            bool_or(mr.can_update) AS can_update,
            bool_or(mr.can_delete) AS can_delete
            FROM {} m
            JOIN {} mr ON mr.menu_id = m.id AND mr.is_active = true
            JOIN {} g ON g.id = mr.group_id AND g.is_active = true
            JOIN {} gr ON gr.group_id = g.id AND gr.is_active = true
            WHERE gr.user_id = $1 AND m.is_active = true
            GROUP BY m.id
            HAVING bool_or(mr.can_read)
            ORDER BY m.sort_order, m.menu_name"#,
            MENU_TABLE_NAME, MENU_ROLE_TABLE_NAME, GROUP_TABLE_NAME, GROUP_ROLE_TABLE_NAME
        )
        .as_str(),
    )
    .bind(user_id)
    .fetch_all(&mut **tx)
    .await?)
}

/// Whether the user may perform `action` on the menu at `menu_url`.
/// Any action requires the menu to be visible (`can_read`) first.
pub async fn has_menu_permission(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
    menu_url: &str,
    action: MenuAction,
) -> anyhow::Result<bool> {
    let access = get_user_menu_access(tx, user_id).await?;
    Ok(access
        .iter()
        .find(|x| x.menu_url == menu_url)
        .map(|x| x.allows(action))
        .unwrap_or(false))
}
