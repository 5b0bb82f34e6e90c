use chrono::{DateTime, FixedOffset};
use poem_openapi::Enum;
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.menu_role";

/// Grant of a menu to a group.
#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct MenuRole {
    pub id: Uuid,
    pub menu_id: Uuid,
    pub group_id: Uuid,
    pub can_read: bool,
    pub can_write: bool,
    pub can_update: bool,
    pub can_delete: bool,
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Enum)]
#[oai(rename_all = "lowercase")]
pub enum MenuAction {
    Read,
    Write,
    Update,
    Delete,
}

impl MenuAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            MenuAction::Read => "read",
            MenuAction::Write => "write",
            MenuAction::Update => "update",
            MenuAction::Delete => "delete",
        }
    }
}

/// A visible menu with the capabilities unioned over all of a user's groups.
#[derive(Clone, Debug, FromRow)]
pub struct MenuAccess {
    pub menu_id: Uuid,
    pub menu_name: String,
    pub menu_url: String,
    pub icon: Option<String>,
    pub parent_id: Option<Uuid>,
    pub sort_order: i32,
    pub can_read: bool,
    pub can_write: bool,
    pub can_update: bool,
    pub can_delete: bool,
}

impl MenuAccess {
    pub fn allows(&self, action: MenuAction) -> bool {
        match action {
            MenuAction::Read => self.can_read,
            MenuAction::Write => self.can_write,
            MenuAction::Update => self.can_update,
            MenuAction::Delete => self.can_delete,
        }
    }
}
