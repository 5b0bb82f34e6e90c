use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.group_role";

/// Membership of a user in a group.
#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct GroupRole {
    pub id: Uuid,
    pub user_id: Uuid,
    pub group_id: Uuid,
    pub is_active: bool,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}
