use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.staff_level";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct StaffLevel {
    pub id: Uuid,
    pub level_name: String,
    pub description: Option<String>,
    /// percent of gross sales paid as commission
    pub commission_rate: i32,
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}
