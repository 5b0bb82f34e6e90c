use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.service";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct Service {
    pub id: Uuid,
    pub service_name: String,
    pub description: Option<String>,
    pub price: i64,
    pub duration_minutes: i32,
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}
