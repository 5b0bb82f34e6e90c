use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.operasional";

/// Operating expense.
#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct Operasional {
    pub id: Uuid,
    pub description: String,
    pub category: Option<String>,
    pub amount: i64,
    pub expense_date: NaiveDate,
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}
