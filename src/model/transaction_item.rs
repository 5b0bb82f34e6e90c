use chrono::{DateTime, FixedOffset};
use poem_openapi::Enum;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.transaction_item";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Enum, Deserialize, Serialize)]
#[oai(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Service,
    Product,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Service => "service",
            ItemType::Product => "product",
        }
    }
}

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct TransactionItem {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub item_type: String,
    pub service_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub item_name: String,
    pub unit_price: i64,
    pub quantity: i32,
    pub total_price: i64,
    pub created_date: Option<DateTime<FixedOffset>>,
}

/// Priced line of a transaction before it is persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemLine {
    pub item_type: ItemType,
    pub item_id: Uuid,
    pub item_name: String,
    pub unit_price: i64,
    pub quantity: i32,
}

impl ItemLine {
    pub fn total_price(&self) -> Option<i64> {
        self.unit_price.checked_mul(self.quantity as i64)
    }
}
