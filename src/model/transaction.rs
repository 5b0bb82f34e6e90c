use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::utils::business_date;

use super::transaction_item::{ItemLine, ItemType};

pub const TABLE_NAME: &str = "public.transaction";

/// Tax charged on the subtotal, in percent.
pub const TAX_RATE_PERCENT: i64 = 10;

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub transaction_number: String,
    pub staff_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub transaction_type: String,
    pub subtotal: i64,
    pub tax_amount: i64,
    pub discount_amount: i64,
    pub total_amount: i64,
    pub payment_method: String,
    pub notes: Option<String>,
    pub transaction_date: DateTime<FixedOffset>,
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionType {
    Service,
    Product,
    Mixed,
}

impl TransactionType {
    /// `None` for an empty item list.
    pub fn classify(items: &[ItemLine]) -> Option<Self> {
        let first = items.first()?.item_type;
        if items.iter().all(|x| x.item_type == first) {
            return Some(match first {
                ItemType::Service => TransactionType::Service,
                ItemType::Product => TransactionType::Product,
            });
        }
        Some(TransactionType::Mixed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Service => "service",
            TransactionType::Product => "product",
            TransactionType::Mixed => "mixed",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransactionTotals {
    pub subtotal: i64,
    pub tax_amount: i64,
    pub discount_amount: i64,
    pub total_amount: i64,
}

impl TransactionTotals {
    /// `None` when an amount overflows.
    pub fn compute(items: &[ItemLine], discount_amount: i64) -> Option<Self> {
        let mut subtotal: i64 = 0;
        for item in items {
            subtotal = subtotal.checked_add(item.total_price()?)?;
        }
        let tax_amount = tax_for(subtotal)?;
        let total_amount = subtotal
            .checked_add(tax_amount)?
            .checked_sub(discount_amount)?;
        Some(Self {
            subtotal,
            tax_amount,
            discount_amount,
            total_amount,
        })
    }
}

/// Tax on `subtotal`, rounded half-up to whole Rupiah.
pub fn tax_for(subtotal: i64) -> Option<i64> {
    Some(subtotal.checked_mul(TAX_RATE_PERCENT)?.checked_add(50)? / 100)
}

/// `TRX` + business date + trailing six digits of the millisecond timestamp.
pub fn generate_transaction_number(now: &DateTime<FixedOffset>) -> String {
    format!(
        "TRX{}{:06}",
        business_date(now).format("%Y%m%d"),
        now.timestamp_millis().rem_euclid(1_000_000)
    )
}
