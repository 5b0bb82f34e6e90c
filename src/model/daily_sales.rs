use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::{
    transaction::TransactionTotals,
    transaction_item::{ItemLine, ItemType},
};

pub const TABLE_NAME: &str = "public.daily_sales";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct DailySales {
    pub id: Uuid,
    pub sales_date: NaiveDate,
    pub staff_id: Uuid,
    pub total_transactions: i32,
    pub total_services: i32,
    pub total_products: i32,
    pub gross_sales: i64,
    pub net_sales: i64,
    pub is_active: bool,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}

/// Amount one recorded transaction adds to its staff's DailySales row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DailySalesIncrement {
    pub total_transactions: i32,
    pub total_services: i32,
    pub total_products: i32,
    pub gross_sales: i64,
    pub net_sales: i64,
}

impl DailySalesIncrement {
    /// `None` when the summed quantities do not fit the counters.
    pub fn from_transaction(items: &[ItemLine], totals: &TransactionTotals) -> Option<Self> {
        let count = |item_type: ItemType| {
            items
                .iter()
                .filter(|x| x.item_type == item_type)
                .try_fold(0i32, |acc, x| acc.checked_add(x.quantity))
        };
        Some(Self {
            total_transactions: 1,
            total_services: count(ItemType::Service)?,
            total_products: count(ItemType::Product)?,
            gross_sales: totals.subtotal,
            net_sales: totals.total_amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_increment_from_mixed_transaction() {
        let items = vec![
            ItemLine {
                item_type: ItemType::Service,
                item_id: Uuid::now_v7(),
                item_name: "Hair Cut".to_string(),
                unit_price: 25000,
                quantity: 1,
            },
            ItemLine {
                item_type: ItemType::Product,
                item_id: Uuid::now_v7(),
                item_name: "Pomade".to_string(),
                unit_price: 60000,
                quantity: 2,
            },
        ];
        let totals = TransactionTotals::compute(&items, 0).unwrap();
        let increment = DailySalesIncrement::from_transaction(&items, &totals);
        assert_eq!(
            increment,
            Some(DailySalesIncrement {
                total_transactions: 1,
                total_services: 1,
                total_products: 2,
                gross_sales: 145000,
                net_sales: 159500,
            })
        );
    }

    #[test]
    fn test_increment_quantity_overflow() {
        let line = || ItemLine {
            item_type: ItemType::Product,
            item_id: Uuid::now_v7(),
            item_name: "Sisir".to_string(),
            unit_price: 0,
            quantity: i32::MAX,
        };
        let items = vec![line(), line()];
        // free items keep the money sums in range
        let totals = TransactionTotals::compute(&items, 0).unwrap();
        assert_eq!(totals.subtotal, 0);

        let increment = DailySalesIncrement::from_transaction(&items, &totals);

        assert_eq!(increment, None);
    }
}
