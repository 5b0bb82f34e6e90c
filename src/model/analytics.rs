use chrono::NaiveDate;
use sqlx::FromRow;
use uuid::Uuid;

/// Totals over a date range of DailySales plus operational expenses.
#[derive(Clone, Debug, Default, FromRow)]
pub struct SalesSummary {
    pub total_transactions: i64,
    pub total_services: i64,
    pub total_products: i64,
    pub gross_sales: i64,
    pub net_sales: i64,
    pub total_expenses: i64,
}

impl SalesSummary {
    pub fn profit(&self) -> i64 {
        self.net_sales - self.total_expenses
    }
}

#[derive(Clone, Debug, FromRow)]
pub struct DailySalesPoint {
    pub sales_date: NaiveDate,
    pub total_transactions: i64,
    pub total_services: i64,
    pub total_products: i64,
    pub gross_sales: i64,
    pub net_sales: i64,
}

#[derive(Clone, Debug, FromRow)]
pub struct StaffPerformance {
    pub staff_id: Uuid,
    pub staff_name: String,
    pub level_name: Option<String>,
    pub commission_rate: i32,
    pub total_transactions: i64,
    pub total_services: i64,
    pub total_products: i64,
    pub gross_sales: i64,
    pub net_sales: i64,
}

impl StaffPerformance {
    /// Commission on gross sales, rounded down to whole Rupiah.
    pub fn commission(&self) -> i64 {
        self.gross_sales.saturating_mul(self.commission_rate as i64) / 100
    }
}

#[derive(Clone, Debug, FromRow)]
pub struct TopItem {
    pub item_type: String,
    pub item_id: Option<Uuid>,
    pub item_name: String,
    pub total_quantity: i64,
    pub total_sales: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profit() {
        let summary = SalesSummary {
            net_sales: 159500,
            total_expenses: 60000,
            ..Default::default()
        };
        assert_eq!(summary.profit(), 99500);
        let summary = SalesSummary {
            net_sales: 0,
            total_expenses: 1000,
            ..Default::default()
        };
        assert_eq!(summary.profit(), -1000);
    }

    #[test]
    fn test_commission() {
        let mut performance = StaffPerformance {
            staff_id: Uuid::now_v7(),
            staff_name: "Budi".to_string(),
            level_name: Some("Senior".to_string()),
            commission_rate: 15,
            total_transactions: 3,
            total_services: 3,
            total_products: 0,
            gross_sales: 75000,
            net_sales: 82500,
        };
        assert_eq!(performance.commission(), 11250);
        performance.gross_sales = 33333;
        assert_eq!(performance.commission(), 4999);
        performance.commission_rate = 0;
        assert_eq!(performance.commission(), 0);
    }
}
