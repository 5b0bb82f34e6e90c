use chrono::{NaiveDate, Utc};
use sqlx::{Pool, Postgres, Transaction};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::{
    core::{
        db::set_statement_timeout,
        sqlx_utils::{binds_query_as, paginate, query_builder, SqlxBinds},
        utils::{business_date, start_of_business_day},
    },
    model::{
        daily_sales::{DailySales, DailySalesIncrement},
        transaction::{
            generate_transaction_number, Transaction as SalesTransaction, TransactionTotals,
            TransactionType, TABLE_NAME,
        },
        transaction_item::{
            ItemLine, ItemType, TransactionItem, TABLE_NAME as ITEM_TABLE_NAME,
        },
        user::User,
    },
    repository::{
        customer::get_customer_by_id, daily_sales::increment_daily_sales,
        product::get_product_by_id, service::get_service_by_id, staff::get_staff_by_id,
    },
    settings::Config,
};

/// Unique constraint postgres generates for `transaction.transaction_number`.
const TRANSACTION_NUMBER_CONSTRAINT: &str = "transaction_transaction_number_key";

#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("transaction has no items")]
    EmptyItems,

    #[error("item {0} quantity must be greater than zero")]
    InvalidQuantity(usize),

    #[error("item {0} unit price must not be negative")]
    InvalidUnitPrice(usize),

    #[error("payment method is required")]
    MissingPaymentMethod,

    #[error("transaction amount overflow")]
    AmountOverflow,

    #[error("staff not found: {0}")]
    StaffNotFound(Uuid),

    #[error("customer not found: {0}")]
    CustomerNotFound(Uuid),

    #[error("service not found: {0}")]
    ServiceNotFound(Uuid),

    #[error("product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("transaction not recorded after {0} attempts")]
    RetriesExhausted(u32),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Other(anyhow::Error),
}

impl From<anyhow::Error> for TransactionError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<sqlx::Error>() {
            Ok(err) => TransactionError::Database(err),
            Err(err) => TransactionError::Other(err),
        }
    }
}

impl TransactionError {
    /// Rejected request payload.
    pub fn is_invalid(&self) -> bool {
        matches!(
            self,
            TransactionError::EmptyItems
                | TransactionError::InvalidQuantity(_)
                | TransactionError::InvalidUnitPrice(_)
                | TransactionError::MissingPaymentMethod
                | TransactionError::AmountOverflow
        )
    }

    /// Reference to a missing or inactive row.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TransactionError::StaffNotFound(_)
                | TransactionError::CustomerNotFound(_)
                | TransactionError::ServiceNotFound(_)
                | TransactionError::ProductNotFound(_)
        )
    }

    /// Whether a fresh attempt of the whole transaction may succeed.
    pub fn is_retryable(&self) -> bool {
        let TransactionError::Database(sqlx::Error::Database(db_err)) = self else {
            return false;
        };
        match db_err.code().as_deref() {
            // serialization_failure, deadlock_detected
            Some("40001") | Some("40P01") => true,
            // unique_violation
            Some("23505") => db_err.constraint() == Some(TRANSACTION_NUMBER_CONSTRAINT),
            _ => false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NewTransactionItem {
    pub item_type: ItemType,
    pub item_id: Uuid,
    pub unit_price: i64,
    pub quantity: i32,
}

#[derive(Clone, Debug)]
pub struct NewTransaction {
    pub staff_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub payment_method: String,
    pub notes: Option<String>,
    pub items: Vec<NewTransactionItem>,
}

impl NewTransaction {
    pub fn validate(&self) -> Result<(), TransactionError> {
        if self.items.is_empty() {
            return Err(TransactionError::EmptyItems);
        }
        if self.payment_method.trim().is_empty() {
            return Err(TransactionError::MissingPaymentMethod);
        }
        for (idx, item) in self.items.iter().enumerate() {
            if item.quantity <= 0 {
                return Err(TransactionError::InvalidQuantity(idx));
            }
            if item.unit_price < 0 {
                return Err(TransactionError::InvalidUnitPrice(idx));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct RecordedTransaction {
    pub transaction: SalesTransaction,
    pub items: Vec<TransactionItem>,
    pub daily_sales: DailySales,
}

/// Persist a transaction, its items and the staff's daily sales increment in a
/// single database transaction. Retryable failures restart the whole unit of
/// work, at most `config.transaction_max_retries` attempts.
pub async fn record_transaction(
    pool: &Pool<Postgres>,
    config: &Config,
    request_user: &User,
    new_transaction: &NewTransaction,
) -> Result<RecordedTransaction, TransactionError> {
    new_transaction.validate()?;
    let max_attempts = config.transaction_max_retries.max(1);
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match try_record_transaction(pool, config, request_user, new_transaction).await {
            Ok(recorded) => return Ok(recorded),
            Err(err) if err.is_retryable() => {
                if attempt >= max_attempts {
                    warn!("record transaction gave up after {} attempts: {}", attempt, err);
                    return Err(TransactionError::RetriesExhausted(attempt));
                }
                warn!("record transaction attempt {} failed, retrying: {}", attempt, err);
            }
            Err(err) => return Err(err),
        }
    }
}

async fn try_record_transaction(
    pool: &Pool<Postgres>,
    config: &Config,
    request_user: &User,
    new_transaction: &NewTransaction,
) -> Result<RecordedTransaction, TransactionError> {
    let mut tx = pool.begin().await?;
    set_statement_timeout(&mut tx, config.db_statement_timeout).await?;

    let staff = get_staff_by_id(&mut tx, &new_transaction.staff_id)
        .await?
        .ok_or(TransactionError::StaffNotFound(new_transaction.staff_id))?;
    if let Some(customer_id) = new_transaction.customer_id {
        get_customer_by_id(&mut tx, &customer_id)
            .await?
            .ok_or(TransactionError::CustomerNotFound(customer_id))?;
    }

    let mut lines: Vec<ItemLine> = vec![];
    for item in new_transaction.items.iter() {
        let item_name = match item.item_type {
            ItemType::Service => {
                get_service_by_id(&mut tx, &item.item_id)
                    .await?
                    .ok_or(TransactionError::ServiceNotFound(item.item_id))?
                    .service_name
            }
            ItemType::Product => {
                get_product_by_id(&mut tx, &item.item_id)
                    .await?
                    .ok_or(TransactionError::ProductNotFound(item.item_id))?
                    .product_name
            }
        };
        lines.push(ItemLine {
            item_type: item.item_type,
            item_id: item.item_id,
            item_name,
            unit_price: item.unit_price,
            quantity: item.quantity,
        });
    }

    let transaction_type =
        TransactionType::classify(&lines).ok_or(TransactionError::EmptyItems)?;
    let totals = TransactionTotals::compute(&lines, 0).ok_or(TransactionError::AmountOverflow)?;
    let increment = DailySalesIncrement::from_transaction(&lines, &totals)
        .ok_or(TransactionError::AmountOverflow)?;

    let now = Utc::now().fixed_offset();
    let transaction = SalesTransaction {
        id: Uuid::now_v7(),
        transaction_number: generate_transaction_number(&now),
        staff_id: staff.id,
        customer_id: new_transaction.customer_id,
        transaction_type: transaction_type.as_str().to_string(),
        subtotal: totals.subtotal,
        tax_amount: totals.tax_amount,
        discount_amount: totals.discount_amount,
        total_amount: totals.total_amount,
        payment_method: new_transaction.payment_method.trim().to_string(),
        notes: new_transaction.notes.clone(),
        transaction_date: now,
        is_active: true,
        created_by: Some(request_user.id),
        updated_by: Some(request_user.id),
        created_date: Some(now),
        updated_date: Some(now),
    };
    create_transaction(&mut tx, &transaction).await?;

    let mut items: Vec<TransactionItem> = vec![];
    for line in lines.iter() {
        let item = TransactionItem {
            id: Uuid::now_v7(),
            transaction_id: transaction.id,
            item_type: line.item_type.as_str().to_string(),
            service_id: (line.item_type == ItemType::Service).then_some(line.item_id),
            product_id: (line.item_type == ItemType::Product).then_some(line.item_id),
            item_name: line.item_name.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            total_price: line.total_price().ok_or(TransactionError::AmountOverflow)?,
            created_date: Some(now),
        };
        create_transaction_item(&mut tx, &item).await?;
        items.push(item);
    }

    let daily_sales =
        increment_daily_sales(&mut tx, &business_date(&now), &staff.id, &increment, &now)
            .await?;

    tx.commit().await?;
    Ok(RecordedTransaction {
        transaction,
        items,
        daily_sales,
    })
}

async fn create_transaction(
    tx: &mut Transaction<'_, Postgres>,
    transaction: &SalesTransaction,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        format!(
            r#"INSERT INTO {} (id, transaction_number, staff_id, customer_id, transaction_type,
            subtotal, tax_amount, discount_amount, total_amount, payment_method, notes,
            transaction_date, is_active, created_by, updated_by, created_date, updated_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(transaction.id)
    .bind(&transaction.transaction_number)
    .bind(transaction.staff_id)
    .bind(transaction.customer_id)
    .bind(&transaction.transaction_type)
    .bind(transaction.subtotal)
    .bind(transaction.tax_amount)
    .bind(transaction.discount_amount)
    .bind(transaction.total_amount)
    .bind(&transaction.payment_method)
    .bind(&transaction.notes)
    .bind(transaction.transaction_date)
    .bind(transaction.is_active)
    .bind(transaction.created_by)
    .bind(transaction.updated_by)
    .bind(transaction.created_date)
    .bind(transaction.updated_date)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn create_transaction_item(
    tx: &mut Transaction<'_, Postgres>,
    item: &TransactionItem,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        format!(
            r#"INSERT INTO {} (id, transaction_id, item_type, service_id, product_id, item_name,
            unit_price, quantity, total_price, created_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"#,
            ITEM_TABLE_NAME
        )
        .as_str(),
    )
    .bind(item.id)
    .bind(item.transaction_id)
    .bind(&item.item_type)
    .bind(item.service_id)
    .bind(item.product_id)
    .bind(&item.item_name)
    .bind(item.unit_price)
    .bind(item.quantity)
    .bind(item.total_price)
    .bind(item.created_date)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn paginate_transaction(
    tx: &mut Transaction<'_, Postgres>,
    page: u32,
    page_size: u32,
    search: Option<String>,
    staff_id: Option<Uuid>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> anyhow::Result<(Vec<SalesTransaction>, u32, u32)> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec!["is_active = true".to_string()];
    if let Some(search) = search {
        binds.push(SqlxBinds::String(format!("%{}%", search)));
        filters.push(format!("transaction_number ILIKE ${}", binds.len()));
    }
    if let Some(staff_id) = staff_id {
        binds.push(SqlxBinds::Uuid(staff_id));
        filters.push(format!("staff_id = ${}", binds.len()));
    }
    if let Some(start) = start_date.and_then(start_of_business_day) {
        binds.push(SqlxBinds::DateTimeFixedOffset(start));
        filters.push(format!("transaction_date >= ${}", binds.len()));
    }
    if let Some(end) = end_date
        .and_then(|x| x.succ_opt())
        .and_then(start_of_business_day)
    {
        binds.push(SqlxBinds::DateTimeFixedOffset(end));
        filters.push(format!("transaction_date < ${}", binds.len()));
    }
    paginate(
        tx,
        TABLE_NAME,
        &filters,
        binds,
        vec!["transaction_date DESC".to_string()],
        page,
        page_size,
    )
    .await
}

pub async fn get_transaction_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<SalesTransaction>> {
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &["id = $1".to_string(), "is_active = true".to_string()],
        vec![],
        None,
        None,
    );
    Ok(
        binds_query_as::<SalesTransaction>(&stmt, vec![SqlxBinds::Uuid(*id)])
            .fetch_optional(&mut **tx)
            .await?,
    )
}

pub async fn get_items_by_transaction(
    tx: &mut Transaction<'_, Postgres>,
    transaction_id: &Uuid,
) -> anyhow::Result<Vec<TransactionItem>> {
    let stmt = query_builder(
        None,
        ITEM_TABLE_NAME,
        &["transaction_id = $1".to_string()],
        vec!["created_date ASC".to_string(), "id ASC".to_string()],
        None,
        None,
    );
    Ok(
        binds_query_as::<TransactionItem>(&stmt, vec![SqlxBinds::Uuid(*transaction_id)])
            .fetch_all(&mut **tx)
            .await?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_transaction(items: Vec<NewTransactionItem>) -> NewTransaction {
        NewTransaction {
            staff_id: Uuid::now_v7(),
            customer_id: None,
            payment_method: "cash".to_string(),
            notes: None,
            items,
        }
    }

    fn item(unit_price: i64, quantity: i32) -> NewTransactionItem {
        NewTransactionItem {
            item_type: ItemType::Service,
            item_id: Uuid::now_v7(),
            unit_price,
            quantity,
        }
    }

    #[test]
    fn test_validate_new_transaction() {
        assert!(new_transaction(vec![item(25000, 1)]).validate().is_ok());
        assert!(matches!(
            new_transaction(vec![]).validate(),
            Err(TransactionError::EmptyItems)
        ));
        assert!(matches!(
            new_transaction(vec![item(25000, 1), item(25000, 0)]).validate(),
            Err(TransactionError::InvalidQuantity(1))
        ));
        assert!(matches!(
            new_transaction(vec![item(-1, 1)]).validate(),
            Err(TransactionError::InvalidUnitPrice(0))
        ));
        let mut no_payment = new_transaction(vec![item(25000, 1)]);
        no_payment.payment_method = "  ".to_string();
        assert!(matches!(
            no_payment.validate(),
            Err(TransactionError::MissingPaymentMethod)
        ));
    }

    #[test]
    fn test_error_classes() {
        assert!(TransactionError::EmptyItems.is_invalid());
        assert!(!TransactionError::EmptyItems.is_not_found());
        assert!(TransactionError::StaffNotFound(Uuid::now_v7()).is_not_found());
        assert!(!TransactionError::RetriesExhausted(3).is_invalid());
        assert!(!TransactionError::Database(sqlx::Error::RowNotFound).is_retryable());
        assert!(!TransactionError::Other(anyhow::anyhow!("boom")).is_retryable());
    }

    #[test]
    fn test_anyhow_sqlx_error_is_unwrapped() {
        let err: TransactionError = anyhow::Error::from(sqlx::Error::RowNotFound).into();
        assert!(matches!(err, TransactionError::Database(_)));
        let err: TransactionError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, TransactionError::Other(_)));
    }
}
