use chrono::{DateTime, FixedOffset, NaiveDate};
use sqlx::{
    postgres::{PgArguments, PgRow},
    query::QueryAs,
    Postgres, Transaction,
};
use uuid::Uuid;

#[derive(Clone, Debug)]
pub enum SqlxBinds {
    String(String),
    OptionString(Option<String>),
    Int(i32),
    BigInt(i64),
    Bool(bool),
    Uuid(Uuid),
    Date(NaiveDate),
    DateTimeFixedOffset(DateTime<FixedOffset>),
}

pub fn binds_query_as<'a, T: for<'r> sqlx::FromRow<'r, PgRow>>(
    stmt: &'a str,
    binds: Vec<SqlxBinds>,
) -> QueryAs<'a, Postgres, T, PgArguments> {
    let mut q: QueryAs<'_, Postgres, T, PgArguments> = sqlx::query_as(stmt);
    for bind in binds.iter() {
        q = match bind {
            SqlxBinds::String(val) => q.bind(val.clone()),
            SqlxBinds::OptionString(val) => q.bind(val.clone()),
            SqlxBinds::Int(val) => q.bind(*val),
            SqlxBinds::BigInt(val) => q.bind(*val),
            SqlxBinds::Bool(val) => q.bind(*val),
            SqlxBinds::Uuid(val) => q.bind(*val),
            SqlxBinds::Date(val) => q.bind(*val),
            SqlxBinds::DateTimeFixedOffset(val) => q.bind(*val),
        };
    }
    q
}

/// Push `column ILIKE %search%` onto `filters` when a search term is given.
pub fn push_search_filter(
    binds: &mut Vec<SqlxBinds>,
    filters: &mut Vec<String>,
    column: &str,
    search: Option<String>,
) {
    if let Some(search) = search {
        binds.push(SqlxBinds::String(format!("%{}%", search)));
        filters.push(format!("{} ILIKE ${}", column, binds.len()));
    }
}

pub fn query_builder(
    select: Option<String>,
    table_name: &str,
    wheres: &[String],
    order_by: Vec<String>,
    limit: Option<u32>,
    offset: Option<u64>,
) -> String {
    // Select
    let mut stmt = "SELECT ".to_string();
    if let Some(val) = select {
        stmt.push_str(&val);
    } else {
        stmt.push_str(" *");
    }

    // From
    stmt.push_str(format!(" FROM {}", table_name).as_str());

    // Where
    if !wheres.is_empty() {
        stmt.push_str(" WHERE ");
        for (idx, item) in wheres.iter().enumerate() {
            stmt.push_str(&format!(" {}", item));
            if idx < wheres.len() - 1 {
                stmt.push_str(" AND");
            }
        }
    }

    // order by
    if !order_by.is_empty() {
        stmt.push_str(" ORDER BY");
        for (idx, item) in order_by.iter().enumerate() {
            stmt.push_str(format!(" {}", item).as_str());
            if idx < order_by.len() - 1 {
                stmt.push(',');
            }
        }
    }

    // Limit
    if let Some(limit) = limit {
        stmt.push_str(format!(" LIMIT {}", limit).as_str());
    }

    // Offset
    if let Some(offset) = offset {
        stmt.push_str(format!(" OFFSET {}", offset).as_str());
    }
    stmt
}

/// Largest page a paginate query returns.
pub const MAX_PAGE_SIZE: u32 = 100;

/// `(limit, offset)` for a 1-based `page`. `page_size` is capped at
/// `MAX_PAGE_SIZE`, the offset is widened so any `page` stays in range.
pub fn page_window(page: u32, page_size: u32) -> (u32, u64) {
    let limit = page_size.min(MAX_PAGE_SIZE);
    let offset = (page.max(1) as u64 - 1) * limit as u64;
    (limit, offset)
}

/// Page count for `counts` rows split into pages of `page_size`.
pub fn page_count(counts: u32, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    counts.div_ceil(page_size)
}

/// Run the page query and its count over the same filters.
/// Returns `(rows, counts, page_count)`.
pub async fn paginate<T>(
    tx: &mut Transaction<'_, Postgres>,
    table_name: &str,
    filters: &[String],
    binds: Vec<SqlxBinds>,
    order_by: Vec<String>,
    page: u32,
    page_size: u32,
) -> anyhow::Result<(Vec<T>, u32, u32)>
where
    T: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
{
    let (limit, offset) = page_window(page, page_size);
    let stmt = query_builder(
        None,
        table_name,
        filters,
        order_by,
        Some(limit),
        Some(offset),
    );
    let stmt_count = query_builder(
        Some("count(id)".to_string()),
        table_name,
        filters,
        vec![],
        None,
        None,
    );
    let data = binds_query_as::<T>(&stmt, binds.clone())
        .fetch_all(&mut **tx)
        .await?;
    let count = binds_query_as::<(i64,)>(&stmt_count, binds)
        .fetch_one(&mut **tx)
        .await?;
    Ok((data, count.0 as u32, page_count(count.0 as u32, limit)))
}

/// Deactivate one row of a table carrying the audit columns.
pub async fn soft_delete_by_id(
    tx: &mut Transaction<'_, Postgres>,
    table_name: &str,
    id: &Uuid,
    updated_by: &Uuid,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"UPDATE {}
    SET is_active = false, updated_by = $1, updated_date = $2
    WHERE id = $3"#,
            table_name
        )
        .as_str(),
    )
    .bind(updated_by)
    .bind(now)
    .bind(id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_builder() {
        let stmt = query_builder(
            None,
            "public.product",
            &["is_active = true".to_string(), "price > $1".to_string()],
            vec!["updated_date DESC".to_string(), "id".to_string()],
            Some(10),
            Some(20),
        );
        assert_eq!(
            stmt,
            "SELECT  * FROM public.product WHERE  is_active = true AND price > $1 ORDER BY updated_date DESC, id LIMIT 10 OFFSET 20"
        );
        let stmt = query_builder(
            Some("count(id)".to_string()),
            "public.product",
            &[],
            vec![],
            None,
            None,
        );
        assert_eq!(stmt, "SELECT count(id) FROM public.product");
    }

    #[test]
    fn test_push_search_filter() {
        let mut binds = vec![SqlxBinds::Bool(true)];
        let mut filters = vec!["is_active = $1".to_string()];
        push_search_filter(&mut binds, &mut filters, "product_name", None);
        assert_eq!(filters.len(), 1);
        push_search_filter(
            &mut binds,
            &mut filters,
            "product_name",
            Some("pomade".to_string()),
        );
        assert_eq!(filters[1], "product_name ILIKE $2");
        assert!(matches!(&binds[1], SqlxBinds::String(val) if val == "%pomade%"));
    }

    #[test]
    fn test_page_window() {
        assert_eq!(page_window(0, 10), (10, 0));
        assert_eq!(page_window(3, 10), (10, 20));
        assert_eq!(page_window(2, 5000), (MAX_PAGE_SIZE, MAX_PAGE_SIZE as u64));
        assert_eq!(
            page_window(u32::MAX, 10),
            (10, (u32::MAX as u64 - 1) * 10)
        );
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(5, 0), 0);
    }
}
