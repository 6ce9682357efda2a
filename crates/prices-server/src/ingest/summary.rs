//! Post-commit statistics over the `prices` table

use bigdecimal::BigDecimal;
use sqlx::PgPool;
use tracing::debug;

use super::error::ImportError;
use super::models::IngestionSummary;

pub const COUNT_CATEGORIES_SQL: &str = "SELECT COUNT(DISTINCT category) FROM prices";

/// An empty table sums to 0, not NULL
pub const SUM_PRICES_SQL: &str = "SELECT COALESCE(SUM(price), 0) FROM prices";

/// Read the table-wide statistics and pair them with `inserted`
///
/// Runs outside the import transaction, after commit: a failure here does
/// not undo the rows already stored.
pub async fn summarize(pool: &PgPool, inserted: u64) -> Result<IngestionSummary, ImportError> {
    let total_categories: i64 = sqlx::query_scalar(COUNT_CATEGORIES_SQL)
        .fetch_one(pool)
        .await
        .map_err(ImportError::Aggregation)?;

    let total_price: BigDecimal = sqlx::query_scalar(SUM_PRICES_SQL)
        .fetch_one(pool)
        .await
        .map_err(ImportError::Aggregation)?;

    debug!(total_categories, total_price = %total_price, "Computed price summary");

    Ok(IngestionSummary {
        total_items: inserted,
        total_categories,
        total_price,
    })
}
