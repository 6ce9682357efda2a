//! Atomic batch insert of parsed price records
//!
//! The whole batch runs in one transaction and becomes visible at commit or
//! not at all. Every row gets its own savepoint: a row the store rejects is
//! rolled back alone and the transaction carries on with the next record.

use sqlx::{postgres::PgStatement, Connection, Executor, PgConnection, PgPool, Statement};
use tracing::{debug, info, warn};

use super::error::ImportError;
use super::models::PriceRecord;

/// Parameterized insert, prepared once per batch
///
/// Explicit casts pin the parameter types to the Rust types bound below, so
/// an out-of-range product id is rejected by the store for that row only.
pub const INSERT_PRICE_SQL: &str = r#"
    INSERT INTO prices (product_id, name, category, price, create_date)
    VALUES ($1::BIGINT, $2::TEXT, $3::TEXT, $4::NUMERIC, $5::DATE)
"#;

/// Insert `records` in one transaction, returning how many rows were stored
///
/// Records are consumed lazily, in order, only after the transaction is open
/// and the insert statement prepared.
///
/// # Errors
///
/// - [`ImportError::Begin`] / [`ImportError::Prepare`] before any record is read
/// - [`ImportError::Commit`] when the commit fails; nothing from the batch persists
pub async fn insert_batch<I>(pool: &PgPool, records: I) -> Result<u64, ImportError>
where
    I: IntoIterator<Item = PriceRecord>,
{
    let mut tx = pool.begin().await.map_err(ImportError::Begin)?;

    let statement = match (&mut *tx).prepare(INSERT_PRICE_SQL).await {
        Ok(statement) => statement,
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback after failed prepare also failed");
            }
            return Err(ImportError::Prepare(e));
        },
    };

    let mut inserted = 0u64;
    let mut rejected = 0u64;

    for (ordinal, record) in records.into_iter().enumerate() {
        match insert_record(&mut tx, &statement, &record).await {
            Ok(()) => inserted += 1,
            Err(e) => {
                rejected += 1;
                warn!(
                    record = ordinal + 1,
                    product_id = record.product_id,
                    error = %e,
                    "Store rejected price record, skipping"
                );
            },
        }
    }

    debug!(inserted, rejected, "Committing price batch");
    tx.commit().await.map_err(ImportError::Commit)?;

    info!(inserted, rejected, "Price batch committed");
    Ok(inserted)
}

async fn insert_record(
    conn: &mut PgConnection,
    statement: &PgStatement<'_>,
    record: &PriceRecord,
) -> Result<(), sqlx::Error> {
    let mut savepoint = conn.begin().await?;

    let result = statement
        .query()
        .bind(record.product_id)
        .bind(&record.name)
        .bind(&record.category)
        .bind(&record.price)
        .bind(record.create_date)
        .execute(&mut *savepoint)
        .await;

    match result {
        Ok(_) => savepoint.commit().await,
        Err(e) => {
            savepoint.rollback().await?;
            Err(e)
        },
    }
}
