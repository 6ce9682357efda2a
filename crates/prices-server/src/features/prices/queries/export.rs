use sqlx::PgPool;

use crate::ingest::{archive, export, StoredPrice};

/// Name of the single entry in an exported archive
pub const EXPORT_ENTRY_NAME: &str = "data.csv";

/// File name offered to the client
pub const EXPORT_FILENAME: &str = "prices.zip";

const SELECT_PRICES_SQL: &str = r#"
    SELECT id, product_id, name, category, price, create_date
    FROM prices
    ORDER BY id ASC
"#;

#[derive(Debug, Clone)]
pub struct ExportPricesResponse {
    pub archive: Vec<u8>,
    pub rows: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportPricesError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

/// Dump the whole `prices` table as a zipped CSV
#[tracing::instrument(skip(pool))]
pub async fn handle(pool: &PgPool) -> Result<ExportPricesResponse, ExportPricesError> {
    let prices: Vec<StoredPrice> = sqlx::query_as(SELECT_PRICES_SQL).fetch_all(pool).await?;

    let csv = export::render_csv(&prices)?;
    let archive = archive::pack(EXPORT_ENTRY_NAME, &csv)?;

    tracing::debug!(rows = prices.len(), size = archive.len(), "Exported prices");

    Ok(ExportPricesResponse {
        archive,
        rows: prices.len(),
    })
}
