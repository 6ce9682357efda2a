//! Import orchestration
//!
//! ```text
//! AwaitingUpload -> Unpacking -> Inserting -> Committing -> Summarizing -> Done
//! ```
//!
//! Any stage may fail; [`ImportError::stage`] says which one did. Skipped
//! rows never fail the import, they only lower `total_items`.

use std::fmt;

use sqlx::PgPool;
use tracing::{debug, info, instrument};

use super::archive;
use super::error::ImportError;
use super::models::IngestionSummary;
use super::parser::PriceRecordParser;
use super::summary;
use super::transaction;
use crate::config::ImportConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStage {
    AwaitingUpload,
    Unpacking,
    Inserting,
    Committing,
    Summarizing,
    Done,
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportStage::AwaitingUpload => "awaiting_upload",
            ImportStage::Unpacking => "unpacking",
            ImportStage::Inserting => "inserting",
            ImportStage::Committing => "committing",
            ImportStage::Summarizing => "summarizing",
            ImportStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Runs one archive through unpack, parse, insert, commit and summarize
#[derive(Clone)]
pub struct ImportPipeline {
    pool: PgPool,
    config: ImportConfig,
}

impl ImportPipeline {
    pub fn new(pool: PgPool, config: ImportConfig) -> Self {
        Self { pool, config }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Import the price file inside `archive_bytes`
    #[instrument(skip(self, archive_bytes), fields(archive_size = archive_bytes.len()))]
    pub async fn run(&self, archive_bytes: &[u8]) -> Result<IngestionSummary, ImportError> {
        debug!(stage = %ImportStage::Unpacking, "Import stage");
        let entry = archive::unpack(archive_bytes, &self.config.entry_suffix)?;
        info!(entry = %entry.name, size = entry.contents.len(), "Importing price file");

        debug!(stage = %ImportStage::Inserting, "Import stage");
        let records = PriceRecordParser::new(&entry.contents);
        let inserted = transaction::insert_batch(&self.pool, records).await?;

        debug!(stage = %ImportStage::Summarizing, inserted, "Import stage");
        let summary = summary::summarize(&self.pool, inserted).await?;

        debug!(stage = %ImportStage::Done, "Import stage");
        Ok(summary)
    }
}
