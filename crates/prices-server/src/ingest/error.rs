//! Import failures

use super::pipeline::ImportStage;
use thiserror::Error;

/// A failure that aborts a whole import
///
/// Row-level problems never show up here: short rows, bad CSV records and
/// rows rejected by the store are skipped inside the pipeline.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid upload: {0}")]
    Upload(String),

    #[error("Upload is not a valid zip archive: {0}")]
    ArchiveFormat(#[from] zip::result::ZipError),

    #[error("No entry ending with '{0}' found in archive")]
    EntryNotFound(String),

    #[error("Failed to begin import transaction: {0}")]
    Begin(#[source] sqlx::Error),

    #[error("Failed to prepare insert statement: {0}")]
    Prepare(#[source] sqlx::Error),

    #[error("Failed to commit import transaction: {0}")]
    Commit(#[source] sqlx::Error),

    #[error("Failed to compute import summary: {0}")]
    Aggregation(#[source] sqlx::Error),
}

impl ImportError {
    /// Stage the pipeline was in when it failed
    pub fn stage(&self) -> ImportStage {
        match self {
            ImportError::Upload(_) => ImportStage::AwaitingUpload,
            ImportError::ArchiveFormat(_) | ImportError::EntryNotFound(_) => ImportStage::Unpacking,
            ImportError::Begin(_) | ImportError::Prepare(_) => ImportStage::Inserting,
            ImportError::Commit(_) => ImportStage::Committing,
            ImportError::Aggregation(_) => ImportStage::Summarizing,
        }
    }

    /// Whether the caller sent something unusable, as opposed to a server fault
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ImportError::Upload(_) | ImportError::ArchiveFormat(_) | ImportError::EntryNotFound(_)
        )
    }
}
