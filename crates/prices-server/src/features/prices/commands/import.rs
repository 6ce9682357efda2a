use crate::ingest::{ImportError, ImportPipeline, IngestionSummary};

/// An uploaded archive waiting to be imported
#[derive(Debug, Clone)]
pub struct ImportPricesCommand {
    pub filename: Option<String>,
    pub content: Vec<u8>,
}

impl ImportPricesCommand {
    pub fn validate(&self) -> Result<(), ImportError> {
        match self.filename.as_deref() {
            Some(name) if name.to_lowercase().ends_with(".zip") => {},
            Some(name) => {
                return Err(ImportError::Upload(format!(
                    "File must be a ZIP archive, got '{}'",
                    name
                )))
            },
            None => return Err(ImportError::Upload("Uploaded file has no file name".to_string())),
        }

        if self.content.is_empty() {
            return Err(ImportError::Upload("Uploaded file is empty".to_string()));
        }

        Ok(())
    }
}

#[tracing::instrument(skip(pipeline, command), fields(filename = ?command.filename, size = command.content.len()))]
pub async fn handle(
    pipeline: &ImportPipeline,
    command: ImportPricesCommand,
) -> Result<IngestionSummary, ImportError> {
    command.validate()?;
    pipeline.run(&command.content).await
}
