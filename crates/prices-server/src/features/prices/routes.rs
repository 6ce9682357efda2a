use crate::api::response::ErrorResponse;
use crate::ingest::{ImportError, ImportPipeline};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};

use super::{
    commands::ImportPricesCommand,
    queries::{export::EXPORT_FILENAME, ExportPricesError},
};

pub fn prices_routes() -> Router<ImportPipeline> {
    Router::new().route("/", post(import_prices).get(export_prices))
}

#[tracing::instrument(skip(pipeline, multipart))]
async fn import_prices(
    State(pipeline): State<ImportPipeline>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, PriceApiError> {
    let mut multipart = multipart.map_err(|e| {
        ImportError::Upload(format!("Expected multipart/form-data: {}", e.body_text()))
    })?;

    let mut command: Option<ImportPricesCommand> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PriceApiError::from_multipart(e.status(), e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().map(|s| s.to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| PriceApiError::from_multipart(e.status(), e.body_text()))?;

        command = Some(ImportPricesCommand {
            filename,
            content: data.to_vec(),
        });
        break;
    }

    let command = command
        .ok_or_else(|| ImportError::Upload("No file field found in multipart data".to_string()))?;

    let summary = super::commands::import::handle(&pipeline, command).await?;

    tracing::info!(
        total_items = summary.total_items,
        total_categories = summary.total_categories,
        total_price = %summary.total_price,
        "Prices imported via API"
    );

    Ok((StatusCode::OK, Json(summary)).into_response())
}

#[tracing::instrument(skip(pipeline))]
async fn export_prices(State(pipeline): State<ImportPipeline>) -> Result<Response, PriceApiError> {
    let response = super::queries::export::handle(pipeline.pool()).await?;

    tracing::debug!(rows = response.rows, size = response.archive.len(), "Prices exported via API");

    let disposition = format!("attachment; filename=\"{}\"", EXPORT_FILENAME);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        response.archive,
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
enum PriceApiError {
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Export(#[from] ExportPricesError),
    #[error("Upload exceeds the configured size limit")]
    TooLarge,
}

impl PriceApiError {
    fn from_multipart(status: StatusCode, message: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            Self::TooLarge
        } else {
            Self::Import(ImportError::Upload(format!(
                "Failed to read multipart field: {}",
                message
            )))
        }
    }
}

impl IntoResponse for PriceApiError {
    fn into_response(self) -> Response {
        match self {
            PriceApiError::Import(err) if err.is_client_error() => {
                let code = match err {
                    ImportError::ArchiveFormat(_) => "INVALID_ARCHIVE",
                    ImportError::EntryNotFound(_) => "ENTRY_NOT_FOUND",
                    _ => "INVALID_UPLOAD",
                };
                tracing::warn!(stage = %err.stage(), "Rejected price upload: {}", err);
                ErrorResponse::new(code, err.to_string()).with_status(StatusCode::BAD_REQUEST)
            },
            PriceApiError::Import(err) => {
                tracing::error!(stage = %err.stage(), "Price import failed: {}", err);
                ErrorResponse::new("INTERNAL_ERROR", "Internal Server Error")
                    .with_status(StatusCode::INTERNAL_SERVER_ERROR)
            },
            PriceApiError::Export(err) => {
                tracing::error!("Price export failed: {}", err);
                ErrorResponse::new("INTERNAL_ERROR", "Internal Server Error")
                    .with_status(StatusCode::INTERNAL_SERVER_ERROR)
            },
            PriceApiError::TooLarge => {
                ErrorResponse::new("PAYLOAD_TOO_LARGE", self.to_string())
                    .with_status(StatusCode::PAYLOAD_TOO_LARGE)
            },
        }
    }
}
