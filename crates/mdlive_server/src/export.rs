//! The PDF export route.

use crate::pdf::ExportError;
use crate::state::AppState;
use axum::extract::Extension;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use std::time::Duration;

/// Upper bound on one export request; reported as a failure rather than
/// left to hang on the engine's own defaults.
const EXPORT_TIMEOUT: Duration = Duration::from_secs(60);

/// `GET /pdf` - flatten the currently rendered page into a themed PDF.
pub async fn pdf_handler(Extension(state): Extension<AppState>) -> Response {
    let Some(flattener) = state.flattener.clone() else {
        return (
            StatusCode::NOT_IMPLEMENTED,
            ExportError::Unavailable.to_string(),
        )
            .into_response();
    };

    // Title and classification are read fresh at request time; the theme is
    // an atomic snapshot of the latest pipeline run.
    let (metadata, title) = match state.pipeline.read_document_facts() {
        Ok(facts) => facts,
        Err(err) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("PDF export failed: {err}"),
            )
                .into_response();
        }
    };
    let theme = state.pipeline.current_theme();
    let template = mdlive_core::print::build(&theme, metadata.sensitivity.as_deref(), &title);

    let url = format!("http://127.0.0.1:{}/", state.port);
    let flatten_task = tokio::task::spawn_blocking(move || flattener.flatten(&url, &template));

    let bytes = match tokio::time::timeout(EXPORT_TIMEOUT, flatten_task).await {
        Err(_) => {
            tracing::error!(timeout = ?EXPORT_TIMEOUT, "PDF export timed out");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("PDF export timed out after {EXPORT_TIMEOUT:?}"),
            )
                .into_response();
        }
        Ok(Err(join_err)) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("PDF export failed: {join_err}"),
            )
                .into_response();
        }
        Ok(Ok(Err(ExportError::Unavailable))) => {
            return (
                StatusCode::NOT_IMPLEMENTED,
                ExportError::Unavailable.to_string(),
            )
                .into_response();
        }
        Ok(Ok(Err(err))) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
        }
        Ok(Ok(Ok(bytes))) => bytes,
    };

    let stem = state
        .pipeline
        .file_path()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());

    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{stem}.pdf\""),
            ),
        ],
        bytes,
    )
        .into_response()
}
