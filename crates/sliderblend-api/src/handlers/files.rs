//! Document upload.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use sliderblend_core::AppError;
use std::sync::Arc;

use crate::error::HttpAppError;
use crate::state::AppState;

const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub file_key: String,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
    }
}

/// Read the single field named `file`. Returns `(filename, bytes)`.
async fn extract_multipart_file(mut multipart: Multipart) -> Result<(String, Vec<u8>), AppError> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        if file.is_some() {
            return Err(AppError::InvalidInput(
                "Multiple file fields are not allowed; send exactly one field named 'file'"
                    .to_string(),
            ));
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::InvalidInput("File field has no filename".to_string()))?;
        let data = field.bytes().await.map_err(multipart_error)?;
        file = Some((filename, data.to_vec()));
    }

    file.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))
}

/// `POST /file/upload`: validate a PDF and store it under the upload folder.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let (filename, data) = extract_multipart_file(multipart).await?;

    state.validator.validate(&filename, &data)?;

    let size = data.len();
    let file_key = state
        .storage
        .upload(
            state.config.upload_folder(),
            &filename,
            PDF_CONTENT_TYPE,
            data,
        )
        .await?;

    tracing::info!(file_key = %file_key, size, "Document uploaded");

    Ok(Json(UploadResponse {
        message: "File uploaded successfully",
        file_key,
    }))
}
