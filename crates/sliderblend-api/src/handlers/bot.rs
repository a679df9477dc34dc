//! Job submission from the Telegram bot.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use sliderblend_core::models::{CreateDocument, Job};
use sliderblend_core::AppError;
use sliderblend_storage::keys::validate_key;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

/// Telegram sends numeric ids; older bot builds send them as strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TelegramId {
    Number(i64),
    Text(String),
}

impl TelegramId {
    fn into_string(self) -> String {
        match self {
            TelegramId::Number(id) => id.to_string(),
            TelegramId::Text(id) => id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChunkRequest {
    pub user_telegram_id: TelegramId,
    /// Storage key returned by `POST /file/upload`.
    pub file_id: String,
    /// Size in bytes.
    pub size: i64,
    pub number_of_pages: i32,
}

#[derive(Debug, Serialize)]
pub struct ChunkResponse {
    pub process_id: Uuid,
}

fn validate_request(state: &AppState, request: &ChunkRequest) -> Result<(), HttpAppError> {
    validate_key(&request.file_id)?;
    state.validator.validate_extension(&request.file_id)?;

    let size = usize::try_from(request.size)
        .map_err(|_| AppError::InvalidInput("size must not be negative".to_string()))?;
    state.validator.validate_file_size(size)?;

    if request.number_of_pages < 0 {
        return Err(
            AppError::InvalidInput("number_of_pages must not be negative".to_string()).into(),
        );
    }
    Ok(())
}

/// `POST /bot/chunk`: register the document, create its job and start the pipeline.
///
/// Responds as soon as the job record exists; progress is read from `GET /process/{id}`.
pub async fn create_chunk_job(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<ChunkRequest>,
) -> Result<Json<ChunkResponse>, HttpAppError> {
    validate_request(&state, &request)?;

    let telegram_id = request.user_telegram_id.into_string();
    let user = state
        .users
        .get_by_telegram_id(&telegram_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User not found: {}", telegram_id)))?;

    if !user.can_submit_documents() {
        return Err(
            AppError::Forbidden("User account is inactive or blocked".to_string()).into(),
        );
    }

    let document = state
        .documents
        .create(CreateDocument {
            user_id: user.id,
            document_name: request.file_id.clone(),
            number_of_pages: request.number_of_pages,
            size: request.size,
        })
        .await?;

    let job = Job::for_document(document.id, request.file_id);
    if let Err(e) = state.job_store.create_job(&job).await {
        tracing::error!(
            error = %e,
            document_id = %document.id,
            "Failed to create job record; document left unembedded"
        );
        return Err(e.into());
    }

    tracing::info!(
        job_id = %job.job_id,
        document_id = %document.id,
        user_id = %user.id,
        "Job created"
    );

    let process_id = job.job_id;
    // Fire and forget: the pipeline records its own outcome in the job store.
    drop(state.pipeline.spawn(job));

    Ok(Json(ChunkResponse { process_id }))
}
