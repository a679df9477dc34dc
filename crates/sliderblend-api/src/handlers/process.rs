//! Job progress lookup.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use sliderblend_core::models::{Job, ProcessState, DATE_PUBLISHED_FORMAT};
use sliderblend_core::AppError;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProcessStatusResponse {
    pub process_id: Uuid,
    pub process_state: ProcessState,
    pub is_complete: bool,
    pub date_published: String,
}

impl From<Job> for ProcessStatusResponse {
    fn from(job: Job) -> Self {
        Self {
            process_id: job.job_id,
            process_state: job.process_state,
            is_complete: job.is_complete,
            date_published: job.date_published.format(DATE_PUBLISHED_FORMAT).to_string(),
        }
    }
}

/// `GET /process/{id}`. Expired jobs are indistinguishable from unknown ones.
pub async fn get_process_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProcessStatusResponse>, HttpAppError> {
    let job_id = Uuid::parse_str(&id)
        .map_err(|_| AppError::BadRequest(format!("Invalid process id: {}", id)))?;

    let job = state.job_store.get_job(job_id).await?;

    Ok(Json(job.into()))
}
