use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::api::state::SharedState;
use crate::dispatch::{JobResult, ProgressSnapshot};
use crate::error::Result;

#[derive(Debug, Deserialize)]
pub struct CreateBroadcastRequest {
    pub group: String,
    pub message: String,
    #[serde(default)]
    pub anonymous: bool,
    #[serde(default)]
    pub sender: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateBroadcastResponse {
    pub job_id: u64,
    pub total: u32,
    pub state: String,
}

#[derive(Debug, Serialize)]
pub struct BroadcastStatusResponse {
    pub job_id: u64,
    pub state: String,
    pub progress: ProgressSnapshot,
    pub result: Option<JobResult>,
}

#[instrument(skip(state, payload), level = "debug")]
pub async fn create(
    State(state): State<SharedState>,
    axum::Json(payload): axum::Json<CreateBroadcastRequest>,
) -> Result<axum::Json<CreateBroadcastResponse>> {
    let entry = state
        .start_broadcast(
            &payload.group,
            payload.message,
            payload.anonymous,
            payload.sender,
        )
        .await?;
    Ok(axum::Json(CreateBroadcastResponse {
        job_id: entry.id,
        total: entry.total,
        state: entry.state_label(),
    }))
}

#[instrument(skip(state), level = "debug")]
pub async fn show(
    Path(job_id): Path<u64>,
    State(state): State<SharedState>,
) -> Result<axum::Json<BroadcastStatusResponse>> {
    let entry = state.get_job(job_id)?;
    let result = entry.result();
    let progress = match &result {
        Some(result) => ProgressSnapshot {
            success: result.success,
            fail: result.fail,
            pending: result.pending,
            total: result.total,
        },
        None => entry.progress.latest(),
    };
    Ok(axum::Json(BroadcastStatusResponse {
        job_id: entry.id,
        state: entry.state_label(),
        progress,
        result,
    }))
}

#[instrument(skip(state), level = "debug")]
pub async fn confirm(
    Path(job_id): Path<u64>,
    State(state): State<SharedState>,
) -> Result<StatusCode> {
    state.get_job(job_id)?.confirm()?;
    Ok(StatusCode::ACCEPTED)
}

#[instrument(skip(state), level = "debug")]
pub async fn decline(
    Path(job_id): Path<u64>,
    State(state): State<SharedState>,
) -> Result<StatusCode> {
    state.get_job(job_id)?.decline()?;
    Ok(StatusCode::ACCEPTED)
}

#[instrument(skip(state), level = "debug")]
pub async fn cancel(
    Path(job_id): Path<u64>,
    State(state): State<SharedState>,
) -> Result<StatusCode> {
    state.get_job(job_id)?.cancel();
    Ok(StatusCode::ACCEPTED)
}

#[instrument(skip(state), level = "debug")]
pub async fn cancel_all(State(state): State<SharedState>) -> StatusCode {
    state.cancel_all();
    StatusCode::ACCEPTED
}
