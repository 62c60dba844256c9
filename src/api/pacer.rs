use axum::{extract::State, http::StatusCode};
use serde::Serialize;
use tracing::instrument;

use crate::api::state::SharedState;

#[derive(Debug, Serialize)]
pub struct PacerStatusResponse {
    pub sends_remaining: u32,
    pub capacity: u32,
    pub next_window_ms: u64,
}

#[instrument(skip(state), level = "debug")]
pub async fn status(State(state): State<SharedState>) -> axum::Json<PacerStatusResponse> {
    let pacer = state.pacer();
    axum::Json(PacerStatusResponse {
        sends_remaining: pacer.remaining(),
        capacity: pacer.capacity(),
        next_window_ms: pacer.time_until_next_allowed().as_millis() as u64,
    })
}

#[instrument(skip(state), level = "debug")]
pub async fn reset(State(state): State<SharedState>) -> StatusCode {
    state.pacer().reset();
    StatusCode::OK
}
