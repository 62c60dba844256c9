mod base;
mod broadcasts;
mod pacer;

use std::borrow::Cow;

use axum::{
    error_handling::HandleErrorLayer, http::StatusCode, response::IntoResponse, routing, Router,
};
use tokio::time::Duration;
use tower::{BoxError, ServiceBuilder};
use tower_http::trace::TraceLayer;

pub mod paths;
pub mod state;

use state::SharedState;

/// Build the dispatch-service API over shared application state
pub fn api(app_state: SharedState) -> Router {
    Router::new()
        .route(paths::base::ROOT, routing::get(base::root))
        .route(paths::base::HEALTH, routing::get(base::health))
        .route(paths::base::ABOUT, routing::get(base::about))
        // Broadcast lifecycle
        .route(
            paths::broadcasts::COLLECTION,
            routing::post(broadcasts::create),
        )
        .route(paths::broadcasts::ITEM, routing::get(broadcasts::show))
        .route(
            paths::broadcasts::CONFIRM,
            routing::post(broadcasts::confirm),
        )
        .route(
            paths::broadcasts::DECLINE,
            routing::post(broadcasts::decline),
        )
        .route(paths::broadcasts::CANCEL, routing::post(broadcasts::cancel))
        .route(
            paths::broadcasts::CANCEL_ALL,
            routing::post(broadcasts::cancel_all),
        )
        // Pacer observation and maintenance
        .route(paths::pacer::STATUS, routing::get(pacer::status))
        .route(paths::pacer::RESET, routing::post(pacer::reset))
        .layer(
            ServiceBuilder::new()
                // Handle errors from middleware
                .layer(HandleErrorLayer::new(handle_error))
                .load_shed()
                .timeout(Duration::from_secs(10)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn handle_error(error: BoxError) -> impl IntoResponse {
    if error.is::<tower::timeout::error::Elapsed>() {
        return (StatusCode::REQUEST_TIMEOUT, Cow::from("request timed out"));
    }

    if error.is::<tower::load_shed::error::Overloaded>() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Cow::from("service is overloaded, try again later"),
        );
    }

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Cow::from(format!("Unhandled internal error: {}", error)),
    )
}
