use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::handlers::Dispatcher;
use crate::telegram::ChatApi;

use super::handlers;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub chat: Arc<dyn ChatApi>,
    /// Reported by /health.
    pub build: &'static str,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/health", get(handlers::health_check))
        .route("/webhook", post(handlers::webhook))
        .route("/set_webhook", post(handlers::set_webhook))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
