use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn practitioner_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::search_practitioners))
        .route("/{practitioner_id}/availability", get(handlers::get_availability))
        .with_state(state)
}
