use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::router::appointment_routes;
use practitioner_cell::router::practitioner_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic Portal API is running!" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/practitioners", practitioner_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
}
