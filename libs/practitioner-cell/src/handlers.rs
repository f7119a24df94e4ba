use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::Utc;
use headers::{Authorization, authorization::Bearer};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_api::PortalClient;
use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::services::availability::AvailabilityService;
use crate::services::directory::DirectoryService;

#[derive(Debug, Deserialize)]
pub struct PractitionerSearchQuery {
    pub name: Option<String>,
}

#[axum::debug_handler]
pub async fn search_practitioners(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Query(query): Query<PractitionerSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let directory = DirectoryService::new(Arc::new(PortalClient::new(&state)));

    let practitioners = directory
        .search(query.name.as_deref().unwrap_or(""), token)
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    Ok(Json(json!({
        "items": practitioners
    })))
}

/// Resolved availability for one practitioner. An upstream failure is not
/// an error here: the response carries an empty index and the client keeps
/// the form usable with no selectable dates.
#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<AppConfig>>,
    Path(practitioner_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let service = AvailabilityService::from_config(&state);

    let index = service.resolve(practitioner_id, Utc::now(), token).await;

    Ok(Json(json!({
        "practitionerId": practitioner_id,
        "availability": index
    })))
}
