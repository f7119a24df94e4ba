use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::{NaiveDate, Utc};
use headers::{Authorization, authorization::Bearer};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_models::pagination::PageRequest;

use crate::models::{AppointmentWithRating, RatingDraft};
use crate::services::booking::{BookingForm, BookingService};
use crate::services::lifecycle::LifecycleService;
use crate::services::rating::RatingService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub patient_id: Uuid,
    pub practitioner_id: Uuid,
    pub date: NaiveDate,
    pub hour: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ListQuery {
    fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(defaults.page),
            page_size: self.page_size.unwrap_or(defaults.page_size),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRequest {
    pub score: i32,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Drive the booking form through its whole sequence for one request:
/// availability is resolved fresh, so the slot id always comes from the
/// current index rather than anything the client remembered.
async fn run_booking(
    state: &AppConfig,
    request: BookingRequest,
    existing_id: Option<Uuid>,
    token: &str,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::from_config(state);

    let mut form = BookingForm::new();
    form.set_patient(request.patient_id);
    form.set_description(request.description);
    form.select_practitioner(request.practitioner_id);

    service.load_availability(&mut form, Utc::now(), token).await?;
    form.select_date(request.date)?;
    form.select_hour(&request.hour)?;

    let appointment = service.submit(&mut form, existing_id, token).await?;

    Ok(Json(json!({
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<BookingRequest>,
) -> Result<Json<Value>, AppError> {
    run_booking(&state, request, None, auth.token()).await
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<BookingRequest>,
) -> Result<Json<Value>, AppError> {
    run_booking(&state, request, Some(appointment_id), auth.token()).await
}

/// The patient's appointment list joined with their ratings. A failed
/// ratings fetch degrades to a list without ratings instead of failing
/// the whole page.
#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let booking = BookingService::from_config(&state);
    let ratings_service = RatingService::from_config(&state);

    let page = booking.list_appointments(query.page_request(), token).await?;

    let mut ratings = match ratings_service.ratings_by_appointment(token).await {
        Ok(ratings) => ratings,
        Err(e) => {
            warn!("Failed to fetch ratings, listing appointments without them: {}", e);
            Default::default()
        }
    };

    let items: Vec<AppointmentWithRating> = page.items
        .into_iter()
        .map(|appointment| {
            let rating = ratings.remove(&appointment.id);
            AppointmentWithRating::new(appointment, rating)
        })
        .collect();

    Ok(Json(json!({
        "items": items,
        "page": page.info.page,
        "pageSize": page.info.page_size,
        "totalPages": page.info.total_pages,
        "totalCount": page.info.total_count
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::from_config(&state);

    let appointment = service.get_appointment(appointment_id, auth.token()).await?;

    Ok(Json(json!({
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let service = LifecycleService::from_config(&state);

    let appointment = service
        .cancel_appointment(appointment_id, Utc::now(), auth.token())
        .await?;

    Ok(Json(json!({
        "appointment": appointment
    })))
}

/// Rate an appointment. Creates the rating on first submission; if the
/// appointment already has one, updates it in place.
#[axum::debug_handler]
pub async fn rate_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<RatingRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let booking = BookingService::from_config(&state);
    let ratings = RatingService::from_config(&state);

    let appointment = booking.get_appointment(appointment_id, token).await?;
    let existing = ratings
        .ratings_by_appointment(token)
        .await?
        .remove(&appointment_id);

    let draft = RatingDraft {
        score: request.score,
        comment: request.comment,
    };

    let rating = ratings
        .submit(&appointment, appointment.patient.id, &draft, existing.as_ref(), token)
        .await?;

    Ok(Json(json!({
        "rating": rating
    })))
}
