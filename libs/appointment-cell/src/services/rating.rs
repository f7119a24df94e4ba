use std::collections::HashMap;
use std::sync::Arc;

use reqwest::Method;
use tracing::{debug, info};
use uuid::Uuid;

use shared_api::{Envelope, PortalClient};
use shared_config::AppConfig;

use crate::models::{Appointment, Rating, RatingDraft, RatingPayload, SchedulingError};
use crate::services::map_upstream;

/// The rating dialog is read-only when a rating already exists, until the
/// user explicitly switches to editing.
#[derive(Debug, Clone, PartialEq)]
pub enum RatingDialogMode {
    Viewing { rating: Rating },
    Editing { existing_id: Option<Uuid> },
}

impl RatingDialogMode {
    pub fn open(existing: Option<&Rating>) -> Self {
        match existing {
            Some(rating) => RatingDialogMode::Viewing { rating: rating.clone() },
            None => RatingDialogMode::Editing { existing_id: None },
        }
    }

    /// Switch a viewing dialog into editing, carrying the rating id so the
    /// submission updates instead of creating a duplicate.
    pub fn edit(&mut self) {
        if let RatingDialogMode::Viewing { rating } = self {
            *self = RatingDialogMode::Editing { existing_id: Some(rating.id) };
        }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, RatingDialogMode::Viewing { .. })
    }

    pub fn existing_id(&self) -> Option<Uuid> {
        match self {
            RatingDialogMode::Viewing { rating } => Some(rating.id),
            RatingDialogMode::Editing { existing_id } => *existing_id,
        }
    }
}

pub struct RatingService {
    portal: Arc<PortalClient>,
}

impl RatingService {
    pub fn new(portal: Arc<PortalClient>) -> Self {
        Self { portal }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Arc::new(PortalClient::new(config)))
    }

    /// Fetch the patient's ratings keyed by appointment id, for joining
    /// against the appointment list. Duplicate appointment ids keep the
    /// last rating returned.
    pub async fn ratings_by_appointment(
        &self,
        auth_token: &str,
    ) -> Result<HashMap<Uuid, Rating>, SchedulingError> {
        let result: Envelope<Vec<Rating>> = self.portal.request(
            Method::GET,
            "/ratings",
            Some(auth_token),
            None,
        ).await.map_err(map_upstream)?;

        debug!("Fetched {} ratings", result.data.len());

        Ok(result.data
            .into_iter()
            .map(|rating| (rating.appointment.id, rating))
            .collect())
    }

    /// Submit a rating for an appointment. Score 0 means nothing was
    /// selected and is rejected before any request goes out; only completed
    /// appointments can be rated. An existing rating is updated in place,
    /// otherwise a new one is created.
    pub async fn submit(
        &self,
        appointment: &Appointment,
        patient_id: Uuid,
        draft: &RatingDraft,
        existing: Option<&Rating>,
        auth_token: &str,
    ) -> Result<Rating, SchedulingError> {
        if draft.score == 0 {
            return Err(SchedulingError::Validation(
                "Select a score before submitting".to_string(),
            ));
        }
        if !(1..=5).contains(&draft.score) {
            return Err(SchedulingError::Validation(format!(
                "Score must be between 1 and 5, got {}", draft.score
            )));
        }
        if appointment.status != crate::models::AppointmentStatus::Completed {
            return Err(SchedulingError::RatingNotAllowed(appointment.status.clone()));
        }

        let payload = RatingPayload {
            appointment_id: appointment.id,
            patient_id,
            score: draft.score,
            comment: draft.comment.clone(),
        };

        let body = serde_json::to_value(&payload)
            .map_err(|e| SchedulingError::Upstream(e.to_string()))?;

        let result: Envelope<Rating> = match existing {
            Some(rating) => {
                self.portal.request(
                    Method::PUT,
                    &format!("/ratings/{}", rating.id),
                    Some(auth_token),
                    Some(body),
                ).await
            }
            None => {
                self.portal.request(
                    Method::POST,
                    "/ratings",
                    Some(auth_token),
                    Some(body),
                ).await
            }
        }.map_err(map_upstream)?;

        info!(
            "Rating {} for appointment {} ({})",
            if existing.is_some() { "updated" } else { "created" },
            appointment.id,
            draft.score
        );
        Ok(result.data)
    }
}
