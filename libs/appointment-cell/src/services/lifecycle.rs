use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::Method;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_api::{Envelope, PortalClient};
use shared_config::AppConfig;

use crate::models::{Appointment, AppointmentPayload, AppointmentStatus, SchedulingError};
use crate::services::map_upstream;

/// Minimum notice for a patient-initiated cancellation, in calendar days.
pub const MIN_CANCEL_NOTICE_DAYS: i64 = 2;

/// Whether an appointment may still be cancelled.
///
/// False for terminal statuses regardless of date. Otherwise the slot's
/// start must be at least [`MIN_CANCEL_NOTICE_DAYS`] calendar days after
/// `now` — the difference is counted in calendar days, not elapsed hours,
/// so an appointment at 00:30 two days from now still qualifies.
pub fn can_cancel(
    status: &AppointmentStatus,
    slot_start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> bool {
    if status.is_terminal() {
        return false;
    }

    let days_ahead = slot_start
        .date_naive()
        .signed_duration_since(now.date_naive())
        .num_days();

    days_ahead >= MIN_CANCEL_NOTICE_DAYS
}

pub struct LifecycleService {
    portal: Arc<PortalClient>,
}

impl LifecycleService {
    pub fn new(portal: Arc<PortalClient>) -> Self {
        Self { portal }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Arc::new(PortalClient::new(config)))
    }

    /// Validate that a status transition is allowed
    pub fn validate_status_transition(
        &self,
        current_status: &AppointmentStatus,
        new_status: &AppointmentStatus,
    ) -> Result<(), SchedulingError> {
        debug!("Validating status transition from {} to {}", current_status, new_status);

        let valid_transitions = self.get_valid_transitions(current_status);

        if !valid_transitions.contains(new_status) {
            warn!("Invalid status transition attempted: {} -> {}", current_status, new_status);
            return Err(SchedulingError::InvalidStatusTransition(current_status.clone()));
        }

        Ok(())
    }

    /// Get all valid next statuses for a given current status
    pub fn get_valid_transitions(&self, current_status: &AppointmentStatus) -> Vec<AppointmentStatus> {
        match current_status {
            AppointmentStatus::Scheduled | AppointmentStatus::Changed => vec![
                AppointmentStatus::Changed,
                AppointmentStatus::Completed,
                AppointmentStatus::Cancelled,
            ],
            // Terminal states - no transitions allowed
            AppointmentStatus::Completed => vec![],
            AppointmentStatus::Cancelled => vec![],
        }
    }

    /// Cancel an appointment. There is no dedicated cancel endpoint
    /// upstream: cancellation is a full update of the appointment with the
    /// status overridden to Cancelado.
    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        now: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<Appointment, SchedulingError> {
        debug!("Cancelling appointment: {}", appointment_id);

        let current = self.get_appointment(appointment_id, auth_token).await?;

        if current.status.is_terminal() {
            return Err(SchedulingError::InvalidStatusTransition(current.status.clone()));
        }
        if !can_cancel(&current.status, current.schedule.initial_hour, now) {
            return Err(SchedulingError::CancellationWindow(MIN_CANCEL_NOTICE_DAYS));
        }

        let payload = AppointmentPayload {
            patient_id: current.patient.id,
            schedule_id: current.schedule.id,
            status: AppointmentStatus::Cancelled,
            description: current.description.clone().unwrap_or_default(),
        };

        let body = serde_json::to_value(&payload)
            .map_err(|e| SchedulingError::Upstream(e.to_string()))?;

        let path = format!("/appointments/{}", appointment_id);
        let result: Envelope<Appointment> = self.portal.request(
            Method::PUT,
            &path,
            Some(auth_token),
            Some(body),
        ).await.map_err(map_upstream)?;

        info!("Appointment {} cancelled", appointment_id);
        Ok(result.data)
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, SchedulingError> {
        let path = format!("/appointments/{}", appointment_id);
        let result: Envelope<Appointment> = self.portal.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(map_upstream)?;

        Ok(result.data)
    }
}
