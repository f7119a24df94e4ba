use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use practitioner_cell::models::ScheduleSlot;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

/// Appointment statuses carry the backend's Portuguese labels on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum AppointmentStatus {
    #[serde(rename = "Agendado")]
    Scheduled,
    #[serde(rename = "Alterado")]
    Changed,
    #[serde(rename = "Concluído")]
    Completed,
    #[serde(rename = "Cancelado")]
    Cancelled,
}

impl AppointmentStatus {
    /// Completed and Cancelled admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "Agendado"),
            AppointmentStatus::Changed => write!(f, "Alterado"),
            AppointmentStatus::Completed => write!(f, "Concluído"),
            AppointmentStatus::Cancelled => write!(f, "Cancelado"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRef {
    pub id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub cpf: Option<String>,
}

/// A patient's booking of one schedule slot. The slot's start timestamp is
/// the canonical appointment time; status and description are the only
/// fields that change after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub patient: PatientRef,
    pub schedule: ScheduleSlot,
    #[serde(default)]
    pub description: Option<String>,
    pub status: AppointmentStatus,
}

/// Full update payload; cancel and edit both go through this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPayload {
    pub patient_id: Uuid,
    pub schedule_id: Uuid,
    pub status: AppointmentStatus,
    pub description: String,
}

// ==============================================================================
// RATING MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingAppointmentRef {
    pub id: Uuid,
}

/// A 1-5 score plus optional comment; at most one per completed
/// appointment, enforced by create-vs-update branching in the workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: Uuid,
    pub appointment: RatingAppointmentRef,
    #[serde(default)]
    pub patient_id: Option<Uuid>,
    pub score: i32,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingPayload {
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub score: i32,
    pub comment: Option<String>,
}

/// What the user typed into the rating dialog before validation.
#[derive(Debug, Clone, Default)]
pub struct RatingDraft {
    pub score: i32,
    pub comment: Option<String>,
}

// ==============================================================================
// LIST VIEW MODELS
// ==============================================================================

/// Appointment joined with its rating, the shape the "my appointments"
/// list renders from. `scheduled_for` is the slot start pre-formatted as
/// `dd/MM/yyyy às HH:mm`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentWithRating {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub scheduled_for: String,
    pub rating: Option<Rating>,
}

impl AppointmentWithRating {
    pub fn new(appointment: Appointment, rating: Option<Rating>) -> Self {
        let scheduled_for =
            shared_utils::dates::format_br_date_time(&appointment.schedule.initial_hour.to_rfc3339());
        Self { appointment, scheduled_for, rating }
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

impl From<SchedulingError> for shared_models::error::AppError {
    fn from(e: SchedulingError) -> Self {
        use shared_models::error::AppError;
        let message = e.to_string();
        match e {
            SchedulingError::NotFound => AppError::NotFound(message),
            SchedulingError::Validation(_)
            | SchedulingError::SlotUnresolved
            | SchedulingError::CancellationWindow(_)
            | SchedulingError::RatingNotAllowed(_) => AppError::BadRequest(message),
            SchedulingError::InvalidStatusTransition(_)
            | SchedulingError::SubmitInFlight => AppError::Conflict(message),
            SchedulingError::Upstream(_) => AppError::ExternalService(message),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum SchedulingError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No schedule slot matches the selected date and hour")]
    SlotUnresolved,

    #[error("Appointment can only be cancelled at least {0} calendar days in advance")]
    CancellationWindow(i64),

    #[error("Appointment cannot be modified in current status: {0}")]
    InvalidStatusTransition(AppointmentStatus),

    #[error("Appointment must be completed before it can be rated, current status: {0}")]
    RatingNotAllowed(AppointmentStatus),

    #[error("A submission is already in flight")]
    SubmitInFlight,

    #[error("Upstream error: {0}")]
    Upstream(String),
}
