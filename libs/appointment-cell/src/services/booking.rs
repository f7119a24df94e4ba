use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Method;
use tracing::{debug, info};
use uuid::Uuid;

use practitioner_cell::models::AvailabilityIndex;
use practitioner_cell::services::availability::AvailabilityService;
use shared_api::{Envelope, PortalClient};
use shared_config::AppConfig;
use shared_models::pagination::{Page, PageRequest};

use crate::models::{Appointment, AppointmentPayload, AppointmentStatus, SchedulingError};
use crate::services::map_upstream;

/// Where the booking form currently sits. Each field gates the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStep {
    PractitionerUnselected,
    DatesLoading,
    DatesLoaded,
    DateSelected,
    ReadyToSubmit,
}

/// The booking form state machine.
///
/// Date and hour selections are only accepted when they belong to the
/// resolved availability, mirroring a date picker whose unavailable days
/// are disabled rather than flagged after submit. Changing the
/// practitioner discards the previous index together with the date and
/// hour, so a stale slot id can never leak across practitioners.
#[derive(Debug, Clone, Default)]
pub struct BookingForm {
    patient_id: Option<Uuid>,
    practitioner_id: Option<Uuid>,
    date: Option<NaiveDate>,
    hour: Option<String>,
    description: Option<String>,
    availability: Option<AvailabilityIndex>,
    submitting: bool,
}

impl BookingForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> BookingStep {
        if self.practitioner_id.is_none() {
            BookingStep::PractitionerUnselected
        } else if self.availability.is_none() {
            BookingStep::DatesLoading
        } else if self.date.is_none() {
            BookingStep::DatesLoaded
        } else if self.hour.is_none() {
            BookingStep::DateSelected
        } else {
            BookingStep::ReadyToSubmit
        }
    }

    pub fn patient_id(&self) -> Option<Uuid> {
        self.patient_id
    }

    pub fn practitioner_id(&self) -> Option<Uuid> {
        self.practitioner_id
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn selected_hour(&self) -> Option<&str> {
        self.hour.as_deref()
    }

    pub fn set_patient(&mut self, patient_id: Uuid) {
        self.patient_id = Some(patient_id);
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    /// Selecting a different practitioner resets the form back to the
    /// dates-loading state: date, hour and the resolved index are cleared.
    pub fn select_practitioner(&mut self, practitioner_id: Uuid) {
        if self.practitioner_id == Some(practitioner_id) {
            return;
        }

        self.practitioner_id = Some(practitioner_id);
        self.date = None;
        self.hour = None;
        self.availability = None;
    }

    pub fn clear_practitioner(&mut self) {
        self.practitioner_id = None;
        self.date = None;
        self.hour = None;
        self.availability = None;
    }

    pub fn availability_loaded(&mut self, index: AvailabilityIndex) {
        self.availability = Some(index);
    }

    pub fn availability(&self) -> Option<&AvailabilityIndex> {
        self.availability.as_ref()
    }

    pub fn selectable_dates(&self) -> Vec<NaiveDate> {
        self.availability
            .as_ref()
            .map(|index| index.dates())
            .unwrap_or_default()
    }

    pub fn select_date(&mut self, date: NaiveDate) -> Result<(), SchedulingError> {
        let index = self.availability.as_ref().ok_or_else(|| {
            SchedulingError::Validation("Availability has not been loaded yet".to_string())
        })?;

        if !index.contains_date(date) {
            return Err(SchedulingError::Validation(format!(
                "Date {} is not available for this practitioner", date
            )));
        }

        self.date = Some(date);
        self.hour = None;
        Ok(())
    }

    pub fn available_hours(&self) -> &[String] {
        match (&self.availability, self.date) {
            (Some(index), Some(date)) => index.hours_for(date),
            _ => &[],
        }
    }

    pub fn select_hour(&mut self, hour: &str) -> Result<(), SchedulingError> {
        if self.date.is_none() {
            return Err(SchedulingError::Validation("Select a date first".to_string()));
        }

        if !self.available_hours().iter().any(|h| h == hour) {
            return Err(SchedulingError::Validation(format!(
                "Hour {} is not available on the selected date", hour
            )));
        }

        self.hour = Some(hour.to_string());
        Ok(())
    }

    pub fn is_submittable(&self) -> bool {
        self.step() == BookingStep::ReadyToSubmit
            && self.patient_id.is_some()
            && !self.submitting
    }

    /// Resolve the chosen date and hour to a slot id and build the
    /// submission payload. A missing mapping is a precondition failure,
    /// never a request that goes out with a stale id.
    pub fn payload(&self, status: AppointmentStatus) -> Result<AppointmentPayload, SchedulingError> {
        let patient_id = self.patient_id.ok_or_else(|| {
            SchedulingError::Validation("Select a patient".to_string())
        })?;
        self.practitioner_id.ok_or_else(|| {
            SchedulingError::Validation("Select a practitioner".to_string())
        })?;
        let date = self.date.ok_or_else(|| {
            SchedulingError::Validation("Select a date".to_string())
        })?;
        let hour = self.hour.as_deref().ok_or_else(|| {
            SchedulingError::Validation("Select an hour".to_string())
        })?;

        let schedule_id = self
            .availability
            .as_ref()
            .and_then(|index| index.slot_id_for(date, hour))
            .ok_or(SchedulingError::SlotUnresolved)?;

        Ok(AppointmentPayload {
            patient_id,
            schedule_id,
            status,
            description: self.description.clone().unwrap_or_default(),
        })
    }

    /// Submissions are single-flight; the gate is released by
    /// [`BookingForm::submit_settled`] whether the request succeeded or not.
    pub fn begin_submit(&mut self) -> Result<(), SchedulingError> {
        if self.submitting {
            return Err(SchedulingError::SubmitInFlight);
        }
        self.submitting = true;
        Ok(())
    }

    pub fn submit_settled(&mut self) {
        self.submitting = false;
    }
}

/// Orchestrates the booking form against the backend: availability
/// loading, create on new bookings, update on edits.
pub struct BookingService {
    portal: Arc<PortalClient>,
    availability: AvailabilityService,
}

impl BookingService {
    pub fn new(portal: Arc<PortalClient>, slot_page_size: u32) -> Self {
        let availability = AvailabilityService::new(Arc::clone(&portal), slot_page_size);
        Self { portal, availability }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Arc::new(PortalClient::new(config)), config.slot_fetch_page_size)
    }

    /// Resolve availability for the form's practitioner. A resolver
    /// failure already surfaces as an empty index, so the form stays
    /// usable with no selectable dates either way.
    pub async fn load_availability(
        &self,
        form: &mut BookingForm,
        now: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<(), SchedulingError> {
        let practitioner_id = form.practitioner_id().ok_or_else(|| {
            SchedulingError::Validation("Select a practitioner".to_string())
        })?;

        let index = self.availability.resolve(practitioner_id, now, auth_token).await;
        debug!(
            "Loaded {} selectable dates for practitioner {}",
            index.days.len(),
            practitioner_id
        );
        form.availability_loaded(index);
        Ok(())
    }

    /// Submit the form. Creates a new appointment with status Agendado, or
    /// updates an existing one with status Alterado. On failure the form
    /// keeps its entered values so the caller can retry.
    pub async fn submit(
        &self,
        form: &mut BookingForm,
        existing_id: Option<Uuid>,
        auth_token: &str,
    ) -> Result<Appointment, SchedulingError> {
        form.begin_submit()?;
        let result = self.submit_inner(form, existing_id, auth_token).await;
        form.submit_settled();
        result
    }

    async fn submit_inner(
        &self,
        form: &BookingForm,
        existing_id: Option<Uuid>,
        auth_token: &str,
    ) -> Result<Appointment, SchedulingError> {
        let status = if existing_id.is_some() {
            AppointmentStatus::Changed
        } else {
            AppointmentStatus::Scheduled
        };

        let payload = form.payload(status)?;
        let body = serde_json::to_value(&payload)
            .map_err(|e| SchedulingError::Upstream(e.to_string()))?;

        let result: Envelope<Appointment> = match existing_id {
            Some(id) => {
                self.portal.request(
                    Method::PUT,
                    &format!("/appointments/{}", id),
                    Some(auth_token),
                    Some(body),
                ).await
            }
            None => {
                self.portal.request(
                    Method::POST,
                    "/appointments",
                    Some(auth_token),
                    Some(body),
                ).await
            }
        }.map_err(map_upstream)?;

        info!(
            "Appointment {} {} for patient {}",
            result.data.id,
            if existing_id.is_some() { "updated" } else { "booked" },
            payload.patient_id
        );
        Ok(result.data)
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, SchedulingError> {
        debug!("Fetching appointment: {}", appointment_id);

        let path = format!("/appointments/{}", appointment_id);
        let result: Envelope<Appointment> = self.portal.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(map_upstream)?;

        Ok(result.data)
    }

    pub async fn list_appointments(
        &self,
        page: PageRequest,
        auth_token: &str,
    ) -> Result<Page<Appointment>, SchedulingError> {
        let path = format!(
            "/appointments?page={}&pageSize={}",
            page.page, page.page_size
        );
        let result: Envelope<Page<Appointment>> = self.portal.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(map_upstream)?;

        Ok(result.data)
    }
}
