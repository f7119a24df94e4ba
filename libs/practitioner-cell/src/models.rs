use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A doctor offering schedule slots. Read-only from this cell's
/// perspective; practitioner management lives in the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Practitioner {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub license_number: Option<String>,
    #[serde(default)]
    pub specialization_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PractitionerRef {
    pub id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
}

/// One bookable unit of time belonging to a practitioner. Immutable once
/// created; the start timestamp is the canonical appointment time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSlot {
    pub id: Uuid,
    pub initial_hour: DateTime<Utc>,
    pub final_hour: DateTime<Utc>,
    #[serde(default)]
    pub practitioner: Option<PractitionerRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub available_hours: Vec<String>,
}

/// Derived grouping of a practitioner's open slots by date and hour,
/// rebuilt on every practitioner change and never persisted.
///
/// `days` is sorted ascending and only contains weekdays strictly after
/// the resolution time. The reverse lookup maps `"{date}_{HH:MM}"` back to
/// a concrete slot id; when two slots collide on the same date and hour
/// the last-seen id wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityIndex {
    pub days: Vec<DayAvailability>,
    pub slot_ids: HashMap<String, Uuid>,
}

impl AvailabilityIndex {
    pub fn slot_key(date: NaiveDate, hour: &str) -> String {
        format!("{}_{}", date, hour)
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.days.iter().map(|day| day.date).collect()
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.days.iter().any(|day| day.date == date)
    }

    pub fn hours_for(&self, date: NaiveDate) -> &[String] {
        self.days
            .iter()
            .find(|day| day.date == date)
            .map(|day| day.available_hours.as_slice())
            .unwrap_or(&[])
    }

    pub fn slot_id_for(&self, date: NaiveDate, hour: &str) -> Option<Uuid> {
        self.slot_ids.get(&Self::slot_key(date, hour)).copied()
    }
}
