use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc, Weekday};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_api::PortalClient;
use shared_config::AppConfig;
use shared_models::pagination::PageRequest;
use shared_utils::dates::hour_label;

use crate::models::{AvailabilityIndex, DayAvailability, ScheduleSlot};
use crate::services::directory::DirectoryService;

/// Buckets slots by the calendar date of their start timestamp and keeps
/// only selectable days: strictly after `now`'s calendar date and falling
/// Monday through Friday. Weekend exclusion is a fixed policy.
///
/// `now` is an explicit parameter so the filter stays deterministic.
pub fn build_index(slots: &[ScheduleSlot], now: DateTime<Utc>) -> AvailabilityIndex {
    let mut hours_by_date: BTreeMap<chrono::NaiveDate, Vec<String>> = BTreeMap::new();
    let mut slot_ids: HashMap<String, Uuid> = HashMap::new();

    for slot in slots {
        let date = slot.initial_hour.date_naive();
        let hour = hour_label(slot.initial_hour);

        hours_by_date.entry(date).or_default().push(hour.clone());
        // Colliding date+hour keys keep the last-seen slot id.
        slot_ids.insert(AvailabilityIndex::slot_key(date, &hour), slot.id);
    }

    let today = now.date_naive();
    let days = hours_by_date
        .into_iter()
        .filter(|(date, _)| *date > today && is_weekday(*date))
        .map(|(date, mut hours)| {
            hours.sort();
            hours.dedup();
            DayAvailability { date, available_hours: hours }
        })
        .collect();

    AvailabilityIndex { days, slot_ids }
}

fn is_weekday(date: chrono::NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Resolves a practitioner's bookable dates and hours from their open
/// schedule slots.
pub struct AvailabilityService {
    directory: DirectoryService,
    slot_page_size: u32,
}

impl AvailabilityService {
    pub fn new(portal: Arc<PortalClient>, slot_page_size: u32) -> Self {
        Self {
            directory: DirectoryService::new(portal),
            slot_page_size,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Arc::new(PortalClient::new(config)), config.slot_fetch_page_size)
    }

    /// Fetches the practitioner's slots with one generous page and builds
    /// the index. A fetch failure is logged and surfaces as an empty index:
    /// the booking form stays usable with no selectable dates.
    pub async fn resolve(
        &self,
        practitioner_id: Uuid,
        now: DateTime<Utc>,
        auth_token: &str,
    ) -> AvailabilityIndex {
        let page = PageRequest { page: 1, page_size: self.slot_page_size };

        match self.directory.list_slots(practitioner_id, page, auth_token).await {
            Ok(slots) => {
                let index = build_index(&slots.items, now);
                debug!(
                    "Resolved {} selectable dates from {} slots for practitioner {}",
                    index.days.len(),
                    slots.items.len(),
                    practitioner_id
                );
                index
            }
            Err(e) => {
                warn!("Failed to fetch slots for practitioner {}: {}", practitioner_id, e);
                AvailabilityIndex::default()
            }
        }
    }
}
