use std::sync::Arc;

use anyhow::Result;
use reqwest::Method;
use tracing::debug;

use shared_api::{Envelope, PortalClient};
use shared_config::AppConfig;
use shared_models::pagination::{Page, PageRequest};

use crate::models::{Practitioner, ScheduleSlot};

/// Thin client over the backend's practitioner and schedule resources.
pub struct DirectoryService {
    portal: Arc<PortalClient>,
}

impl DirectoryService {
    pub fn new(portal: Arc<PortalClient>) -> Self {
        Self { portal }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Arc::new(PortalClient::new(config)))
    }

    /// Name-prefix search backing the practitioner autocomplete. An empty
    /// query short-circuits to an empty list without touching the network.
    pub async fn search(&self, name: &str, auth_token: &str) -> Result<Vec<Practitioner>> {
        if name.trim().is_empty() {
            return Ok(Vec::new());
        }

        debug!("Searching practitioners by name: {}", name);

        let path = format!("/practitioners?name={}", urlencoding::encode(name));
        let result: Envelope<Page<Practitioner>> = self.portal.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await?;

        Ok(result.data.items)
    }

    /// One page of a practitioner's open schedule slots.
    pub async fn list_slots(
        &self,
        practitioner_id: uuid::Uuid,
        page: PageRequest,
        auth_token: &str,
    ) -> Result<Page<ScheduleSlot>> {
        debug!("Fetching schedule slots for practitioner: {}", practitioner_id);

        let path = format!(
            "/schedules/filtered?practitionerId={}&page={}&pageSize={}",
            practitioner_id, page.page, page.page_size
        );
        let result: Envelope<Page<ScheduleSlot>> = self.portal.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await?;

        Ok(result.data)
    }
}
