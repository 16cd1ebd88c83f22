// src/portal/mod.rs
pub mod calendar;
pub mod documents;
pub mod models;
pub mod selectors;
pub mod session;

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://spartan.dgw.co.id/";

/// Timeouts and bounds for talking to the portal.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub base_url: String,
    /// Login redirects, page loads, search results.
    pub page_timeout: Duration,
    /// How long a document's detail view may take to appear.
    pub detail_timeout: Duration,
    /// How long to wait for a calendar label to change after a month click.
    pub label_settle_timeout: Duration,
    /// How long the search spinner may take to appear after Search is clicked.
    pub search_start_timeout: Duration,
    pub max_calendar_steps: usize,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_timeout: Duration::from_secs(30),
            detail_timeout: Duration::from_secs(30),
            label_settle_timeout: Duration::from_secs(2),
            search_start_timeout: Duration::from_secs(5),
            max_calendar_steps: 120,
        }
    }
}

impl PortalConfig {
    /// Joins a portal-relative path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}
