// src/portal/session.rs
use std::fmt;
use crate::driver::{Driver, Locator, Pick, Role};
use crate::portal::selectors;
use crate::portal::PortalConfig;
use crate::utils::error::DriverError;

/// Account used to sign in to the portal.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Self {
        Self { email: sanitize_credential(email), password: sanitize_credential(password) }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Strips surrounding whitespace and ASCII punctuation picked up from
/// copy-pasting or shell quoting.
pub fn sanitize_credential(raw: &str) -> String {
    raw.trim_matches(|c: char| c.is_whitespace() || c.is_ascii_punctuation()).to_string()
}

/// Signs in through the login form and waits to land on the dashboard.
pub async fn login<D: Driver>(driver: &mut D, config: &PortalConfig, credentials: &Credentials) -> Result<(), DriverError> {
    tracing::info!("Logging in as {}", credentials.email);

    let home = config.url("");
    driver.goto(&home).await?;
    driver.wait_for_url(&config.url(selectors::LOGIN_PATH), config.page_timeout).await?;

    let email = driver.find(&selectors::textbox(selectors::EMAIL_FIELD), Pick::First).await?;
    driver.fill(&email, &credentials.email).await?;
    let password = driver.find(&selectors::textbox(selectors::PASSWORD_FIELD), Pick::First).await?;
    driver.fill(&password, &credentials.password).await?;

    let submit = driver.find(&selectors::button(selectors::LOGIN_BUTTON), Pick::First).await?;
    driver.click(&submit).await?;

    driver.wait_for_url(&home, config.page_timeout).await.map_err(|e| {
        tracing::error!("Login did not complete; check the credentials");
        e
    })?;
    tracing::debug!("Logged in");
    Ok(())
}

/// Goes to the inbox's processed tab and opens the filter panel.
pub async fn open_filter_panel<D: Driver>(driver: &mut D, config: &PortalConfig) -> Result<(), DriverError> {
    tracing::info!("Navigating to Inbox...");

    let inbox = driver.find(&selectors::button(selectors::INBOX_BUTTON), Pick::First).await?;
    driver.click(&inbox).await?;
    driver.wait_for_url(&config.url(selectors::INBOX_PATH), config.page_timeout).await?;

    let processed = driver.find(&Locator::role(Role::Tab, selectors::PROCESSED_TAB), Pick::First).await?;
    driver.click(&processed).await?;
    let filter = driver.find(&selectors::button(selectors::FILTER_BUTTON), Pick::First).await?;
    driver.click(&filter).await?;
    Ok(())
}
