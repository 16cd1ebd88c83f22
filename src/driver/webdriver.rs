// src/driver/webdriver.rs
use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use crate::driver::models::{Browser, FindRequest, NewSession, ScriptRequest, WireElement, WireError, WireResponse};
use crate::driver::{Driver, ElementRef, Locator};
use crate::utils::error::DriverError;

// Upper bound for a single protocol round trip; waits are polled on top of this.
const COMMAND_TIMEOUT_SECS: u64 = 60;

/// One browser session on a WebDriver server (chromedriver, geckodriver, Selenium).
pub struct WebDriverSession {
    http: reqwest::Client,
    endpoint: String,
    session_id: String,
}

/// Creates a reqwest client configured for WebDriver interaction.
fn build_webdriver_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(COMMAND_TIMEOUT_SECS))
        .build()
}

impl WebDriverSession {
    /// Opens a new browser session on the WebDriver server at `endpoint`.
    pub async fn start(endpoint: &str, browser: Browser, headless: bool) -> Result<Self, DriverError> {
        let http = build_webdriver_client()?;
        let endpoint = endpoint.trim_end_matches('/').to_string();

        tracing::info!("Starting {:?} session via {}", browser, endpoint);
        let response = http
            .post(format!("{}/session", endpoint))
            .json(&browser.capabilities(headless))
            .send()
            .await?; // Propagates reqwest::Error as DriverError::Network

        let session: NewSession = decode(response).await?;
        tracing::debug!("WebDriver session id: {}", session.session_id);

        Ok(Self { http, endpoint, session_id: session.session_id })
    }

    /// Ends the session and closes the browser.
    pub async fn quit(self) -> Result<(), DriverError> {
        let url = format!("{}/session/{}", self.endpoint, self.session_id);
        let response = self.http.delete(&url).send().await?;
        let _: Value = decode(response).await?;
        tracing::debug!("WebDriver session {} closed", self.session_id);
        Ok(())
    }

    async fn command<T: DeserializeOwned>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T, DriverError> {
        let url = format!("{}/session/{}{}", self.endpoint, self.session_id, path);
        tracing::trace!("WebDriver {} {}", method, path);

        let request = self.http.request(method.clone(), &url);
        // POST commands require a JSON body even when they take no parameters.
        let request = match body {
            Some(body) => request.json(&body),
            None if method == Method::POST => request.json(&serde_json::json!({})),
            None => request,
        };

        decode(request.send().await?).await
    }

    async fn find_elements(&self, path: &str, locator: &Locator, scoped: bool) -> Result<Vec<ElementRef>, DriverError> {
        let (using, value) = locator.to_strategy(scoped);
        let body = serde_json::to_value(FindRequest { using, value: &value })
            .map_err(|e| DriverError::Protocol(e.to_string()))?;
        let elements: Vec<WireElement> = self.command(Method::POST, path, Some(body)).await?;
        Ok(elements.into_iter().map(|e| ElementRef::new(e.id)).collect())
    }

    async fn property(&self, element: &ElementRef, name: &str) -> Result<String, DriverError> {
        let path = format!("/element/{}/property/{}", element.id(), name);
        let value: Option<String> = self.command(Method::GET, &path, None).await?;
        Ok(value.unwrap_or_default())
    }

    async fn execute(&self, script: &str) -> Result<Value, DriverError> {
        let body = serde_json::to_value(ScriptRequest { script, args: Vec::new() })
            .map_err(|e| DriverError::Protocol(e.to_string()))?;
        self.command(Method::POST, "/execute/sync", Some(body)).await
    }
}

/// Unwraps the `value` envelope, turning non-2xx responses into typed errors.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, DriverError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        tracing::debug!("WebDriver returned {}: {}", status, body);
        return match serde_json::from_str::<WireResponse<WireError>>(&body) {
            Ok(wire) => Err(DriverError::WebDriver { error: wire.value.error, message: wire.value.message }),
            Err(_) => Err(DriverError::Http { status, body }),
        };
    }

    serde_json::from_str::<WireResponse<T>>(&body)
        .map(|wire| wire.value)
        .map_err(|e| DriverError::Protocol(format!("{} in response: {}", e, body)))
}

#[async_trait]
impl Driver for WebDriverSession {
    async fn goto(&mut self, url: &str) -> Result<(), DriverError> {
        tracing::debug!("Navigating to {}", url);
        let _: Value = self.command(Method::POST, "/url", Some(serde_json::json!({ "url": url }))).await?;
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, DriverError> {
        self.command(Method::GET, "/url", None).await
    }

    async fn find_all(&mut self, locator: &Locator) -> Result<Vec<ElementRef>, DriverError> {
        self.find_elements("/elements", locator, false).await
    }

    async fn find_all_within(&mut self, parent: &ElementRef, locator: &Locator) -> Result<Vec<ElementRef>, DriverError> {
        let path = format!("/element/{}/elements", parent.id());
        self.find_elements(&path, locator, true).await
    }

    async fn click(&mut self, element: &ElementRef) -> Result<(), DriverError> {
        let path = format!("/element/{}/click", element.id());
        let _: Value = self.command(Method::POST, &path, None).await?;
        Ok(())
    }

    async fn fill(&mut self, element: &ElementRef, text: &str) -> Result<(), DriverError> {
        let clear = format!("/element/{}/clear", element.id());
        let _: Value = self.command(Method::POST, &clear, None).await?;

        let value = format!("/element/{}/value", element.id());
        let _: Value = self.command(Method::POST, &value, Some(serde_json::json!({ "text": text }))).await?;
        Ok(())
    }

    async fn input_value(&mut self, element: &ElementRef) -> Result<String, DriverError> {
        self.property(element, "value").await
    }

    async fn text(&mut self, element: &ElementRef) -> Result<String, DriverError> {
        let path = format!("/element/{}/text", element.id());
        self.command(Method::GET, &path, None).await
    }

    async fn inner_html(&mut self, element: &ElementRef) -> Result<String, DriverError> {
        self.property(element, "innerHTML").await
    }

    async fn outer_html(&mut self, element: &ElementRef) -> Result<String, DriverError> {
        self.property(element, "outerHTML").await
    }

    async fn is_displayed(&mut self, element: &ElementRef) -> Result<bool, DriverError> {
        let path = format!("/element/{}/displayed", element.id());
        self.command(Method::GET, &path, None).await
    }

    async fn ready_state(&mut self) -> Result<String, DriverError> {
        let state = self.execute("return document.readyState").await?;
        state
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| DriverError::Protocol(format!("readyState was not a string: {}", state)))
    }
}
