// src/driver/models.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Every WebDriver response wraps its payload in `{"value": ...}`.
/// Example: {"value": {"sessionId": "...", "capabilities": {...}}}
#[derive(Debug, Deserialize)]
pub struct WireResponse<T> {
    pub value: T,
}

#[derive(Debug, Deserialize)]
pub struct NewSession {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

/// Error payload returned with a non-2xx status.
#[derive(Debug, Deserialize)]
pub struct WireError {
    pub error: String,
    #[serde(default)]
    pub message: String,
}

/// W3C WebDriver serializes element references under a fixed key.
#[derive(Debug, Deserialize)]
pub struct WireElement {
    #[serde(rename = "element-6066-11e4-a07e-4f4a86b0d3a6")]
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct FindRequest<'a> {
    pub using: &'a str,
    pub value: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ScriptRequest<'a> {
    pub script: &'a str,
    pub args: Vec<Value>,
}

/// Browser the session is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Browser {
    Chrome,
    Firefox,
}

impl Browser {
    /// Builds the `capabilities` body of a new-session request.
    pub fn capabilities(self, headless: bool) -> Value {
        match self {
            Browser::Chrome => {
                let args: Vec<&str> = if headless { vec!["--headless=new", "--window-size=1920,1080"] } else { vec![] };
                serde_json::json!({
                    "capabilities": {
                        "alwaysMatch": {
                            "browserName": "chrome",
                            "goog:chromeOptions": { "args": args }
                        }
                    }
                })
            }
            Browser::Firefox => {
                let args: Vec<&str> = if headless { vec!["-headless"] } else { vec![] };
                serde_json::json!({
                    "capabilities": {
                        "alwaysMatch": {
                            "browserName": "firefox",
                            "moz:firefoxOptions": { "args": args }
                        }
                    }
                })
            }
        }
    }
}
