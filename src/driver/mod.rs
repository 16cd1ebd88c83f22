// src/driver/mod.rs
//! UI-automation capability the portal components run against.
//!
//! Components never hold global browser state: each receives `&mut impl Driver`
//! for the duration of its work, so the single browser session is exclusively
//! borrowed by whichever stage is currently driving it. `WebDriverSession`
//! speaks the W3C WebDriver protocol; tests use a scripted fake portal.
pub mod models;
pub mod webdriver;
#[cfg(test)]
pub mod fake;

use std::fmt;
use std::time::{Duration, Instant};
use async_trait::async_trait;
use crate::utils::error::DriverError;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Accessible roles the portal is located by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Button,
    Textbox,
    Tab,
    GridCell,
    Option,
    Heading,
    Table,
}

impl Role {
    fn xpath_predicate(self) -> &'static str {
        match self {
            Role::Button => "(self::button or @role='button')",
            Role::Textbox => "(self::input or self::textarea or @role='textbox')",
            Role::Tab => "@role='tab'",
            Role::GridCell => "(@role='gridcell' or self::td)",
            Role::Option => "(@role='option' or self::option)",
            Role::Heading => {
                "(self::h1 or self::h2 or self::h3 or self::h4 or self::h5 or self::h6 or @role='heading')"
            }
            Role::Table => "(self::table or @role='table' or @role='grid')",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// Element by accessible role and name; `exact` requires the whole name to match.
    Role { role: Role, name: String, exact: bool },
    Css(String),
    XPath(String),
}

impl Locator {
    pub fn role(role: Role, name: impl Into<String>) -> Self {
        Locator::Role { role, name: name.into(), exact: false }
    }

    pub fn exact_role(role: Role, name: impl Into<String>) -> Self {
        Locator::Role { role, name: name.into(), exact: true }
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath(expression: impl Into<String>) -> Self {
        Locator::XPath(expression.into())
    }

    /// Returns the `(using, value)` pair of a WebDriver find command. Role
    /// locators become XPath; `scoped` makes them relative to a parent element.
    pub fn to_strategy(&self, scoped: bool) -> (&'static str, String) {
        match self {
            Locator::Css(selector) => ("css selector", selector.clone()),
            Locator::XPath(expression) => ("xpath", expression.clone()),
            Locator::Role { role, name, exact } => {
                let prefix = if scoped { "." } else { "" };
                let xpath = format!(
                    "{}//*[{} and ({})]",
                    prefix,
                    role.xpath_predicate(),
                    name_predicate(*role, name, *exact)
                );
                ("xpath", xpath)
            }
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Role { role, name, exact: true } => write!(f, "{:?} named exactly '{}'", role, name),
            Locator::Role { role, name, exact: false } => write!(f, "{:?} named '{}'", role, name),
            Locator::Css(selector) => write!(f, "css '{}'", selector),
            Locator::XPath(expression) => write!(f, "xpath '{}'", expression),
        }
    }
}

fn name_predicate(role: Role, name: &str, exact: bool) -> String {
    let literal = xpath_literal(name);
    let matches = |expr: &str| {
        if exact {
            format!("normalize-space({})={}", expr, literal)
        } else {
            format!("contains(normalize-space({}), {})", expr, literal)
        }
    };

    match role {
        // Form fields are named by their <label for=...>, aria-label or placeholder.
        Role::Textbox => format!(
            "{} or {} or @id=//label[{}]/@for",
            matches("@aria-label"),
            matches("@placeholder"),
            matches(".")
        ),
        Role::Table => format!("{} or caption[{}]", matches("@aria-label"), matches(".")),
        _ => format!("{} or {}", matches("."), matches("@aria-label")),
    }
}

/// Quotes a string for XPath 1.0, which has no escape sequences.
fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{}'", value)
    } else if !value.contains('"') {
        format!("\"{}\"", value)
    } else {
        format!("concat('{}')", value.split('\'').collect::<Vec<_>>().join("', \"'\", '"))
    }
}

/// Which of several matches an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    First,
    Last,
    Nth(usize),
}

impl Pick {
    pub fn select<T>(self, mut items: Vec<T>) -> Option<T> {
        match self {
            Pick::First if !items.is_empty() => Some(items.swap_remove(0)),
            Pick::Last => items.pop(),
            Pick::Nth(n) if n < items.len() => Some(items.swap_remove(n)),
            _ => None,
        }
    }
}

/// Opaque reference to a DOM element inside the current session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef(String);

impl ElementRef {
    pub fn new(id: impl Into<String>) -> Self {
        ElementRef(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementState {
    Visible,
    Detached,
}

#[async_trait]
pub trait Driver: Send {
    async fn goto(&mut self, url: &str) -> Result<(), DriverError>;
    async fn current_url(&mut self) -> Result<String, DriverError>;
    async fn find_all(&mut self, locator: &Locator) -> Result<Vec<ElementRef>, DriverError>;
    async fn find_all_within(&mut self, parent: &ElementRef, locator: &Locator) -> Result<Vec<ElementRef>, DriverError>;
    async fn click(&mut self, element: &ElementRef) -> Result<(), DriverError>;
    async fn fill(&mut self, element: &ElementRef, text: &str) -> Result<(), DriverError>;
    async fn input_value(&mut self, element: &ElementRef) -> Result<String, DriverError>;
    async fn text(&mut self, element: &ElementRef) -> Result<String, DriverError>;
    async fn inner_html(&mut self, element: &ElementRef) -> Result<String, DriverError>;
    async fn outer_html(&mut self, element: &ElementRef) -> Result<String, DriverError>;
    async fn is_displayed(&mut self, element: &ElementRef) -> Result<bool, DriverError>;
    /// `document.readyState` of the current page.
    async fn ready_state(&mut self) -> Result<String, DriverError>;

    async fn find(&mut self, locator: &Locator, pick: Pick) -> Result<ElementRef, DriverError> {
        let elements = self.find_all(locator).await?;
        pick.select(elements)
            .ok_or_else(|| DriverError::ElementNotFound(format!("{} ({:?})", locator, pick)))
    }

    async fn find_within(&mut self, parent: &ElementRef, locator: &Locator, pick: Pick) -> Result<ElementRef, DriverError> {
        let elements = self.find_all_within(parent, locator).await?;
        pick.select(elements)
            .ok_or_else(|| DriverError::ElementNotFound(format!("{} ({:?}) inside {}", locator, pick, parent.id())))
    }

    async fn wait_for_url(&mut self, url: &str, timeout: Duration) -> Result<(), DriverError> {
        let started = Instant::now();
        loop {
            let current = self.current_url().await?;
            if urls_match(&current, url) {
                return Ok(());
            }
            if started.elapsed() >= timeout {
                return Err(DriverError::Timeout {
                    condition: format!("URL {} (currently {})", url, current),
                    waited_ms: started.elapsed().as_millis(),
                });
            }
            tokio::time::sleep(POLL_INTERVAL.min(timeout.saturating_sub(started.elapsed()))).await;
        }
    }

    async fn wait_for_load_state(&mut self, timeout: Duration) -> Result<(), DriverError> {
        let started = Instant::now();
        loop {
            if self.ready_state().await? == "complete" {
                return Ok(());
            }
            if started.elapsed() >= timeout {
                return Err(DriverError::Timeout {
                    condition: "page load to complete".to_string(),
                    waited_ms: started.elapsed().as_millis(),
                });
            }
            tokio::time::sleep(POLL_INTERVAL.min(timeout.saturating_sub(started.elapsed()))).await;
        }
    }

    async fn wait_for(&mut self, locator: &Locator, state: ElementState, timeout: Duration) -> Result<(), DriverError> {
        let started = Instant::now();
        loop {
            if self.has_state(locator, state).await? {
                return Ok(());
            }
            if started.elapsed() >= timeout {
                return Err(DriverError::Timeout {
                    condition: format!("{} to be {:?}", locator, state),
                    waited_ms: started.elapsed().as_millis(),
                });
            }
            tokio::time::sleep(POLL_INTERVAL.min(timeout.saturating_sub(started.elapsed()))).await;
        }
    }

    async fn has_state(&mut self, locator: &Locator, state: ElementState) -> Result<bool, DriverError> {
        let elements = self.find_all(locator).await?;
        match state {
            ElementState::Detached => Ok(elements.is_empty()),
            ElementState::Visible => {
                for element in &elements {
                    match self.is_displayed(element).await {
                        Ok(true) => return Ok(true),
                        Ok(false) => {}
                        Err(e) if e.is_stale() => {}
                        Err(e) => return Err(e),
                    }
                }
                Ok(false)
            }
        }
    }
}

/// URLs compare equal when they differ only by a trailing slash.
pub fn urls_match(a: &str, b: &str) -> bool {
    a.trim_end_matches('/') == b.trim_end_matches('/')
}
