// src/portal/calendar.rs
//! Date-range filter navigation.
//!
//! The filter panel has two date pickers. Each shows one month at a time with
//! previous/next controls, so reaching an arbitrary date means stepping month
//! by month until the header label matches the target month and year, then
//! clicking the day cell. Stepping is capped: a widget that never reaches the
//! target (stuck label, unexpected format) ends in `NavigationError` instead of
//! looping forever.
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use std::cmp::Ordering;
use std::time::{Duration, Instant};
use crate::driver::{Driver, Pick};
use crate::portal::models::DateRange;
use crate::portal::selectors;
use crate::utils::error::NavigationError;

const LABEL_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// One month-at-a-time date picker.
#[async_trait]
pub trait CalendarWidget: Send {
    async fn open(&mut self) -> Result<(), NavigationError>;
    /// Header label of the displayed month, e.g. "January 2024".
    async fn current_label(&mut self) -> Result<String, NavigationError>;
    async fn next_month(&mut self) -> Result<(), NavigationError>;
    async fn previous_month(&mut self) -> Result<(), NavigationError>;
    async fn select_day(&mut self, day: u32) -> Result<(), NavigationError>;
}

/// Parses a header label into `(year, month)`.
pub fn parse_label(label: &str) -> Result<(i32, u32), NavigationError> {
    let trimmed = label.trim();
    NaiveDate::parse_from_str(&format!("1 {}", trimmed), "%d %B %Y")
        .map(|date| (date.year(), date.month()))
        .map_err(|_| NavigationError::UnreadableLabel(trimmed.to_string()))
}

pub struct DateRangeNavigator {
    max_steps: usize,
}

impl DateRangeNavigator {
    pub fn new(max_steps: usize) -> Self {
        Self { max_steps }
    }

    /// Steps `widget` to the month of `target` and clicks its day.
    /// Returns the number of month clicks used.
    pub async fn select_date<W>(&self, widget: &mut W, target: NaiveDate) -> Result<usize, NavigationError>
    where
        W: CalendarWidget + ?Sized,
    {
        widget.open().await?;
        let goal = (target.year(), target.month());

        for steps in 0..=self.max_steps {
            let shown = parse_label(&widget.current_label().await?)?;
            match shown.cmp(&goal) {
                Ordering::Equal => {
                    widget.select_day(target.day()).await?;
                    tracing::debug!("Selected {} after {} month steps", target, steps);
                    return Ok(steps);
                }
                _ if steps == self.max_steps => break,
                Ordering::Less => widget.next_month().await?,
                Ordering::Greater => widget.previous_month().await?,
            }
        }

        Err(NavigationError::StepLimitExceeded {
            target: target.format("%B %Y").to_string(),
            steps: self.max_steps,
        })
    }

    /// Drives the "from" (first) and "to" (last) pickers of the filter panel.
    pub async fn select_range<D: Driver>(
        &self,
        driver: &mut D,
        range: &DateRange,
        settle_timeout: Duration,
    ) -> Result<(), NavigationError> {
        tracing::info!(
            "Setting date filter {} .. {}",
            range.from().format("%d/%m/%Y"),
            range.to().format("%d/%m/%Y")
        );

        let mut from_picker = PortalCalendar::new(&mut *driver, Pick::First, settle_timeout);
        self.select_date(&mut from_picker, range.from()).await?;

        let mut to_picker = PortalCalendar::new(&mut *driver, Pick::Last, settle_timeout);
        self.select_date(&mut to_picker, range.to()).await?;
        Ok(())
    }
}

/// A picker on the live page, identified by its position among the pickers.
pub struct PortalCalendar<'a, D: Driver> {
    driver: &'a mut D,
    position: Pick,
    settle_timeout: Duration,
}

impl<'a, D: Driver> PortalCalendar<'a, D> {
    pub fn new(driver: &'a mut D, position: Pick, settle_timeout: Duration) -> Self {
        Self { driver, position, settle_timeout }
    }

    async fn click_control(&mut self, name: &str) -> Result<(), NavigationError> {
        let before = self.current_label().await?;
        let control = self.driver.find(&selectors::button(name), self.position).await?;
        self.driver.click(&control).await?;

        // The header re-renders asynchronously; compare against a stale label
        // and the next step would overshoot.
        let started = Instant::now();
        while started.elapsed() < self.settle_timeout {
            if self.current_label().await? != before {
                return Ok(());
            }
            tokio::time::sleep(LABEL_POLL_INTERVAL).await;
        }
        tracing::debug!("Calendar label stayed at '{}' after '{}'", before, name);
        Ok(())
    }
}

#[async_trait]
impl<'a, D: Driver> CalendarWidget for PortalCalendar<'a, D> {
    async fn open(&mut self) -> Result<(), NavigationError> {
        let button = self.driver.find(&selectors::button(selectors::CHOOSE_DATE_BUTTON), self.position).await?;
        self.driver.click(&button).await?;
        Ok(())
    }

    async fn current_label(&mut self) -> Result<String, NavigationError> {
        let label = self.driver.find(&selectors::calendar_label(), self.position).await?;
        Ok(self.driver.text(&label).await?.trim().to_string())
    }

    async fn next_month(&mut self) -> Result<(), NavigationError> {
        self.click_control(selectors::NEXT_MONTH_BUTTON).await
    }

    async fn previous_month(&mut self) -> Result<(), NavigationError> {
        self.click_control(selectors::PREVIOUS_MONTH_BUTTON).await
    }

    async fn select_day(&mut self, day: u32) -> Result<(), NavigationError> {
        let cell = self.driver.find(&selectors::day_cell(day), self.position).await?;
        self.driver.click(&cell).await?;
        Ok(())
    }
}
