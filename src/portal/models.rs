// src/portal/models.rs
use chrono::{Datelike, NaiveDate};
use crate::utils::error::AppError;

/// Input format of CLI dates and of the portal's LPJ Date field.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Inclusive date filter applied to the inbox search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, AppError> {
        if from > to {
            return Err(AppError::Config(format!(
                "Start date {} is after end date {}",
                from.format(DATE_FORMAT),
                to.format(DATE_FORMAT)
            )));
        }
        Ok(Self { from, to })
    }

    /// Parses both endpoints as `DD/MM/YYYY`.
    pub fn parse(from: &str, to: &str) -> Result<Self, AppError> {
        Self::new(parse_date(from)?, parse_date(to)?)
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|e| AppError::Config(format!("Invalid date '{}' (expected DD/MM/YYYY): {}", raw, e)))
}

/// One entry of the filtered result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHandle {
    /// Zero-based position in the result list at enumeration time.
    pub index: usize,
    /// Display code shown on the entry and as the detail view heading.
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub submitted_by: String,
    pub activity_type_primary: String,
    pub activity_type_secondary: String,
    pub proposal_name: String,
    /// `"YYYY - MonthName"`, derived from the portal's `DD/MM/YYYY` value.
    pub lpj_date: String,
}

impl DocumentMetadata {
    pub fn filename(&self) -> String {
        format!(
            "{} - {} - {} - {} - {}",
            self.lpj_date,
            self.submitted_by,
            self.activity_type_primary,
            self.activity_type_secondary,
            self.proposal_name
        )
    }
}

/// Reformats a `DD/MM/YYYY` date as `"YYYY - MonthName"`.
pub fn lpj_date_label(raw: &str) -> Option<String> {
    let date = NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()?;
    Some(format!("{} - {}", date.year(), date.format("%B")))
}

/// Table row before aggregation; only the columns that survive cleaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRow {
    pub activity_name: String,
    pub po_name: String,
    pub total: i64,
}

/// Rows sharing `(activity_name, po_name)` summed together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRecord {
    pub activity_name: String,
    pub po_name: String,
    pub total: i64,
    pub count: usize,
}

/// What gets written for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub filename: String,
    pub records: Vec<ActivityRecord>,
}
