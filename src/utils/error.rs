// src/utils/error.rs
use std::num::ParseIntError;
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error {status}: {body}")]
    Http { status: reqwest::StatusCode, body: String },

    #[error("WebDriver error '{error}': {message}")]
    WebDriver { error: String, message: String },

    #[error("No element matches {0}")]
    ElementNotFound(String),

    #[error("Timed out after {waited_ms} ms waiting for {condition}")]
    Timeout { condition: String, waited_ms: u128 },

    #[error("Malformed WebDriver response: {0}")]
    Protocol(String),
}

impl DriverError {
    /// Stale or detached references are expected while the page re-renders.
    pub fn is_stale(&self) -> bool {
        matches!(self, DriverError::WebDriver { error, .. }
            if error == "stale element reference" || error == "no such element")
    }
}

#[derive(Error, Debug)]
pub enum NavigationError {
    #[error("Calendar did not reach {target} within {steps} steps")]
    StepLimitExceeded { target: String, steps: usize },

    #[error("Could not read calendar label '{0}' as a month and year")]
    UnreadableLabel(String),

    #[error("Calendar interaction failed: {0}")]
    Driver(#[from] DriverError),
}

/// A monetary cell that did not reduce to an integer.
#[derive(Error, Debug)]
#[error("Could not parse amount '{raw}': {source}")]
pub struct CurrencyError {
    pub raw: String,
    #[source]
    pub source: ParseIntError,
}

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Activity table not found")]
    Missing,

    #[error("Activity table has no data rows")]
    Empty,

    #[error("Activity table is missing column '{0}'")]
    MissingColumn(String),

    #[error("Activity table row {row} has {found} cells, expected at least {expected}")]
    ShortRow { row: usize, found: usize, expected: usize },
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Currency(#[from] CurrencyError),

    #[error("Total for '{activity_name}' / '{po_name}' overflows")]
    Overflow { activity_name: String, po_name: String },
}

/// How the pipeline treats a failure of one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Skip the document and continue with the next one.
    Skip,
    /// Abort the whole run.
    Fatal,
}

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Detail view for '{code}' did not load within {waited_ms} ms")]
    DetailLoadTimeout { code: String, waited_ms: u128 },

    #[error("Activity table unusable: {0}")]
    Table(#[from] TableError),

    #[error("Amount parsing failed: {0}")]
    Parse(#[from] CurrencyError),

    #[error("Aggregation failed: {0}")]
    Aggregation(String),

    #[error("Invalid LPJ date '{0}'")]
    InvalidDate(String),

    #[error("Portal interaction failed: {0}")]
    Driver(#[from] DriverError),
}

impl DocumentError {
    pub fn severity(&self) -> Severity {
        match self {
            DocumentError::DetailLoadTimeout { .. } | DocumentError::Table(_) => Severity::Skip,
            DocumentError::Parse(_)
            | DocumentError::Aggregation(_)
            | DocumentError::InvalidDate(_)
            | DocumentError::Driver(_) => Severity::Fatal,
        }
    }
}

impl From<ExtractError> for DocumentError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Table(e) => DocumentError::Table(e),
            ExtractError::Currency(e) => DocumentError::Parse(e),
            overflow @ ExtractError::Overflow { .. } => DocumentError::Aggregation(overflow.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("{column} value {value} cannot be stored exactly in a spreadsheet cell")]
    Precision { column: &'static str, value: i64 },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Portal interaction failed: {0}")]
    Driver(#[from] DriverError),

    #[error("Date filter failed: {0}")]
    Navigation(#[from] NavigationError),

    #[error("Document processing failed: {0}")]
    Document(#[from] DocumentError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
