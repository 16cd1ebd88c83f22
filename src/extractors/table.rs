// src/extractors/table.rs

// --- Imports ---
use crate::extractors::currency::parse_amount;
use crate::portal::models::{ActivityRecord, ActivityRow};
use crate::utils::error::{ExtractError, TableError};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;

// --- Column Names ---
const ACTIVITY_NAME_COLUMN: &str = "Activity Name";
const PO_NAME_COLUMN: &str = "PO Name";
const TOTAL_COLUMN: &str = "Total";

// Present in the portal's table but irrelevant to the report.
const DISCARDED_COLUMNS: [&str; 12] = [
    "Activity Date",
    "Provinsi",
    "Kabupaten / Kota",
    "Description",
    "Total Activities",
    "UOM",
    "Amount/Activity",
    "Sub Total Activity",
    "Gifts",
    "Total Gifts Item",
    "Gift Amount",
    "Action",
];

// --- CSS Selectors (Lazy Static) ---
static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("tr").expect("Failed to compile ROW_SELECTOR")
});

static HEADER_CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("th").expect("Failed to compile HEADER_CELL_SELECTOR")
});

static DATA_CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("td").expect("Failed to compile DATA_CELL_SELECTOR")
});

// --- Regex Patterns (Lazy Static) ---
// Dropdown cells render the word "Select" alongside their value.
static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)select").expect("Failed to compile PLACEHOLDER_RE")
});

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("Failed to compile WHITESPACE_RE")
});

/// Turns the detail view's activity table into per-activity totals.
#[derive(Debug, Default)]
pub struct TableTransformer;

impl TableTransformer {
    pub fn new() -> Self { Self {} }

    /// Parses, cleans and aggregates one activity table.
    pub fn transform(&self, table_html: &str) -> Result<Vec<ActivityRecord>, ExtractError> {
        let rows = self.parse_rows(table_html)?;
        let records = aggregate(rows)?;
        tracing::debug!("Aggregated activity table into {} records", records.len());
        Ok(records)
    }

    /// Reads the data rows of the table, keeping only the aggregation columns.
    pub fn parse_rows(&self, table_html: &str) -> Result<Vec<ActivityRow>, ExtractError> {
        let fragment = Html::parse_fragment(table_html);

        let mut headers: Vec<String> = Vec::new();
        let mut data_rows: Vec<Vec<ElementRef>> = Vec::new();

        for row in fragment.select(&ROW_SELECTOR) {
            let header_cells: Vec<_> = row.select(&HEADER_CELL_SELECTOR).collect();
            if headers.is_empty() && !header_cells.is_empty() {
                headers = header_cells.iter().map(|cell| normalize_text(&cell_text(*cell))).collect();
                continue;
            }

            let cells: Vec<_> = row.select(&DATA_CELL_SELECTOR).collect();
            if cells.is_empty() {
                continue;
            }
            if cells.len() == 1 && cells[0].value().attr("colspan").is_some() {
                // "No data" style placeholder spanning the whole table
                tracing::debug!("Skipping placeholder row: '{}'", normalize_text(&cell_text(cells[0])));
                continue;
            }
            data_rows.push(cells);
        }

        if headers.is_empty() {
            return Err(TableError::Missing.into());
        }
        for header in &headers {
            let known = [ACTIVITY_NAME_COLUMN, PO_NAME_COLUMN, TOTAL_COLUMN].contains(&header.as_str())
                || DISCARDED_COLUMNS.contains(&header.as_str());
            if !known {
                tracing::debug!("Ignoring unexpected column '{}'", header);
            }
        }

        let activity_idx = column_index(&headers, ACTIVITY_NAME_COLUMN)?;
        let po_idx = column_index(&headers, PO_NAME_COLUMN)?;
        let total_idx = column_index(&headers, TOTAL_COLUMN)?;
        let needed = activity_idx.max(po_idx).max(total_idx) + 1;

        if data_rows.is_empty() {
            return Err(TableError::Empty.into());
        }

        let mut rows = Vec::with_capacity(data_rows.len());
        for (i, cells) in data_rows.iter().enumerate() {
            if cells.len() < needed {
                return Err(TableError::ShortRow { row: i + 1, found: cells.len(), expected: needed }.into());
            }
            rows.push(ActivityRow {
                activity_name: clean_label(&cell_text(cells[activity_idx])),
                po_name: clean_label(&cell_text(cells[po_idx])),
                total: parse_amount(&cell_text(cells[total_idx]))?,
            });
        }

        Ok(rows)
    }
}

/// Groups rows by `(activity_name, po_name)`, ordered by key.
pub fn aggregate(rows: Vec<ActivityRow>) -> Result<Vec<ActivityRecord>, ExtractError> {
    let mut groups: BTreeMap<(String, String), (i64, usize)> = BTreeMap::new();

    for row in rows {
        let key = (row.activity_name, row.po_name);
        let entry = groups.entry(key.clone()).or_insert((0, 0));
        entry.0 = entry.0.checked_add(row.total).ok_or_else(|| ExtractError::Overflow {
            activity_name: key.0,
            po_name: key.1,
        })?;
        entry.1 += 1;
    }

    Ok(groups
        .into_iter()
        .map(|((activity_name, po_name), (total, count))| ActivityRecord { activity_name, po_name, total, count })
        .collect())
}

fn column_index(headers: &[String], name: &str) -> Result<usize, TableError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| TableError::MissingColumn(name.to_string()))
}

fn cell_text(cell: ElementRef) -> String {
    cell.text().collect::<String>()
}

fn normalize_text(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

fn clean_label(text: &str) -> String {
    normalize_text(&PLACEHOLDER_RE.replace_all(text, ""))
}
