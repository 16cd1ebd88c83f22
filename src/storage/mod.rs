// src/storage/mod.rs
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use rust_xlsxwriter::{Format, Workbook};
use crate::portal::models::ExtractionResult;
use crate::utils::error::StorageError;

pub const REPORT_EXTENSION: &str = "xlsx";
pub const REPORT_HEADERS: [&str; 4] = ["Activity Name", "PO Name", "Total", "Count"];

// Spreadsheet cells hold f64; integers beyond 2^53 would be rounded.
const MAX_EXACT_CELL_INTEGER: i64 = 1 << 53;

/// Receives each extracted document as soon as it is ready.
pub trait ReportWriter {
    fn write(&mut self, result: &ExtractionResult) -> Result<PathBuf, StorageError>;
}

pub struct StorageManager {
    base_dir: PathBuf,
    written: HashSet<PathBuf>,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path, written: HashSet::new() })
    }

    /// Deletes everything in the output directory; reports are never merged
    /// with those of an earlier run. Returns the number of entries removed.
    pub fn clear(&mut self) -> Result<usize, StorageError> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if path.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
            tracing::debug!("Removed {}", path.display());
            removed += 1;
        }
        self.written.clear();
        Ok(removed)
    }

    pub fn report_path(&self, filename: &str) -> PathBuf {
        self.base_dir.join(format!("{}.{}", sanitize_file_name(filename), REPORT_EXTENSION))
    }
}

impl ReportWriter for StorageManager {
    /// Saves one document's records as a single-sheet workbook
    fn write(&mut self, result: &ExtractionResult) -> Result<PathBuf, StorageError> {
        let file_path = self.report_path(&result.filename);
        if !self.written.insert(file_path.clone()) {
            tracing::warn!("Two documents map to {}; keeping the later one", file_path.display());
        }

        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();
        let worksheet = workbook.add_worksheet();

        for (col, header) in REPORT_HEADERS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
        }
        for (i, record) in result.records.iter().enumerate() {
            let row = (i + 1) as u32;
            worksheet.write_string(row, 0, record.activity_name.as_str())?;
            worksheet.write_string(row, 1, record.po_name.as_str())?;
            worksheet.write_number(row, 2, exact_cell_number(REPORT_HEADERS[2], record.total)?)?;
            worksheet.write_number(row, 3, exact_cell_number(REPORT_HEADERS[3], record.count as i64)?)?;
        }

        workbook.save(&file_path)?;
        tracing::info!("Saved: {}", file_path.display());

        Ok(file_path)
    }
}

fn exact_cell_number(column: &'static str, value: i64) -> Result<f64, StorageError> {
    if value.unsigned_abs() > MAX_EXACT_CELL_INTEGER as u64 {
        return Err(StorageError::Precision { column, value });
    }
    Ok(value as f64)
}

/// Replaces characters that are not allowed in file names on common platforms.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}
