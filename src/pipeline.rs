// src/pipeline.rs
use std::path::PathBuf;
use crate::driver::{Driver, Locator, Pick, Role};
use crate::extractors::TableTransformer;
use crate::portal::calendar::DateRangeNavigator;
use crate::portal::documents::{DocumentEnumerator, DocumentExtractor};
use crate::portal::models::{DateRange, DocumentHandle, ExtractionResult};
use crate::portal::{selectors, PortalConfig};
use crate::storage::ReportWriter;
use crate::utils::error::{AppError, DocumentError, DriverError, Severity};
use crate::utils::html_debug;

/// Filters the inbox to a date range and turns every LPJ found into a report.
///
/// Documents are processed one at a time on the single browser session. A
/// document whose detail view never loads, or whose activity table is absent
/// or unusable, is skipped with a warning. Anything else, including an amount
/// that does not parse, stops the run: a wrong total is worse than a missing
/// report.
pub struct ExtractionPipeline<'a, D: Driver, W: ReportWriter> {
    driver: &'a mut D,
    writer: &'a mut W,
    config: &'a PortalConfig,
    transformer: TableTransformer,
    debug_dir: Option<PathBuf>,
}

impl<'a, D: Driver, W: ReportWriter> ExtractionPipeline<'a, D, W> {
    pub fn new(driver: &'a mut D, writer: &'a mut W, config: &'a PortalConfig) -> Self {
        Self { driver, writer, config, transformer: TableTransformer::new(), debug_dir: None }
    }

    /// Saves the page markup of every skipped document into `dir`.
    pub fn with_debug_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.debug_dir = dir;
        self
    }

    pub async fn run(&mut self, range: &DateRange) -> Result<Vec<ExtractionResult>, AppError> {
        // 1. Date filter, document type, search
        DateRangeNavigator::new(self.config.max_calendar_steps)
            .select_range(&mut *self.driver, range, self.config.label_settle_timeout)
            .await?;
        self.search_lpj().await?;

        // 2. Enumerate once; the list is not refreshed during the run
        let documents = DocumentEnumerator::new(self.config.page_timeout, self.config.search_start_timeout)
            .list_documents(&mut *self.driver)
            .await?;
        let total = documents.len();
        tracing::info!("Found {} items to process.", total);

        // 3. Process each document in order
        let extractor = DocumentExtractor::new(self.config.detail_timeout);
        let mut results = Vec::with_capacity(total);
        let mut skipped = 0;

        for handle in &documents {
            tracing::info!("Processing item {}/{}: {}", handle.index + 1, total, handle.code);

            let mut label = handle.code.clone();
            match self.process_document(&extractor, handle, &mut label).await {
                Ok(result) => {
                    self.writer.write(&result)?;
                    results.push(result);
                }
                Err(error) if error.severity() == Severity::Skip => {
                    tracing::warn!("Skipping item {}: {} ({})", handle.index + 1, label, error);
                    skipped += 1;
                    self.save_snapshot(&extractor, handle, &label, &error).await;
                }
                Err(error) => {
                    tracing::error!("Item {} failed: {} ({})", handle.index + 1, label, error);
                    return Err(error.into());
                }
            }
        }

        tracing::info!("Processing finished. Extracted: {}, Skipped: {}", results.len(), skipped);
        Ok(results)
    }

    async fn search_lpj(&mut self) -> Result<(), DriverError> {
        let document_type = self.driver.find(&selectors::exact_button(selectors::DOCUMENT_TYPE_BUTTON), Pick::First).await?;
        self.driver.click(&document_type).await?;
        let lpj = self.driver.find(&Locator::role(Role::Option, selectors::LPJ_OPTION), Pick::First).await?;
        self.driver.click(&lpj).await?;
        let search = self.driver.find(&selectors::button(selectors::SEARCH_BUTTON), Pick::First).await?;
        self.driver.click(&search).await?;
        Ok(())
    }

    /// `label` starts as the display code and becomes the filename once the
    /// metadata is known, so failures can be reported as precisely as possible.
    async fn process_document(
        &mut self,
        extractor: &DocumentExtractor,
        handle: &DocumentHandle,
        label: &mut String,
    ) -> Result<ExtractionResult, DocumentError> {
        extractor.open(&mut *self.driver, handle).await?;
        let metadata = extractor.extract(&mut *self.driver, handle).await?;
        let filename = metadata.filename();
        *label = filename.clone();

        let table_html = extractor.activity_table(&mut *self.driver).await?;
        let records = self.transformer.transform(&table_html)?;

        Ok(ExtractionResult { filename, records })
    }

    async fn save_snapshot(&mut self, extractor: &DocumentExtractor, handle: &DocumentHandle, label: &str, error: &DocumentError) {
        let Some(dir) = self.debug_dir.clone() else { return };

        let name = format!("item {} - {}", handle.index + 1, label);
        let saved = match extractor.page_markup(&mut *self.driver).await {
            Ok(markup) => html_debug::save_debug_html(&dir, &name, &error.to_string(), &markup).map(|_| ()),
            Err(e) => {
                tracing::warn!("Could not capture page for debugging: {}", e);
                Ok(())
            }
        };
        if let Err(e) = saved {
            tracing::warn!("Failed to save debug snapshot: {}", e);
        }
    }
}
