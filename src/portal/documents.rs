// src/portal/documents.rs
use std::time::Duration;
use crate::driver::{Driver, ElementRef, ElementState, Locator, Pick};
use crate::portal::models::{lpj_date_label, DocumentHandle, DocumentMetadata};
use crate::portal::selectors;
use crate::utils::error::{DocumentError, DriverError, TableError};

/// Lists the entries of the inbox once a search has finished loading.
pub struct DocumentEnumerator {
    timeout: Duration,
    start_timeout: Duration,
}

impl DocumentEnumerator {
    /// `start_timeout` bounds the wait for the search spinner to show up,
    /// `timeout` the wait for it to go away again.
    pub fn new(timeout: Duration, start_timeout: Duration) -> Self {
        Self { timeout, start_timeout }
    }

    /// Waits for the search to settle, then returns the visible entries in
    /// display order. Entries that appear or disappear afterwards are not seen.
    pub async fn list_documents<D: Driver>(&self, driver: &mut D) -> Result<Vec<DocumentHandle>, DriverError> {
        driver.wait_for_load_state(self.timeout).await?;

        // The inbox never reloads, so readyState is already "complete" and the
        // old list is still attached until the spinner shows up.
        let indicator = selectors::loading_indicator();
        match driver.wait_for(&indicator, ElementState::Visible, self.start_timeout).await {
            Ok(()) => tracing::debug!("Search started"),
            Err(DriverError::Timeout { .. }) => {
                tracing::debug!("No loading indicator within {:?}; assuming results are in", self.start_timeout)
            }
            Err(e) => return Err(e),
        }
        driver.wait_for(&indicator, ElementState::Detached, self.timeout).await?;

        let items = match result_items(driver).await? {
            Some(items) => items,
            None => {
                tracing::warn!("Result list not found; treating search as empty");
                return Ok(Vec::new());
            }
        };

        let mut handles = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let code_element = driver.find_within(item, &selectors::item_code(), Pick::First).await?;
            let code = driver.inner_html(&code_element).await?.trim().to_string();
            tracing::debug!("Found item {}: {}", index + 1, code);
            handles.push(DocumentHandle { index, code });
        }

        Ok(handles)
    }
}

async fn result_items<D: Driver>(driver: &mut D) -> Result<Option<Vec<ElementRef>>, DriverError> {
    let list = match driver.find_all(&selectors::result_list()).await?.into_iter().next() {
        Some(list) => list,
        None => return Ok(None),
    };
    Ok(Some(driver.find_all_within(&list, &selectors::result_items()).await?))
}

/// Opens one entry and reads its detail view.
pub struct DocumentExtractor {
    detail_timeout: Duration,
}

impl DocumentExtractor {
    pub fn new(detail_timeout: Duration) -> Self {
        Self { detail_timeout }
    }

    /// Clicks the entry at the handle's position in the result list.
    pub async fn open<D: Driver>(&self, driver: &mut D, handle: &DocumentHandle) -> Result<(), DocumentError> {
        let items = result_items(driver)
            .await?
            .ok_or_else(|| DriverError::ElementNotFound(selectors::RESULT_LIST_XPATH.to_string()))?;
        let item = Pick::Nth(handle.index)
            .select(items)
            .ok_or_else(|| DriverError::ElementNotFound(format!("result item {} ({})", handle.index + 1, handle.code)))?;
        driver.click(&item).await?;
        Ok(())
    }

    /// Waits for the detail view of `handle` and reads its identifying fields.
    pub async fn extract<D: Driver>(&self, driver: &mut D, handle: &DocumentHandle) -> Result<DocumentMetadata, DocumentError> {
        driver
            .wait_for(&selectors::detail_heading(&handle.code), ElementState::Visible, self.detail_timeout)
            .await
            .map_err(|e| match e {
                DriverError::Timeout { waited_ms, .. } => DocumentError::DetailLoadTimeout {
                    code: handle.code.clone(),
                    waited_ms,
                },
                other => DocumentError::Driver(other),
            })?;

        let submitted_by = read_field(driver, selectors::SUBMITTED_BY_FIELD, Pick::First).await?;
        let activity_type_primary = read_field(driver, selectors::ACTIVITY_TYPE_FIELD, Pick::Nth(0)).await?;
        let activity_type_secondary = read_field(driver, selectors::ACTIVITY_TYPE_FIELD, Pick::Nth(1)).await?;
        let proposal_name = read_field(driver, selectors::PROPOSAL_NAME_FIELD, Pick::First).await?;
        let raw_date = read_field(driver, selectors::LPJ_DATE_FIELD, Pick::First).await?;
        let lpj_date = lpj_date_label(&raw_date).ok_or(DocumentError::InvalidDate(raw_date))?;

        Ok(DocumentMetadata {
            submitted_by,
            activity_type_primary,
            activity_type_secondary,
            proposal_name,
            lpj_date,
        })
    }

    /// Outer HTML of the (last) activity table on the open detail view.
    pub async fn activity_table<D: Driver>(&self, driver: &mut D) -> Result<String, DocumentError> {
        let locator = selectors::activity_table();
        match driver.wait_for(&locator, ElementState::Visible, self.detail_timeout).await {
            Ok(()) => {}
            Err(DriverError::Timeout { .. }) => return Err(TableError::Missing.into()),
            Err(e) => return Err(e.into()),
        }
        let table = driver.find(&locator, Pick::Last).await?;
        Ok(driver.outer_html(&table).await?)
    }

    /// Full markup of the current page, for debug snapshots.
    pub async fn page_markup<D: Driver>(&self, driver: &mut D) -> Result<String, DriverError> {
        let body = driver.find(&Locator::css("body"), Pick::First).await?;
        driver.outer_html(&body).await
    }
}

async fn read_field<D: Driver>(driver: &mut D, label: &str, pick: Pick) -> Result<String, DriverError> {
    let field = driver.find(&selectors::textbox(label), pick).await?;
    Ok(driver.input_value(&field).await?.trim().to_string())
}
