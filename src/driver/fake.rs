// src/driver/fake.rs
//! In-memory stand-in for the portal, answering the same locators the real
//! components use. Element ids encode what they point at (`next:0`, `item:2`).
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use crate::driver::{urls_match, Driver, ElementRef, Locator, Role};
use crate::portal::selectors;
use crate::utils::error::DriverError;

pub const FAKE_BASE_URL: &str = "https://portal.test/";

#[derive(Debug, Clone)]
pub struct FakeCalendar {
    pub year: i32,
    pub month: u32,
    pub opened: bool,
    pub selected: Option<NaiveDate>,
}

impl FakeCalendar {
    pub fn showing(year: i32, month: u32) -> Self {
        Self { year, month, opened: false, selected: None }
    }

    fn label(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_default()
    }

    fn step(&mut self, forward: bool) {
        let first = NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap();
        let moved = if forward {
            first.checked_add_months(chrono::Months::new(1)).unwrap()
        } else {
            first.checked_sub_months(chrono::Months::new(1)).unwrap()
        };
        self.year = moved.year();
        self.month = moved.month();
    }
}

#[derive(Debug, Clone)]
pub struct FakeDocument {
    pub code: String,
    pub submitted_by: String,
    pub activity_types: [String; 2],
    pub proposal_name: String,
    pub lpj_date: String,
    pub table_html: Option<String>,
    /// When false the detail view never shows its heading.
    pub loads: bool,
}

impl FakeDocument {
    pub fn sample(code: &str) -> Self {
        Self {
            code: code.to_string(),
            submitted_by: "Agus".to_string(),
            activity_types: ["Marketing".to_string(), "Event".to_string()],
            proposal_name: format!("Proposal {}", code),
            lpj_date: "10/01/2024".to_string(),
            table_html: Some(sample_table(&[
                ("Pameran", "PO-1", "Rp\u{a0}1.000.000"),
                ("Pameran", "PO-1", "Rp\u{a0}500.000"),
            ])),
            loads: true,
        }
    }
}

/// Builds an activity table in the portal's column layout.
pub fn sample_table(rows: &[(&str, &str, &str)]) -> String {
    let headers = [
        "Activity Date", "Activity Name", "PO Name", "Provinsi", "Kabupaten / Kota", "Description",
        "Total Activities", "UOM", "Amount/Activity", "Sub Total Activity", "Gifts", "Total Gifts Item",
        "Gift Amount", "Total", "Action",
    ];
    let mut html = String::from(r#"<table aria-label="activity table"><thead><tr>"#);
    for header in headers {
        html.push_str(&format!("<th>{}</th>", header));
    }
    html.push_str("</tr></thead><tbody>");
    for (activity, po, total) in rows {
        html.push_str(&format!(
            "<tr><td>02/01/2024</td><td>{}<button>Select</button></td><td>{}</td><td>Jawa Barat</td>\
             <td>Bandung</td><td>-</td><td>1</td><td>Unit</td><td>Rp 0</td><td>Rp 0</td><td>-</td>\
             <td>0</td><td>Rp 0</td><td>{}</td><td>Edit</td></tr>",
            activity, po, total
        ));
    }
    html.push_str("</tbody></table>");
    html
}

pub struct FakePortal {
    pub base_url: String,
    pub current_url: String,
    pub logged_in: bool,
    pub calendars: [FakeCalendar; 2],
    pub documents: Vec<FakeDocument>,
    pub open_document: Option<usize>,
    pub searched: bool,
    /// Polls for which the loading indicator is still attached.
    pub loading_polls: usize,
    /// Value `loading_polls` is reset to when Search is clicked.
    pub search_loading_polls: usize,
    /// Indicator polls after Search before the request starts and the spinner attaches.
    pub search_start_polls: usize,
    pending_start_polls: usize,
    pub filled: HashMap<String, String>,
    pub clicks: Vec<String>,
}

impl FakePortal {
    pub fn with_documents(documents: Vec<FakeDocument>) -> Self {
        Self {
            base_url: FAKE_BASE_URL.to_string(),
            current_url: "about:blank".to_string(),
            logged_in: false,
            calendars: [FakeCalendar::showing(2023, 6), FakeCalendar::showing(2023, 6)],
            documents,
            open_document: None,
            searched: false,
            loading_polls: 0,
            search_loading_polls: 1,
            search_start_polls: 0,
            pending_start_polls: 0,
            filled: HashMap::new(),
            clicks: Vec::new(),
        }
    }

    fn start_search(&mut self) {
        self.searched = true;
        self.loading_polls = self.search_loading_polls;
    }

    fn loaded_document(&self) -> Option<(usize, &FakeDocument)> {
        let index = self.open_document?;
        self.documents.get(index).filter(|d| d.loads).map(|d| (index, d))
    }

    fn document(&self, id: &str) -> Result<&FakeDocument, DriverError> {
        id.split(':')
            .nth(1)
            .and_then(|i| i.parse::<usize>().ok())
            .and_then(|i| self.documents.get(i))
            .ok_or_else(|| missing(id))
    }

    fn calendar(&mut self, id: &str) -> Result<&mut FakeCalendar, DriverError> {
        let index = id.split(':').nth(1).and_then(|i| i.parse::<usize>().ok()).ok_or_else(|| missing(id))?;
        self.calendars.get_mut(index).ok_or_else(|| missing(id))
    }

    fn detail_field(&self, id: &str) -> Result<String, DriverError> {
        let document = self.document(id)?;
        let value = match id.rsplit(':').next() {
            Some("submitted") => document.submitted_by.clone(),
            Some("type0") => document.activity_types[0].clone(),
            Some("type1") => document.activity_types[1].clone(),
            Some("proposal") => document.proposal_name.clone(),
            Some("date") => document.lpj_date.clone(),
            _ => return Err(missing(id)),
        };
        Ok(value)
    }

    fn by_role(&self, role: Role, name: &str) -> Vec<String> {
        let pair = |prefix: &str| vec![format!("{}:0", prefix), format!("{}:1", prefix)];
        match (role, name) {
            (Role::Textbox, selectors::EMAIL_FIELD) => vec!["field:email".into()],
            (Role::Textbox, selectors::PASSWORD_FIELD) => vec!["field:password".into()],
            (Role::Button, selectors::LOGIN_BUTTON) => vec!["login".into()],
            (Role::Button, selectors::INBOX_BUTTON) => vec!["inbox".into()],
            (Role::Tab, selectors::PROCESSED_TAB) => vec!["tab:processed".into()],
            (Role::Button, selectors::FILTER_BUTTON) => vec!["filter".into()],
            (Role::Button, selectors::CHOOSE_DATE_BUTTON) => pair("choose"),
            (Role::Button, selectors::NEXT_MONTH_BUTTON) => pair("next"),
            (Role::Button, selectors::PREVIOUS_MONTH_BUTTON) => pair("prev"),
            (Role::GridCell, day) => match day.parse::<u32>() {
                Ok(d) if (1..=31).contains(&d) => vec![format!("day:0:{}", d), format!("day:1:{}", d)],
                _ => Vec::new(),
            },
            (Role::Button, selectors::DOCUMENT_TYPE_BUTTON) => vec!["doctype".into()],
            (Role::Option, selectors::LPJ_OPTION) => vec!["option:lpj".into()],
            (Role::Button, selectors::SEARCH_BUTTON) => vec!["search".into()],
            (Role::Heading, code) => match self.loaded_document() {
                Some((i, doc)) if doc.code.contains(code) => vec![format!("heading:{}", i)],
                _ => Vec::new(),
            },
            (Role::Textbox, label) => match self.loaded_document() {
                Some((i, _)) => match label {
                    selectors::SUBMITTED_BY_FIELD => vec![format!("detail:{}:submitted", i)],
                    selectors::ACTIVITY_TYPE_FIELD => vec![format!("detail:{}:type0", i), format!("detail:{}:type1", i)],
                    selectors::PROPOSAL_NAME_FIELD => vec![format!("detail:{}:proposal", i)],
                    selectors::LPJ_DATE_FIELD => vec![format!("detail:{}:date", i)],
                    _ => Vec::new(),
                },
                None => Vec::new(),
            },
            (Role::Table, selectors::ACTIVITY_TABLE) => match self.loaded_document() {
                Some((i, doc)) if doc.table_html.is_some() => vec![format!("table:{}", i)],
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }
}

fn missing(id: &str) -> DriverError {
    DriverError::WebDriver { error: "no such element".to_string(), message: format!("fake element '{}'", id) }
}

fn refs(ids: Vec<String>) -> Vec<ElementRef> {
    ids.into_iter().map(ElementRef::new).collect()
}

#[async_trait]
impl Driver for FakePortal {
    async fn goto(&mut self, url: &str) -> Result<(), DriverError> {
        self.current_url = if urls_match(url, &self.base_url) && !self.logged_in {
            format!("{}{}", self.base_url, selectors::LOGIN_PATH)
        } else {
            url.to_string()
        };
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, DriverError> {
        Ok(self.current_url.clone())
    }

    async fn find_all(&mut self, locator: &Locator) -> Result<Vec<ElementRef>, DriverError> {
        let ids = match locator {
            Locator::Role { role, name, .. } => self.by_role(*role, name),
            Locator::Css(css) if css == selectors::CALENDAR_LABEL_CSS => vec!["label:0".into(), "label:1".into()],
            Locator::Css(css) if css == selectors::LOADING_INDICATOR_CSS => {
                if self.pending_start_polls > 0 {
                    self.pending_start_polls -= 1;
                    if self.pending_start_polls == 0 {
                        self.start_search();
                    }
                    Vec::new()
                } else if self.loading_polls > 0 {
                    self.loading_polls -= 1;
                    vec!["spinner".into()]
                } else {
                    Vec::new()
                }
            }
            Locator::Css(css) if css == "body" => vec!["body".into()],
            Locator::XPath(xpath) if xpath == selectors::RESULT_LIST_XPATH && self.searched => vec!["list".into()],
            _ => Vec::new(),
        };
        Ok(refs(ids))
    }

    async fn find_all_within(&mut self, parent: &ElementRef, locator: &Locator) -> Result<Vec<ElementRef>, DriverError> {
        let ids = match (parent.id(), locator) {
            ("list", Locator::Css(css)) if css == selectors::RESULT_ITEM_CSS => {
                (0..self.documents.len()).map(|i| format!("item:{}", i)).collect()
            }
            (item, Locator::XPath(xpath)) if item.starts_with("item:") && xpath == selectors::ITEM_CODE_XPATH => {
                vec![item.replacen("item:", "code:", 1)]
            }
            _ => Vec::new(),
        };
        Ok(refs(ids))
    }

    async fn click(&mut self, element: &ElementRef) -> Result<(), DriverError> {
        let id = element.id().to_string();
        match id.split(':').collect::<Vec<_>>().as_slice() {
            ["choose", _] => self.calendar(&id)?.opened = true,
            ["next", _] => self.calendar(&id)?.step(true),
            ["prev", _] => self.calendar(&id)?.step(false),
            ["day", k, d] => {
                let day: u32 = d.parse().map_err(|_| missing(&id))?;
                let calendar = self.calendar(&format!("day:{}", k))?;
                calendar.selected = NaiveDate::from_ymd_opt(calendar.year, calendar.month, day);
            }
            ["login"] => {
                self.logged_in = true;
                self.current_url = self.base_url.clone();
            }
            ["inbox"] => self.current_url = format!("{}{}", self.base_url, selectors::INBOX_PATH),
            ["search"] if self.search_start_polls > 0 => self.pending_start_polls = self.search_start_polls,
            ["search"] => self.start_search(),
            ["item", i] => {
                let index: usize = i.parse().map_err(|_| missing(&id))?;
                if index >= self.documents.len() {
                    return Err(missing(&id));
                }
                self.open_document = Some(index);
            }
            _ => {}
        }
        self.clicks.push(id);
        Ok(())
    }

    async fn fill(&mut self, element: &ElementRef, text: &str) -> Result<(), DriverError> {
        self.filled.insert(element.id().to_string(), text.to_string());
        Ok(())
    }

    async fn input_value(&mut self, element: &ElementRef) -> Result<String, DriverError> {
        let id = element.id();
        if id.starts_with("detail:") {
            return self.detail_field(id);
        }
        self.filled.get(id).cloned().ok_or_else(|| missing(id))
    }

    async fn text(&mut self, element: &ElementRef) -> Result<String, DriverError> {
        let id = element.id().to_string();
        if id.starts_with("label:") {
            return Ok(self.calendar(&id)?.label());
        }
        Err(missing(&id))
    }

    async fn inner_html(&mut self, element: &ElementRef) -> Result<String, DriverError> {
        let id = element.id();
        if id.starts_with("code:") {
            return Ok(format!(" {} ", self.document(id)?.code));
        }
        Err(missing(id))
    }

    async fn outer_html(&mut self, element: &ElementRef) -> Result<String, DriverError> {
        let id = element.id();
        if id == "body" {
            return Ok("<body><main>fake detail view</main></body>".to_string());
        }
        if id.starts_with("table:") {
            return self.document(id)?.table_html.clone().ok_or_else(|| missing(id));
        }
        Err(missing(id))
    }

    async fn is_displayed(&mut self, _element: &ElementRef) -> Result<bool, DriverError> {
        Ok(true)
    }

    async fn ready_state(&mut self) -> Result<String, DriverError> {
        Ok("complete".to_string())
    }
}
