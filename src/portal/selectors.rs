// src/portal/selectors.rs
//! Where things live on the portal. Everything here mirrors the portal's
//! current markup (MUI components, labels in mixed English/Indonesian) and
//! is expected to drift when the portal changes.
use crate::driver::{Locator, Role};

pub const LOGIN_PATH: &str = "login/";
pub const INBOX_PATH: &str = "inbox/";

pub const EMAIL_FIELD: &str = "Email";
pub const PASSWORD_FIELD: &str = "Password";
pub const LOGIN_BUTTON: &str = "Login";
pub const INBOX_BUTTON: &str = "Inbox";
pub const PROCESSED_TAB: &str = "Sudah Diproses";
pub const FILTER_BUTTON: &str = "Filter";

pub const CHOOSE_DATE_BUTTON: &str = "Choose date";
pub const CALENDAR_LABEL_CSS: &str = ".MuiPickersCalendarHeader-label";
pub const NEXT_MONTH_BUTTON: &str = "Next month";
pub const PREVIOUS_MONTH_BUTTON: &str = "Previous month";

pub const DOCUMENT_TYPE_BUTTON: &str = "Document";
pub const LPJ_OPTION: &str = "LPJ";
pub const SEARCH_BUTTON: &str = "Search";
pub const LOADING_INDICATOR_CSS: &str = ".MuiCircularProgress-root";

pub const RESULT_LIST_XPATH: &str = "/html/body/div/div[2]/main/div[2]/div[1]/div[5]/div/div/ul";
pub const RESULT_ITEM_CSS: &str = "li";
/// Relative to one result item.
pub const ITEM_CODE_XPATH: &str = "./div/div/div[2]/div[1]/p[2]";

pub const SUBMITTED_BY_FIELD: &str = "Submitted By (Dikirim Oleh)";
pub const ACTIVITY_TYPE_FIELD: &str = "Activity Type (Tipe Aktivitas)";
pub const PROPOSAL_NAME_FIELD: &str = "Proposal Name";
pub const LPJ_DATE_FIELD: &str = "LPJ Date";
pub const ACTIVITY_TABLE: &str = "activity table";

pub fn button(name: &str) -> Locator {
    Locator::role(Role::Button, name)
}

pub fn exact_button(name: &str) -> Locator {
    Locator::exact_role(Role::Button, name)
}

pub fn textbox(name: &str) -> Locator {
    Locator::role(Role::Textbox, name)
}

pub fn calendar_label() -> Locator {
    Locator::css(CALENDAR_LABEL_CSS)
}

pub fn day_cell(day: u32) -> Locator {
    Locator::exact_role(Role::GridCell, day.to_string())
}

pub fn loading_indicator() -> Locator {
    Locator::css(LOADING_INDICATOR_CSS)
}

pub fn result_list() -> Locator {
    Locator::xpath(RESULT_LIST_XPATH)
}

pub fn result_items() -> Locator {
    Locator::css(RESULT_ITEM_CSS)
}

pub fn item_code() -> Locator {
    Locator::xpath(ITEM_CODE_XPATH)
}

pub fn detail_heading(code: &str) -> Locator {
    Locator::role(Role::Heading, code)
}

pub fn activity_table() -> Locator {
    Locator::role(Role::Table, ACTIVITY_TABLE)
}
