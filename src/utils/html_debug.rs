// src/utils/html_debug.rs
use std::fs;
use std::path::{Path, PathBuf};
use crate::storage::sanitize_file_name;
use crate::utils::error::StorageError;

/// Saves the markup of a detail view that could not be processed, prefixed
/// with a banner naming the reason, so selector drift can be inspected offline.
pub fn save_debug_html(dir: &Path, label: &str, reason: &str, html: &str) -> Result<PathBuf, StorageError> {
    fs::create_dir_all(dir)?;

    let mut debug_html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<style>\n");
    debug_html.push_str(".debug-banner { background-color: #FFC0CB; padding: 8px; font-family: monospace; }\n");
    debug_html.push_str("</style>\n</head>\n<body>\n");
    debug_html.push_str(&format!(
        "<div class=\"debug-banner\">{}: {}</div>\n",
        escape_text(label),
        escape_text(reason)
    ));
    debug_html.push_str(html);
    debug_html.push_str("\n</body>\n</html>");

    let path = dir.join(format!("{}.html", sanitize_file_name(label)));
    fs::write(&path, debug_html)?;

    tracing::info!("Saved debug HTML to {}", path.display());
    Ok(path)
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
