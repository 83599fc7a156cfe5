//! Artifact file names and per-row listing labels.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use summarygen_docx::DOCX_EXTENSION;
use summarygen_shared::{Field, ProjectRecord};

/// File name of the combined document.
pub const COMBINED_FILE_NAME: &str = "All_Project_Summaries.docx";

/// Characters that are unsafe in file names on common filesystems.
static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[/\\:*?"<>|\x00-\x1f]"#).expect("valid regex"));

/// Row label: the trimmed project number, or `row-{index}` when it is
/// missing or blank.
pub fn record_label(record: &ProjectRecord, index: usize) -> String {
    match record.get(Field::PNumber).map(str::trim) {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => format!("row-{index}"),
    }
}

/// `Project_{label}.docx`, with path-hostile characters replaced by `_`.
pub fn record_file_name(record: &ProjectRecord, index: usize) -> String {
    let label = record_label(record, index);
    let safe = UNSAFE_FILENAME_CHARS.replace_all(&label, "_");
    format!("Project_{safe}.{DOCX_EXTENSION}")
}

/// One line of the project listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowSummary {
    /// Zero-based position in the input table.
    pub index: usize,
    pub label: String,
    pub title: String,
    pub file_name: String,
}

/// Listing entries for every record, in table order.
pub fn summarize_rows(records: &[ProjectRecord]) -> Vec<RowSummary> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| RowSummary {
            index,
            label: record_label(record, index),
            title: record.resolve(Field::ShortDescription).to_string(),
            file_name: record_file_name(record, index),
        })
        .collect()
}
