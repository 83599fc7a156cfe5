//! Tabular ingestion: spreadsheets, comma-delimited and tab-delimited text.
//!
//! The input format is chosen from the file extension. Every format yields an
//! ordered [`ProjectTable`] whose first source row is the header. Ingestion
//! checks for the expected project columns but never rejects a table for
//! lacking them; see [`missing_columns`].

mod delimited;
mod spreadsheet;

use std::fmt;
use std::path::Path;

use tracing::{info, instrument, warn};

use summarygen_shared::{ProjectTable, Result, SummaryError, expected_columns};

pub use delimited::parse_delimited;
pub use spreadsheet::read_workbook;

// ---------------------------------------------------------------------------
// SourceFormat
// ---------------------------------------------------------------------------

/// Supported input encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Excel workbook (`.xlsx`).
    Xlsx,
    /// Comma-delimited text (`.csv`).
    Csv,
    /// Tab-delimited text (`.txt`).
    Tsv,
}

impl SourceFormat {
    /// Pick the format from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "xlsx" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            "txt" => Ok(Self::Tsv),
            _ => Err(SummaryError::UnsupportedFormat { extension: ext }),
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
            Self::Tsv => "tsv",
        })
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Options for [`load_table`].
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Worksheet to read from workbooks (first sheet when `None`).
    pub sheet: Option<String>,
}

/// A loaded table plus the soft-validation outcome.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub format: SourceFormat,
    pub table: ProjectTable,
    /// Expected columns absent from the header, in canonical order.
    pub missing_columns: Vec<&'static str>,
}

impl IngestReport {
    /// User-facing warning text when columns are missing.
    pub fn warning(&self) -> Option<String> {
        if self.missing_columns.is_empty() {
            return None;
        }
        Some(format!(
            "input is missing expected columns: {}. Generation will continue, \
             but missing fields will use fallback text.",
            self.missing_columns.join(", ")
        ))
    }
}

/// Load a table from disk, choosing the parser by file extension.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_table(path: &Path, opts: &IngestOptions) -> Result<IngestReport> {
    let format = SourceFormat::from_path(path)?;

    let table = match format {
        SourceFormat::Xlsx => read_workbook(path, opts.sheet.as_deref())?,
        SourceFormat::Csv | SourceFormat::Tsv => {
            let bytes = std::fs::read(path).map_err(|e| SummaryError::io(path, e))?;
            let content = delimited::decode(bytes);
            let delimiter = if format == SourceFormat::Csv { b',' } else { b'\t' };
            parse_delimited(&content, delimiter)?
        }
    };

    let missing = missing_columns(&table);
    if !missing.is_empty() {
        warn!(missing = ?missing, "input is missing expected columns");
    }

    info!(
        %format,
        rows = table.rows.len(),
        columns = table.columns.len(),
        "table loaded"
    );

    Ok(IngestReport {
        format,
        table,
        missing_columns: missing,
    })
}

/// Expected project columns that the table's header does not contain.
pub fn missing_columns(table: &ProjectTable) -> Vec<&'static str> {
    expected_columns()
        .filter(|col| !table.has_column(col))
        .collect()
}
