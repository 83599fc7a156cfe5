//! End-to-end workflows: input file → table → records → documents.

use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use summarygen_docx::{from_docx, preview_text};
use summarygen_ingest::{IngestOptions, IngestReport, load_table};
use summarygen_shared::{ProjectRecord, Result, SummaryError};

use crate::builder::{RenderOptions, render_record};
use crate::export::{ExportConfig, ExportResult, ProgressReporter, export};
use crate::naming::{RowSummary, summarize_rows};

/// Configuration for [`generate`].
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Input table (`.xlsx`, `.csv` or `.txt`).
    pub input: PathBuf,
    pub ingest: IngestOptions,
    pub export: ExportConfig,
}

/// Result of [`generate`].
#[derive(Debug)]
pub struct GenerateResult {
    /// Expected columns the input lacked.
    pub missing_columns: Vec<&'static str>,
    /// Warning text for the missing columns, if any.
    pub warning: Option<String>,
    pub record_count: usize,
    pub export: ExportResult,
}

/// A loaded input: the ingestion report plus its records in table order.
#[derive(Debug, Clone)]
pub struct LoadedInput {
    pub report: IngestReport,
    pub records: Vec<ProjectRecord>,
}

/// Load an input table and convert its rows to records.
pub fn load_records(path: &Path, opts: &IngestOptions) -> Result<LoadedInput> {
    let report = load_table(path, opts)?;
    let records = report.table.records();
    Ok(LoadedInput { report, records })
}

/// Run the full `generate` workflow.
///
/// 1. Load and soft-validate the table
/// 2. Convert rows to records
/// 3. Render and write the selected artifacts plus `manifest.json`
#[instrument(skip_all, fields(input = %config.input.display()))]
pub fn generate(config: &GenerateConfig, progress: &dyn ProgressReporter) -> Result<GenerateResult> {
    progress.phase("Reading input table");
    let loaded = load_records(&config.input, &config.ingest)?;

    let exported = export(&config.export, &loaded.records, progress)?;

    info!(
        records = loaded.records.len(),
        artifacts = exported.artifacts.len(),
        "generation complete"
    );

    Ok(GenerateResult {
        warning: loaded.report.warning(),
        missing_columns: loaded.report.missing_columns,
        record_count: loaded.records.len(),
        export: exported,
    })
}

/// Listing entries for an input file.
pub fn list_rows(path: &Path, opts: &IngestOptions) -> Result<(IngestReport, Vec<RowSummary>)> {
    let loaded = load_records(path, opts)?;
    let rows = summarize_rows(&loaded.records);
    Ok((loaded.report, rows))
}

/// Render one record's document and read its text back for display.
///
/// The text is extracted from the serialized artifact rather than the
/// in-memory model, so the preview shows exactly what the file contains.
pub fn preview_record(
    records: &[ProjectRecord],
    index: usize,
    opts: &RenderOptions,
) -> Result<String> {
    let record = records.get(index).ok_or_else(|| {
        SummaryError::validation(format!(
            "row {index} is out of range (table has {} rows)",
            records.len()
        ))
    })?;

    let bytes = render_record(record, opts)?;
    let doc = from_docx(&bytes)?;
    Ok(preview_text(&doc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::SilentProgress;
    use crate::naming::COMBINED_FILE_NAME;
    use summarygen_shared::Emit;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(name)
    }

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("summarygen-pipeline-test-{}", uuid::Uuid::now_v7()))
    }

    #[test]
    fn generate_from_csv_fixture() {
        let tmp = temp_dir();
        let config = GenerateConfig {
            input: fixture("projects.csv"),
            ingest: IngestOptions::default(),
            export: ExportConfig {
                output_dir: tmp.clone(),
                emit: Emit::All,
                render: RenderOptions::default(),
                tool_version: "0.1.0-test".into(),
            },
        };

        let result = generate(&config, &SilentProgress).unwrap();
        assert_eq!(result.record_count, 3);
        assert!(result.warning.is_none());
        assert_eq!(result.export.artifacts.len(), 4);
        assert!(tmp.join("Project_P100.docx").exists());
        assert!(tmp.join(COMBINED_FILE_NAME).exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn generate_with_missing_columns_still_succeeds() {
        let tmp = temp_dir();
        let config = GenerateConfig {
            input: fixture("partial.txt"),
            ingest: IngestOptions::default(),
            export: ExportConfig {
                output_dir: tmp.clone(),
                emit: Emit::Records,
                render: RenderOptions::default(),
                tool_version: "0.1.0-test".into(),
            },
        };

        let result = generate(&config, &SilentProgress).unwrap();
        assert!(result.missing_columns.contains(&"completion_code"));
        assert!(result.warning.is_some());
        assert_eq!(result.record_count, 2);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn unsupported_input_generates_nothing() {
        let tmp = temp_dir();
        let config = GenerateConfig {
            input: PathBuf::from("projects.json"),
            ingest: IngestOptions::default(),
            export: ExportConfig {
                output_dir: tmp.clone(),
                emit: Emit::All,
                render: RenderOptions::default(),
                tool_version: "0.1.0-test".into(),
            },
        };

        let err = generate(&config, &SilentProgress).unwrap_err();
        assert!(matches!(err, SummaryError::UnsupportedFormat { .. }));
        assert!(!tmp.exists());
    }

    #[test]
    fn list_rows_from_fixture() {
        let (report, rows) = list_rows(&fixture("projects.csv"), &IngestOptions::default()).unwrap();
        assert!(report.missing_columns.is_empty());
        let labels: Vec<_> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["P100", "P200", "row-2"]);
        assert_eq!(rows[2].title, "No title provided");
    }

    #[test]
    fn preview_reads_back_rendered_text() {
        let loaded = load_records(&fixture("projects.csv"), &IngestOptions::default()).unwrap();
        let text = preview_record(&loaded.records, 0, &RenderOptions::default()).unwrap();

        assert!(text.starts_with("Project Summary: P100\nUpgrade\nTechnical Terms Explained\n"));
        assert!(text.contains("Field | Details\n"));
        assert!(text.contains("Affected Customers | 5\n"));
        assert!(text.ends_with("Completion Code | DONE\n"));
    }

    #[test]
    fn preview_out_of_range_row() {
        let err = preview_record(&[], 0, &RenderOptions::default()).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }
}
