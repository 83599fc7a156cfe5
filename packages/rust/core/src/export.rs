//! Output directory writer.
//!
//! Renders the selected artifacts, writes each one atomically and records
//! them in `manifest.json`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use summarygen_shared::{Emit, ProjectRecord, Result, SummaryError};

use crate::builder::{RenderOptions, render_combined, render_record};
use crate::naming::{COMBINED_FILE_NAME, record_file_name};

/// Name of the manifest written next to the artifacts.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Current schema version of `manifest.json`.
pub const MANIFEST_SCHEMA_VERSION: u32 = 1;

/// Configuration for [`export`].
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Directory artifacts are written to (created if missing).
    pub output_dir: PathBuf,
    /// Which artifacts to produce.
    pub emit: Emit,
    /// Document properties.
    pub render: RenderOptions,
    /// Tool version string recorded in the manifest.
    pub tool_version: String,
}

/// Metadata for a single artifact file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMeta {
    pub filename: String,
    pub sha256: String,
    pub size_bytes: usize,
    /// Source row for per-record artifacts; `None` for the combined document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_index: Option<usize>,
}

/// The `manifest.json` structure written to the output directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportManifest {
    pub schema_version: u32,
    pub tool_version: String,
    pub generated_at: DateTime<Utc>,
    pub record_count: usize,
    pub artifacts: Vec<ArtifactMeta>,
}

/// Output from a successful export.
#[derive(Debug, Clone)]
pub struct ExportResult {
    pub output_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub artifacts: Vec<ArtifactMeta>,
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting export status.
pub trait ProgressReporter {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each artifact is written.
    fn artifact_written(&self, filename: &str, current: usize, total: usize);
    /// Called when the export completes.
    fn done(&self, result: &ExportResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn artifact_written(&self, _filename: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &ExportResult) {}
}

/// Render and write the configured artifacts for `records`.
///
/// Per-record files are named `Project_{p_number}.docx`; when two records
/// resolve to the same name, later ones get a `_row-{index}` suffix so no
/// artifact is overwritten.
#[instrument(skip_all, fields(output_dir = %config.output_dir.display(), emit = %config.emit, records = records.len()))]
pub fn export(
    config: &ExportConfig,
    records: &[ProjectRecord],
    progress: &dyn ProgressReporter,
) -> Result<ExportResult> {
    let start = Instant::now();
    let dir = &config.output_dir;
    std::fs::create_dir_all(dir).map_err(|e| SummaryError::io(dir, e))?;

    let total = usize::from(config.emit.combined())
        + if config.emit.records() { records.len() } else { 0 };
    let mut artifacts = Vec::with_capacity(total);

    if config.emit.records() {
        progress.phase("Writing project summaries");
        let mut used = HashSet::new();
        for (idx, record) in records.iter().enumerate() {
            let filename = unique_name(record_file_name(record, idx), idx, &mut used);
            let bytes = render_record(record, &config.render)?;
            let meta = write_artifact(dir, &filename, &bytes, Some(idx))?;
            artifacts.push(meta);
            progress.artifact_written(&filename, artifacts.len(), total);
        }
    }

    if config.emit.combined() {
        progress.phase("Writing combined summary");
        let bytes = render_combined(records, &config.render)?;
        let meta = write_artifact(dir, COMBINED_FILE_NAME, &bytes, None)?;
        artifacts.push(meta);
        progress.artifact_written(COMBINED_FILE_NAME, artifacts.len(), total);
    }

    let manifest = ExportManifest {
        schema_version: MANIFEST_SCHEMA_VERSION,
        tool_version: config.tool_version.clone(),
        generated_at: Utc::now(),
        record_count: records.len(),
        artifacts: artifacts.clone(),
    };
    let manifest_path = dir.join(MANIFEST_FILE_NAME);
    write_json(&manifest_path, &manifest)?;

    info!(count = artifacts.len(), "export complete");

    let result = ExportResult {
        output_dir: dir.clone(),
        manifest_path,
        artifacts,
        elapsed: start.elapsed(),
    };
    progress.done(&result);
    Ok(result)
}

/// Read a previously written manifest.
pub fn read_manifest(output_dir: &Path) -> Result<ExportManifest> {
    let path = output_dir.join(MANIFEST_FILE_NAME);
    let content = std::fs::read_to_string(&path).map_err(|e| SummaryError::io(&path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| SummaryError::parse(format!("invalid {MANIFEST_FILE_NAME}: {e}")))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn unique_name(name: String, idx: usize, used: &mut HashSet<String>) -> String {
    if used.insert(name.clone()) {
        return name;
    }
    let stem = name.strip_suffix(".docx").unwrap_or(&name);
    let mut renamed = format!("{stem}_row-{idx}.docx");
    let mut attempt = 2;
    while !used.insert(renamed.clone()) {
        renamed = format!("{stem}_row-{idx}-{attempt}.docx");
        attempt += 1;
    }
    renamed
}

/// Write one artifact atomically (temp file, then rename) and hash it.
fn write_artifact(
    dir: &Path,
    filename: &str,
    bytes: &[u8],
    record_index: Option<usize>,
) -> Result<ArtifactMeta> {
    let target = dir.join(filename);
    let temp = dir.join(format!(".{filename}.tmp"));

    std::fs::write(&temp, bytes).map_err(|e| SummaryError::io(&temp, e))?;
    std::fs::rename(&temp, &target).map_err(|e| SummaryError::io(&target, e))?;

    let sha256 = format!("{:x}", Sha256::digest(bytes));
    debug!(file = %filename, size = bytes.len(), "wrote artifact");

    Ok(ArtifactMeta {
        filename: filename.to_string(),
        sha256,
        size_bytes: bytes.len(),
        record_index,
    })
}

/// Write a JSON file (pretty-printed).
fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| SummaryError::serialize(format!("JSON serialization failed: {e}")))?;
    std::fs::write(path, json).map_err(|e| SummaryError::io(path, e))?;
    debug!(path = %path.display(), "wrote JSON file");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
