//! Core domain logic for the project summary generator.
//!
//! Turns ingested project records into summary documents: one per record
//! ([`builder::build_record_document`]) or all records combined
//! ([`builder::build_combined_document`]), and writes them to disk
//! ([`export::export`]). [`pipeline`] ties ingestion and export together.

pub mod builder;
pub mod export;
pub mod glossary;
pub mod naming;
pub mod pipeline;

pub use builder::{
    COMBINED_TITLE, RenderOptions, build_combined_document, build_record_document,
    render_combined, render_record,
};
pub use export::{ExportConfig, ExportResult, ProgressReporter, SilentProgress, export};
pub use glossary::{GLOSSARY, GlossaryEntry};
pub use naming::{COMBINED_FILE_NAME, RowSummary, record_file_name, summarize_rows};
