//! Shared types, error model, and configuration for the summary generator.
//!
//! This crate is the foundation depended on by all other workspace crates.
//! It provides:
//! - [`SummaryError`], the unified error type
//! - Domain types ([`CellValue`], [`Row`], [`ProjectTable`], [`ProjectRecord`], [`Field`])
//! - Configuration ([`AppConfig`], [`Emit`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, DocumentConfig, Emit, IngestConfig, config_dir, config_file_path,
    init_config, init_config_in, load_config, load_config_from,
};
pub use error::{Result, SummaryError};
pub use types::{CellValue, Field, ProjectRecord, ProjectTable, Row, expected_columns};
