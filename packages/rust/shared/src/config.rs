//! Application configuration for the summary generator.
//!
//! User config lives at `~/.summarygen/summarygen.toml`.
//! CLI flags override config file values, which override defaults.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SummaryError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "summarygen.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".summarygen";

// ---------------------------------------------------------------------------
// Config structs (matching summarygen.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Input table options.
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Generated document properties.
    #[serde(default)]
    pub document: DocumentConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory generated documents are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Which artifacts `generate` writes.
    #[serde(default)]
    pub emit: Emit,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            emit: Emit::default(),
        }
    }
}

fn default_output_dir() -> String {
    "summaries".into()
}

/// `[ingest]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Worksheet to read from spreadsheets (first sheet when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
}

/// `[document]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// Value written to the documents' creator property.
    #[serde(default = "default_creator")]
    pub creator: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            creator: default_creator(),
        }
    }
}

fn default_creator() -> String {
    "Project Summary Generator".into()
}

// ---------------------------------------------------------------------------
// Emit
// ---------------------------------------------------------------------------

/// Selects which document artifacts a generation run produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emit {
    /// One document per record plus the combined document.
    #[default]
    All,
    /// Only the combined document.
    Combined,
    /// Only the per-record documents.
    Records,
}

impl Emit {
    pub fn combined(self) -> bool {
        matches!(self, Self::All | Self::Combined)
    }

    pub fn records(self) -> bool {
        matches!(self, Self::All | Self::Records)
    }
}

impl fmt::Display for Emit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::Combined => "combined",
            Self::Records => "records",
        })
    }
}

impl FromStr for Emit {
    type Err = SummaryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "combined" => Ok(Self::Combined),
            "records" => Ok(Self::Records),
            other => Err(SummaryError::config(format!(
                "unknown emit value '{other}': expected 'all', 'combined' or 'records'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.summarygen/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| SummaryError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.summarygen/summarygen.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SummaryError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| SummaryError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    init_config_in(&dir)
}

/// Write a default config file into `dir`, creating it if needed.
pub fn init_config_in(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| SummaryError::io(dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| SummaryError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SummaryError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
