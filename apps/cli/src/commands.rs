//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use summarygen_core::export::{ExportConfig, ExportResult, ProgressReporter};
use summarygen_core::pipeline::{self, GenerateConfig};
use summarygen_core::RenderOptions;
use summarygen_ingest::IngestOptions;
use summarygen_shared::{AppConfig, Emit, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Project Summary Generator: explain project status in plain language.
#[derive(Parser)]
#[command(
    name = "summarygen",
    version,
    about = "Turn a project table (.xlsx, .csv, .txt) into plain-language summary documents.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate summary documents for every project in a table.
    Generate {
        /// Input table (.xlsx, .csv or tab-delimited .txt).
        file: PathBuf,

        /// Output directory (defaults to the configured output_dir).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Artifacts to write: all, combined, or records.
        #[arg(short, long)]
        emit: Option<Emit>,

        /// Worksheet to read from .xlsx input (defaults to the first sheet).
        #[arg(long)]
        sheet: Option<String>,
    },

    /// List the projects in a table with their output file names.
    List {
        /// Input table (.xlsx, .csv or tab-delimited .txt).
        file: PathBuf,

        /// Worksheet to read from .xlsx input.
        #[arg(long)]
        sheet: Option<String>,

        /// Print the listing as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the text of one project's summary document.
    Preview {
        /// Input table (.xlsx, .csv or tab-delimited .txt).
        file: PathBuf,

        /// Zero-based row index of the project to preview.
        #[arg(short, long)]
        row: usize,

        /// Worksheet to read from .xlsx input.
        #[arg(long)]
        sheet: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "summarygen=info",
        1 => "summarygen=debug",
        _ => "summarygen=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate {
            file,
            out,
            emit,
            sheet,
        } => cmd_generate(&file, out, emit, sheet),
        Command::List { file, sheet, json } => cmd_list(&file, sheet, json),
        Command::Preview { file, row, sheet } => cmd_preview(&file, row, sheet),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

/// Ingest options from the `--sheet` flag, falling back to config.
fn ingest_options(config: &AppConfig, sheet: Option<String>) -> IngestOptions {
    IngestOptions {
        sheet: sheet.or_else(|| config.ingest.sheet.clone()),
    }
}

fn render_options(config: &AppConfig) -> RenderOptions {
    RenderOptions {
        creator: Some(config.document.creator.clone()),
    }
}

fn print_warning(warning: Option<String>) {
    if let Some(warning) = warning {
        eprintln!("warning: {warning}");
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_generate(
    file: &Path,
    out: Option<PathBuf>,
    emit: Option<Emit>,
    sheet: Option<String>,
) -> Result<()> {
    let config = load_config()?;

    let output_dir = out.unwrap_or_else(|| PathBuf::from(&config.defaults.output_dir));
    let emit = emit.unwrap_or(config.defaults.emit);

    let generate_config = GenerateConfig {
        input: file.to_path_buf(),
        ingest: ingest_options(&config, sheet),
        export: ExportConfig {
            output_dir,
            emit,
            render: render_options(&config),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        },
    };

    info!(
        input = %file.display(),
        output_dir = %generate_config.export.output_dir.display(),
        %emit,
        "generating summaries"
    );

    let reporter = CliProgress::new();
    let result = pipeline::generate(&generate_config, &reporter)
        .map_err(|e| eyre!("could not generate summaries from '{}': {e}", file.display()))?;

    print_warning(result.warning);

    println!();
    println!("  Summaries generated!");
    println!("  Projects:  {}", result.record_count);
    println!("  Documents: {}", result.export.artifacts.len());
    println!("  Output:    {}", result.export.output_dir.display());
    println!("  Manifest:  {}", result.export.manifest_path.display());
    println!("  Time:      {:.1}s", result.export.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_list(file: &Path, sheet: Option<String>, json: bool) -> Result<()> {
    let config = load_config()?;
    let (report, rows) = pipeline::list_rows(file, &ingest_options(&config, sheet))?;

    print_warning(report.warning());

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No projects found in '{}'.", file.display());
        return Ok(());
    }

    let label_width = column_width(rows.iter().map(|r| r.label.as_str()), "PROJECT");
    let title_width = column_width(rows.iter().map(|r| r.title.as_str()), "TITLE");

    println!(
        "{:>4}  {:<label_width$}  {:<title_width$}  FILE",
        "ROW", "PROJECT", "TITLE"
    );
    for row in &rows {
        println!(
            "{:>4}  {:<label_width$}  {:<title_width$}  {}",
            row.index, row.label, row.title, row.file_name
        );
    }

    Ok(())
}

/// Display width of a listing column, in characters.
fn column_width<'a>(values: impl Iterator<Item = &'a str>, header: &str) -> usize {
    values
        .map(|v| v.chars().count())
        .chain(std::iter::once(header.chars().count()))
        .max()
        .unwrap_or(0)
}

fn cmd_preview(file: &Path, row: usize, sheet: Option<String>) -> Result<()> {
    let config = load_config()?;
    let loaded = pipeline::load_records(file, &ingest_options(&config, sheet))?;

    print_warning(loaded.report.warning());

    let text = pipeline::preview_record(&loaded.records, row, &render_options(&config))?;
    print!("{text}");
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn artifact_written(&self, filename: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Writing [{current}/{total}] {filename}"));
    }

    fn done(&self, _result: &ExportResult) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_generate_flags() {
        let cli = Cli::parse_from([
            "summarygen",
            "generate",
            "projects.xlsx",
            "--out",
            "out",
            "--emit",
            "combined",
            "--sheet",
            "Projects",
        ]);
        match cli.command {
            Command::Generate {
                file,
                out,
                emit,
                sheet,
            } => {
                assert_eq!(file, PathBuf::from("projects.xlsx"));
                assert_eq!(out, Some(PathBuf::from("out")));
                assert_eq!(emit, Some(Emit::Combined));
                assert_eq!(sheet.as_deref(), Some("Projects"));
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn rejects_unknown_emit() {
        let result = Cli::try_parse_from(["summarygen", "generate", "a.csv", "--emit", "pdf"]);
        assert!(result.is_err());
    }

    #[test]
    fn sheet_flag_overrides_config() {
        let mut config = AppConfig::default();
        config.ingest.sheet = Some("FromConfig".into());
        assert_eq!(
            ingest_options(&config, Some("Flag".into())).sheet.as_deref(),
            Some("Flag")
        );
        assert_eq!(
            ingest_options(&config, None).sheet.as_deref(),
            Some("FromConfig")
        );
    }

    #[test]
    fn column_width_counts_characters() {
        assert_eq!(column_width(["Café", "Über"].into_iter(), "TITLE"), 5);
        assert_eq!(column_width(["Mise à jour du portail"].into_iter(), "TITLE"), 22);
    }
}
