//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use pepindex_artifacts::SEARCH_ROUTES_FILENAME;
use pepindex_core::{BuildOptions, BuildProgress, BuildSummary, Stage, run_build, run_check};
use pepindex_resolver::Resolver;
use pepindex_shared::{AppConfig, config_file_path, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// pepindex — navigation indexes for the peptide reference content.
#[derive(Parser)]
#[command(
    name = "pepindex",
    version,
    about = "Build peptide/blend navigation indexes and resolve search queries.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ./pepindex.toml, then ~/.pepindex/pepindex.toml).
    #[arg(long, global = true, env = "PEPINDEX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Content store root. Overrides `paths.content_root`.
    #[arg(long, global = true)]
    pub content_root: Option<PathBuf>,

    /// Artifact directory. Overrides `paths.output_dir`.
    #[arg(long, global = true)]
    pub out: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
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
    /// Build every index and write the artifacts.
    Build,

    /// Rebuild in memory and report artifacts that differ from disk.
    Check,

    /// Resolve a search query against the search routes artifact.
    Resolve {
        /// Raw query text.
        query: String,

        /// Search routes artifact (defaults to <out>/search_routes_v1.json).
        #[arg(long)]
        index: Option<PathBuf>,
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
    Init {
        /// Where to write it (defaults to ~/.pepindex/pepindex.toml).
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so command output
/// on stdout stays machine-readable.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "pepindex=info",
        1 => "pepindex=debug",
        _ => "pepindex=trace",
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
    match &cli.command {
        Command::Build => cmd_build(&cli),
        Command::Check => cmd_check(&cli),
        Command::Resolve { query, index } => cmd_resolve(&cli, query, index.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Init { path } => cmd_config_init(path.as_deref()),
            ConfigAction::Show => cmd_config_show(&cli),
        },
    }
}

/// Load the config and apply the path overrides from the command line.
fn resolved_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(root) = &cli.content_root {
        config.paths.content_root = root.clone();
    }
    if let Some(out) = &cli.out {
        config.paths.output_dir = out.clone();
    }
    Ok(config)
}

fn build_options(cli: &Cli) -> Result<BuildOptions> {
    let config = resolved_config(cli)?;
    Ok(BuildOptions::from_config(&config, env!("CARGO_PKG_VERSION")))
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_build(cli: &Cli) -> Result<()> {
    let options = build_options(cli)?;
    info!(
        content_root = %options.content_root.display(),
        out = %options.output_dir.display(),
        "building indexes"
    );

    let reporter = CliProgress::new();
    let summary = run_build(&options, &reporter)?;

    println!();
    println!("  Indexes built successfully!");
    println!("  Run:    {}", summary.run_id);
    println!("  Path:   {}", summary.output_dir.display());
    for artifact in &summary.artifacts {
        println!(
            "    {:<36} {:>9} B  {}",
            artifact.filename,
            artifact.size_bytes,
            &artifact.sha256[..12]
        );
    }
    println!("  Time:   {:.2}s", summary.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_check(cli: &Cli) -> Result<()> {
    let options = build_options(cli)?;
    let reporter = CliProgress::new();
    let report = run_check(&options, &reporter)?;
    reporter.finish();

    for drift in &report.artifacts {
        println!("  {:<10} {}", drift.status.to_string(), drift.filename);
    }

    if report.is_clean() {
        println!("\n  All artifacts up to date.");
        return Ok(());
    }

    let stale: Vec<&str> = report.drifted().map(|d| d.filename.as_str()).collect();
    Err(eyre!(
        "{} artifact(s) out of date: {}. Run `pepindex build` to regenerate.",
        stale.len(),
        stale.join(", ")
    ))
}

fn cmd_resolve(cli: &Cli, query: &str, index: Option<&Path>) -> Result<()> {
    let config = resolved_config(cli)?;
    let path = match index {
        Some(p) => p.to_path_buf(),
        None => config.paths.output_dir.join(SEARCH_ROUTES_FILENAME),
    };
    if !path.exists() {
        return Err(eyre!(
            "no search routes index at '{}'. Run `pepindex build` first.",
            path.display()
        ));
    }

    let resolver = Resolver::from_path(&path, config.resolver)?;
    let resolution = resolver.resolve(query);
    info!(query, intent = ?resolution.intent, "query resolved");

    println!("{}", serde_json::to_string_pretty(&resolution)?);
    Ok(())
}

fn cmd_config_init(path: Option<&Path>) -> Result<()> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_file_path()?,
    };
    if path.exists() {
        return Err(eyre!("config already exists at '{}'", path.display()));
    }
    let path = init_config(&path)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(cli: &Cli) -> Result<()> {
    let config = resolved_config(cli)?;
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
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl BuildProgress for CliProgress {
    fn stage_started(&self, stage: Stage) {
        self.spinner.set_message(stage.to_string());
    }

    fn stage_finished(&self, stage: Stage, records: usize) {
        self.spinner.println(format!("  ✓ {stage} ({records})"));
    }

    fn done(&self, _summary: &BuildSummary) {
        self.finish();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}
