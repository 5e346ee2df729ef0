//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use smartlinks_core::manifest::{load_manifest, write_manifest};
use smartlinks_core::pipeline::{ProgressReporter, RunSummary, resolve_links};
use smartlinks_shared::{AppConfig, LinkOptions, init_config, load_config, load_config_from};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// SmartLinks — resolve loose links between generated documents.
#[derive(Parser)]
#[command(
    name = "smartlinks",
    version,
    about = "Point relative links at the articles and pages they most likely mean.",
    long_about = None,
)]
pub(crate) struct Cli {
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
    /// Resolve the links of every document in a corpus manifest.
    Run {
        /// Corpus manifest (JSON).
        manifest: PathBuf,

        /// Config file to use instead of ~/.smartlinks/smartlinks.toml.
        #[arg(short, long, env = "SMARTLINKS_CONFIG")]
        config: Option<PathBuf>,

        /// Also rewrite `[text](href)` in each document's Markdown source.
        #[arg(long)]
        rewrite_source: bool,

        /// Where to write the updated manifest (defaults to in place).
        #[arg(short, long)]
        out: Option<PathBuf>,
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
        0 => "smartlinks=info",
        1 => "smartlinks=debug",
        _ => "smartlinks=trace",
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
        Command::Run {
            manifest,
            config,
            rewrite_source,
            out,
        } => cmd_run(&manifest, config.as_deref(), rewrite_source, out.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_run(
    manifest: &Path,
    config: Option<&Path>,
    rewrite_source: bool,
    out: Option<&Path>,
) -> Result<()> {
    let app_config = match config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    // CLI flag can only turn source rewriting on, never off.
    let mut options = LinkOptions::from(&app_config);
    options.rewrite_source |= rewrite_source;

    if !manifest.is_file() {
        return Err(eyre!("manifest '{}' not found", manifest.display()));
    }

    info!(
        manifest = %manifest.display(),
        rewrite_source = options.rewrite_source,
        "resolving links"
    );

    let mut collections = load_manifest(manifest)?;
    let reporter = CliProgress::new();
    let summary = resolve_links(&mut collections, &options, &reporter)?;

    let out = out.unwrap_or(manifest);
    write_manifest(out, &collections)?;

    // Print summary
    println!();
    println!("  Links resolved!");
    println!("  Documents:  {}", summary.documents);
    println!("  Links:      {}", summary.links_seen);
    println!("  Resolved:   {}", summary.resolved);
    println!("  Unresolved: {}", summary.unresolved);
    if options.rewrite_source {
        println!("  Sources:    {}", summary.sources_written);
    }
    println!("  Manifest:   {}", out.display());
    println!("  Time:       {:.1}s", summary.elapsed.as_secs_f64());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif bar.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} [{pos}/{len}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        Self { bar }
    }
}

impl ProgressReporter for CliProgress {
    fn document(&self, slug: &str, current: usize, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(current as u64);
        self.bar.set_message(format!("Matching links in {slug}"));
    }

    fn done(&self, _summary: &RunSummary) {
        self.bar.finish_and_clear();
    }
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
