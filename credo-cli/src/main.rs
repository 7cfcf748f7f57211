use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use credo_core::{RuleCategorizer, categorize_all};
use credo_ingest::{NormalizedStatement, Normalizer};
use credo_scoring::score_statement;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod render;
mod state;

#[derive(Parser, Debug)]
#[command(name = "credo", version, about = "Bank statement normalization and credit-risk scoring")]
struct Cli {
    /// Log decisions (schema, date format, per-signal values) to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize a statement CSV and print the period and monthly totals
    Normalize {
        /// Path to the statement CSV
        #[arg(long)]
        csv: PathBuf,

        /// Print the normalized statement as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Normalize, categorize and score a statement CSV
    Score {
        /// Path to the statement CSV
        #[arg(long)]
        csv: PathBuf,

        /// Scoring policy TOML (overrides [scoring] from ~/.credo/config.toml)
        #[arg(long)]
        policy: Option<PathBuf>,

        /// Print the score report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Manage ~/.credo/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file if none exists
    Init,
    /// Print the effective configuration
    Show,
    /// Validate weights, bands, thresholds and templates
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Normalize { csv, json } => {
            let statement = normalize_csv(&csv)?;
            if json {
                render::print_json(&statement)?;
            } else {
                render::print_statement(&statement);
            }
        }

        Command::Score { csv, policy, json } => {
            let mut cfg = config::load_config()?;
            if let Some(path) = policy {
                cfg.scoring = config::load_policy(&path)?;
            }
            config::ensure_valid(&cfg)?;

            let mut statement = normalize_csv_with(&csv, &cfg)?;
            let rules = RuleCategorizer::new().context("compile categorization rules")?;
            let labelled = categorize_all(&rules, &mut statement.transactions);
            info!(labelled, "applied rule categorizer");

            let report = score_statement(&statement.transactions, &statement.period, &cfg.scoring)
                .with_context(|| format!("scoring {}", csv.display()))?;

            let output = render::ScoreOutput::new(&statement, &report, &cfg.scoring);
            if json {
                render::print_json(&output)?;
            } else {
                render::print_report(&statement, &output);
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
            ConfigCommand::Check => config::check_config()?,
        },
    }

    Ok(())
}

/// Logs go to stderr so `--json` output stays machine-readable.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn normalize_csv(path: &Path) -> Result<NormalizedStatement> {
    let cfg = config::load_config()?;
    normalize_csv_with(path, &cfg)
}

fn normalize_csv_with(path: &Path, cfg: &config::Config) -> Result<NormalizedStatement> {
    if !path.exists() {
        bail!("CSV not found: {} (pass --csv <path>)", path.display());
    }
    Normalizer::default()
        .with_templates(cfg.templates.iter().cloned())
        .normalize_path(path)
        .with_context(|| format!("normalizing {}", path.display()))
}
