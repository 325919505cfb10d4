use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use taskpulse_core::{
    DeterministicAdvisor, Task, TaskAdvisor, completed, completed_on, local_day, normalize_records,
};
use tracing_subscriber::EnvFilter;

mod config;
mod input;
mod render;
mod state;

use input::InputFormat;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TASKPULSE_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "taskpulse", version = VERSION, about = "Rank tasks and analyze completed work")]
struct Cli {
    /// Log debug output to stderr (overrides TASKPULSE_LOG's default level)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print tasks in priority order
    Prioritize {
        /// Task records (.json or .csv)
        #[arg(long, short)]
        input: PathBuf,

        #[arg(long, value_enum)]
        format: Option<InputFormat>,

        /// Max tasks to print (default: config display.limit)
        #[arg(long)]
        limit: Option<usize>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Score the tasks completed on a day (default: today)
    Analyze {
        /// Task records (.json or .csv)
        #[arg(long, short)]
        input: PathBuf,

        #[arg(long, value_enum)]
        format: Option<InputFormat>,

        /// Day to analyze, YYYY-MM-DD in the configured timezone
        #[arg(long, conflicts_with = "all")]
        date: Option<NaiveDate>,

        /// Analyze every completed task regardless of day
        #[arg(long)]
        all: bool,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Manage ~/.taskpulse/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = config::load_config()?;

    match cli.command {
        Command::Prioritize {
            input,
            format,
            limit,
            json,
        } => {
            let tz = cfg.timezone()?;
            let tasks = load_tasks(&input, format, tz)?;
            let advisor = DeterministicAdvisor::new(cfg.analyzer()?);
            let ranked = advisor.prioritize(&tasks)?;

            let limit = limit.unwrap_or(cfg.display.limit);
            if json || cfg.display.json {
                println!("{}", render::ranked_json(&ranked, limit)?);
            } else {
                print!("{}", render::ranked_text(&ranked, limit, tz));
            }
        }

        Command::Analyze {
            input,
            format,
            date,
            all,
            json,
        } => {
            let analyzer = cfg.analyzer()?;
            let tz = analyzer.timezone;
            let tasks = load_tasks(&input, format, tz)?;

            let selected = if all {
                completed(&tasks)
            } else {
                let day = date.unwrap_or_else(|| local_day(Utc::now(), tz));
                tracing::debug!(%day, timezone = %tz, "selecting completions for day");
                completed_on(&tasks, day, tz)
            };

            let advisor = DeterministicAdvisor::new(analyzer);
            let analysis = advisor.analyze(&selected)?;

            if json || cfg.display.json {
                println!("{}", render::analysis_json(&analysis)?);
            } else {
                print!("{}", render::analysis_text(&analysis));
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => {
                let (path, written) = config::init_config()?;
                if written {
                    println!("Wrote {}", path.display());
                } else {
                    println!("Config already exists: {}", path.display());
                }
            }
            ConfigCommand::Show => {
                let s = toml::to_string_pretty(&cfg).context("serialize config")?;
                println!("# {}\n{}", config::config_path()?.display(), s);
            }
        },
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("TASKPULSE_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_tasks(path: &Path, format: Option<InputFormat>, tz: chrono_tz::Tz) -> Result<Vec<Task>> {
    if !path.exists() {
        bail!("input not found: {} (pass --input <path>)", path.display());
    }
    let records = input::load_records(path, format)?;
    let normalized = normalize_records(&records, tz)
        .with_context(|| format!("normalize records from {}", path.display()))?;

    let degraded = normalized.iter().filter(|n| !n.is_clean()).count();
    if degraded > 0 {
        tracing::warn!(
            degraded,
            total = normalized.len(),
            "some task records were malformed and normalized to defaults"
        );
    }

    Ok(normalized.into_iter().map(|n| n.task).collect())
}
