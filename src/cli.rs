//! CLI interface for Vito.
//!
//! Loads a scenario file into a broker and works through one period.
//! Each subcommand is non-interactive: arguments in, report out. Logs go to
//! stderr so `--json` output can be piped.

mod format;

use std::path::{Path, PathBuf};
use std::rc::Rc;

use clap::{Parser, Subcommand};
use jiff::civil::Date;

use vito::notify::{ChannelObserver, LogTransport, Observer};
use vito::{Broker, Config, Scenario};

use format::{format_pending, format_report};

/// Vito: hand out the month's work and keep the books.
#[derive(Debug, Parser)]
#[command(name = "vito", version, after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Config file. Defaults to `~/.vito/config.toml` when it exists.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log every decision the broker makes.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Command,
}

const WORKFLOW_HELP: &str = r"Workflow: running a month
  1. vito pending scenario.toml --date 2024-06-01
     → shows what is due in June and which crew would take each task
  2. vito run scenario.toml --date 2024-06-01
     → assigns and carries out June's tasks, prints crew balances and funds
  3. vito run scenario.toml --date 2024-06-01 --json > june.json";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Assign and carry out every task due in the month of `--date`.
    Run {
        /// Scenario file describing people, crews and tasks.
        scenario: PathBuf,

        /// Any day in the month to run.
        #[arg(long)]
        date: Date,

        /// Print the period report as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show the tasks due in the month of `--date` and who would take them.
    ///
    /// Nothing is assigned or carried out.
    Pending {
        /// Scenario file describing people, crews and tasks.
        scenario: PathBuf,

        /// Any day in the month to look at.
        #[arg(long)]
        date: Date,
    },
}

/// Run the CLI, returning an error message on failure.
pub fn run(cli: Cli) -> Result<(), String> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Run {
            scenario,
            date,
            json,
        } => cmd_run(&config, &scenario, date, json),
        Command::Pending { scenario, date } => cmd_pending(&config, &scenario, date),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config, String> {
    let config = match path {
        Some(path) => Config::load(path),
        None => Config::load_default(),
    };
    config.map_err(|e| e.to_string())
}

fn load_broker(config: &Config, path: &Path) -> Result<Broker, String> {
    let scenario = Scenario::load(path).map_err(|e| e.to_string())?;
    let observer: Rc<dyn Observer> = Rc::new(ChannelObserver::new(
        &config.notification_recipient,
        LogTransport,
    ));
    scenario
        .build(config, &observer)
        .map_err(|e| format!("failed to load {}: {e}", path.display()))
}

fn cmd_run(config: &Config, scenario: &Path, date: Date, json: bool) -> Result<(), String> {
    let mut broker = load_broker(config, scenario)?;

    let report = broker
        .run_period(date)
        .map_err(|e| format!("period {} failed: {e}", date.strftime("%Y-%m")))?;

    if json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("failed to serialize report: {e}"))?;
        println!("{json}");
    } else {
        print!("{}", format_report(&broker, &report));
    }

    Ok(())
}

fn cmd_pending(config: &Config, scenario: &Path, date: Date) -> Result<(), String> {
    let broker = load_broker(config, scenario)?;

    let pending = broker.pending_tasks_for(date);
    if pending.is_empty() {
        println!("Nothing due in {}", date.strftime("%Y-%m"));
        return Ok(());
    }

    print!(
        "{}",
        format_pending(&broker, &pending).map_err(|e| e.to_string())?
    );
    Ok(())
}
