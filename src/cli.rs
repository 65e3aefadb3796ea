// src/cli.rs
use chrono::NaiveDate;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(author, version, about = "Filter, group and summarise your workout log", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Print tables as CSV instead
    #[arg(long, global = true)]
    pub export_csv: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitsCli {
    Metric,
    Imperial,
}

/// History filters shared by `list` and `stats`.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Case-insensitive text matched against name, notes and superset partners
    #[arg(short, long)]
    pub search: Option<String>,

    /// Workout type to keep ("all" for every type)
    #[arg(short = 't', long = "type")]
    pub workout_type: Option<String>,

    /// Muscle group to keep ("all" for every group)
    #[arg(short, long)]
    pub muscle: Option<String>,

    /// First day to include (YYYY-MM-DD). Defaults to the configured window.
    #[arg(long, value_parser = parse_date, conflicts_with = "all_dates")]
    pub from: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date, conflicts_with = "all_dates")]
    pub to: Option<NaiveDate>,

    /// Ignore dates entirely
    #[arg(long)]
    pub all_dates: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log a new exercise entry
    Add {
        /// Name of the exercise (e.g., "Bench Press")
        #[arg(short, long)]
        exercise: String,

        #[arg(short, long)]
        sets: i64,

        #[arg(short, long)]
        reps: i64,

        /// Weight used per rep, in configured units
        #[arg(short, long)]
        weight: Option<f64>,

        /// Workout type, e.g. "Push"
        #[arg(short = 't', long = "type")]
        workout_type: Option<String>,

        /// Target muscle group, e.g. "Chest"
        #[arg(short, long)]
        muscle: Option<String>,

        /// Day of the workout (YYYY-MM-DD), defaults to today
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        /// Set type, e.g. "superset" or "alternate"
        #[arg(long)]
        set_type: Option<String>,

        /// Partner exercises for a superset/alternate set (repeatable)
        #[arg(long = "with", requires = "set_type")]
        additional: Vec<String>,

        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Delete entries by ID
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Show a single entry by ID
    Show { id: String },
    /// List entries grouped by day, type and muscle group
    List {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Show totals and breakdowns for the filtered history
    Stats {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// List the workout types and muscle groups present in the history
    Facets,
    /// Import a JSON export of exercise records
    Import { path: std::path::PathBuf },
    /// Browse the exercise catalog
    Catalog {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(short, long)]
        muscle: Option<String>,
        #[arg(short, long)]
        equipment: Option<String>,
        #[arg(short, long)]
        difficulty: Option<String>,
        /// Catalog file to use instead of the configured one
        #[arg(long)]
        file: Option<std::path::PathBuf>,
    },
    /// Set the length of the default date window in days
    SetRangeDays { days: u32 },
    /// Set the units used for display
    SetUnits {
        #[arg(value_enum)]
        units: UnitsCli,
    },
    /// Show the path to the database file
    DbPath,
    /// Show the path to the config file
    ConfigPath,
    /// Generate shell completion scripts
    GenerateCompletion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{value}' (expected YYYY-MM-DD): {e}"))
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
