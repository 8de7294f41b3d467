use crate::core::export::ExportFormat;
use clap::{Parser, Subcommand};

/// Command-line interface definition for scentfleet
#[derive(Parser)]
#[command(
    name = "scentfleet",
    version = env!("CARGO_PKG_VERSION"),
    about = "Scent dispenser fleet manager: schedules, refills and fluid-level estimation",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(long = "editor", help = "Editor to use (overrides $EDITOR/$VISUAL)")]
        editor: Option<String>,
    },

    /// Manage spray schedules
    Schedule {
        #[command(subcommand)]
        action: ScheduleAction,
    },

    /// Manage dispensers
    Dispenser {
        #[command(subcommand)]
        action: DispenserAction,
    },

    /// Show the estimated fluid level of a dispenser
    Level {
        #[arg(long)]
        id: i64,

        /// Instant to estimate at (RFC 3339 or "YYYY-MM-DD HH:MM"), default now
        #[arg(long)]
        at: Option<String>,

        /// Ignore the usage service and recompute from the schedule
        #[arg(long)]
        local: bool,
    },

    /// Show the usage service figures for a dispenser
    Usage {
        #[arg(long)]
        id: i64,

        #[arg(long)]
        at: Option<String>,
    },

    /// Log a refill
    Refill {
        #[arg(long)]
        id: i64,

        /// Amount poured in, in ml
        #[arg(long, allow_negative_numbers = true)]
        amount: f64,

        /// Refill time (RFC 3339 or "YYYY-MM-DD HH:MM"), default now
        #[arg(long)]
        at: Option<String>,

        /// Level estimate shown to the technician before refilling
        #[arg(long)]
        captured: Option<f64>,

        #[arg(long, default_value = "")]
        notes: String,
    },

    /// List the refill history
    Refills {
        /// Only this dispenser
        #[arg(long)]
        id: Option<i64>,
    },

    /// Export the refill history
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        /// Output file path (absolute path required)
        #[arg(long, value_name = "FILE")]
        file: String,

        /// Overwrite output file without confirmation
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Print the internal audit log
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },
}

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Add a time-based (--range) or interval-based (--interval) schedule
    Add {
        #[arg(long)]
        name: String,

        /// Time window "HH:MM-HH:MM/SPRAY/PAUSE", repeatable
        #[arg(long = "range", conflicts_with = "intervals")]
        ranges: Vec<String>,

        /// Cycle step "SPRAY/PAUSE", repeatable
        #[arg(long = "interval")]
        intervals: Vec<String>,

        /// Length of one run of the interval list, in minutes
        #[arg(long, default_value_t = 0.0)]
        duration: f64,

        /// Runs per day of the interval list
        #[arg(long, default_value_t = 1.0)]
        cycles: f64,

        #[arg(long = "ml-per-hour")]
        ml_per_hour: Option<f64>,

        /// Active days, e.g. "mon,tue,fri" (default: every day)
        #[arg(long, default_value = "")]
        days: String,
    },

    /// List schedules with their daily usage
    List,

    /// Show a schedule and its usage breakdown
    Show {
        #[arg(long)]
        id: i64,
    },

    /// Delete a schedule (dispensers using it are left without schedule)
    Del {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum DispenserAction {
    /// Register a dispenser
    Add {
        #[arg(long)]
        name: String,

        /// Tank capacity in ml (default from config)
        #[arg(long)]
        capacity: Option<f64>,

        /// Current level in ml; when given, the decay clock starts now
        #[arg(long)]
        level: Option<f64>,

        #[arg(long, default_value = "")]
        location: String,

        #[arg(long)]
        schedule: Option<i64>,

        #[arg(long = "ml-per-hour")]
        ml_per_hour: Option<f64>,
    },

    /// List dispensers with their estimated level
    List {
        #[arg(long)]
        at: Option<String>,
    },

    /// Assign a schedule ("none" to clear)
    Assign {
        #[arg(long)]
        id: i64,

        #[arg(long)]
        schedule: String,
    },

    /// Set or clear (--clear) the per-dispenser ml/hour override
    Rate {
        #[arg(long)]
        id: i64,

        #[arg(long = "ml-per-hour", conflicts_with = "clear")]
        ml_per_hour: Option<f64>,

        #[arg(long)]
        clear: bool,
    },

    /// Delete a dispenser and its refill history
    Del {
        #[arg(long)]
        id: i64,
    },
}
