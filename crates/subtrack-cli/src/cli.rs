//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Subtrack - Find and track recurring subscriptions
#[derive(Parser)]
#[command(name = "subtrack")]
#[command(about = "Subscription tracker with recurring charge detection", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "subtrack.db", global = true)]
    pub db: PathBuf,

    /// Config file (defaults to ~/.config/subtrack/config.toml, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// User whose subscriptions are managed
    #[arg(long, default_value = "local", global = true)]
    pub user: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Detect recurring charges in a transaction export
    Detect {
        /// JSON or CSV file of transactions
        #[arg(short, long)]
        file: PathBuf,

        /// Days of history to examine (defaults to the configured lookback)
        #[arg(short, long)]
        days: Option<u32>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// End the lookback window on this day instead of today (YYYY-MM-DD)
        #[arg(long)]
        today: Option<String>,
    },

    /// Check the payment window for a due date
    Due {
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Billing frequency: monthly or yearly
        #[arg(short, long, default_value = "monthly")]
        frequency: String,

        /// Evaluate as of this day instead of today (YYYY-MM-DD)
        #[arg(long)]
        today: Option<String>,
    },

    /// Manage tracked subscriptions
    Subscriptions {
        #[command(subcommand)]
        action: Option<SubscriptionsAction>,
    },

    /// Show a spending summary
    Summary {
        /// Evaluate as of this day instead of today (YYYY-MM-DD)
        #[arg(long)]
        today: Option<String>,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

#[derive(Subcommand)]
pub enum SubscriptionsAction {
    /// List subscriptions by due date
    List,

    /// Track a new subscription
    Add {
        /// Subscription name
        name: String,

        /// Charge per billing period
        #[arg(short, long)]
        amount: f64,

        /// Billing frequency: monthly or yearly
        #[arg(short, long, default_value = "monthly")]
        frequency: String,

        /// Next due date (YYYY-MM-DD)
        #[arg(short, long)]
        due: Option<String>,
    },

    /// Change fields of a subscription
    Edit {
        /// Subscription ID
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(short, long)]
        amount: Option<f64>,

        #[arg(short, long)]
        frequency: Option<String>,

        /// New due date (YYYY-MM-DD, empty to clear)
        #[arg(short, long)]
        due: Option<String>,
    },

    /// Stop tracking a subscription
    Delete {
        /// Subscription ID
        id: i64,
    },

    /// Mark a subscription paid and move its due date forward
    Pay {
        /// Subscription ID
        id: i64,

        /// Pay as of this day instead of today (YYYY-MM-DD)
        #[arg(long)]
        today: Option<String>,
    },
}
