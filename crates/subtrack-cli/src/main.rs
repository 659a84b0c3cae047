//! Subtrack CLI - Subscription tracker
//!
//! Usage:
//!   subtrack init                      Initialize database
//!   subtrack detect --file export.csv  Find recurring charges
//!   subtrack subscriptions pay 3       Mark a subscription paid
//!   subtrack serve --port 3000         Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Detect {
            file,
            days,
            json,
            today,
        } => commands::cmd_detect(&config, &file, days, json, today.as_deref())
            .await
            .map(|_| ()),
        Commands::Due {
            date,
            frequency,
            today,
        } => commands::cmd_due(&config, &date, &frequency, today.as_deref()),
        Commands::Subscriptions { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                None | Some(SubscriptionsAction::List) => {
                    commands::cmd_subscriptions_list(&db, &cli.user)
                }
                Some(SubscriptionsAction::Add {
                    name,
                    amount,
                    frequency,
                    due,
                }) => commands::cmd_subscriptions_add(
                    &db,
                    &cli.user,
                    &name,
                    amount,
                    &frequency,
                    due.as_deref(),
                )
                .map(|_| ()),
                Some(SubscriptionsAction::Edit {
                    id,
                    name,
                    amount,
                    frequency,
                    due,
                }) => commands::cmd_subscriptions_edit(
                    &db,
                    id,
                    name,
                    amount,
                    frequency.as_deref(),
                    due,
                ),
                Some(SubscriptionsAction::Delete { id }) => {
                    commands::cmd_subscriptions_delete(&db, id)
                }
                Some(SubscriptionsAction::Pay { id, today }) => {
                    commands::cmd_subscriptions_pay(&db, &config, id, today.as_deref()).map(|_| ())
                }
            }
        }
        Commands::Summary { today } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_summary(&db, &cli.user, today.as_deref()).map(|_| ())
        }
        Commands::Serve { port, host } => commands::cmd_serve(&cli.db, config, &host, port).await,
    }
}
