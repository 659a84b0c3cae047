//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_config` - Resolve the configuration file
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use subtrack_core::{config::default_config_path, db::Database, AppConfig};

pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    Database::new(path_str).context("Failed to open database")
}

pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    AppConfig::load(path).context("Failed to load configuration")
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    open_db(db_path)?;

    println!("✅ Database initialized successfully!");
    if let Some(path) = default_config_path() {
        println!("   Config overrides are read from {}", path.display());
    }
    println!();
    println!("Next steps:");
    println!("  1. Find recurring charges: subtrack detect --file transactions.csv");
    println!("  2. Track one: subtrack subscriptions add Netflix --amount 15.99 --due 2026-02-01");
    println!("  3. Start web UI: subtrack serve");

    Ok(())
}
