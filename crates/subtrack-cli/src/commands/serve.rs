//! Server command implementation

use std::path::Path;

use anyhow::Result;
use subtrack_core::AppConfig;

use super::open_db;

pub async fn cmd_serve(db_path: &Path, config: AppConfig, host: &str, port: u16) -> Result<()> {
    println!("🚀 Starting subtrack web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    println!(
        "   Payment windows: {} days (monthly), {} days (yearly)",
        config.billing.monthly_grace_days, config.billing.yearly_grace_days
    );
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path)?;
    subtrack_server::serve(db, config, host, port).await?;

    Ok(())
}
