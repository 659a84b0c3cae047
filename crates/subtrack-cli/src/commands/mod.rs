//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init) and shared utilities (open_db, load_config)
//! - `detect` - Recurring charge detection and ad-hoc due date checks
//! - `serve` - Web server command
//! - `subscriptions` - Subscription management commands (list, add, edit, delete, pay)
//! - `summary` - Spending summary

pub mod core;
pub mod detect;
pub mod serve;
pub mod subscriptions;
pub mod summary;

// Re-export command functions for main.rs
pub use self::core::*;
pub use detect::*;
pub use serve::*;
pub use subscriptions::*;
pub use summary::*;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use subtrack_core::{Clock, SystemClock};

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// The `--today` override, or the local calendar day
pub fn resolve_today(today: Option<&str>) -> Result<NaiveDate> {
    match today {
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .with_context(|| format!("Invalid --today '{}' (use YYYY-MM-DD)", s)),
        None => Ok(SystemClock.today()),
    }
}
