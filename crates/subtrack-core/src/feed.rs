//! Transaction sources
//!
//! Detection runs over transactions pulled from some feed for a lookback
//! window. The bank aggregator is one such feed; exported files are another.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::error::Result;
use crate::import;
use crate::models::RawTransaction;

/// Default number of days of history examined for recurring charges
pub const DEFAULT_LOOKBACK_DAYS: u32 = 90;

/// Inclusive range of calendar days to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl LookbackWindow {
    /// The `days` days leading up to and including `today`
    pub fn ending(today: NaiveDate, days: u32) -> Self {
        Self {
            start: today
                .checked_sub_signed(Duration::days(i64::from(days)))
                .unwrap_or(NaiveDate::MIN),
            end: today,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.start..=self.end).contains(&date)
    }
}

/// A source of bank transactions
#[async_trait]
pub trait TransactionFeed: Send + Sync {
    /// Fetch transactions inside the window
    async fn fetch(&self, window: &LookbackWindow) -> Result<Vec<RawTransaction>>;

    /// Short name for logs
    fn name(&self) -> &str;
}

/// Reads transactions from an exported JSON or CSV file
#[derive(Debug, Clone)]
pub struct FileFeed {
    path: PathBuf,
}

impl FileFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TransactionFeed for FileFeed {
    async fn fetch(&self, window: &LookbackWindow) -> Result<Vec<RawTransaction>> {
        let transactions = import::load_transactions(&self.path)?;

        let total = transactions.len();
        // Undated rows pass through; detection discards them
        let in_window: Vec<RawTransaction> = transactions
            .into_iter()
            .filter(|tx| tx.day().map_or(true, |day| window.contains(day)))
            .collect();

        debug!(
            "{}: kept {} of {} transactions between {} and {}",
            self.name(),
            in_window.len(),
            total,
            window.start,
            window.end
        );
        Ok(in_window)
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookback_window() {
        let today = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        let window = LookbackWindow::ending(today, 90);
        assert_eq!(window.start, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert!(window.contains(today));
        assert!(window.contains(window.start));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2026, 4, 2).unwrap()));
    }

    #[tokio::test]
    async fn test_file_feed_filters_to_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transactions.json");
        std::fs::write(
            &path,
            r#"[
                {"amount": 9.99, "merchant_name": "Spotify", "date": "2025-12-01"},
                {"amount": 9.99, "merchant_name": "Spotify", "date": "2026-01-15"},
                {"amount": 9.99, "merchant_name": "Spotify", "date": "2026-02-14"},
                {"amount": 9.99, "merchant_name": "Spotify"}
            ]"#,
        )
        .unwrap();

        let feed = FileFeed::new(&path);
        let window = LookbackWindow::ending(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(), 90);
        let transactions = feed.fetch(&window).await.unwrap();

        assert_eq!(transactions.len(), 3);
        assert!(transactions.iter().all(|tx| tx.date.as_deref() != Some("2025-12-01")));
    }

    #[tokio::test]
    async fn test_file_feed_missing_file() {
        let feed = FileFeed::new("/nonexistent/subtrack/transactions.json");
        let window = LookbackWindow::ending(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(), 90);
        assert!(feed.fetch(&window).await.is_err());
    }
}
