//! Detection and due date command implementations

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use subtrack_core::dates::{self, days_until};
use subtrack_core::{
    AppConfig, BillingCycle, DetectionReport, FileFeed, Frequency, LookbackWindow,
    RecurrenceDetector, TransactionFeed,
};

use super::{resolve_today, truncate};

/// Fetch the window of transactions ending `today` and run detection over it
pub async fn run_detect(
    config: &AppConfig,
    file: &Path,
    days: Option<u32>,
    today: NaiveDate,
) -> Result<DetectionReport> {
    let window = LookbackWindow::ending(today, days.unwrap_or(config.feed.lookback_days));
    let feed = FileFeed::new(file);
    let transactions = feed
        .fetch(&window)
        .await
        .with_context(|| format!("Failed to read transactions from {}", file.display()))?;

    Ok(RecurrenceDetector::with_config(config.detection.clone()).report(&transactions))
}

pub async fn cmd_detect(
    config: &AppConfig,
    file: &Path,
    days: Option<u32>,
    json: bool,
    today: Option<&str>,
) -> Result<DetectionReport> {
    let today = resolve_today(today)?;
    let report = run_detect(config, file, days, today).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(report);
    }

    println!(
        "🔍 Analyzed {} transactions from {}",
        report.analyzed,
        file.display()
    );

    if report.recurring.is_empty() {
        println!("   No recurring charges found.");
        return Ok(report);
    }

    println!();
    println!("📋 Recurring Charges");
    println!("   ─────────────────────────────────────────────────────────────");
    for candidate in &report.recurring {
        println!(
            "   {:24} │ {:>9}/{:<7} │ {:14} │ last {} ({}x)",
            truncate(&candidate.name, 24),
            format!("${:.2}", candidate.amount),
            candidate.frequency.as_str(),
            truncate(&candidate.category, 14),
            candidate.last_charge,
            candidate.occurrences
        );
    }
    println!();
    println!("Track one with: subtrack subscriptions add <name> --amount <amount> --due <date>");

    Ok(report)
}

pub fn cmd_due(config: &AppConfig, date: &str, frequency: &str, today: Option<&str>) -> Result<()> {
    let today = resolve_today(today)?;
    let frequency = Frequency::parse_lenient(frequency);
    let cycle = BillingCycle::with_config(config.billing.clone());

    let due = dates::parse_due_date(Some(date)).context("Invalid --date")?;
    let eligible = cycle.is_eligible_on(due, frequency, today);
    let next = cycle.next_due_date(due, frequency, today)?;
    let days = days_until(due, today);

    println!("📅 {} subscription due {}", frequency, due);
    match days {
        d if d < 0 => println!("   Overdue by {} day(s)", -d),
        0 => println!("   Due today"),
        d => println!("   Due in {} day(s)", d),
    }
    if eligible {
        println!("   ✅ Payable now (window opens {} days before)", cycle.grace_days(frequency));
    } else {
        println!(
            "   ⏳ Not payable yet (window opens {} days before)",
            cycle.grace_days(frequency)
        );
    }
    println!("   Next due date after payment: {}", next);

    Ok(())
}
