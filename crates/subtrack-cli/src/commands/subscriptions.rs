//! Subscription command implementations

use anyhow::{Context, Result};
use subtrack_core::dates::days_until;
use subtrack_core::{
    sort_by_due_date, AppConfig, BillingCycle, Database, Error, Frequency, NewSubscription,
    PaymentOutcome, SubscriptionUpdate,
};

use super::{resolve_today, truncate};

pub fn cmd_subscriptions_list(db: &Database, user_id: &str) -> Result<()> {
    let mut subscriptions = db.list_subscriptions(user_id)?;

    if subscriptions.is_empty() {
        println!("No subscriptions tracked yet. Add one with:");
        println!("  subtrack subscriptions add Netflix --amount 15.99 --due 2026-02-01");
        return Ok(());
    }

    sort_by_due_date(&mut subscriptions);

    println!();
    println!("📋 Subscriptions");
    println!("   ─────────────────────────────────────────────────────────────");

    for sub in subscriptions {
        println!(
            "   #{:<4} {:20} │ {:>9}/{:<7} │ due {}",
            sub.id,
            truncate(&sub.name, 20),
            format!("${:.2}", sub.amount),
            sub.frequency.as_str(),
            sub.due_day()
                .map(|d| d.to_string())
                .unwrap_or_else(|| "?".to_string())
        );
    }

    Ok(())
}

pub fn cmd_subscriptions_add(
    db: &Database,
    user_id: &str,
    name: &str,
    amount: f64,
    frequency: &str,
    due: Option<&str>,
) -> Result<i64> {
    let new = NewSubscription {
        name: name.to_string(),
        amount,
        frequency: Frequency::parse_lenient(frequency),
        due_date: due.map(String::from),
    };
    let sub = db
        .create_subscription(user_id, &new)
        .context("Failed to add subscription")?;

    println!(
        "✅ Tracking {} (ID: {}) at ${:.2}/{}",
        sub.name, sub.id, sub.amount, sub.frequency
    );
    Ok(sub.id)
}

pub fn cmd_subscriptions_edit(
    db: &Database,
    id: i64,
    name: Option<String>,
    amount: Option<f64>,
    frequency: Option<&str>,
    due: Option<String>,
) -> Result<()> {
    let update = SubscriptionUpdate {
        name,
        amount,
        frequency: frequency.map(Frequency::parse_lenient),
        due_date: due,
    };
    if update.is_empty() {
        anyhow::bail!("Nothing to change. Pass --name, --amount, --frequency or --due");
    }

    let sub = db.update_subscription(id, &update)?;
    println!("✅ Updated {} (ID: {})", sub.name, sub.id);
    Ok(())
}

pub fn cmd_subscriptions_delete(db: &Database, id: i64) -> Result<()> {
    db.delete_subscription(id)?;
    println!("🗑️  Subscription {} deleted", id);
    Ok(())
}

/// Mark a subscription paid and store its next due date
pub fn cmd_subscriptions_pay(
    db: &Database,
    config: &AppConfig,
    id: i64,
    today: Option<&str>,
) -> Result<PaymentOutcome> {
    let today = resolve_today(today)?;
    let sub = db
        .get_subscription(id)?
        .ok_or_else(|| anyhow::anyhow!("Subscription not found: {}", id))?;

    let cycle = BillingCycle::with_config(config.billing.clone());
    let outcome = match cycle.mark_paid(&sub, today) {
        Ok(outcome) => outcome,
        Err(Error::NotYetPayable {
            days_until_due,
            grace_days,
        }) => {
            anyhow::bail!(
                "{} is due in {} days; it can be marked paid {} days before the due date",
                sub.name,
                days_until_due,
                grace_days
            );
        }
        Err(e) => return Err(e).context("Failed to mark subscription paid"),
    };

    db.update_due_date(id, outcome.next_due)?;

    println!("💸 Marked {} paid", sub.name);
    println!(
        "   Next due: {} (in {} days)",
        outcome.next_due,
        days_until(outcome.next_due, today)
    );
    Ok(outcome)
}
