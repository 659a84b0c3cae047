//! Spending summary command

use anyhow::Result;
use subtrack_core::{Database, SpendingSummary};

use super::resolve_today;

pub fn cmd_summary(db: &Database, user_id: &str, today: Option<&str>) -> Result<SpendingSummary> {
    let today = resolve_today(today)?;
    let subscriptions = db.list_subscriptions(user_id)?;
    let summary = SpendingSummary::compute(&subscriptions, today);

    println!();
    println!("📊 Spending Summary");
    println!("   ─────────────────────────────");
    println!("   Monthly total:      ${:.2}", summary.monthly_total);
    println!("   Yearly total:       ${:.2}", summary.yearly_total);
    println!(
        "   Subscriptions:      {} monthly, {} yearly",
        summary.monthly_count, summary.yearly_count
    );
    println!("   Due within 7 days:  {}", summary.upcoming_count);
    println!("   Average per month:  ${:.2}", summary.average_monthly_cost);
    if let Some(name) = &summary.most_expensive {
        println!("   Most expensive:     {}", name);
    }

    Ok(summary)
}
