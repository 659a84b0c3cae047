//! Spending summary over tracked subscriptions

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::Serialize;

use crate::dates::days_until;
use crate::models::{Frequency, Subscription};

/// Days ahead counted as "upcoming"
pub const UPCOMING_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpendingSummary {
    /// Monthly spend with yearly plans spread over 12 months
    pub monthly_total: f64,
    /// Yearly spend with monthly plans counted 12 times
    pub yearly_total: f64,
    pub monthly_count: usize,
    pub yearly_count: usize,
    /// Subscriptions due between today and a week from today
    pub upcoming_count: usize,
    pub average_monthly_cost: f64,
    /// Name of the subscription with the highest monthly-equivalent cost
    pub most_expensive: Option<String>,
}

/// Cost of a subscription expressed per month
pub fn monthly_equivalent(subscription: &Subscription) -> f64 {
    match subscription.frequency {
        Frequency::Monthly => subscription.amount,
        Frequency::Yearly => subscription.amount / 12.0,
    }
}

impl SpendingSummary {
    pub fn compute(subscriptions: &[Subscription], today: NaiveDate) -> Self {
        let mut summary = Self::default();
        let mut most_expensive: Option<(&Subscription, f64)> = None;

        for sub in subscriptions {
            match sub.frequency {
                Frequency::Monthly => {
                    summary.monthly_count += 1;
                    summary.yearly_total += sub.amount * 12.0;
                }
                Frequency::Yearly => {
                    summary.yearly_count += 1;
                    summary.yearly_total += sub.amount;
                }
            }

            let monthly = monthly_equivalent(sub);
            summary.monthly_total += monthly;

            if most_expensive.map_or(true, |(_, best)| monthly > best) {
                most_expensive = Some((sub, monthly));
            }

            if let Some(due) = sub.due_day() {
                let days = days_until(due, today);
                if (0..=UPCOMING_WINDOW_DAYS).contains(&days) {
                    summary.upcoming_count += 1;
                }
            }
        }

        if !subscriptions.is_empty() {
            summary.average_monthly_cost = summary.monthly_total / subscriptions.len() as f64;
        }
        summary.most_expensive = most_expensive.map(|(sub, _)| sub.name.clone());
        summary
    }
}

/// Sort by due day, soonest first; missing or unreadable due dates go last
pub fn sort_by_due_date(subscriptions: &mut [Subscription]) {
    subscriptions.sort_by(|a, b| match (a.due_day(), b.due_day()) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
