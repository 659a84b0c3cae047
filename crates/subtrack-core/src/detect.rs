//! Recurring charge detection
//!
//! Infers which merchants in a batch of bank transactions are billing on a
//! regular schedule. A merchant qualifies when:
//! 1. It has at least two debits in the batch
//! 2. Every charge is within 10% of the mean charge
//! 3. The mean gap between charges looks monthly (25-35 days) or yearly (350-380 days)
//!
//! Detection is pure: no state is kept between calls and malformed
//! transactions are dropped instead of reported.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::{DetectionReport, Frequency, RawTransaction, RecurringCandidate};

/// Detection thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Minimum charges from one merchant to infer a pattern
    pub min_occurrences: usize,
    /// Maximum relative deviation of any charge from the mean (exclusive)
    pub amount_variance: f64,
    /// Mean interval range (inclusive, in days) classified as monthly
    pub monthly_min_days: f64,
    pub monthly_max_days: f64,
    /// Mean interval range (inclusive, in days) classified as yearly
    pub yearly_min_days: f64,
    pub yearly_max_days: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_occurrences: 2,
            amount_variance: 0.10,
            monthly_min_days: 25.0,
            monthly_max_days: 35.0,
            yearly_min_days: 350.0,
            yearly_max_days: 380.0,
        }
    }
}

impl DetectionConfig {
    /// Classify a mean interval, or `None` if it matches no cadence
    pub fn classify_interval(&self, mean_days: f64) -> Option<Frequency> {
        if (self.yearly_min_days..=self.yearly_max_days).contains(&mean_days) {
            Some(Frequency::Yearly)
        } else if (self.monthly_min_days..=self.monthly_max_days).contains(&mean_days) {
            Some(Frequency::Monthly)
        } else {
            None
        }
    }
}

/// One debit that survived filtering
#[derive(Debug, Clone, Copy)]
struct Charge<'a> {
    amount: f64,
    date: NaiveDate,
    category: &'a str,
}

/// Charges from one merchant, in input order
#[derive(Debug)]
struct MerchantGroup<'a> {
    merchant: &'a str,
    charges: Vec<Charge<'a>>,
}

/// Detects recurring charges in a batch of transactions
#[derive(Debug, Clone, Default)]
pub struct RecurrenceDetector {
    config: DetectionConfig,
}

impl RecurrenceDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Run detection and wrap the result with the number of transactions examined
    pub fn report(&self, transactions: &[RawTransaction]) -> DetectionReport {
        DetectionReport {
            recurring: self.detect(transactions),
            analyzed: transactions.len(),
        }
    }

    /// Find recurring charges, most expensive first
    pub fn detect(&self, transactions: &[RawTransaction]) -> Vec<RecurringCandidate> {
        let groups = group_by_merchant(transactions);
        let group_count = groups.len();

        let mut recurring: Vec<RecurringCandidate> = groups
            .into_iter()
            .filter_map(|group| self.evaluate_group(group))
            .collect();

        // Stable: merchants with equal amounts keep first-seen order
        recurring.sort_by(|a, b| b.amount.total_cmp(&a.amount));

        info!(
            "Recurring detection: {} transactions, {} merchants, {} recurring",
            transactions.len(),
            group_count,
            recurring.len()
        );

        recurring
    }

    fn evaluate_group(&self, group: MerchantGroup<'_>) -> Option<RecurringCandidate> {
        let charges = &group.charges;
        if charges.len() < self.config.min_occurrences.max(2) {
            debug!(
                "Skipping {} - only {} charge(s)",
                group.merchant,
                charges.len()
            );
            return None;
        }

        let mean_amount = mean(charges.iter().map(|c| c.amount))?;
        let consistent = charges
            .iter()
            .all(|c| (c.amount - mean_amount).abs() / mean_amount < self.config.amount_variance);
        if !consistent {
            debug!(
                "Skipping {} - amounts vary more than {:.0}% around ${:.2}",
                group.merchant,
                self.config.amount_variance * 100.0,
                mean_amount
            );
            return None;
        }

        let mut dates: Vec<NaiveDate> = charges.iter().map(|c| c.date).collect();
        dates.sort();

        let mean_interval = mean(dates.windows(2).map(|w| (w[1] - w[0]).num_days() as f64))?;
        let Some(frequency) = self.config.classify_interval(mean_interval) else {
            debug!(
                "Skipping {} - mean interval {:.1} days matches no cadence",
                group.merchant, mean_interval
            );
            return None;
        };

        let last_charge = *dates.last()?;
        debug!(
            "Found recurring charge: {} @ ${:.2}/{} (last {})",
            group.merchant, mean_amount, frequency, last_charge
        );

        Some(RecurringCandidate {
            name: group.merchant.to_string(),
            amount: round_cents(mean_amount),
            frequency,
            category: charges[0].category.to_string(),
            last_charge,
            occurrences: charges.len(),
        })
    }
}

/// Detect recurring charges with the default thresholds
pub fn detect_recurring(transactions: &[RawTransaction]) -> Vec<RecurringCandidate> {
    RecurrenceDetector::new().detect(transactions)
}

/// Group debits by merchant key, keeping groups in first-seen order
fn group_by_merchant(transactions: &[RawTransaction]) -> Vec<MerchantGroup<'_>> {
    let mut groups: Vec<MerchantGroup<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for tx in transactions {
        // Refunds and credits are never recurring charges
        if !(tx.amount > 0.0) {
            continue;
        }
        let Some(merchant) = tx.merchant_key() else {
            continue;
        };
        let Some(date) = tx.day() else {
            debug!("Skipping {} charge with unreadable date {:?}", merchant, tx.date);
            continue;
        };

        let charge = Charge {
            amount: tx.amount,
            date,
            category: tx.primary_category(),
        };

        match index.get(merchant) {
            Some(&i) => groups[i].charges.push(charge),
            None => {
                index.insert(merchant, groups.len());
                groups.push(MerchantGroup {
                    merchant,
                    charges: vec![charge],
                });
            }
        }
    }

    groups
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
