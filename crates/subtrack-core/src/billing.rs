//! Billing cycle engine
//!
//! Decides whether a subscription can be marked paid and where its next due
//! date lands afterwards. A subscription is payable once its due date is
//! within the grace window for its frequency (7 days monthly, 30 days yearly);
//! overdue subscriptions are always payable.
//!
//! "Today" is always passed in, so results are deterministic for a given day.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dates::{self, add_months_clamped, add_years_clamped, days_until};
use crate::error::{Error, Result};
use crate::models::{Frequency, Subscription};

/// Grace windows, in days before the due date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    pub monthly_grace_days: i64,
    pub yearly_grace_days: i64,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            monthly_grace_days: 7,
            yearly_grace_days: 30,
        }
    }
}

impl BillingConfig {
    pub fn grace_days(&self, frequency: Frequency) -> i64 {
        match frequency {
            Frequency::Monthly => self.monthly_grace_days,
            Frequency::Yearly => self.yearly_grace_days,
        }
    }
}

/// Source of the current calendar day
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local calendar day of the host
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always reports the same day
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Add `count` billing periods, clamping to the end of short months
pub fn add_billing_period(date: NaiveDate, frequency: Frequency, count: i32) -> Option<NaiveDate> {
    match frequency {
        Frequency::Monthly => add_months_clamped(date, count),
        Frequency::Yearly => add_years_clamped(date, count),
    }
}

/// Result of marking a subscription paid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentOutcome {
    pub previous_due: NaiveDate,
    pub next_due: NaiveDate,
    /// Days from today until the previous due date (negative when overdue)
    pub days_until_due: i64,
    /// Billing periods skipped forward
    pub periods_advanced: i32,
}

#[derive(Debug, Clone, Default)]
pub struct BillingCycle {
    config: BillingConfig,
}

impl BillingCycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BillingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BillingConfig {
        &self.config
    }

    pub fn grace_days(&self, frequency: Frequency) -> i64 {
        self.config.grace_days(frequency)
    }

    /// Whether a stored due date is inside its payment window.
    ///
    /// Missing or unreadable due dates are never payable.
    pub fn is_eligible_for_payment(
        &self,
        due_date: Option<&str>,
        frequency: Frequency,
        today: NaiveDate,
    ) -> bool {
        match dates::parse_due_date(due_date) {
            Ok(due) => self.is_eligible_on(due, frequency, today),
            Err(e) => {
                debug!("Not eligible for payment: {}", e);
                false
            }
        }
    }

    pub fn is_eligible_on(&self, due: NaiveDate, frequency: Frequency, today: NaiveDate) -> bool {
        days_until(due, today) <= self.grace_days(frequency)
    }

    /// Next due date after paying a subscription whose due date is stored as text
    pub fn advance_due_date(
        &self,
        due_date: Option<&str>,
        frequency: Frequency,
        today: NaiveDate,
    ) -> Result<NaiveDate> {
        let due = dates::parse_due_date(due_date)?;
        self.next_due_date(due, frequency, today)
    }

    /// Next due date after paying: the first whole number of billing periods
    /// past `due` that falls outside the grace window.
    ///
    /// Each candidate is computed from `due` itself, so a due date on the 31st
    /// returns to the 31st in long months after clamping in short ones.
    pub fn next_due_date(
        &self,
        due: NaiveDate,
        frequency: Frequency,
        today: NaiveDate,
    ) -> Result<NaiveDate> {
        self.advance(due, frequency, today).map(|(next, _)| next)
    }

    fn advance(
        &self,
        due: NaiveDate,
        frequency: Frequency,
        today: NaiveDate,
    ) -> Result<(NaiveDate, i32)> {
        let grace = self.grace_days(frequency);
        let mut periods = 0i32;

        loop {
            periods = periods
                .checked_add(1)
                .ok_or_else(|| Error::InvalidDate(format!("cannot advance {}", due)))?;
            let candidate = add_billing_period(due, frequency, periods).ok_or_else(|| {
                Error::InvalidDate(format!("{} + {} {} is out of range", due, periods, frequency))
            })?;

            if days_until(candidate, today) > grace {
                debug!(
                    "Advanced {} due date {} by {} period(s) to {}",
                    frequency, due, periods, candidate
                );
                return Ok((candidate, periods));
            }
        }
    }

    /// Mark a subscription paid.
    ///
    /// Fails with [`Error::NotYetPayable`] when the due date is still outside
    /// the grace window, and with [`Error::InvalidDate`] when it is unreadable.
    pub fn mark_paid(&self, subscription: &Subscription, today: NaiveDate) -> Result<PaymentOutcome> {
        let due = dates::parse_due_date(subscription.due_date.as_deref())?;
        let frequency = subscription.frequency;
        let days_until_due = days_until(due, today);
        let grace_days = self.grace_days(frequency);

        if days_until_due > grace_days {
            return Err(Error::NotYetPayable {
                days_until_due,
                grace_days,
            });
        }

        let (next_due, periods_advanced) = self.advance(due, frequency, today)?;
        Ok(PaymentOutcome {
            previous_due: due,
            next_due,
            days_until_due,
            periods_advanced,
        })
    }
}
