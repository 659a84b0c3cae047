//! Subscription operations

use chrono::NaiveDate;
use rusqlite::{params, Row};

use super::{parse_datetime, Database};
use crate::dates::{self, format_iso_date};
use crate::error::{Error, Result};
use crate::models::{Frequency, NewSubscription, Subscription, SubscriptionUpdate};

const SUBSCRIPTION_COLUMNS: &str = "id, user_id, name, amount, frequency, due_date, created_at";

fn row_to_subscription(row: &Row<'_>) -> rusqlite::Result<Subscription> {
    let frequency: String = row.get(4)?;
    let created_at: String = row.get(6)?;

    Ok(Subscription {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        amount: row.get(3)?,
        frequency: Frequency::parse_lenient(&frequency),
        due_date: row.get(5)?,
        created_at: parse_datetime(&created_at),
    })
}

fn validate_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidData("subscription name is required".to_string()));
    }
    Ok(name)
}

fn validate_amount(amount: f64) -> Result<f64> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidData(format!(
            "amount must be a non-negative number, got {}",
            amount
        )));
    }
    Ok(amount)
}

/// Normalize a due date to `YYYY-MM-DD`; blank means "no due date"
fn normalize_due_date(due_date: Option<&str>) -> Result<Option<String>> {
    match due_date.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => dates::parse_calendar_day(raw)
            .map(|day| Some(format_iso_date(day)))
            .ok_or_else(|| Error::InvalidDate(format!("cannot parse '{}'", raw))),
    }
}

impl Database {
    /// Start tracking a subscription for a user
    pub fn create_subscription(&self, user_id: &str, new: &NewSubscription) -> Result<Subscription> {
        let name = validate_name(&new.name)?;
        let amount = validate_amount(new.amount)?;
        let due_date = normalize_due_date(new.due_date.as_deref())?;

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO subscriptions (user_id, name, amount, frequency, due_date)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![user_id, name, amount, new.frequency.as_str(), due_date],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_subscription(id)?
            .ok_or_else(|| Error::NotFound(format!("subscription {}", id)))
    }

    /// List a user's subscriptions in creation order
    pub fn list_subscriptions(&self, user_id: &str) -> Result<Vec<Subscription>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM subscriptions WHERE user_id = ? ORDER BY id",
            SUBSCRIPTION_COLUMNS
        ))?;

        let subscriptions = stmt
            .query_map(params![user_id], row_to_subscription)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(subscriptions)
    }

    /// Get subscription by ID
    pub fn get_subscription(&self, id: i64) -> Result<Option<Subscription>> {
        let conn = self.conn()?;

        let result = conn.query_row(
            &format!("SELECT {} FROM subscriptions WHERE id = ?", SUBSCRIPTION_COLUMNS),
            params![id],
            row_to_subscription,
        );

        match result {
            Ok(sub) => Ok(Some(sub)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Apply a partial update; fields left as `None` keep their value
    pub fn update_subscription(&self, id: i64, update: &SubscriptionUpdate) -> Result<Subscription> {
        let existing = self
            .get_subscription(id)?
            .ok_or_else(|| Error::NotFound(format!("subscription {}", id)))?;

        let name = match update.name.as_deref() {
            Some(name) => validate_name(name)?.to_string(),
            None => existing.name,
        };
        let amount = match update.amount {
            Some(amount) => validate_amount(amount)?,
            None => existing.amount,
        };
        let frequency = update.frequency.unwrap_or(existing.frequency);
        let due_date = match update.due_date.as_deref() {
            Some(due) => normalize_due_date(Some(due))?,
            None => existing.due_date,
        };

        let conn = self.conn()?;
        conn.execute(
            r#"
            UPDATE subscriptions
            SET name = ?, amount = ?, frequency = ?, due_date = ?
            WHERE id = ?
            "#,
            params![name, amount, frequency.as_str(), due_date, id],
        )?;
        drop(conn);

        self.get_subscription(id)?
            .ok_or_else(|| Error::NotFound(format!("subscription {}", id)))
    }

    /// Record a new due date (after a payment)
    pub fn update_due_date(&self, id: i64, due: NaiveDate) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE subscriptions SET due_date = ? WHERE id = ?",
            params![format_iso_date(due), id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("subscription {}", id)));
        }
        Ok(())
    }

    /// Delete a subscription by ID
    pub fn delete_subscription(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM subscriptions WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("subscription {}", id)));
        }
        Ok(())
    }
}
