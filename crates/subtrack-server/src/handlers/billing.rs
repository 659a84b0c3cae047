//! Billing cycle handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState};
use subtrack_core::dates::{self, days_until};
use subtrack_core::{BillingCycle, Frequency};

/// Request body for an ad-hoc due date check
#[derive(Debug, Deserialize)]
pub struct NextDueRequest {
    pub due_date: Option<String>,
    /// Unrecognized or missing values are treated as monthly
    #[serde(default)]
    pub frequency: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NextDueResponse {
    pub eligible: bool,
    pub days_until_due: i64,
    pub grace_days: i64,
    pub next_due_date: NaiveDate,
}

/// POST /api/billing/next-due - Payment window and next due date for a due date
pub async fn next_due(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NextDueRequest>,
) -> Result<Json<NextDueResponse>, AppError> {
    let today = state.clock.today();
    let frequency = body
        .frequency
        .as_deref()
        .map(Frequency::parse_lenient)
        .unwrap_or(Frequency::Monthly);
    let cycle = BillingCycle::with_config(state.config.billing.clone());

    let due = dates::parse_due_date(body.due_date.as_deref())?;
    let next_due_date = cycle.next_due_date(due, frequency, today)?;

    Ok(Json(NextDueResponse {
        eligible: cycle.is_eligible_on(due, frequency, today),
        days_until_due: days_until(due, today),
        grace_days: cycle.grace_days(frequency),
        next_due_date,
    }))
}
