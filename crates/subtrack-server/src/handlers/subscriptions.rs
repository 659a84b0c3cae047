//! Subscription management handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppError, AppState, SuccessResponse, DEFAULT_USER};
use subtrack_core::{
    sort_by_due_date, BillingCycle, NewSubscription, SpendingSummary, Subscription,
    SubscriptionUpdate,
};

/// Query params selecting whose subscriptions to read
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: Option<String>,
}

impl UserQuery {
    fn user_id(&self) -> &str {
        self.user_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_USER)
    }
}

/// GET /api/subscriptions - List a user's subscriptions, soonest due first
pub async fn list_subscriptions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<Subscription>>, AppError> {
    let mut subscriptions = state.db.list_subscriptions(query.user_id())?;
    sort_by_due_date(&mut subscriptions);
    Ok(Json(subscriptions))
}

/// Request body for creating a subscription
#[derive(Debug, Deserialize)]
pub struct CreateSubscriptionRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(flatten)]
    pub subscription: NewSubscription,
}

/// POST /api/subscriptions - Start tracking a subscription
pub async fn create_subscription(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateSubscriptionRequest>,
) -> Result<Json<Subscription>, AppError> {
    let user_id = body
        .user_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_USER);

    let subscription = state.db.create_subscription(user_id, &body.subscription)?;
    info!("Created subscription {} ({})", subscription.id, subscription.name);
    Ok(Json(subscription))
}

/// GET /api/subscriptions/:id - Get a single subscription
pub async fn get_subscription(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Subscription>, AppError> {
    let subscription = state
        .db
        .get_subscription(id)?
        .ok_or_else(|| AppError::not_found(&format!("Subscription {} not found", id)))?;
    Ok(Json(subscription))
}

/// PUT /api/subscriptions/:id - Update fields of a subscription
pub async fn update_subscription(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(update): Json<SubscriptionUpdate>,
) -> Result<Json<Subscription>, AppError> {
    if update.is_empty() {
        return Err(AppError::bad_request("No fields to update"));
    }
    Ok(Json(state.db.update_subscription(id, &update)?))
}

/// DELETE /api/subscriptions/:id - Stop tracking a subscription
pub async fn delete_subscription(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.db.delete_subscription(id)?;
    info!("Deleted subscription {}", id);
    Ok(Json(SuccessResponse { success: true }))
}

/// Response for marking a subscription paid
#[derive(Serialize)]
pub struct PaymentResponse {
    pub subscription: Subscription,
    pub previous_due_date: NaiveDate,
    pub next_due_date: NaiveDate,
}

/// POST /api/subscriptions/:id/pay - Mark paid and advance the due date
pub async fn pay_subscription(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<PaymentResponse>, AppError> {
    let subscription = state
        .db
        .get_subscription(id)?
        .ok_or_else(|| AppError::not_found(&format!("Subscription {} not found", id)))?;

    let cycle = BillingCycle::with_config(state.config.billing.clone());
    let outcome = cycle.mark_paid(&subscription, state.clock.today())?;

    state.db.update_due_date(id, outcome.next_due)?;
    let subscription = state
        .db
        .get_subscription(id)?
        .ok_or_else(|| AppError::not_found(&format!("Subscription {} not found", id)))?;

    info!(
        "Marked subscription {} paid: {} -> {}",
        id, outcome.previous_due, outcome.next_due
    );

    Ok(Json(PaymentResponse {
        subscription,
        previous_due_date: outcome.previous_due,
        next_due_date: outcome.next_due,
    }))
}

/// GET /api/subscriptions/summary - Spending summary for a user
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> Result<Json<SpendingSummary>, AppError> {
    let subscriptions = state.db.list_subscriptions(query.user_id())?;
    Ok(Json(SpendingSummary::compute(
        &subscriptions,
        state.clock.today(),
    )))
}
