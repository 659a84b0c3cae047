//! Recurring charge detection handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;

use crate::{AppError, AppState};
use subtrack_core::{DetectionReport, RawTransaction, RecurrenceDetector};

/// Request body for detection: transactions as delivered by the aggregator
#[derive(Debug, Deserialize)]
pub struct DetectRequest {
    #[serde(default)]
    pub transactions: Vec<RawTransaction>,
}

/// POST /api/recurring/detect - Find recurring charges in a batch of transactions
pub async fn detect_recurring(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DetectRequest>,
) -> Result<Json<DetectionReport>, AppError> {
    let detector = RecurrenceDetector::with_config(state.config.detection.clone());
    let report = detector.report(&body.transactions);

    info!(
        "Detection request: {} transactions analyzed, {} recurring",
        report.analyzed,
        report.recurring.len()
    );

    Ok(Json(report))
}
