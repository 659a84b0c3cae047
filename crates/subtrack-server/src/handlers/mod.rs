//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod billing;
pub mod detection;
pub mod subscriptions;

// Re-export all handlers for use in router
pub use billing::*;
pub use detection::*;
pub use subscriptions::*;

use axum::Json;
use serde_json::{json, Value};

/// GET /api/health - Liveness check
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
