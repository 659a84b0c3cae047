//! Subtrack Web Server
//!
//! Axum-based REST API for tracking subscriptions and detecting recurring
//! charges.
//!
//! Security features:
//! - Restrictive CORS policy
//! - Security headers (CSP, nosniff, frame denial)
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info};

use subtrack_core::{AppConfig, Clock, Database, SystemClock};

mod handlers;

/// User assumed when a request names none
pub const DEFAULT_USER: &str = "local";

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: AppConfig,
    /// Source of "today" for billing decisions
    pub clock: Arc<dyn Clock>,
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router
pub fn create_router(db: Database, config: AppConfig) -> Router {
    create_router_with_clock(db, config, Arc::new(SystemClock))
}

/// Create the application router with an explicit clock
pub fn create_router_with_clock(db: Database, config: AppConfig, clock: Arc<dyn Clock>) -> Router {
    let state = Arc::new(AppState { db, config, clock });

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        // Subscriptions
        .route(
            "/subscriptions",
            get(handlers::list_subscriptions).post(handlers::create_subscription),
        )
        .route("/subscriptions/summary", get(handlers::get_summary))
        .route(
            "/subscriptions/:id",
            get(handlers::get_subscription)
                .put(handlers::update_subscription)
                .delete(handlers::delete_subscription),
        )
        .route("/subscriptions/:id/pay", post(handlers::pay_subscription))
        // Detection
        .route("/recurring/detect", post(handlers::detect_recurring))
        // Billing
        .route("/billing/next-due", post(handlers::next_due));

    // Restrictive default: only allow same-origin
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let csp_value = HeaderValue::from_static("default-src 'self'; frame-ancestors 'none'");

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ))
}

/// Start the server
pub async fn serve(db: Database, config: AppConfig, host: &str, port: u16) -> anyhow::Result<()> {
    let app = create_router(db, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn conflict(msg: &str) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();

        // Caller mistakes carry their own message; everything else stays generic
        if let Some(core) = err.downcast_ref::<subtrack_core::Error>() {
            use subtrack_core::Error as CoreError;
            let message = core.to_string();
            match core {
                CoreError::InvalidDate(_) | CoreError::InvalidData(_) => {
                    return Self::bad_request(&message)
                }
                CoreError::NotFound(_) => return Self::not_found(&message),
                CoreError::NotYetPayable { .. } => return Self::conflict(&message),
                _ => {}
            }
        }

        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

#[cfg(test)]
mod tests;
