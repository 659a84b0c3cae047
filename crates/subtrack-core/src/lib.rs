//! Subtrack Core Library
//!
//! Shared functionality for the subtrack subscription tracker:
//! - Recurring charge detection over bank transactions
//! - Billing cycle engine (payment windows, clamped due-date advancement)
//! - Spending summaries
//! - Transaction feeds and CSV/JSON import
//! - Database access and migrations
//! - Layered TOML configuration

pub mod billing;
pub mod config;
pub mod dates;
pub mod db;
pub mod detect;
pub mod error;
pub mod feed;
pub mod import;
pub mod models;
pub mod summary;

pub use billing::{
    add_billing_period, BillingConfig, BillingCycle, Clock, FixedClock, PaymentOutcome,
    SystemClock,
};
pub use config::{AppConfig, FeedConfig};
pub use db::Database;
pub use detect::{detect_recurring, DetectionConfig, RecurrenceDetector};
pub use error::{Error, Result};
pub use feed::{FileFeed, LookbackWindow, TransactionFeed};
pub use models::{
    DetectionReport, Frequency, NewSubscription, RawTransaction, RecurringCandidate,
    Subscription, SubscriptionUpdate,
};
pub use summary::{sort_by_due_date, SpendingSummary};
