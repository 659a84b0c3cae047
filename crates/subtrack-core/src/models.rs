//! Domain models for subtrack

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::dates;

/// Category used when a transaction carries none
pub const DEFAULT_CATEGORY: &str = "Other";

/// Subscription billing frequency
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Parse a frequency, treating anything unrecognized as monthly.
    ///
    /// Unknown values are recovered locally and reported with a warning
    /// rather than rejected.
    pub fn parse_lenient(s: &str) -> Self {
        match s.parse() {
            Ok(freq) => freq,
            Err(_) => {
                warn!(
                    frequency = s,
                    "Unrecognized frequency, defaulting to monthly"
                );
                Self::Monthly
            }
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(format!("Unknown frequency: {}", s)),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Serde helper: deserialize a frequency string with the monthly fallback
pub fn deserialize_frequency_lenient<'de, D>(deserializer: D) -> Result<Frequency, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(Frequency::parse_lenient(&raw))
}

/// Serde helper: optional variant of [`deserialize_frequency_lenient`]
pub fn deserialize_optional_frequency_lenient<'de, D>(
    deserializer: D,
) -> Result<Option<Frequency>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.map(|s| Frequency::parse_lenient(&s)))
}

/// A transaction as delivered by the bank aggregator
///
/// Positive amounts are debits (money spent), negative amounts are credits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    #[serde(default)]
    pub amount: f64,
    /// Cleaned merchant name, preferred over `name` when present
    #[serde(default)]
    pub merchant_name: Option<String>,
    /// Raw bank description
    #[serde(default, alias = "description")]
    pub name: Option<String>,
    /// ISO calendar day (`YYYY-MM-DD`)
    #[serde(default)]
    pub date: Option<String>,
    /// Category hierarchy, most general first
    #[serde(default)]
    pub category: Option<Vec<String>>,
}

impl RawTransaction {
    /// Merchant grouping key: merchant name, falling back to the description
    pub fn merchant_key(&self) -> Option<&str> {
        non_empty(self.merchant_name.as_deref()).or_else(|| non_empty(self.name.as_deref()))
    }

    /// First category element, or "Other"
    pub fn primary_category(&self) -> &str {
        self.category
            .as_ref()
            .and_then(|c| non_empty(c.first().map(String::as_str)))
            .unwrap_or(DEFAULT_CATEGORY)
    }

    /// Calendar day of the transaction, if the date can be read
    pub fn day(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(dates::parse_calendar_day)
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// A merchant pattern inferred to be a recurring charge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringCandidate {
    pub name: String,
    /// Mean charge, rounded to cents
    pub amount: f64,
    pub frequency: Frequency,
    pub category: String,
    #[serde(rename = "lastCharge")]
    pub last_charge: NaiveDate,
    pub occurrences: usize,
}

/// Result of running the detector over one batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    pub recurring: Vec<RecurringCandidate>,
    /// Number of transactions examined
    pub analyzed: usize,
}

/// A tracked subscription
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub amount: f64,
    pub frequency: Frequency,
    /// Due date as stored; may carry a time component or be missing
    pub due_date: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    /// Normalized calendar day of the due date
    pub fn due_day(&self) -> Option<NaiveDate> {
        self.due_date.as_deref().and_then(dates::parse_calendar_day)
    }
}

/// A subscription to be created
#[derive(Debug, Clone, Deserialize)]
pub struct NewSubscription {
    pub name: String,
    pub amount: f64,
    #[serde(default, deserialize_with = "deserialize_frequency_lenient")]
    pub frequency: Frequency,
    #[serde(default)]
    pub due_date: Option<String>,
}

/// Partial update of a subscription (absent fields are left alone)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_frequency_lenient")]
    pub frequency: Option<Frequency>,
    #[serde(default)]
    pub due_date: Option<String>,
}

impl SubscriptionUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.amount.is_none()
            && self.frequency.is_none()
            && self.due_date.is_none()
    }
}
