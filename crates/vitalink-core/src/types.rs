//! Shared value types for health data

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single health reading from an upstream source (wearable, API, manual entry)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthMetric {
    /// Kind of reading (e.g. "heart_rate", "sleep_duration", "steps")
    pub metric_type: String,
    /// Numeric value of the reading
    pub value: f64,
    /// Unit the value is expressed in (e.g. "bpm", "hours")
    pub unit: String,
    /// Where the reading came from (e.g. "oura", "fitbit", "manual")
    pub source: String,
    /// When the reading was taken
    pub recorded_at: DateTime<Utc>,
}

impl HealthMetric {
    /// Create a new metric recorded now
    pub fn new(
        metric_type: impl Into<String>,
        value: f64,
        unit: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            metric_type: metric_type.into(),
            value,
            unit: unit.into(),
            source: source.into(),
            recorded_at: Utc::now(),
        }
    }
}

/// Reporting period for AI-generated summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryPeriod {
    Daily,
    Weekly,
    Monthly,
}

impl std::fmt::Display for SummaryPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummaryPeriod::Daily => write!(f, "day"),
            SummaryPeriod::Weekly => write!(f, "week"),
            SummaryPeriod::Monthly => write!(f, "month"),
        }
    }
}
