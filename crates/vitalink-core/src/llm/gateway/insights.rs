//! Health insight and summary prompts built on the gateway

use std::collections::BTreeMap;

use serde_json::{Value, json};

use super::ProviderGateway;
use crate::error::VitalinkResult;
use crate::llm::messages::ChatMessage;
use crate::types::{HealthMetric, SummaryPeriod};

const INSIGHTS_SYSTEM_PROMPT: &str = "You are a health data assistant. You analyze personal \
     health metrics and explain trends in plain language. Be specific, cite the numbers you \
     are given, and never invent measurements. You do not give medical diagnoses; suggest \
     seeing a professional for anything concerning.";

impl ProviderGateway {
    /// Ask for insights about a set of health metrics
    pub async fn get_insights(
        &self,
        metrics: &[HealthMetric],
        question: &str,
    ) -> VitalinkResult<String> {
        let messages = vec![
            ChatMessage::system(INSIGHTS_SYSTEM_PROMPT),
            ChatMessage::user(format!(
                "Here are my health metrics grouped by type:\n{}\n\n{}",
                serialize_metrics(metrics),
                question
            )),
        ];
        Ok(self.chat_sync(&messages).await?.content)
    }

    /// Ask for a narrative summary of the given period
    pub async fn get_summary(
        &self,
        metrics: &[HealthMetric],
        period: SummaryPeriod,
    ) -> VitalinkResult<String> {
        let question = format!(
            "Write a short summary of this {}'s health data: overall picture first, \
             then one or two notable changes.",
            period
        );
        self.get_insights(metrics, &question).await
    }
}

/// Group metrics by type and render them as JSON with stable key order, so
/// identical inputs produce identical prompts (and identical cache keys).
fn serialize_metrics(metrics: &[HealthMetric]) -> String {
    let mut grouped: BTreeMap<&str, Vec<Value>> = BTreeMap::new();
    for metric in metrics {
        grouped.entry(&metric.metric_type).or_default().push(json!({
            "value": metric.value,
            "unit": metric.unit,
            "source": metric.source,
            "recorded_at": metric.recorded_at.to_rfc3339(),
        }));
    }
    serde_json::to_string_pretty(&grouped).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn metric(metric_type: &str, value: f64) -> HealthMetric {
        HealthMetric {
            metric_type: metric_type.to_string(),
            value,
            unit: "count".to_string(),
            source: "oura".to_string(),
            recorded_at: Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn serialization_is_deterministic() {
        let a = vec![metric("steps", 9000.0), metric("heart_rate", 61.0)];
        let b = vec![metric("heart_rate", 61.0), metric("steps", 9000.0)];
        // Same metrics, different input order: grouping differs but the
        // type keys come out sorted either way
        let rendered_a = serialize_metrics(&a);
        let rendered_b = serialize_metrics(&b);
        assert!(rendered_a.find("heart_rate").unwrap() < rendered_a.find("steps").unwrap());
        assert!(rendered_b.find("heart_rate").unwrap() < rendered_b.find("steps").unwrap());
    }

    #[test]
    fn groups_by_metric_type() {
        let rendered = serialize_metrics(&[metric("steps", 100.0), metric("steps", 200.0)]);
        assert_eq!(rendered.matches("\"steps\"").count(), 1);
        assert!(rendered.contains("100.0"));
        assert!(rendered.contains("200.0"));
    }
}
