//! Offline analysis of monitoring payloads: averages, peaks, error counts.
//!
//! Operates on the schemaless records returned by the API
//! (`/api/performance` metrics and `/api/errors` entries).

use serde_json::Value;
use std::collections::BTreeMap;

const AVERAGED_FIELDS: [&str; 4] = ["cpu_usage", "memory_usage", "disk_usage", "execution_time"];

/// Average the standard numeric fields over a metrics list. Missing fields
/// count as zero, matching the server's own reporting. Empty input yields
/// an empty map.
pub fn calculate_averages(metrics: &[Value]) -> BTreeMap<String, f64> {
    if metrics.is_empty() {
        return BTreeMap::new();
    }
    let mut totals = BTreeMap::new();
    for field in AVERAGED_FIELDS {
        let total: f64 = metrics
            .iter()
            .map(|m| m.get(field).and_then(Value::as_f64).unwrap_or(0.0))
            .sum();
        totals.insert(field.to_string(), total / metrics.len() as f64);
    }
    totals
}

/// A single peak observation.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PeakSample {
    pub value: f64,
    pub timestamp: Option<String>,
    pub function: Option<String>,
}

/// Peak resource usage across a metrics list.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct PeakUsage {
    pub cpu: Option<PeakSample>,
    pub memory: Option<PeakSample>,
    pub execution_time: Option<PeakSample>,
}

/// Find the highest `cpu_usage`, `memory_usage`, and `execution_time`
/// values, together with when and where they occurred.
pub fn find_peak_usage(metrics: &[Value]) -> PeakUsage {
    let mut peak = PeakUsage::default();
    for metric in metrics {
        update_peak(&mut peak.cpu, metric, "cpu_usage");
        update_peak(&mut peak.memory, metric, "memory_usage");
        update_peak(&mut peak.execution_time, metric, "execution_time");
    }
    peak
}

fn update_peak(slot: &mut Option<PeakSample>, metric: &Value, field: &str) {
    let Some(value) = metric.get(field).and_then(Value::as_f64) else {
        return;
    };
    if slot.as_ref().is_some_and(|s| s.value >= value) {
        return;
    }
    *slot = Some(PeakSample {
        value,
        timestamp: metric
            .get("timestamp")
            .and_then(Value::as_str)
            .map(String::from),
        function: metric
            .get("function_name")
            .and_then(Value::as_str)
            .map(String::from),
    });
}

/// Count errors by their `error_type` field; entries without one are
/// bucketed as `UNKNOWN`.
pub fn count_errors_by_type(errors: &[Value]) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for error in errors {
        let error_type = error
            .get("error_type")
            .and_then(Value::as_str)
            .unwrap_or("UNKNOWN");
        *counts.entry(error_type.to_string()).or_insert(0) += 1;
    }
    counts
}
