use serde::{Deserialize, Serialize};

use extract::ExtractionMode;

use crate::benchmark::BenchmarkResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub model: String,
    pub extraction_type: ExtractionMode,
    pub requests: usize,
    pub failures: usize,
    pub avg_tokens: f64,
    /// Latency fields only count requests that completed
    pub avg_seconds: Option<f64>,
    pub p50_seconds: Option<f64>,
    pub p95_seconds: Option<f64>,
}

/// Per (model, mode) summary, in the order groups first appear
pub fn summarize(results: &[BenchmarkResult]) -> Vec<GroupSummary> {
    let mut groups: Vec<((&str, ExtractionMode), Vec<&BenchmarkResult>)> = Vec::new();

    for result in results {
        let key = (result.model.as_str(), result.extraction_type);
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(result),
            None => groups.push((key, vec![result])),
        }
    }

    groups
        .into_iter()
        .map(|((model, mode), members)| compute_summary(model, mode, &members))
        .collect()
}

fn compute_summary(
    model: &str,
    mode: ExtractionMode,
    members: &[&BenchmarkResult],
) -> GroupSummary {
    let mut latencies: Vec<f64> = members.iter().filter_map(|r| r.processing_time).collect();
    latencies.sort_by(|a, b| a.total_cmp(b));

    let total_tokens: f64 = members.iter().map(|r| r.num_tokens as f64).sum();
    let avg_tokens = total_tokens / members.len() as f64;
    let avg_seconds = if latencies.is_empty() {
        None
    } else {
        Some(latencies.iter().sum::<f64>() / latencies.len() as f64)
    };

    GroupSummary {
        model: model.to_string(),
        extraction_type: mode,
        requests: members.len(),
        failures: members.iter().filter(|r| r.is_failure()).count(),
        avg_tokens,
        avg_seconds,
        p50_seconds: percentile(&latencies, 50),
        p95_seconds: percentile(&latencies, 95),
    }
}

/// Nearest-rank percentile of already sorted data: rank = ceil(p/100 * n), at least 1
pub fn percentile(sorted_data: &[f64], p: usize) -> Option<f64> {
    if sorted_data.is_empty() {
        return None;
    }
    let n = sorted_data.len();
    let rank = (p * n).div_ceil(100).clamp(1, n);
    Some(sorted_data[rank - 1])
}
