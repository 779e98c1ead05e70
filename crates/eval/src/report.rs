use crate::benchmark::BenchmarkResult;
use crate::stats::GroupSummary;

pub fn format_result_line(result: &BenchmarkResult) -> String {
    let time = result
        .processing_time
        .map(|t| format!("{:.2}s", t))
        .unwrap_or_else(|| "N/A".to_string());
    let status = result
        .response_status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "N/A".to_string());

    format!(
        "Model: {} | Type: {} | {} | Tokens: {} | Time: {} | Status: {}",
        result.model, result.extraction_type, result.text_id, result.num_tokens, time, status
    )
}

pub fn format_summary_line(summary: &GroupSummary) -> String {
    let secs = |v: Option<f64>| {
        v.map(|s| format!("{:.2}s", s))
            .unwrap_or_else(|| "N/A".to_string())
    };

    format!(
        "  {} ({}): {} requests, {} failed | Avg tokens: {:.0} | Avg: {} | P50: {} | P95: {}",
        summary.model,
        summary.extraction_type,
        summary.requests,
        summary.failures,
        summary.avg_tokens,
        secs(summary.avg_seconds),
        secs(summary.p50_seconds),
        secs(summary.p95_seconds),
    )
}

pub fn print_results(results: &[BenchmarkResult], summary: &[GroupSummary]) {
    println!("\nBenchmark Results:");
    for result in results {
        println!("{}", format_result_line(result));
    }

    println!("\nSummary:");
    for group in summary {
        println!("{}", format_summary_line(group));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use extract::{ExtractionMode, FailureKind, RequestFailure, ResponseOutput};

    fn failed_result() -> BenchmarkResult {
        BenchmarkResult {
            model: "llama3".to_string(),
            extraction_type: ExtractionMode::NuExtract,
            num_tokens: 42,
            processing_time: None,
            response_status: None,
            output: ResponseOutput::Failed(RequestFailure {
                kind: FailureKind::Network,
                message: "connection refused".to_string(),
            }),
            server_timings: None,
            text_id: "Article_2".to_string(),
        }
    }

    #[test]
    fn test_line_with_missing_time() {
        assert_eq!(
            format_result_line(&failed_result()),
            "Model: llama3 | Type: nuextract | Article_2 | Tokens: 42 | Time: N/A | Status: N/A"
        );
    }

    #[test]
    fn test_line_with_time() {
        let mut result = failed_result();
        result.processing_time = Some(3.14159);
        result.response_status = Some(200);
        assert!(format_result_line(&result).ends_with("| Time: 3.14s | Status: 200"));
    }

    #[test]
    fn test_summary_line() {
        let summary = GroupSummary {
            model: "llama3".to_string(),
            extraction_type: ExtractionMode::Default,
            requests: 5,
            failures: 1,
            avg_tokens: 812.4,
            avg_seconds: Some(1.5),
            p50_seconds: Some(1.25),
            p95_seconds: None,
        };
        assert_eq!(
            format_summary_line(&summary),
            "  llama3 (default): 5 requests, 1 failed | Avg tokens: 812 | Avg: 1.50s | P50: 1.25s | P95: N/A"
        );
    }
}
