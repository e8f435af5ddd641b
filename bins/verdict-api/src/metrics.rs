// Prometheus counters exposed on GET /metrics
use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};
use verdict_common::types::CaseResult;

lazy_static! {
    pub static ref EXECUTIONS: IntCounterVec = register_int_counter_vec!(
        "verdict_executions_total",
        "Execution requests by kind and outcome",
        &["kind", "outcome"]
    )
    .unwrap();
    pub static ref CASE_VERDICTS: IntCounterVec = register_int_counter_vec!(
        "verdict_case_verdicts_total",
        "Judged test cases by verdict",
        &["status"]
    )
    .unwrap();
}

pub fn record_execution(kind: &str, outcome: &str) {
    EXECUTIONS.with_label_values(&[kind, outcome]).inc();
}

pub fn record_cases(results: &[CaseResult]) {
    for result in results {
        CASE_VERDICTS
            .with_label_values(&[result.status.as_str()])
            .inc();
    }
}

/// Render every registered metric in the text exposition format
pub fn render() -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
