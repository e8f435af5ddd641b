use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single test case supplied by the caller. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: u32,
    pub input_data: String,
    pub expected_output: String,
    #[serde(default)]
    pub is_sample: bool,
}

/// Per-case verdict produced by the batch paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseStatus {
    #[serde(rename = "PASSED")]
    Passed,
    #[serde(rename = "FAILED")]
    Failed,
    #[serde(rename = "TLE")]
    TimeLimitExceeded,
    #[serde(rename = "CE")]
    CompilationError,
    #[serde(rename = "ERROR")]
    Error,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Passed => "PASSED",
            CaseStatus::Failed => "FAILED",
            CaseStatus::TimeLimitExceeded => "TLE",
            CaseStatus::CompilationError => "CE",
            CaseStatus::Error => "ERROR",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Rewritten stdin for one test case, as returned by the input interpreter.
///
/// `formatted_input` is only trusted when `success` is true.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    pub success: bool,
    #[serde(default)]
    pub formatted_input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Interpretation {
    /// Record used when the interpreter could not produce anything for a case
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            formatted_input: None,
            explanation: None,
            error: Some(reason.into()),
        }
    }

    /// The stdin to submit: the rewritten input when usable, else the original
    pub fn resolve_input<'a>(&'a self, original: &'a str) -> &'a str {
        match (self.success, self.formatted_input.as_deref()) {
            (true, Some(formatted)) => formatted,
            _ => original,
        }
    }
}

/// Outcome of one test case. Exactly one is produced per input case, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseResult {
    pub test_case: TestCase,
    pub status: CaseStatus,
    pub output: Option<String>,
    pub expected: String,
    pub execution_time: Option<f64>,
    pub memory: Option<u64>,
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_interpretation: Option<Interpretation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_input: Option<String>,
}

impl CaseResult {
    /// ERROR record for a case whose pipeline failed before producing a verdict
    pub fn error(test_case: &TestCase, message: impl Into<String>) -> Self {
        Self {
            test_case: test_case.clone(),
            status: CaseStatus::Error,
            output: None,
            expected: test_case.expected_output.clone(),
            execution_time: None,
            memory: None,
            error: Some(message.into()),
            llm_interpretation: None,
            used_input: None,
        }
    }

    pub fn passed(&self) -> bool {
        self.status == CaseStatus::Passed
    }
}

/// Remote status as reported by the execution engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInfo {
    pub id: u32,
    pub description: String,
}

/// Result of a single interactive execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub status: StatusInfo,
    pub stdout: String,
    pub stderr: String,
    pub compile_output: Option<String>,
    pub time: Option<f64>,
    pub memory: Option<u64>,
    pub error: Option<String>,
}

/// Verdict counts over a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub time_limit_exceeded: usize,
    pub compilation_errors: usize,
    pub errors: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[CaseResult]) -> Self {
        results.iter().fold(
            BatchSummary {
                total: results.len(),
                ..Default::default()
            },
            |mut summary, result| {
                match result.status {
                    CaseStatus::Passed => summary.passed += 1,
                    CaseStatus::Failed => summary.failed += 1,
                    CaseStatus::TimeLimitExceeded => summary.time_limit_exceeded += 1,
                    CaseStatus::CompilationError => summary.compilation_errors += 1,
                    CaseStatus::Error => summary.errors += 1,
                }
                summary
            },
        )
    }

    /// True when every case PASSED; an empty batch has nothing failing
    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }
}

/// Batch results plus their summary, as handed back to API and CLI callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub results: Vec<CaseResult>,
    pub summary: BatchSummary,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    pub fn new(results: Vec<CaseResult>) -> Self {
        let summary = BatchSummary::from_results(&results);
        Self {
            results,
            summary,
            finished_at: Utc::now(),
        }
    }
}
