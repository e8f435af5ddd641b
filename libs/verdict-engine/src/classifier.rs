/// Outcome Classifier - terminal remote status -> verdict
///
/// **Classification (by status id):**
/// - 3 Accepted            -> PASSED / FAILED, decided by the comparator
/// - 4 Wrong Answer        -> FAILED
/// - 5 Time Limit Exceeded -> TLE
/// - 6 Compilation Error   -> CE
/// - anything else         -> ERROR
///
/// Two shapers sit on top of the same classification: `execution_report` for the
/// interactive single-execution path (keeps display defaults such as "No output")
/// and `case_verdict` for batch test cases (unused fields are left empty).
use crate::comparator::outputs_match;
use crate::decoder::ExecutionResult;
use crate::poller::{JobState, TerminalStatus};
use verdict_common::types::{CaseStatus, ExecutionReport};

pub const NO_OUTPUT: &str = "No output";
pub const TIME_LIMIT_EXCEEDED: &str = "Time Limit Exceeded";
pub const COMPILATION_ERROR: &str = "Compilation Error";
pub const RUNTIME_ERROR: &str = "Runtime Error";
pub const UNKNOWN_ERROR: &str = "Unknown Error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    CompilationError { diagnostic: String },
    Failed { description: Option<String> },
}

/// Classify a terminal result. Non-terminal ids are reported as failures.
pub fn classify(result: &ExecutionResult) -> Classification {
    match JobState::from_status_id(result.status.id) {
        JobState::Terminal(TerminalStatus::Accepted) => Classification::Accepted,
        JobState::Terminal(TerminalStatus::WrongAnswer) => Classification::WrongAnswer,
        JobState::Terminal(TerminalStatus::TimeLimitExceeded) => Classification::TimeLimitExceeded,
        JobState::Terminal(TerminalStatus::CompilationError) => Classification::CompilationError {
            diagnostic: non_blank(result.compile_output.as_deref())
                .unwrap_or(COMPILATION_ERROR)
                .to_string(),
        },
        JobState::Terminal(TerminalStatus::Other(_)) | JobState::Queued | JobState::Running => {
            Classification::Failed {
                description: non_blank(Some(&result.status.description)).map(String::from),
            }
        }
    }
}

/// Shape a result for interactive display
pub fn execution_report(result: ExecutionResult) -> ExecutionReport {
    let classification = classify(&result);
    let ExecutionResult {
        status,
        stdout,
        stderr,
        compile_output,
        time,
        memory,
    } = result;

    let (stdout, stderr, compile_output, error) = match classification {
        Classification::Accepted => (
            stdout
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| NO_OUTPUT.to_string()),
            stderr.unwrap_or_default(),
            compile_output,
            None,
        ),
        Classification::WrongAnswer => (
            stdout.unwrap_or_default(),
            stderr.unwrap_or_default(),
            compile_output,
            None,
        ),
        Classification::TimeLimitExceeded => (
            String::new(),
            TIME_LIMIT_EXCEEDED.to_string(),
            None,
            Some(TIME_LIMIT_EXCEEDED.to_string()),
        ),
        Classification::CompilationError { diagnostic } => (
            String::new(),
            String::new(),
            Some(diagnostic.clone()),
            Some(diagnostic),
        ),
        Classification::Failed { description } => (
            String::new(),
            description.clone().unwrap_or_else(|| RUNTIME_ERROR.to_string()),
            compile_output,
            Some(description.unwrap_or_else(|| UNKNOWN_ERROR.to_string())),
        ),
    };

    ExecutionReport {
        status,
        stdout,
        stderr,
        compile_output,
        time,
        memory,
        error,
    }
}

/// Verdict and compact fields for one batch test case
#[derive(Debug, Clone, PartialEq)]
pub struct CaseVerdict {
    pub status: CaseStatus,
    pub output: Option<String>,
    pub error: Option<String>,
}

pub fn case_verdict(result: &ExecutionResult, expected: &str) -> CaseVerdict {
    match classify(result) {
        Classification::Accepted => {
            let passed = outputs_match(result.stdout.as_deref(), Some(expected));
            CaseVerdict {
                status: if passed {
                    CaseStatus::Passed
                } else {
                    CaseStatus::Failed
                },
                output: Some(result.stdout.clone().unwrap_or_default()),
                error: None,
            }
        }
        Classification::WrongAnswer => CaseVerdict {
            status: CaseStatus::Failed,
            output: Some(result.stdout.clone().unwrap_or_default()),
            error: None,
        },
        Classification::TimeLimitExceeded => CaseVerdict {
            status: CaseStatus::TimeLimitExceeded,
            output: None,
            error: Some(TIME_LIMIT_EXCEEDED.to_string()),
        },
        Classification::CompilationError { diagnostic } => CaseVerdict {
            status: CaseStatus::CompilationError,
            output: None,
            error: Some(diagnostic),
        },
        Classification::Failed { description } => CaseVerdict {
            status: CaseStatus::Error,
            output: None,
            error: Some(description.unwrap_or_else(|| UNKNOWN_ERROR.to_string())),
        },
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
