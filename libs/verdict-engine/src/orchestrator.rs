/// Test Case Orchestrator - run the pipeline once per test case
///
/// **Pipeline per case:**
/// submit -> wait -> classify -> compare (Accepted only) -> CaseResult
///
/// **Guarantees:**
/// - Cases run one at a time, in input order (one in-flight job at a time)
/// - Output length always equals input length
/// - A failing case becomes an ERROR record; the batch never returns early
///
/// The batch is a sequential fold over the cases: each step yields
/// `Result<CaseResult>` and `settle` turns the error side into data.
use crate::classifier::case_verdict;
use crate::client::SubmissionClient;
use crate::error::Result;
use crate::interpreter::InputInterpreter;
use crate::poller::ResultPoller;
use futures_util::stream::{self, StreamExt};
use std::time::Duration;
use tracing::{info, instrument, warn};
use verdict_common::types::{CaseResult, Interpretation, TestCase};

#[derive(Clone)]
pub struct TestCaseOrchestrator {
    client: SubmissionClient,
    poller: ResultPoller,
    budget: Duration,
}

impl TestCaseOrchestrator {
    pub fn new(client: SubmissionClient, poller: ResultPoller, budget: Duration) -> Self {
        Self {
            client,
            poller,
            budget,
        }
    }

    /// Run every case with its original input
    #[instrument(skip(self, code, test_cases), fields(cases = test_cases.len()))]
    pub async fn run(&self, code: &str, language: &str, test_cases: &[TestCase]) -> Vec<CaseResult> {
        let results: Vec<CaseResult> = stream::iter(test_cases)
            .then(move |test_case| async move {
                let attempt = self
                    .run_case(code, language, test_case, &test_case.input_data)
                    .await;
                settle(test_case, attempt)
            })
            .collect()
            .await;

        log_batch(&results);
        results
    }

    /// Run every case with interpreter-rewritten input where the rewrite succeeded
    #[instrument(skip(self, interpreter, code, test_cases, problem_context), fields(cases = test_cases.len()))]
    pub async fn run_interpreted(
        &self,
        interpreter: &dyn InputInterpreter,
        code: &str,
        language: &str,
        test_cases: &[TestCase],
        problem_context: Option<&str>,
    ) -> Vec<CaseResult> {
        let interpretations =
            interpretations_for(interpreter, test_cases, language, problem_context).await;
        self.run_with_interpretations(code, language, test_cases, interpretations)
            .await
    }

    /// Run cases against already-obtained interpretations (one per case, same order)
    pub async fn run_with_interpretations(
        &self,
        code: &str,
        language: &str,
        test_cases: &[TestCase],
        interpretations: Vec<Interpretation>,
    ) -> Vec<CaseResult> {
        let interpretations = align(interpretations, test_cases.len());

        let results: Vec<CaseResult> = stream::iter(test_cases.iter().zip(interpretations))
            .then(move |(test_case, interpretation)| async move {
                let input = interpretation.resolve_input(&test_case.input_data).to_string();
                let attempt = self.run_case(code, language, test_case, &input).await;

                // a failed case records the original input, whatever was submitted
                let used_input = if attempt.is_ok() {
                    input
                } else {
                    test_case.input_data.clone()
                };

                CaseResult {
                    used_input: Some(used_input),
                    llm_interpretation: Some(interpretation),
                    ..settle(test_case, attempt)
                }
            })
            .collect()
            .await;

        log_batch(&results);
        results
    }

    #[instrument(skip(self, code, test_case, input), fields(case_id = test_case.id))]
    async fn run_case(
        &self,
        code: &str,
        language: &str,
        test_case: &TestCase,
        input: &str,
    ) -> Result<CaseResult> {
        let handle = self.client.submit(code, language, input).await?;
        let result = self.poller.wait(&handle, self.budget).await?;
        let verdict = case_verdict(&result, &test_case.expected_output);

        info!(status = %verdict.status, status_id = result.status.id, "Test case finished");

        Ok(CaseResult {
            test_case: test_case.clone(),
            status: verdict.status,
            output: verdict.output,
            expected: test_case.expected_output.clone(),
            execution_time: result.time,
            memory: result.memory,
            error: verdict.error,
            llm_interpretation: None,
            used_input: None,
        })
    }
}

/// Convert one case's pipeline attempt into a result record
pub fn settle(test_case: &TestCase, attempt: Result<CaseResult>) -> CaseResult {
    attempt.unwrap_or_else(|err| {
        warn!(case_id = test_case.id, error = %err, "Test case failed before producing a verdict");
        CaseResult::error(test_case, err.to_string())
    })
}

/// Ask the interpreter for one interpretation per case; never fails
async fn interpretations_for(
    interpreter: &dyn InputInterpreter,
    test_cases: &[TestCase],
    language: &str,
    problem_context: Option<&str>,
) -> Vec<Interpretation> {
    if test_cases.is_empty() {
        return Vec::new();
    }

    match interpreter
        .interpret(test_cases, language, problem_context)
        .await
    {
        Ok(interpretations) => {
            if interpretations.len() != test_cases.len() {
                warn!(
                    expected = test_cases.len(),
                    returned = interpretations.len(),
                    "Interpreter returned a different number of interpretations"
                );
            }
            interpretations
        }
        Err(err) => {
            warn!(error = %err, "Input interpretation failed; using original inputs");
            let reason = format!("input interpretation failed: {}", err);
            test_cases
                .iter()
                .map(|_| Interpretation::unavailable(reason.clone()))
                .collect()
        }
    }
}

/// Pad or truncate to exactly `len` interpretations
fn align(mut interpretations: Vec<Interpretation>, len: usize) -> Vec<Interpretation> {
    interpretations.truncate(len);
    while interpretations.len() < len {
        interpretations.push(Interpretation::unavailable(
            "no interpretation returned for this test case",
        ));
    }
    interpretations
}

fn log_batch(results: &[CaseResult]) {
    let passed = results.iter().filter(|r| r.passed()).count();
    info!(total = results.len(), passed, "Batch complete");
}
