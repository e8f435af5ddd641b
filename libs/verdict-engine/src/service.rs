/// Execution Service - caller-facing operations
///
/// **Architecture:**
/// 1. SubmissionClient sends code to the remote engine (client.rs)
/// 2. ResultPoller waits for a terminal status (poller.rs)
/// 3. The classifier shapes the result (classifier.rs)
/// 4. TestCaseOrchestrator repeats this per test case (orchestrator.rs)
///
/// Built once per process from an `EngineConfig` and passed to whoever needs it.
use crate::backend::ExecutionBackend;
use crate::classifier::execution_report;
use crate::client::SubmissionClient;
use crate::config::{ConfigError, EngineConfig};
use crate::error::Result;
use crate::interpreter::{HttpInterpreter, InputInterpreter};
use crate::judge0::Judge0Backend;
use crate::orchestrator::TestCaseOrchestrator;
use crate::poller::ResultPoller;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};
use verdict_common::types::{CaseResult, ExecutionReport, Interpretation, TestCase};

#[derive(Clone)]
pub struct ExecutionService {
    client: SubmissionClient,
    poller: ResultPoller,
    orchestrator: TestCaseOrchestrator,
    single_timeout: Duration,
    interpreter: Option<Arc<dyn InputInterpreter>>,
}

impl ExecutionService {
    /// Wire the production backend (and interpreter, when configured)
    pub fn from_config(config: &EngineConfig) -> std::result::Result<Self, ConfigError> {
        let backend = Arc::new(Judge0Backend::new(config)?);
        let mut service = Self::new(backend, config);

        if let Some(interpreter) = HttpInterpreter::from_config(config)? {
            service = service.with_interpreter(Arc::new(interpreter));
        }

        info!(
            api_url = %config.api_url,
            languages = config.languages.entries().len(),
            interpreter = service.has_interpreter(),
            "Execution service ready"
        );
        Ok(service)
    }

    pub fn new(backend: Arc<dyn ExecutionBackend>, config: &EngineConfig) -> Self {
        let client = SubmissionClient::new(backend.clone(), config.languages.clone());
        let poller = ResultPoller::new(backend, config.poll_interval);
        let orchestrator =
            TestCaseOrchestrator::new(client.clone(), poller.clone(), config.batch_timeout);

        Self {
            client,
            poller,
            orchestrator,
            single_timeout: config.single_timeout,
            interpreter: None,
        }
    }

    pub fn with_interpreter(mut self, interpreter: Arc<dyn InputInterpreter>) -> Self {
        self.interpreter = Some(interpreter);
        self
    }

    pub fn has_interpreter(&self) -> bool {
        self.interpreter.is_some()
    }

    /// Run code once and return the shaped result. Errors propagate unchanged.
    #[instrument(skip(self, code, input))]
    pub async fn execute_code(&self, code: &str, language: &str, input: &str) -> Result<ExecutionReport> {
        let handle = self.client.submit(code, language, input).await?;
        let result = self.poller.wait(&handle, self.single_timeout).await?;
        Ok(execution_report(result))
    }

    /// Judge code against every test case with its original input
    pub async fn execute_test_cases(
        &self,
        code: &str,
        language: &str,
        test_cases: &[TestCase],
    ) -> Vec<CaseResult> {
        self.orchestrator.run(code, language, test_cases).await
    }

    /// Judge code against every test case after input interpretation.
    ///
    /// Without a configured interpreter every case falls back to its original input.
    pub async fn execute_test_cases_with_interpreter(
        &self,
        code: &str,
        language: &str,
        test_cases: &[TestCase],
        problem_context: Option<&str>,
    ) -> Vec<CaseResult> {
        match &self.interpreter {
            Some(interpreter) => {
                self.orchestrator
                    .run_interpreted(interpreter.as_ref(), code, language, test_cases, problem_context)
                    .await
            }
            None => {
                let interpretations = test_cases
                    .iter()
                    .map(|_| Interpretation::unavailable("no input interpreter configured"))
                    .collect();
                self.orchestrator
                    .run_with_interpretations(code, language, test_cases, interpretations)
                    .await
            }
        }
    }

    pub fn supported_languages(&self) -> Vec<String> {
        self.client.languages().names()
    }

    pub fn language_id(&self, language: &str) -> Option<u32> {
        self.client.languages().id_of(language)
    }
}
