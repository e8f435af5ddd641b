/// Result Poller - wait for a submitted job to reach a terminal status
///
/// **State machine:**
/// The remote status id maps onto `JobState` through a pure function
/// (`JobState::from_status_id`). Ids 1 and 2 are non-terminal (queued, running);
/// every higher id is terminal and is returned as soon as it is observed.
///
/// **Timing:**
/// Fetches immediately, then once per interval. Gives up with
/// `EngineError::Timeout` when another interval would overrun the budget.
/// Each fetch is bounded by the deadline too, so a slow status call cannot
/// stretch the wait past the budget.
/// All timing goes through `tokio::time`, so tests drive it with a paused clock.
use crate::backend::{ExecutionBackend, JobHandle};
use crate::decoder::{self, ExecutionResult};
use crate::error::{EngineError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

pub const STATUS_IN_QUEUE: u32 = 1;
pub const STATUS_PROCESSING: u32 = 2;
pub const STATUS_ACCEPTED: u32 = 3;
pub const STATUS_WRONG_ANSWER: u32 = 4;
pub const STATUS_TIME_LIMIT_EXCEEDED: u32 = 5;
pub const STATUS_COMPILATION_ERROR: u32 = 6;

/// Terminal remote statuses the classifier distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalStatus {
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    CompilationError,
    /// Runtime errors, internal errors, anything else the engine reports
    Other(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Queued,
    Running,
    Terminal(TerminalStatus),
}

impl JobState {
    pub fn from_status_id(id: u32) -> Self {
        match id {
            0..=STATUS_IN_QUEUE => JobState::Queued,
            STATUS_PROCESSING => JobState::Running,
            STATUS_ACCEPTED => JobState::Terminal(TerminalStatus::Accepted),
            STATUS_WRONG_ANSWER => JobState::Terminal(TerminalStatus::WrongAnswer),
            STATUS_TIME_LIMIT_EXCEEDED => JobState::Terminal(TerminalStatus::TimeLimitExceeded),
            STATUS_COMPILATION_ERROR => JobState::Terminal(TerminalStatus::CompilationError),
            other => JobState::Terminal(TerminalStatus::Other(other)),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Terminal(_))
    }
}

#[derive(Clone)]
pub struct ResultPoller {
    backend: Arc<dyn ExecutionBackend>,
    interval: Duration,
}

impl ResultPoller {
    pub fn new(backend: Arc<dyn ExecutionBackend>, interval: Duration) -> Self {
        Self { backend, interval }
    }

    /// Poll until the job is terminal or `budget` runs out
    #[instrument(skip(self), fields(token = %handle, budget_secs = budget.as_secs()))]
    pub async fn wait(&self, handle: &JobHandle, budget: Duration) -> Result<ExecutionResult> {
        let started = Instant::now();
        let deadline = started + budget;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let raw = match tokio::time::timeout_at(deadline, self.backend.fetch(handle)).await {
                Ok(fetched) => fetched?,
                Err(_) => {
                    let waited = started.elapsed();
                    warn!(attempts, waited_ms = waited.as_millis() as u64, "Status check ran into the deadline");
                    return Err(EngineError::Timeout { waited, attempts });
                }
            };
            let state = JobState::from_status_id(raw.status.id);
            let result = decoder::decode_logged(raw);

            if state.is_terminal() {
                info!(
                    status_id = result.status.id,
                    status = %result.status.description,
                    attempts,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Execution finished"
                );
                return Ok(result);
            }

            debug!(status_id = result.status.id, attempts, "Execution still pending");

            let waited = started.elapsed();
            if waited + self.interval > budget {
                warn!(attempts, waited_ms = waited.as_millis() as u64, "Gave up waiting for execution");
                return Err(EngineError::Timeout { waited, attempts });
            }

            tokio::time::sleep(self.interval).await;
        }
    }
}
