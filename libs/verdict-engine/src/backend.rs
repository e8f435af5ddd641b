/// Execution Backend - the seam to the remote sandbox
///
/// **Responsibility:**
/// Carry one submission to the remote engine and fetch its status by token.
///
/// **Boundary:**
/// - Backend knows the wire protocol and transport encoding
/// - Backend does NOT decode result fields (see `decoder`)
/// - Backend does NOT decide when a job is finished (see `poller`)
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use verdict_common::types::StatusInfo;

/// Opaque identifier of one submitted job. Never inspected locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One execution request with the language already resolved to a remote id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub source_code: String,
    pub language_id: u32,
    pub stdin: String,
}

/// Status record exactly as the remote engine returned it.
///
/// Text fields are still transport-encoded at this point.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawSubmission {
    pub status: StatusInfo,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub compile_output: Option<String>,
    #[serde(default, deserialize_with = "seconds")]
    pub time: Option<f64>,
    #[serde(default)]
    pub memory: Option<u64>,
}

impl RawSubmission {
    pub fn with_status(id: u32, description: &str) -> Self {
        Self {
            status: StatusInfo {
                id,
                description: description.to_string(),
            },
            stdout: None,
            stderr: None,
            compile_output: None,
            time: None,
            memory: None,
        }
    }
}

// Judge0 reports time as a decimal string ("0.012"); accept plain numbers too.
fn seconds<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Number(f64),
        Text(String),
    }

    match Option::<Seconds>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Seconds::Number(n)) => Ok(Some(n)),
        Some(Seconds::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Send one execution request; returns the job's token
    async fn submit(&self, submission: &Submission) -> Result<JobHandle>;

    /// Fetch the current status of a job (fields still encoded)
    async fn fetch(&self, handle: &JobHandle) -> Result<RawSubmission>;
}
