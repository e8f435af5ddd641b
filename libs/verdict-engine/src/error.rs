use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Everything that can go wrong between accepting a submission and returning a result.
///
/// Each variant carries the structured data a caller needs to decide whether to retry,
/// and `hint()` gives the remediation text shown to users.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("unsupported language: {language}")]
    UnsupportedLanguage { language: String },

    #[error("execution service rejected credentials (HTTP {status})")]
    Auth { status: u16, hint: String },

    #[error("execution service rate limit exceeded (HTTP {status})")]
    RateLimit { status: u16, hint: String },

    #[error("execution service unavailable (HTTP {status})")]
    ServiceUnavailable { status: u16, hint: String },

    #[error("submission failed: {message}")]
    Submission {
        status: Option<u16>,
        message: String,
        hint: String,
    },

    #[error("execution did not finish within {}s ({attempts} status checks)", waited.as_secs())]
    Timeout { waited: Duration, attempts: u32 },

    #[error("could not reach execution service: {0}")]
    Transport(String),

    #[error("unexpected response from execution service: {0}")]
    InvalidResponse(String),

    /// Anything that went wrong talking to the input interpreter
    #[error("input interpreter failed: {message}")]
    Interpreter { status: Option<u16>, message: String },
}

impl EngineError {
    /// Classify a non-success HTTP status from the execution service
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 | 403 => EngineError::Auth {
                status,
                hint: "Check JUDGE0_API_KEY and JUDGE0_AUTH_MODE.".to_string(),
            },
            429 => EngineError::RateLimit {
                status,
                hint: "Too many submissions; wait a moment before retrying.".to_string(),
            },
            502..=504 => EngineError::ServiceUnavailable {
                status,
                hint: "The execution service is down or overloaded; try again later.".to_string(),
            },
            _ => EngineError::Submission {
                status: Some(status),
                message: excerpt(body),
                hint: "The execution service refused the request; check the code and language."
                    .to_string(),
            },
        }
    }

    /// Classify a failed call to the input interpreter
    pub fn interpreter(status: Option<u16>, detail: &str) -> Self {
        let message = match status {
            Some(code) => format!("HTTP {}: {}", code, excerpt(detail)),
            None => detail.to_string(),
        };
        EngineError::Interpreter { status, message }
    }

    pub fn hint(&self) -> String {
        match self {
            EngineError::UnsupportedLanguage { .. } => {
                "Pick one of the supported languages.".to_string()
            }
            EngineError::Auth { hint, .. }
            | EngineError::RateLimit { hint, .. }
            | EngineError::ServiceUnavailable { hint, .. }
            | EngineError::Submission { hint, .. } => hint.clone(),
            EngineError::Timeout { .. } => {
                "The program may loop forever or the service is busy; retry or simplify the input."
                    .to_string()
            }
            EngineError::Transport(_) => {
                "Check network connectivity and JUDGE0_API_URL.".to_string()
            }
            EngineError::InvalidResponse(_) => {
                "The execution service returned an unexpected payload.".to_string()
            }
            EngineError::Interpreter { status: Some(401 | 403), .. } => {
                "Check INTERPRETER_API_KEY.".to_string()
            }
            EngineError::Interpreter { .. } => {
                "Check INTERPRETER_URL; original inputs are used until the interpreter responds."
                    .to_string()
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::RateLimit { .. }
                | EngineError::ServiceUnavailable { .. }
                | EngineError::Timeout { .. }
                | EngineError::Interpreter {
                    status: Some(429 | 502..=504),
                    ..
                }
        )
    }
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            EngineError::InvalidResponse(err.to_string())
        } else {
            EngineError::Transport(err.to_string())
        }
    }
}

fn excerpt(body: &str) -> String {
    const LIMIT: usize = 200;
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    match trimmed.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
