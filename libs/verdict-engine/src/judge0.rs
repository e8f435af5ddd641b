// HTTP backend speaking the Judge0 submissions API
use crate::backend::{ExecutionBackend, JobHandle, RawSubmission, Submission};
use crate::config::{AuthMode, ConfigError, EngineConfig};
use crate::error::{EngineError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const RESULT_FIELDS: &str = "stdout,stderr,status,compile_output,time,memory";

#[derive(Debug, Serialize)]
struct SubmitBody {
    source_code: String,
    language_id: u32,
    stdin: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

pub struct Judge0Backend {
    http: reqwest::Client,
    base_url: String,
}

impl Judge0Backend {
    pub fn new(config: &EngineConfig) -> std::result::Result<Self, ConfigError> {
        let headers = auth_headers(config)?;

        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                key: "JUDGE0_API_URL",
                value: config.api_url.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: config.api_url.clone(),
        })
    }
}

fn auth_headers(config: &EngineConfig) -> std::result::Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::new();
    let Some(key) = config.api_key.as_deref() else {
        return Ok(headers);
    };

    let header_value = |value: &str| {
        HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidValue {
            key: "JUDGE0_API_KEY",
            value: "<redacted>".to_string(),
            reason: e.to_string(),
        })
    };

    match config.auth_mode {
        AuthMode::RapidApi => {
            headers.insert(HeaderName::from_static("x-rapidapi-key"), header_value(key)?);
            headers.insert(
                HeaderName::from_static("x-rapidapi-host"),
                header_value(config.api_host())?,
            );
        }
        AuthMode::Token => {
            headers.insert(HeaderName::from_static("x-auth-token"), header_value(key)?);
        }
        AuthMode::None => {}
    }

    Ok(headers)
}

/// Turn a non-2xx response into the matching error variant
async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(EngineError::from_status(status.as_u16(), &body))
}

#[async_trait]
impl ExecutionBackend for Judge0Backend {
    #[instrument(skip(self, submission), fields(language_id = submission.language_id))]
    async fn submit(&self, submission: &Submission) -> Result<JobHandle> {
        let body = SubmitBody {
            source_code: general_purpose::STANDARD.encode(&submission.source_code),
            language_id: submission.language_id,
            stdin: general_purpose::STANDARD.encode(&submission.stdin),
        };

        let response = self
            .http
            .post(format!("{}/submissions", self.base_url))
            .query(&[("base64_encoded", "true"), ("wait", "false")])
            .json(&body)
            .send()
            .await?;

        let TokenResponse { token } = check(response).await?.json().await?;
        if token.trim().is_empty() {
            return Err(EngineError::InvalidResponse("empty submission token".to_string()));
        }

        debug!(token = %token, "Submission accepted");
        Ok(JobHandle::new(token))
    }

    #[instrument(skip(self), fields(token = %handle))]
    async fn fetch(&self, handle: &JobHandle) -> Result<RawSubmission> {
        let response = self
            .http
            .get(format!("{}/submissions/{}", self.base_url, handle.as_str()))
            .query(&[("base64_encoded", "true"), ("fields", RESULT_FIELDS)])
            .send()
            .await?;

        let raw: RawSubmission = check(response).await?.json().await?;
        Ok(raw)
    }
}
