// HTTP route handlers for the Verdict API

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;
use verdict_common::types::{BatchReport, TestCase};
use verdict_engine::EngineError;

use crate::metrics;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    pub code: String,
    pub language: String,
    #[serde(default)]
    pub input: String,
}

#[derive(Debug, Deserialize)]
pub struct TestsRequest {
    pub code: String,
    pub language: String,
    pub test_cases: Vec<TestCase>,
    #[serde(default)]
    pub problem_context: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    pub languages: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct LanguageResponse {
    pub language: String,
    pub id: u32,
}

/// Engine failure rendered as `{error, hint, retryable}` with a matching status code
pub struct ApiError(pub EngineError);

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            EngineError::UnsupportedLanguage { .. } => StatusCode::BAD_REQUEST,
            EngineError::RateLimit { .. } => StatusCode::TOO_MANY_REQUESTS,
            EngineError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            EngineError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            EngineError::Auth { .. }
            | EngineError::Submission { .. }
            | EngineError::Transport(_)
            | EngineError::InvalidResponse(_)
            | EngineError::Interpreter { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (
            status,
            Json(serde_json::json!({
                "error": self.0.to_string(),
                "hint": self.0.hint(),
                "retryable": self.0.is_retryable(),
            })),
        )
            .into_response()
    }
}

/// POST /execute - Run code once and return its output
pub async fn execute_code(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ExecuteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4();
    info!(request_id = %request_id, language = %payload.language, "Execution requested");

    match state
        .service
        .execute_code(&payload.code, &payload.language, &payload.input)
        .await
    {
        Ok(report) => {
            metrics::record_execution("single", "ok");
            info!(request_id = %request_id, status = %report.status.description, "Execution finished");
            Ok((StatusCode::OK, Json(report)))
        }
        Err(e) => {
            metrics::record_execution("single", "error");
            error!(request_id = %request_id, error = %e, "Execution failed");
            Err(ApiError(e))
        }
    }
}

/// POST /execute/tests - Judge code against test cases
pub async fn execute_tests(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TestsRequest>,
) -> impl IntoResponse {
    let request_id = Uuid::new_v4();
    info!(
        request_id = %request_id,
        language = %payload.language,
        test_cases = payload.test_cases.len(),
        "Batch requested"
    );

    let results = state
        .service
        .execute_test_cases(&payload.code, &payload.language, &payload.test_cases)
        .await;

    batch_response(request_id, "batch", results)
}

/// POST /execute/tests/interpreted - Judge code after rewriting inputs
pub async fn execute_tests_interpreted(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TestsRequest>,
) -> Response {
    if !state.service.has_interpreter() {
        warn!("Interpreted batch requested but no interpreter is configured");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "error": "input interpretation is not configured",
                "hint": "Set INTERPRETER_URL to enable interpreted test runs.",
                "retryable": false,
            })),
        )
            .into_response();
    }

    let request_id = Uuid::new_v4();
    info!(
        request_id = %request_id,
        language = %payload.language,
        test_cases = payload.test_cases.len(),
        "Interpreted batch requested"
    );

    let results = state
        .service
        .execute_test_cases_with_interpreter(
            &payload.code,
            &payload.language,
            &payload.test_cases,
            payload.problem_context.as_deref(),
        )
        .await;

    batch_response(request_id, "interpreted", results).into_response()
}

fn batch_response(
    request_id: Uuid,
    kind: &str,
    results: Vec<verdict_common::types::CaseResult>,
) -> impl IntoResponse {
    metrics::record_execution(kind, "ok");
    metrics::record_cases(&results);

    let report = BatchReport::new(results);
    info!(
        request_id = %request_id,
        total = report.summary.total,
        passed = report.summary.passed,
        "Batch finished"
    );

    (StatusCode::OK, Json(report))
}

/// GET /languages - Supported language names
pub async fn list_languages(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(LanguagesResponse {
        languages: state.service.supported_languages(),
    })
}

/// GET /languages/{name} - Engine id for one language
pub async fn get_language(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Response {
    match state.service.language_id(&name) {
        Some(id) => Json(LanguageResponse { language: name, id }).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": format!("unsupported language: {}", name),
                "supported": state.service.supported_languages(),
            })),
        )
            .into_response(),
    }
}

/// GET /health - Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /metrics - Prometheus text exposition
pub async fn export_metrics() -> Response {
    match metrics::render() {
        Ok(body) => (StatusCode::OK, body).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use verdict_engine::{EngineConfig, ExecutionService};

    fn state() -> Arc<AppState> {
        let service = ExecutionService::from_config(&EngineConfig::default()).unwrap();
        Arc::new(AppState { service })
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn case(id: u32) -> TestCase {
        TestCase {
            id,
            input_data: "1 2".to_string(),
            expected_output: "3".to_string(),
            is_sample: false,
        }
    }

    #[test]
    fn test_error_status_mapping() {
        let cases = vec![
            (EngineError::UnsupportedLanguage { language: "x".into() }, StatusCode::BAD_REQUEST),
            (EngineError::from_status(429, ""), StatusCode::TOO_MANY_REQUESTS),
            (EngineError::from_status(503, ""), StatusCode::SERVICE_UNAVAILABLE),
            (
                EngineError::Timeout { waited: Duration::from_secs(15), attempts: 16 },
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (EngineError::from_status(401, ""), StatusCode::BAD_GATEWAY),
            (EngineError::from_status(400, "bad"), StatusCode::BAD_GATEWAY),
            (EngineError::Transport("refused".into()), StatusCode::BAD_GATEWAY),
            (EngineError::InvalidResponse("no token".into()), StatusCode::BAD_GATEWAY),
            (EngineError::interpreter(Some(401), "denied"), StatusCode::BAD_GATEWAY),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError(err).status_code(), expected);
        }
    }

    #[tokio::test]
    async fn test_error_body_carries_hint() {
        let response = ApiError(EngineError::from_status(429, "")).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("rate limit"));
        assert!(!body["hint"].as_str().unwrap().is_empty());
        assert_eq!(body["retryable"], true);
    }

    #[tokio::test]
    async fn test_execute_unsupported_language() {
        let response = execute_code(
            State(state()),
            Json(ExecuteRequest {
                code: "DISPLAY 'HI'.".to_string(),
                language: "cobol".to_string(),
                input: String::new(),
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["retryable"], false);
    }

    #[tokio::test]
    async fn test_batch_with_unsupported_language_reports_errors() {
        let response = execute_tests(
            State(state()),
            Json(TestsRequest {
                code: "code".to_string(),
                language: "cobol".to_string(),
                test_cases: vec![case(1), case(2)],
                problem_context: None,
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["results"].as_array().unwrap().len(), 2);
        assert_eq!(body["results"][0]["status"], "ERROR");
        assert_eq!(body["summary"]["total"], 2);
        assert_eq!(body["summary"]["errors"], 2);
    }

    #[tokio::test]
    async fn test_interpreted_without_interpreter_is_unavailable() {
        let response = execute_tests_interpreted(
            State(state()),
            Json(TestsRequest {
                code: "code".to_string(),
                language: "python".to_string(),
                test_cases: vec![case(1)],
                problem_context: Some("sum two numbers".to_string()),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_language_lookup() {
        let found = get_language(State(state()), Path("Python".to_string())).await;
        assert_eq!(found.status(), StatusCode::OK);
        let body = body_json(found).await;
        assert_eq!(body["id"], 71);

        let missing = get_language(State(state()), Path("brainfuck".to_string())).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_languages() {
        let response = list_languages(State(state())).await.into_response();
        let body = body_json(response).await;
        let languages = body["languages"].as_array().unwrap();
        assert!(languages.iter().any(|l| l == "rust"));
    }
}
