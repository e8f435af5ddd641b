// Boundary to the external input-interpretation service
use crate::config::{ConfigError, EngineConfig};
use crate::error::{EngineError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use verdict_common::types::{Interpretation, TestCase};

/// Rewrites raw test-case inputs into stdin payloads for a given language.
///
/// Must return one interpretation per test case, in the same order.
#[async_trait]
pub trait InputInterpreter: Send + Sync {
    async fn interpret(
        &self,
        test_cases: &[TestCase],
        language: &str,
        problem_context: Option<&str>,
    ) -> Result<Vec<Interpretation>>;
}

#[derive(Debug, Serialize)]
struct InterpretRequest<'a> {
    test_cases: &'a [TestCase],
    language: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    problem_context: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InterpretResponse {
    Wrapped { interpretations: Vec<Interpretation> },
    Bare(Vec<Interpretation>),
}

impl From<InterpretResponse> for Vec<Interpretation> {
    fn from(response: InterpretResponse) -> Self {
        match response {
            InterpretResponse::Wrapped { interpretations } => interpretations,
            InterpretResponse::Bare(interpretations) => interpretations,
        }
    }
}

/// Interpreter reached over HTTP (JSON in, JSON out)
pub struct HttpInterpreter {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpInterpreter {
    pub fn new(url: impl Into<String>, config: &EngineConfig) -> std::result::Result<Self, ConfigError> {
        let url = url.into();
        let http = reqwest::Client::builder()
            .timeout(config.interpreter_timeout)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                key: "INTERPRETER_URL",
                value: url.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            url,
            api_key: config.interpreter_api_key.clone(),
        })
    }

    /// Interpreter configured by INTERPRETER_URL, if any
    pub fn from_config(config: &EngineConfig) -> std::result::Result<Option<Self>, ConfigError> {
        config
            .interpreter_url
            .as_deref()
            .map(|url| Self::new(url, config))
            .transpose()
    }
}

#[async_trait]
impl InputInterpreter for HttpInterpreter {
    #[instrument(skip(self, test_cases, problem_context), fields(cases = test_cases.len()))]
    async fn interpret(
        &self,
        test_cases: &[TestCase],
        language: &str,
        problem_context: Option<&str>,
    ) -> Result<Vec<Interpretation>> {
        let body = InterpretRequest {
            test_cases,
            language,
            problem_context,
        };

        let mut request = self.http.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| EngineError::interpreter(None, &e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::interpreter(Some(status.as_u16()), &body));
        }

        let parsed: InterpretResponse = response
            .json()
            .await
            .map_err(|e| EngineError::interpreter(None, &format!("unreadable response: {}", e)))?;
        let interpretations: Vec<Interpretation> = parsed.into();
        debug!(returned = interpretations.len(), "Interpreter responded");
        Ok(interpretations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_accepts_wrapped_and_bare() {
        let wrapped: InterpretResponse = serde_json::from_str(
            r#"{"interpretations": [{"success": true, "formatted_input": "1\n2\n"}]}"#,
        )
        .unwrap();
        let bare: InterpretResponse =
            serde_json::from_str(r#"[{"success": false, "formatted_input": null, "error": "unparseable"}]"#)
                .unwrap();

        let wrapped: Vec<Interpretation> = wrapped.into();
        let bare: Vec<Interpretation> = bare.into();
        assert_eq!(wrapped[0].formatted_input.as_deref(), Some("1\n2\n"));
        assert!(!bare[0].success);
        assert_eq!(bare[0].error.as_deref(), Some("unparseable"));
    }

    #[test]
    fn test_request_shape() {
        let cases = vec![TestCase {
            id: 1,
            input_data: "nums = [1,2]".to_string(),
            expected_output: "3".to_string(),
            is_sample: true,
        }];
        let body = InterpretRequest {
            test_cases: &cases,
            language: "python",
            problem_context: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["language"], "python");
        assert_eq!(json["test_cases"][0]["input_data"], "nums = [1,2]");
        assert!(json.get("problem_context").is_none());
    }

    #[test]
    fn test_from_config_without_url() {
        assert!(HttpInterpreter::from_config(&EngineConfig::default()).unwrap().is_none());
    }

    #[test]
    fn test_from_config_with_url() {
        let config = EngineConfig {
            interpreter_url: Some("http://localhost:8080/interpret".to_string()),
            ..EngineConfig::default()
        };
        assert!(HttpInterpreter::from_config(&config).unwrap().is_some());
    }

    mod wire {
        use super::*;
        use crate::testing::StubServer;
        use axum::http::Method;

        fn cases() -> Vec<TestCase> {
            vec![
                TestCase {
                    id: 1,
                    input_data: "nums = [1, 2]".to_string(),
                    expected_output: "3".to_string(),
                    is_sample: true,
                },
                TestCase {
                    id: 2,
                    input_data: "nums = [5]".to_string(),
                    expected_output: "5".to_string(),
                    is_sample: false,
                },
            ]
        }

        fn interpreter_for(server: &StubServer, api_key: Option<&str>) -> HttpInterpreter {
            let config = EngineConfig {
                interpreter_api_key: api_key.map(String::from),
                ..EngineConfig::default()
            };
            HttpInterpreter::new(format!("{}/interpret", server.base_url), &config).unwrap()
        }

        #[tokio::test]
        async fn test_interpret_request_and_response() {
            let server = StubServer::fixed(
                200,
                r#"{"interpretations": [
                    {"success": true, "formatted_input": "2\n1 2\n", "explanation": "length first"},
                    {"success": false, "formatted_input": null, "error": "ambiguous"}
                ]}"#,
            )
            .await;
            let interpreter = interpreter_for(&server, Some("llm-key"));

            let interpretations = interpreter
                .interpret(&cases(), "cpp", Some("sum the numbers"))
                .await
                .unwrap();

            assert_eq!(interpretations.len(), 2);
            assert_eq!(interpretations[0].formatted_input.as_deref(), Some("2\n1 2\n"));
            assert!(!interpretations[1].success);

            let request = &server.requests()[0];
            assert_eq!(request.method, Method::POST);
            assert_eq!(request.path, "/interpret");
            assert_eq!(request.header("authorization"), Some("Bearer llm-key"));
            let body = request.json();
            assert_eq!(body["language"], "cpp");
            assert_eq!(body["problem_context"], "sum the numbers");
            assert_eq!(body["test_cases"].as_array().unwrap().len(), 2);
        }

        #[tokio::test]
        async fn test_interpret_without_key_sends_no_auth() {
            let server = StubServer::fixed(200, "[]").await;
            let interpreter = interpreter_for(&server, None);

            let interpretations = interpreter.interpret(&cases(), "python", None).await.unwrap();

            assert!(interpretations.is_empty());
            assert!(server.requests()[0].header("authorization").is_none());
        }

        #[tokio::test]
        async fn test_interpret_rejected_credentials() {
            let server = StubServer::fixed(401, "invalid api key").await;
            let interpreter = interpreter_for(&server, Some("stale"));

            let err = interpreter.interpret(&cases(), "python", None).await.unwrap_err();

            assert!(matches!(err, EngineError::Interpreter { status: Some(401), .. }), "{err:?}");
            assert_eq!(err.hint(), "Check INTERPRETER_API_KEY.");
        }

        #[tokio::test]
        async fn test_interpret_unreadable_response() {
            let server = StubServer::fixed(200, "not json").await;
            let interpreter = interpreter_for(&server, None);

            let err = interpreter.interpret(&cases(), "python", None).await.unwrap_err();

            assert!(matches!(err, EngineError::Interpreter { status: None, .. }), "{err:?}");
        }
    }
}
