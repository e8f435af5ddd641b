use crate::backend::{ExecutionBackend, JobHandle, Submission};
use crate::error::{EngineError, Result};
use crate::languages::LanguageTable;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Sends single execution requests to the remote engine.
///
/// Language names are resolved against the table first, so an unknown
/// language never produces a network call.
#[derive(Clone)]
pub struct SubmissionClient {
    backend: Arc<dyn ExecutionBackend>,
    languages: LanguageTable,
}

impl SubmissionClient {
    pub fn new(backend: Arc<dyn ExecutionBackend>, languages: LanguageTable) -> Self {
        Self { backend, languages }
    }

    pub fn languages(&self) -> &LanguageTable {
        &self.languages
    }

    #[instrument(skip(self, code, input), fields(code_bytes = code.len(), input_bytes = input.len()))]
    pub async fn submit(&self, code: &str, language: &str, input: &str) -> Result<JobHandle> {
        let Some(language_id) = self.languages.id_of(language) else {
            warn!(language = %language, "Rejected submission for unsupported language");
            return Err(EngineError::UnsupportedLanguage {
                language: language.to_string(),
            });
        };

        let submission = Submission {
            source_code: code.to_string(),
            language_id,
            stdin: input.to_string(),
        };

        let handle = self.backend.submit(&submission).await?;
        info!(token = %handle, language_id, "Submitted code for execution");
        Ok(handle)
    }
}
