/// Response Decoder - transport encoding -> plain text
///
/// **Rules:**
/// - stdout, stderr and compile_output are decoded independently
/// - A field that fails to decode is kept exactly as received
/// - A bad field never drops the record or touches its siblings
///
/// The remote engine wraps long base64 payloads across lines, so embedded
/// whitespace is stripped before decoding.
use crate::backend::RawSubmission;
use base64::{engine::general_purpose, Engine as _};
use std::fmt;
use tracing::warn;
use verdict_common::types::StatusInfo;

/// Status record with every text field in plain text
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub status: StatusInfo,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub compile_output: Option<String>,
    pub time: Option<f64>,
    pub memory: Option<u64>,
}

/// Non-fatal: one field could not be decoded and was left as received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeWarning {
    pub field: &'static str,
    pub reason: String,
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not decode {}: {}", self.field, self.reason)
    }
}

/// Decode one base64 text field
pub fn decode_field(encoded: &str) -> Result<String, base64::DecodeError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = general_purpose::STANDARD.decode(compact)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn decode_optional(
    field: &'static str,
    value: Option<String>,
    warnings: &mut Vec<DecodeWarning>,
) -> Option<String> {
    let raw = value?;
    match decode_field(&raw) {
        Ok(text) => Some(text),
        Err(e) => {
            warnings.push(DecodeWarning {
                field,
                reason: e.to_string(),
            });
            Some(raw)
        }
    }
}

/// Decode every text field of a raw record, collecting warnings for the ones that failed
pub fn decode(raw: RawSubmission) -> (ExecutionResult, Vec<DecodeWarning>) {
    let mut warnings = Vec::new();

    let result = ExecutionResult {
        stdout: decode_optional("stdout", raw.stdout, &mut warnings),
        stderr: decode_optional("stderr", raw.stderr, &mut warnings),
        compile_output: decode_optional("compile_output", raw.compile_output, &mut warnings),
        status: raw.status,
        time: raw.time,
        memory: raw.memory,
    };

    (result, warnings)
}

/// `decode` with warnings logged instead of returned
pub fn decode_logged(raw: RawSubmission) -> ExecutionResult {
    let (result, warnings) = decode(raw);
    for warning in &warnings {
        warn!(
            field = warning.field,
            reason = %warning.reason,
            status_id = result.status.id,
            "Field left undecoded"
        );
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(stdout: Option<&str>, stderr: Option<&str>, compile_output: Option<&str>) -> RawSubmission {
        RawSubmission {
            stdout: stdout.map(String::from),
            stderr: stderr.map(String::from),
            compile_output: compile_output.map(String::from),
            time: Some(0.01),
            memory: Some(1024),
            ..RawSubmission::with_status(3, "Accepted")
        }
    }

    #[test]
    fn test_decode_field() {
        assert_eq!(decode_field("SGVsbG8K").unwrap(), "Hello\n");
        assert_eq!(decode_field("").unwrap(), "");
    }

    #[test]
    fn test_decode_field_ignores_line_wrapping() {
        assert_eq!(decode_field("SGVs\nbG8K\n").unwrap(), "Hello\n");
    }

    #[test]
    fn test_decode_all_fields() {
        let (result, warnings) = decode(raw(Some("MTIw"), Some("d2Fybg=="), None));
        assert!(warnings.is_empty());
        assert_eq!(result.stdout.as_deref(), Some("120"));
        assert_eq!(result.stderr.as_deref(), Some("warn"));
        assert_eq!(result.compile_output, None);
        assert_eq!(result.time, Some(0.01));
        assert_eq!(result.memory, Some(1024));
    }

    #[test]
    fn test_corrupt_stderr_does_not_affect_stdout() {
        let (result, warnings) = decode(raw(Some("MTIw"), Some("%%%not-base64%%%"), None));
        assert_eq!(result.stdout.as_deref(), Some("120"));
        assert_eq!(result.stderr.as_deref(), Some("%%%not-base64%%%"));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "stderr");
    }

    #[test]
    fn test_every_field_can_fail_independently() {
        let (result, warnings) = decode(raw(Some("!!"), Some("??"), Some("**")));
        assert_eq!(result.stdout.as_deref(), Some("!!"));
        assert_eq!(result.stderr.as_deref(), Some("??"));
        assert_eq!(result.compile_output.as_deref(), Some("**"));
        let fields: Vec<_> = warnings.iter().map(|w| w.field).collect();
        assert_eq!(fields, vec!["stdout", "stderr", "compile_output"]);
    }

    #[test]
    fn test_invalid_utf8_is_converted_lossily() {
        // 0xff 0xfe is not valid UTF-8
        let (result, warnings) = decode(raw(Some("//4="), None, None));
        assert!(warnings.is_empty());
        assert_eq!(result.stdout.as_deref(), Some("\u{fffd}\u{fffd}"));
    }
}
