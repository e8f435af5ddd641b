/// Output Comparator - strict textual equality after normalization
///
/// **Normalization Rules:**
/// - CRLF line endings become LF
/// - Leading and trailing whitespace is trimmed
/// - Everything else (case, internal whitespace, number formatting) must match exactly
///
/// An absent or empty side never matches.

fn normalize_output(output: &str) -> String {
    output.replace("\r\n", "\n").trim().to_string()
}

/// Compare program output against the expected answer
pub fn outputs_match(actual: Option<&str>, expected: Option<&str>) -> bool {
    match (actual, expected) {
        (Some(actual), Some(expected)) if !actual.is_empty() && !expected.is_empty() => {
            normalize_output(actual) == normalize_output(expected)
        }
        _ => false,
    }
}
