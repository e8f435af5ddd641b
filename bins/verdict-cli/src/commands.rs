// CLI commands for running and judging code
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use verdict_common::types::{BatchReport, CaseResult, CaseStatus, ExecutionReport, TestCase};
use verdict_engine::{EngineConfig, ExecutionService};

/// Accepted shapes for a test-case file
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CasesFile {
    Wrapped { test_cases: Vec<TestCase> },
    Bare(Vec<TestCase>),
}

fn load_config() -> Result<EngineConfig> {
    EngineConfig::from_env().context("Invalid execution engine configuration")
}

fn build_service(config: &EngineConfig) -> Result<ExecutionService> {
    ExecutionService::from_config(config).context("Failed to build execution service")
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Parse test cases from JSON text
fn parse_cases(content: &str) -> Result<Vec<TestCase>> {
    let parsed: CasesFile =
        serde_json::from_str(content).context("Failed to parse test cases")?;
    Ok(match parsed {
        CasesFile::Wrapped { test_cases } => test_cases,
        CasesFile::Bare(test_cases) => test_cases,
    })
}

fn load_cases(path: &Path) -> Result<Vec<TestCase>> {
    let content = read_source(path)?;
    parse_cases(&content).with_context(|| format!("Invalid test case file {}", path.display()))
}

/// Run a source file once
pub async fn run_code(language: &str, file: &Path, stdin: Option<&Path>, json: bool) -> Result<()> {
    let config = load_config()?;
    let service = build_service(&config)?;

    let code = read_source(file)?;
    let input = match stdin {
        Some(path) => read_source(path)?,
        None => String::new(),
    };

    let report = service.execute_code(&code, language, &input).await.map_err(|e| {
        let hint = e.hint();
        anyhow::Error::new(e).context(hint)
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

/// Judge a source file against test cases. Returns whether every case passed.
pub async fn run_tests(
    language: &str,
    file: &Path,
    cases: &Path,
    interpret: bool,
    context: Option<&str>,
    json: bool,
) -> Result<bool> {
    let config = load_config()?;
    let service = build_service(&config)?;

    let code = read_source(file)?;
    let test_cases = load_cases(cases)?;

    if interpret && !service.has_interpreter() {
        bail!("--interpret needs an input interpreter; set INTERPRETER_URL");
    }

    if !json {
        println!("🚀 Judging {} against {} test case(s)...", file.display(), test_cases.len());
    }

    let results = if interpret {
        service
            .execute_test_cases_with_interpreter(&code, language, &test_cases, context)
            .await
    } else {
        service.execute_test_cases(&code, language, &test_cases).await
    };

    let report = BatchReport::new(results);
    let all_passed = report.summary.all_passed();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_batch(&report);
    }
    Ok(all_passed)
}

/// Print the language table
pub fn list_languages() -> Result<()> {
    let config = load_config()?;
    let entries = config.languages.entries();

    println!("📋 Supported Languages:\n");
    println!("{:<14} {:<6} {:<30}", "NAME", "ID", "ALIASES");
    println!("{}", "─".repeat(52));

    for entry in entries {
        println!("{:<14} {:<6} {:<30}", entry.name, entry.id, entry.aliases.join(", "));
    }

    println!("\n✅ Total: {} language(s)", entries.len());
    Ok(())
}

fn print_report(report: &ExecutionReport) {
    println!("📊 Status: {} ({})", report.status.description, report.status.id);
    if let (Some(time), Some(memory)) = (report.time, report.memory) {
        println!("⏱️  {:.3}s, {} KB", time, memory);
    }
    if let Some(compile_output) = &report.compile_output {
        println!("\n🔨 Compiler output:\n{}", compile_output);
    }
    if !report.stdout.is_empty() {
        println!("\n📤 stdout:\n{}", report.stdout);
    }
    if !report.stderr.is_empty() {
        println!("\n⚠️  stderr:\n{}", report.stderr);
    }
}

fn status_icon(status: CaseStatus) -> &'static str {
    match status {
        CaseStatus::Passed => "✅",
        CaseStatus::Failed => "❌",
        CaseStatus::TimeLimitExceeded => "⏰",
        CaseStatus::CompilationError => "🔨",
        CaseStatus::Error => "💥",
    }
}

fn case_line(result: &CaseResult) -> String {
    let mut line = format!(
        "{} Test {:<4} {:<6}",
        status_icon(result.status),
        result.test_case.id,
        result.status
    );
    if let Some(time) = result.execution_time {
        line.push_str(&format!(" {:.3}s", time));
    }
    if result.status == CaseStatus::Failed {
        line.push_str(&format!(
            "  expected {:?}, got {:?}",
            result.expected,
            result.output.as_deref().unwrap_or("")
        ));
    }
    if let Some(error) = &result.error {
        line.push_str(&format!("  {}", error));
    }
    line
}

fn print_batch(report: &BatchReport) {
    println!();
    for result in &report.results {
        println!("{}", case_line(result));
        if let Some(used) = &result.used_input {
            if *used != result.test_case.input_data {
                println!("       input rewritten to {:?}", used);
            }
        }
    }

    let summary = &report.summary;
    println!("{}", "─".repeat(52));
    println!(
        "📊 {}/{} passed ({} failed, {} TLE, {} CE, {} errors)",
        summary.passed,
        summary.total,
        summary.failed,
        summary.time_limit_exceeded,
        summary.compilation_errors,
        summary.errors
    );
}
