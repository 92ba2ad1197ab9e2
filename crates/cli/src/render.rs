//! Terminal rendering of job outcomes.
//!
//! The output window shows the one stream that matters for the status
//! (compile output for compile errors, stdout for accepted runs, stderr
//! otherwise); the details block shows status, memory and time.

use coderun_core::execution::{ExecutionResult, JobOutcome};
use coderun_core::language::LANGUAGES;
use coderun_core::status::{STATUS_ACCEPTED, STATUS_COMPILATION_ERROR, STATUS_TIME_LIMIT_EXCEEDED};

/// Shown in place of stdout when an accepted run printed nothing.
pub const EMPTY_OUTPUT_HINT: &str = "(no output)";

/// Notice printed once a terminal status arrives.
pub const SUCCESS_NOTICE: &str = "Compiled Successfully!";

/// Notice printed when the client could not obtain a terminal status.
pub const FAILURE_NOTICE: &str = "Something went wrong! Please try again.";

/// Text for the output window.
pub fn output_window(result: &ExecutionResult) -> String {
    let text = match result.status_id {
        STATUS_COMPILATION_ERROR => result.compile_output_text(),
        STATUS_ACCEPTED => {
            return match result.stdout_text() {
                Some(stdout) if !stdout.is_empty() => stdout.into_owned(),
                _ => EMPTY_OUTPUT_HINT.to_string(),
            };
        }
        STATUS_TIME_LIMIT_EXCEEDED => return "Time Limit Exceeded".to_string(),
        _ => result.stderr_text(),
    };
    text.map(|t| t.into_owned()).unwrap_or_default()
}

/// Status, memory and time lines.
pub fn output_details(result: &ExecutionResult) -> String {
    let memory = result
        .memory_kb
        .map_or_else(|| "-".to_string(), |kb| format!("{kb} KB"));
    let time = result
        .time_secs
        .map_or_else(|| "-".to_string(), |secs| format!("{secs} s"));

    format!(
        "Status: {}\nMemory: {memory}\nTime: {time}",
        result.status_description
    )
}

/// Full report for a terminal outcome.
pub fn report(outcome: &JobOutcome) -> String {
    let result = outcome.result();
    let mut out = String::new();

    out.push_str("Output\n------\n");
    let window = output_window(result);
    out.push_str(&window);
    if !window.is_empty() && !window.ends_with('\n') {
        out.push('\n');
    }

    if let Some(message) = result.message_text().filter(|m| !m.trim().is_empty()) {
        out.push_str("\nMessage: ");
        out.push_str(message.trim_end());
        out.push('\n');
    }

    out.push('\n');
    out.push_str(&output_details(result));
    out.push('\n');
    out
}

/// One line per catalogued language: name, id, label.
pub fn language_table() -> String {
    let width = LANGUAGES.iter().map(|l| l.name.len()).max().unwrap_or(0);
    LANGUAGES
        .iter()
        .map(|l| format!("{:<width$}  {:>3}  {}\n", l.name, l.id, l.label))
        .collect()
}
