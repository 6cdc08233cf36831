//! Output rendering for run results.
//!
//! Supports `human` (default) and `json` outputs. Writers are passed in so
//! the runner can be exercised against in-memory buffers.

use crate::models::RunSummary;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::io::{self, Write};

/// Immediate per-file failure line (CLI mode).
pub fn write_file_failure(
    err: &mut dyn Write,
    path: &str,
    message: &str,
    color: bool,
) -> io::Result<()> {
    if color {
        writeln!(
            err,
            "{} {}: {}",
            "Failed to validate".red().bold(),
            path.bold(),
            message
        )
    } else {
        writeln!(err, "Failed to validate {}: {}", path, message)
    }
}

/// Summary block written after a run with failures.
///
/// When `verbose`, each failed path is listed with its captured message.
pub fn write_failure_summary(
    err: &mut dyn Write,
    summary: &RunSummary,
    verbose: bool,
    color: bool,
) -> io::Result<()> {
    writeln!(err)?;
    let title = "— Validation summary —";
    if color {
        writeln!(err, "{}", title.bold())?;
    } else {
        writeln!(err, "{}", title)?;
    }
    writeln!(err, "  Total files: {}", summary.total)?;
    writeln!(err, "  Passed: {}", summary.passed)?;
    let failed = format!("  Failed: {}", summary.failed.len());
    if color {
        writeln!(err, "{}", failed.red())?;
    } else {
        writeln!(err, "{}", failed)?;
    }
    if verbose {
        writeln!(err)?;
        writeln!(err, "Failed files:")?;
        for f in &summary.failed {
            let icon = if color {
                "✖".red().to_string()
            } else {
                "✖".to_string()
            };
            writeln!(
                err,
                "  {} {}: {}",
                icon,
                f.path,
                f.error_message().unwrap_or_default()
            )?;
        }
    }
    Ok(())
}

/// Success line for a run where every file passed.
pub fn write_success(out: &mut dyn Write, summary: &RunSummary, color: bool) -> io::Result<()> {
    let line = format!("Successfully validated {} file(s)", summary.total);
    if color {
        writeln!(out, "{} {}", "✔".green(), line.green().bold())
    } else {
        writeln!(out, "✔ {}", line)
    }
}

/// Consolidated failure text sent to the CI channel.
pub fn ci_failure_message(summary: &RunSummary) -> String {
    let mut msg = format!(
        "Action failed with error: {} of {} file(s) failed validation:",
        summary.failed.len(),
        summary.total
    );
    for f in &summary.failed {
        msg.push('\n');
        msg.push_str(&f.path);
        msg.push_str(": ");
        msg.push_str(f.error_message().unwrap_or_default());
    }
    msg
}

/// Compose the JSON summary (pure) for testing/snapshot purposes.
pub fn compose_summary_json(summary: &RunSummary) -> JsonVal {
    json!({
        "total": summary.total,
        "passed": summary.passed,
        "failed": summary.failed,
        "ok": summary.ok(),
    })
}

pub fn write_json(out: &mut dyn Write, summary: &RunSummary) -> io::Result<()> {
    let text = serde_json::to_string_pretty(&compose_summary_json(summary))?;
    writeln!(out, "{}", text)
}
