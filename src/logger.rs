//! Terminal logging with configurable verbosity levels.
//!
//! Supports three verbosity levels:
//! - Minimal: One-liner nginx-style
//! - Compact: Multi-line httpie-style
//! - Verbose: Full block with separators
//!
//! Also owns credential redaction. The full key value must never appear in
//! any log line; only the redacted form produced here may.

use crate::config::LogVerbosity;
use std::io::Write;

/// Redact a credential to its first 8 and last 4 characters.
///
/// Keys too short to redact meaningfully are fully masked.
pub fn redact_credential(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "****".to_string();
    }
    let prefix: String = chars[..8].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", prefix, suffix)
}

/// Outcome of a single relay invocation, as far as logging cares.
pub struct RelayOutcome {
    pub origin: String,
    pub model: String,
    pub status: u16,
    pub duration_ms: u64,
    pub streamed: bool,
}

/// Format duration in human-readable form.
fn format_duration(ms: u64) -> String {
    if ms >= 1000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        format!("{}ms", ms)
    }
}

/// Format a relay outcome for terminal output.
pub fn format_outcome(outcome: &RelayOutcome, verbosity: &LogVerbosity) -> String {
    match verbosity {
        LogVerbosity::Minimal => format_minimal(outcome),
        LogVerbosity::Compact => format_compact(outcome),
        LogVerbosity::Verbose => format_verbose(outcome),
    }
}

fn format_minimal(outcome: &RelayOutcome) -> String {
    let duration = format_duration(outcome.duration_ms);
    let mode = if outcome.streamed { " [stream]" } else { "" };

    format!(
        "POST /api/chat {} {} {}{}",
        outcome.status, duration, outcome.model, mode
    )
}

fn format_compact(outcome: &RelayOutcome) -> String {
    let request_line = format!("→ POST /api/chat [{}] from {}", outcome.model, outcome.origin);

    let duration = format_duration(outcome.duration_ms);
    let mode = if outcome.streamed { ", streamed" } else { "" };
    let response_line = format!("← {} ({}{})", outcome.status, duration, mode);

    format!("{}\n{}", request_line, response_line)
}

fn format_verbose(outcome: &RelayOutcome) -> String {
    let separator = "────────────────────────────────────────";
    let status_text = if (200..300).contains(&outcome.status) {
        "OK"
    } else {
        "ERROR"
    };
    let duration = format_duration(outcome.duration_ms);
    let mode = if outcome.streamed { "stream" } else { "buffered" };

    format!(
        "{separator}\n\
         POST /api/chat\n\
         Origin: {origin}\n\
         Model: {model}\n\
         Status: {status} {status_text}\n\
         Timing: {duration} ({mode})\n\
         {separator}",
        separator = separator,
        origin = outcome.origin,
        model = outcome.model,
        status = outcome.status,
        status_text = status_text,
        duration = duration,
        mode = mode
    )
}

/// Log an outcome to the given writer.
pub fn log_outcome<W: Write>(
    writer: &mut W,
    outcome: &RelayOutcome,
    verbosity: &LogVerbosity,
) -> std::io::Result<()> {
    writeln!(writer, "{}", format_outcome(outcome, verbosity))
}
