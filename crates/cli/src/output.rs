// Output format auto-detection for the CLI.
//
// TTY → human-readable text. Piped/redirected → structured JSON.
// `--json` flag forces JSON output regardless of terminal.

use outline_store::{OutlineError, PersistError, Rejection};
use serde::Serialize;
use std::io::{self, IsTerminal, Write};

use crate::exit_code::UsageError;

const ANSI_RED: &str = "\x1b[31m";
const ANSI_YELLOW: &str = "\x1b[33m";
const ANSI_RESET: &str = "\x1b[0m";

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text.
    Human,
    /// Machine-readable JSON (one value per command).
    Json,
}

impl OutputFormat {
    /// Auto-detect format: JSON if `--json` was passed or stdout is not a TTY.
    pub fn detect(json_flag: bool) -> Self {
        if json_flag {
            return Self::Json;
        }
        Self::detect_from_terminal(io::stdout().is_terminal())
    }

    /// Testable variant that takes an explicit `is_tty` flag.
    pub fn detect_from_terminal(is_tty: bool) -> Self {
        if is_tty {
            Self::Human
        } else {
            Self::Json
        }
    }
}

/// Write a value to stdout in the selected format.
pub fn print_output<T, F>(format: OutputFormat, value: &T, human_fn: F) -> io::Result<()>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    write_output(&mut io::stdout().lock(), format, value, human_fn)
}

/// Write a value to a provided writer (useful for testing).
pub fn write_output<W, T, F>(
    writer: &mut W,
    format: OutputFormat,
    value: &T,
    human_fn: F,
) -> io::Result<()>
where
    W: Write,
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Human => {
            writeln!(writer, "{}", human_fn(value))
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut *writer, value).map_err(io::Error::other)?;
            writeln!(writer)
        }
    }
}

/// Write an error to stderr in the selected format.
pub fn print_error(format: OutputFormat, code: &str, message: &str) {
    let mut err = io::stderr().lock();
    let _ = write_diagnostic(&mut err, format, "error", code, message, io::stderr().is_terminal());
}

/// Write a warning to stderr in the selected format.
pub fn print_warning(format: OutputFormat, code: &str, message: &str) {
    let mut err = io::stderr().lock();
    let _ =
        write_diagnostic(&mut err, format, "warning", code, message, io::stderr().is_terminal());
}

fn write_diagnostic<W: Write>(
    writer: &mut W,
    format: OutputFormat,
    label: &str,
    code: &str,
    message: &str,
    is_tty: bool,
) -> io::Result<()> {
    match format {
        OutputFormat::Human => {
            let color = if label == "error" { ANSI_RED } else { ANSI_YELLOW };
            writeln!(writer, "{}", render_human_stderr_line(label, message, is_tty, color))
        }
        OutputFormat::Json => {
            let mut obj = serde_json::Map::new();
            obj.insert(
                label.to_string(),
                serde_json::json!({
                    "code": code,
                    "message": message,
                }),
            );
            serde_json::to_writer(&mut *writer, &obj).map_err(io::Error::other)?;
            writeln!(writer)
        }
    }
}

/// Print a command failure with its stable error code.
pub fn print_anyhow_error(format: OutputFormat, error: &anyhow::Error) {
    let (code, message) = error_code(error);
    print_error(format, code, &message);
}

/// Stable code plus the full message chain for a command failure.
pub fn error_code(error: &anyhow::Error) -> (&'static str, String) {
    let message = format!("{error:#}");
    for cause in error.chain() {
        if let Some(err) = cause.downcast_ref::<OutlineError>() {
            return (err.code(), message);
        }
        if let Some(rejection) = cause.downcast_ref::<Rejection>() {
            return (rejection.code(), message);
        }
        if let Some(persist) = cause.downcast_ref::<PersistError>() {
            return (persist.code(), message);
        }
        if cause.downcast_ref::<UsageError>().is_some() {
            return ("USAGE", message);
        }
    }
    ("ERROR", message)
}

fn render_human_stderr_line(label: &str, message: &str, is_tty: bool, color: &str) -> String {
    if is_tty {
        format!("{color}{label}:{ANSI_RESET} {message}")
    } else {
        format!("{label}: {message}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_tty_returns_human() {
        assert_eq!(OutputFormat::detect_from_terminal(true), OutputFormat::Human);
    }

    #[test]
    fn detect_pipe_returns_json() {
        assert_eq!(OutputFormat::detect_from_terminal(false), OutputFormat::Json);
    }

    #[test]
    fn detect_json_flag_overrides_tty() {
        assert_eq!(OutputFormat::detect(true), OutputFormat::Json);
    }

    #[test]
    fn write_output_human_format() {
        #[derive(Serialize)]
        struct Info {
            path: String,
        }
        let info = Info { path: "/v1".into() };
        let mut buf = Vec::new();
        write_output(&mut buf, OutputFormat::Human, &info, |i| format!("Path: {}", i.path))
            .unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Path: /v1\n");
    }

    #[test]
    fn write_output_json_does_not_call_human_fn() {
        #[derive(Serialize)]
        struct Info {
            path: String,
            removed: usize,
        }
        let info = Info { path: "/v1/a2".into(), removed: 4 };
        let mut buf = Vec::new();
        write_output(&mut buf, OutputFormat::Json, &info, |_| {
            unreachable!("human_fn should not be called in JSON mode")
        })
        .unwrap();
        let output = String::from_utf8(buf).unwrap();
        assert!(output.ends_with('\n'));
        let parsed: serde_json::Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(parsed["path"], "/v1/a2");
        assert_eq!(parsed["removed"], 4);
    }

    #[test]
    fn json_diagnostic_is_keyed_by_label() {
        let mut buf = Vec::new();
        write_diagnostic(&mut buf, OutputFormat::Json, "error", "NOT_FOUND", "gone", false)
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed["error"]["code"], "NOT_FOUND");
        assert_eq!(parsed["error"]["message"], "gone");
    }

    #[test]
    fn human_diagnostic_without_tty_is_plain() {
        let mut buf = Vec::new();
        write_diagnostic(&mut buf, OutputFormat::Human, "warning", "W", "careful", false)
            .unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "warning: careful\n");
    }

    #[test]
    fn render_human_error_uses_color_for_tty() {
        let line = render_human_stderr_line("error", "boom", true, ANSI_RED);
        assert!(line.contains(ANSI_RED));
        assert!(line.contains(ANSI_RESET));
        assert!(line.contains("boom"));
    }

    #[test]
    fn error_code_reads_store_errors() {
        let err = anyhow::Error::new(OutlineError::from(Rejection::ParentMissing("/v4".into())));
        let (code, message) = error_code(&err);
        assert_eq!(code, "PARENT_MISSING");
        assert!(message.contains("/v4"));

        let err = anyhow::Error::new(PersistError::Conflict { expected: 3, found: 4 })
            .context("saving outline");
        assert_eq!(error_code(&err).0, "PERSISTENCE_CONFLICT");

        let err = anyhow::Error::new(UsageError("no source".into()));
        assert_eq!(error_code(&err).0, "USAGE");

        assert_eq!(error_code(&anyhow::anyhow!("other")).0, "ERROR");
    }
}
