//! Diagnostic renderers for the CLI collaborator: editor-parseable text,
//! JSON, and GitHub Actions annotations. TTY detection and coloring stay on
//! the CLI side; the core emits plain structured text.

use serde::Serialize;

use crate::diagnostics::{Diagnostic, Severity};
use crate::error::{Error, Result};

/// Output format choice, as exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Github,
}

/// `<path>:<line>:<col>: <severity>[<code>] <message>`
pub fn render_text(diag: &Diagnostic) -> String {
    format!(
        "{}:{}:{}: {}[{}] {}",
        diag.path, diag.line, diag.column, diag.severity, diag.code, diag.message
    )
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    path: &'a str,
    line: usize,
    column: usize,
    severity: Severity,
    code: &'a str,
    message: &'a str,
}

/// A JSON array of diagnostic objects.
pub fn render_json(diags: &[Diagnostic]) -> Result<String> {
    let entries: Vec<JsonDiagnostic<'_>> = diags
        .iter()
        .map(|d| JsonDiagnostic {
            path: &d.path,
            line: d.line,
            column: d.column,
            severity: d.severity,
            code: d.code.as_str(),
            message: &d.message,
        })
        .collect();
    serde_json::to_string(&entries).map_err(|e| Error::Config(e.to_string()))
}

/// `::error file=...,line=...,col=...,title=E001::message`
pub fn render_github(diag: &Diagnostic) -> String {
    format!(
        "::{} file={},line={},col={},title={}::{}",
        diag.severity, diag.path, diag.line, diag.column, diag.code, diag.message
    )
}

pub fn render(diags: &[Diagnostic], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(diags
            .iter()
            .map(render_text)
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Json => render_json(diags),
        OutputFormat::Github => Ok(diags
            .iter()
            .map(render_github)
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// Exit-code policy: `0` clean, `1` errors — or, under strict, warnings
/// too. Warnings already suppressed by configuration never reach here, so
/// strict only checks what remains.
pub fn exit_code(diags: &[Diagnostic], strict: bool) -> i32 {
    let has_errors = diags.iter().any(|d| d.severity == Severity::Error);
    let has_warnings = diags.iter().any(|d| d.severity == Severity::Warning);
    if has_errors || (strict && has_warnings) {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Code;

    fn sample() -> Diagnostic {
        Diagnostic::new(
            "pipeline.py",
            12,
            5,
            Severity::Error,
            Code::E001,
            "Column 'age' does not exist in schema 'UserSchema' (columns: user_id, email)",
        )
    }

    #[test]
    fn test_should_render_editor_parseable_text() {
        // arrange
        let diag = sample();

        // act
        let text = render_text(&diag);

        // assert
        assert_eq!(
            text,
            "pipeline.py:12:5: error[E001] Column 'age' does not exist in schema \
             'UserSchema' (columns: user_id, email)"
        );
    }

    #[test]
    fn test_should_render_json_array() {
        // arrange
        let diag = sample();

        // act
        let json = render_json(std::slice::from_ref(&diag)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        // assert
        assert_eq!(parsed[0]["path"], "pipeline.py");
        assert_eq!(parsed[0]["line"], 12);
        assert_eq!(parsed[0]["column"], 5);
        assert_eq!(parsed[0]["severity"], "error");
        assert_eq!(parsed[0]["code"], "E001");
    }

    #[test]
    fn test_should_render_github_annotation() {
        // arrange
        let mut diag = sample();
        diag.severity = Severity::Warning;
        diag.code = Code::W002;

        // act
        let line = render_github(&diag);

        // assert
        assert!(line.starts_with("::warning file=pipeline.py,line=12,col=5,title=W002::"));
    }

    #[test]
    fn test_should_compute_exit_codes() {
        // arrange
        let error = sample();
        let mut warning = sample();
        warning.severity = Severity::Warning;
        warning.code = Code::W001;

        // act/assert
        assert_eq!(exit_code(&[], false), 0);
        assert_eq!(exit_code(std::slice::from_ref(&warning), false), 0);
        assert_eq!(exit_code(std::slice::from_ref(&warning), true), 1);
        assert_eq!(exit_code(std::slice::from_ref(&error), false), 1);
    }
}
