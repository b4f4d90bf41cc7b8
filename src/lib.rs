//! framelint — static column-level analysis for pandas and polars code.
//!
//! Given Python sources that manipulate DataFrames, framelint reports every
//! column reference that cannot exist at runtime, without executing the
//! code. Bindings carry a symbolic column set (a declared schema, an
//! inferred name set, or nothing) that is threaded through a catalogue of
//! data-manipulation operations; references are validated against it and
//! failures come back as compiler-style diagnostics.
//!
//! The crate is the analysis core: parsing, the schema model, the
//! cross-file project index, the inference engine, and the diagnostic
//! engine, plus renderers for the formats a CLI front end needs. Argument
//! parsing, terminal colors, and exit codes are the CLI's business.
//!
//! ```no_run
//! use framelint::{check_paths, CancelToken, Options};
//!
//! let diags = check_paths(
//!     &["src/pipeline".into()],
//!     &Options::default(),
//!     &CancelToken::new(),
//! )?;
//! for diag in &diags {
//!     println!("{}", framelint::render::render_text(diag));
//! }
//! # Ok::<(), framelint::Error>(())
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub mod config;
pub mod declare;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod index;
pub mod ingest;
pub mod render;
pub mod resolve;
pub mod schema;
pub mod state;

pub use config::{find_project_root, Options};
pub use diagnostics::{Code, Diagnostic, Severity};
pub use engine::Analyzer;
pub use error::{Error, Result};
pub use index::ProjectIndex;
pub use render::{exit_code, OutputFormat};
pub use schema::{Column, ColumnGroup, ColumnSet, ColumnType, Schema};
pub use state::ColumnSetState;

/// External cancel signal, checked between top-level statements within a
/// file and between files in a batch. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Analyze source text held in memory; `path` is only used in diagnostics.
///
/// A parse failure is not an error: it comes back as the file's single
/// PARSE-ERROR diagnostic.
pub fn check_source(
    source: &str,
    path: &Path,
    options: &Options,
    index: Option<&ProjectIndex>,
    cancel: &CancelToken,
) -> Result<Vec<Diagnostic>> {
    if !options.enabled {
        return Ok(Vec::new());
    }
    let module = match ingest::SourceModule::from_source(source.to_string(), path) {
        Ok(module) => module,
        Err(Error::Syntax {
            path,
            line,
            column,
            message,
        }) => {
            return Ok(vec![Diagnostic::new(
                path.display().to_string(),
                line,
                column,
                Severity::Error,
                Code::ParseError,
                format!("syntax error: {}", message),
            )]);
        }
        Err(e) => return Err(e),
    };
    Analyzer::new(&module, options, index, cancel).run()
}

/// Analyze one file on disk.
pub fn check_file(
    path: &Path,
    options: &Options,
    index: Option<&ProjectIndex>,
    cancel: &CancelToken,
) -> Result<Vec<Diagnostic>> {
    let source = std::fs::read_to_string(path)?;
    check_source(&source, path, options, index, cancel)
}

/// Analyze a batch of files and directories: build the project index over
/// the directory arguments (unless disabled), analyze every file, and merge
/// the results into one deterministic, `(path, line, column, code)`-ordered
/// list.
pub fn check_paths(
    paths: &[PathBuf],
    options: &Options,
    cancel: &CancelToken,
) -> Result<Vec<Diagnostic>> {
    if !options.enabled {
        return Ok(Vec::new());
    }

    let mut files: Vec<PathBuf> = Vec::new();
    let mut roots: Vec<PathBuf> = Vec::new();
    for path in paths {
        if path.is_dir() {
            roots.push(path.clone());
            files.extend(index::collect_py_files(path));
        } else {
            roots.push(find_project_root(path));
            files.push(path.clone());
        }
    }
    files.sort();
    files.dedup();
    roots.sort();
    roots.dedup();

    let mut diags = Vec::new();
    let index = if options.no_index {
        None
    } else {
        let mut merged = ProjectIndex::default();
        for root in &roots {
            let (built, index_diags) = ProjectIndex::build(root);
            merged.absorb(built);
            diags.extend(index_diags);
        }
        Some(merged)
    };

    for file in &files {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        match check_file(file, options, index.as_ref(), cancel) {
            Ok(file_diags) => diags.extend(file_diags),
            Err(Error::Syntax {
                path,
                line,
                column,
                message,
            }) => diags.push(Diagnostic::new(
                path.display().to_string(),
                line,
                column,
                Severity::Error,
                Code::ParseError,
                format!("syntax error: {}", message),
            )),
            Err(e) => return Err(e),
        }
    }

    if !options.warnings {
        diags.retain(|d| d.severity != Severity::Warning);
    }
    Ok(diagnostics::sort_and_dedup(diags))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_emit_nothing_when_disabled() {
        // arrange
        let options = Options {
            enabled: false,
            ..Options::default()
        };

        // act
        let diags = check_source(
            "df = read_csv(\"u.csv\", usecols=[\"a\"])\ndf[\"missing\"]\n",
            Path::new("t.py"),
            &options,
            None,
            &CancelToken::new(),
        )
        .unwrap();

        // assert
        assert!(diags.is_empty());
    }

    #[test]
    fn test_should_surface_parse_failure_as_diagnostic() {
        // arrange/act
        let diags = check_source(
            "def broken(:\n",
            Path::new("bad.py"),
            &Options::default(),
            None,
            &CancelToken::new(),
        )
        .unwrap();

        // assert
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, Code::ParseError);
        assert_eq!(diags[0].severity, Severity::Error);
    }

    #[test]
    fn test_should_stop_on_cancelled_token() {
        // arrange
        let cancel = CancelToken::new();
        cancel.cancel();

        // act
        let result = check_source(
            "x = 1\n",
            Path::new("t.py"),
            &Options::default(),
            None,
            &cancel,
        );

        // assert
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[test]
    fn test_should_run_twice_with_identical_output() {
        // arrange
        let source = r#"
df = read_csv("u.csv", usecols=["user_id", "email"])
df["age"]
df.drop(columns=["nope"])
"#;
        let options = Options {
            strict_ingest: true,
            ..Options::default()
        };

        // act
        let first =
            check_source(source, Path::new("t.py"), &options, None, &CancelToken::new()).unwrap();
        let second =
            check_source(source, Path::new("t.py"), &options, None, &CancelToken::new()).unwrap();

        // assert — byte-identical diagnostics
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }
}
