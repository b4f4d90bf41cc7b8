//! The configuration gate: a flat options bag and its pyproject loader.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Recognized options. Flags received from a CLI override the file; merging
/// is the caller's job — this type only carries the resolved values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    /// When false, the engine emits nothing.
    pub enabled: bool,
    /// When false, severity "warning" is suppressed.
    pub warnings: bool,
    /// Enables W001/W002.
    pub strict_ingest: bool,
    /// Disables the cross-file project index.
    pub no_index: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            enabled: true,
            warnings: true,
            strict_ingest: false,
            no_index: false,
        }
    }
}

#[derive(Deserialize)]
struct Pyproject {
    tool: Option<ToolTable>,
}

#[derive(Deserialize)]
struct ToolTable {
    framelint: Option<RawOptions>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOptions {
    enabled: Option<bool>,
    warnings: Option<bool>,
    #[serde(rename = "strict-ingest")]
    strict_ingest: Option<bool>,
    #[serde(rename = "no-index")]
    no_index: Option<bool>,
}

impl Options {
    /// Load `[tool.framelint]` from `<root>/pyproject.toml`.
    ///
    /// A missing or unreadable file and a missing table both yield defaults.
    /// A malformed table is a [`Error::Config`] — the run must abort before
    /// analysis begins.
    pub fn from_pyproject(project_root: &Path) -> Result<Options> {
        let config_path = project_root.join("pyproject.toml");
        let Ok(content) = fs::read_to_string(&config_path) else {
            return Ok(Options::default());
        };

        let parsed: Pyproject =
            toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;

        let defaults = Options::default();
        let Some(raw) = parsed.tool.and_then(|t| t.framelint) else {
            return Ok(defaults);
        };

        Ok(Options {
            enabled: raw.enabled.unwrap_or(defaults.enabled),
            warnings: raw.warnings.unwrap_or(defaults.warnings),
            strict_ingest: raw.strict_ingest.unwrap_or(defaults.strict_ingest),
            no_index: raw.no_index.unwrap_or(defaults.no_index),
        })
    }
}

/// Walk up from `start_path` to the nearest directory holding a
/// `pyproject.toml`. Falls back to `start_path` itself.
pub fn find_project_root(start_path: &Path) -> PathBuf {
    let mut current = start_path.to_path_buf();
    if current.is_file() {
        current.pop();
    }
    loop {
        if current.join("pyproject.toml").exists() {
            return current;
        }
        if !current.pop() {
            return start_path.to_path_buf();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_default_without_pyproject() {
        // arrange
        let temp = tempfile::tempdir().unwrap();

        // act
        let options = Options::from_pyproject(temp.path()).unwrap();

        // assert
        assert_eq!(options, Options::default());
        assert!(options.enabled);
        assert!(options.warnings);
        assert!(!options.strict_ingest);
        assert!(!options.no_index);
    }

    #[test]
    fn test_should_read_framelint_table() {
        // arrange
        let temp = tempfile::tempdir().unwrap();
        fs::write(
            temp.path().join("pyproject.toml"),
            "[tool.framelint]\nenabled = true\nwarnings = false\n\"strict-ingest\" = true\n",
        )
        .unwrap();

        // act
        let options = Options::from_pyproject(temp.path()).unwrap();

        // assert
        assert!(options.enabled);
        assert!(!options.warnings);
        assert!(options.strict_ingest);
        assert!(!options.no_index);
    }

    #[test]
    fn test_should_ignore_unrelated_tool_tables() {
        // arrange
        let temp = tempfile::tempdir().unwrap();
        fs::write(
            temp.path().join("pyproject.toml"),
            "[tool.something]\nenabled = false\n",
        )
        .unwrap();

        // act
        let options = Options::from_pyproject(temp.path()).unwrap();

        // assert
        assert!(options.enabled);
    }

    #[test]
    fn test_should_reject_malformed_table() {
        // arrange — wrong value type for a recognized key
        let temp = tempfile::tempdir().unwrap();
        fs::write(
            temp.path().join("pyproject.toml"),
            "[tool.framelint]\nenabled = \"yes\"\n",
        )
        .unwrap();

        // act
        let result = Options::from_pyproject(temp.path());

        // assert
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_find_project_root() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        let sub = root.join("a/b/c");
        fs::create_dir_all(&sub).unwrap();
        fs::write(root.join("pyproject.toml"), "").unwrap();

        assert_eq!(find_project_root(&sub), root);
        assert_eq!(find_project_root(root), root);
    }
}
