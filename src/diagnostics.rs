//! Diagnostic taxonomy, ordering, and typo suggestions.

use serde::{Deserialize, Serialize};

/// Stable diagnostic codes.
///
/// An enum instead of a bare `String` prevents typos and enables exhaustive
/// matching; the variant order is the tie-break order for sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Code {
    /// Column not in schema / inferred set
    E001,
    /// Column was renamed (rename ledger hit)
    E002,
    /// Bare load with no column info
    W001,
    /// `drop(columns=[...])` names an absent column
    W002,
    /// Union of incompatible schemas at a declaration site
    SchemaConflict,
    /// The syntax ingester failed
    ParseError,
}

impl Code {
    pub fn as_str(self) -> &'static str {
        match self {
            Code::E001 => "E001",
            Code::E002 => "E002",
            Code::W001 => "W001",
            Code::W002 => "W002",
            Code::SchemaConflict => "SCHEMA-CONFLICT",
            Code::ParseError => "PARSE-ERROR",
        }
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Code {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Code {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "E001" => Ok(Code::E001),
            "E002" => Ok(Code::E002),
            "W001" => Ok(Code::W001),
            "W002" => Ok(Code::W002),
            "SCHEMA-CONFLICT" => Ok(Code::SchemaConflict),
            "PARSE-ERROR" => Ok(Code::ParseError),
            other => Err(serde::de::Error::custom(format!(
                "unknown diagnostic code: {}",
                other
            ))),
        }
    }
}

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One finding, anchored to a source position.
///
/// Rendering (colors, summaries) is the caller's job; see [`crate::render`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub path: String,
    pub line: usize,
    pub column: usize,
    pub severity: Severity,
    pub code: Code,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        path: impl Into<String>,
        line: usize,
        column: usize,
        severity: Severity,
        code: Code,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            line,
            column,
            severity,
            code,
            message: message.into(),
        }
    }
}

/// Sort by `(path, line, column, code)` and collapse identical findings.
///
/// Message participates in the sort only to make duplicates adjacent; it does
/// not affect the relative order of distinct findings at the same position
/// beyond determinism.
pub fn sort_and_dedup(mut diags: Vec<Diagnostic>) -> Vec<Diagnostic> {
    diags.sort_by(|a, b| {
        a.path
            .cmp(&b.path)
            .then(a.line.cmp(&b.line))
            .then(a.column.cmp(&b.column))
            .then(a.code.cmp(&b.code))
            .then(a.message.cmp(&b.message))
    });
    diags.dedup();
    diags
}

/// Damerau–Levenshtein distance (optimal string alignment variant).
fn damerau_levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();
    let mut matrix = vec![vec![0usize; b_len + 1]; a_len + 1];

    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, cell) in matrix[0].iter_mut().enumerate() {
        *cell = j;
    }

    for i in 1..=a_len {
        for j in 1..=b_len {
            let cost = if a_chars[i - 1] == b_chars[j - 1] {
                0
            } else {
                1
            };
            let mut best = std::cmp::min(
                std::cmp::min(matrix[i - 1][j] + 1, matrix[i][j - 1] + 1),
                matrix[i - 1][j - 1] + cost,
            );
            if i > 1
                && j > 1
                && a_chars[i - 1] == b_chars[j - 2]
                && a_chars[i - 2] == b_chars[j - 1]
            {
                best = std::cmp::min(best, matrix[i - 2][j - 2] + 1);
            }
            matrix[i][j] = best;
        }
    }
    matrix[a_len][b_len]
}

/// Closest column name to `name`, if any is close enough to suggest.
///
/// The distance budget is `max(1, len/4)`, capped at 2. Ties resolve to the
/// lexicographically smallest candidate so output is stable across runs.
pub fn best_suggestion<'a>(name: &str, candidates: &'a [String]) -> Option<&'a str> {
    let budget = std::cmp::max(1, name.chars().count() / 4).min(2);
    candidates
        .iter()
        .map(|c| (damerau_levenshtein(name, c), c))
        .filter(|(dist, _)| *dist <= budget)
        .min_by(|(d1, c1), (d2, c2)| d1.cmp(d2).then(c1.cmp(c2)))
        .map(|(_, c)| c.as_str())
}

/// Return true if the source line at `line` (1-indexed) carries a
/// `# framelint: ignore` or `# framelint: ignore[code]` comment.
pub fn is_line_ignored(source: &str, line: usize, code: Code) -> bool {
    let Some(line_text) = source.lines().nth(line.wrapping_sub(1)) else {
        return false;
    };
    let marker = "# framelint: ignore";
    if let Some(pos) = line_text.find(marker) {
        let after = &line_text[pos + marker.len()..];
        // Bare ignore — suppress everything on this line
        if after.trim_start().is_empty() || after.starts_with(char::is_whitespace) {
            return true;
        }
        // Code-specific ignore: # framelint: ignore[code1, code2]
        if after.starts_with('[') {
            if let Some(end) = after.find(']') {
                return after[1..end].split(',').any(|c| c.trim() == code.as_str());
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_compute_distance_with_transposition() {
        // arrange
        let a = "revnue";
        let b = "revenue";

        // act
        let dist = damerau_levenshtein(a, b);

        // assert
        assert_eq!(dist, 1);
        assert_eq!(damerau_levenshtein("email", "emial"), 1);
        assert_eq!(damerau_levenshtein("kitten", "sitting"), 3);
        assert_eq!(damerau_levenshtein("", "abc"), 3);
        assert_eq!(damerau_levenshtein("equal", "equal"), 0);
    }

    #[test]
    fn test_should_find_best_match_for_typo() {
        // arrange
        let candidates = vec!["user_id".to_string(), "email".to_string()];

        // act
        let result = best_suggestion("emai", &candidates);

        // assert
        assert_eq!(result, Some("email"));
    }

    #[test]
    fn test_should_not_suggest_for_distant_name() {
        // arrange — "age" is nowhere near either candidate
        let candidates = vec!["user_id".to_string(), "email".to_string()];

        // act
        let result = best_suggestion("age", &candidates);

        // assert
        assert_eq!(result, None);
    }

    #[test]
    fn test_should_scale_budget_with_name_length() {
        // arrange — a 3-char name gets a budget of 1, not 2
        let candidates = vec!["abc".to_string()];

        // act/assert
        assert_eq!(best_suggestion("axx", &candidates), None);
        assert_eq!(best_suggestion("abx", &candidates), Some("abc"));
    }

    #[test]
    fn test_should_break_ties_lexicographically() {
        // arrange — both candidates are at distance 1 from "colx"
        let candidates = vec!["colz".to_string(), "cola".to_string()];

        // act
        let result = best_suggestion("colx", &candidates);

        // assert
        assert_eq!(result, Some("cola"));
    }

    #[test]
    fn test_should_sort_and_collapse_duplicates() {
        // arrange
        let d = |line, code| {
            Diagnostic::new("a.py", line, 1, Severity::Error, code, "m")
        };
        let diags = vec![d(2, Code::E001), d(1, Code::E002), d(1, Code::E001), d(1, Code::E001)];

        // act
        let sorted = sort_and_dedup(diags);

        // assert
        assert_eq!(sorted.len(), 3);
        assert_eq!(sorted[0].code, Code::E001);
        assert_eq!(sorted[0].line, 1);
        assert_eq!(sorted[1].code, Code::E002);
        assert_eq!(sorted[2].line, 2);
    }

    #[test]
    fn test_should_serialize_code_as_string() {
        // arrange/act
        let json = serde_json::to_string(&Code::SchemaConflict).unwrap();

        // assert
        assert_eq!(json, "\"SCHEMA-CONFLICT\"");
        let back: Code = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Code::SchemaConflict);
    }

    #[test]
    fn test_should_honor_ignore_comments() {
        // arrange
        let source = "x = 1\nprint(df[\"a\"])  # framelint: ignore\ny = 2\n";

        // act/assert
        assert!(is_line_ignored(source, 2, Code::E001));
        assert!(!is_line_ignored(source, 1, Code::E001));
        assert!(!is_line_ignored(source, 3, Code::E001));
    }

    #[test]
    fn test_should_honor_code_specific_ignore() {
        // arrange
        let source = "df.drop(columns=[\"x\"])  # framelint: ignore[W002, E002]\n";

        // act/assert
        assert!(is_line_ignored(source, 1, Code::W002));
        assert!(is_line_ignored(source, 1, Code::E002));
        assert!(!is_line_ignored(source, 1, Code::E001));
    }
}
