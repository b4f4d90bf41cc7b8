//! Syntax ingester: parse a source file into a navigable tree with stable
//! spans, plus the literal-extraction helpers the rest of the crate shares.
//!
//! Parse failures abort the current file only; no partial tree is exposed.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use ruff_python_ast::{self as ast, Expr};
use ruff_python_parser::parse_module;
use ruff_source_file::{LineIndex, SourceCode};
use ruff_text_size::TextSize;

use crate::error::{Error, Result};

/// A parsed module plus everything needed to map offsets back to
/// line/column positions.
pub struct SourceModule {
    path: PathBuf,
    source: String,
    line_index: LineIndex,
    module: ast::ModModule,
}

impl SourceModule {
    /// Read and parse `path`.
    pub fn parse(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)?;
        Self::from_source(source, path)
    }

    /// Parse source text held in memory; `path` is only used for reporting.
    pub fn from_source(source: String, path: &Path) -> Result<Self> {
        let line_index = LineIndex::from_source_text(&source);
        match parse_module(&source) {
            Ok(parsed) => Ok(Self {
                path: path.to_path_buf(),
                module: parsed.into_syntax(),
                source,
                line_index,
            }),
            Err(e) => {
                let loc = SourceCode::new(&source, &line_index).source_location(e.location.start());
                Err(Error::Syntax {
                    path: path.to_path_buf(),
                    line: loc.row.get(),
                    column: loc.column.get(),
                    message: e.error.to_string(),
                })
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn body(&self) -> &[ast::Stmt] {
        &self.module.body
    }

    /// 1-indexed `(line, column)` for a byte offset.
    pub fn location(&self, offset: TextSize) -> (usize, usize) {
        let loc = SourceCode::new(&self.source, &self.line_index).source_location(offset);
        (loc.row.get(), loc.column.get())
    }
}

/// The text of a string literal expression.
pub fn string_literal(expr: &Expr) -> Option<&str> {
    if let Expr::StringLiteral(s) = expr {
        Some(s.value.to_str())
    } else {
        None
    }
}

/// Extract a `["a", "b", ...]` list of string literals. Returns None if the
/// expression is not a list or any element is not a string literal.
pub fn string_list(expr: &Expr) -> Option<Vec<String>> {
    if let Expr::List(list) = expr {
        let mut result = Vec::new();
        for el in &list.elts {
            result.push(string_literal(el)?.to_string());
        }
        Some(result)
    } else {
        None
    }
}

/// Extract columns from a list or a single string expression.
pub fn string_list_or_single(expr: &Expr) -> Option<Vec<String>> {
    match expr {
        Expr::List(_) => string_list(expr),
        Expr::StringLiteral(s) => Some(vec![s.value.to_str().to_string()]),
        _ => None,
    }
}

/// Extract a `{"old": "new", ...}` dict of string literals. Items with
/// non-literal keys or values disqualify the whole mapping.
pub fn string_dict(dict: &ast::ExprDict) -> Option<HashMap<String, String>> {
    let mut map = HashMap::new();
    for item in &dict.items {
        let key = item.key.as_ref()?;
        match (string_literal(key), string_literal(&item.value)) {
            (Some(k), Some(v)) => {
                map.insert(k.to_string(), v.to_string());
            }
            _ => return None,
        }
    }
    Some(map)
}

/// The string-literal keys of a dict, skipping non-literal keys.
pub fn string_dict_keys(dict: &ast::ExprDict) -> Vec<String> {
    dict.items
        .iter()
        .filter_map(|item| item.key.as_ref())
        .filter_map(string_literal)
        .map(str::to_string)
        .collect()
}

/// Flatten a `a.b.c` name/attribute chain into its dotted segments.
/// Returns None for anything that is not a pure chain of names.
pub fn attribute_chain(expr: &Expr) -> Option<Vec<String>> {
    match expr {
        Expr::Name(name) => Some(vec![name.id.to_string()]),
        Expr::Attribute(attr) => {
            let mut segments = attribute_chain(&attr.value)?;
            segments.push(attr.attr.to_string());
            Some(segments)
        }
        _ => None,
    }
}

/// The final identifier of a callee or type expression: `pl.read_csv` →
/// `read_csv`, `DataFrame` → `DataFrame`.
pub fn final_name(expr: &Expr) -> Option<&str> {
    match expr {
        Expr::Name(name) => Some(name.id.as_str()),
        Expr::Attribute(attr) => Some(attr.attr.as_str()),
        _ => None,
    }
}

/// Look up a keyword argument by name.
pub fn keyword<'a>(call: &'a ast::ExprCall, name: &str) -> Option<&'a Expr> {
    call.arguments
        .keywords
        .iter()
        .find(|k| k.arg.as_ref().map(|a| a.as_str()) == Some(name))
        .map(|k| &k.value)
}

/// Whether an expression is the integer literal `1` (the pandas column axis).
pub fn is_int_one(expr: &Expr) -> bool {
    if let Expr::NumberLiteral(n) = expr {
        if let ast::Number::Int(ref i) = n.value {
            return i.as_u64() == Some(1);
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_first_expr(source: &str) -> ast::Stmt {
        let module = SourceModule::from_source(source.to_string(), Path::new("t.py")).unwrap();
        module.body()[0].clone()
    }

    #[test]
    fn test_should_report_parse_error_location() {
        // arrange
        let source = "x = 1\ndef broken(:\n".to_string();

        // act
        let result = SourceModule::from_source(source, Path::new("bad.py"));

        // assert
        match result {
            Err(Error::Syntax { line, path, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(path, Path::new("bad.py"));
            }
            other => panic!("expected syntax error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_should_map_offsets_to_one_indexed_locations() {
        // arrange
        let module =
            SourceModule::from_source("x = 1\ny = 2\n".to_string(), Path::new("t.py")).unwrap();

        // act
        let (line, col) = module.location(TextSize::new(6));

        // assert
        assert_eq!((line, col), (2, 1));
    }

    #[test]
    fn test_should_extract_string_list() {
        // arrange
        let stmt = parse_first_expr("x = [\"a\", \"b\"]");
        let ast::Stmt::Assign(assign) = stmt else {
            panic!("expected assign");
        };

        // act
        let cols = string_list(&assign.value);

        // assert
        assert_eq!(cols, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_should_reject_mixed_list() {
        // arrange
        let stmt = parse_first_expr("x = [\"a\", 1]");
        let ast::Stmt::Assign(assign) = stmt else {
            panic!("expected assign");
        };

        // act/assert
        assert_eq!(string_list(&assign.value), None);
    }

    #[test]
    fn test_should_flatten_attribute_chain() {
        // arrange
        let stmt = parse_first_expr("x = a.b.c");
        let ast::Stmt::Assign(assign) = stmt else {
            panic!("expected assign");
        };

        // act
        let chain = attribute_chain(&assign.value);

        // assert
        assert_eq!(
            chain,
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn test_should_extract_string_dict() {
        // arrange
        let stmt = parse_first_expr("x = {\"old\": \"new\"}");
        let ast::Stmt::Assign(assign) = stmt else {
            panic!("expected assign");
        };
        let Expr::Dict(dict) = &*assign.value else {
            panic!("expected dict");
        };

        // act
        let map = string_dict(dict).unwrap();

        // assert
        assert_eq!(map.get("old").map(String::as_str), Some("new"));
    }
}
