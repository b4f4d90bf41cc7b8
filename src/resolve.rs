//! Annotation resolver: recognize "DataFrame parameterized by a schema
//! reference" annotations and resolve the reference to a concrete schema.
//!
//! Frame type names are matched structurally by their final dotted segment,
//! so `pd.DataFrame`, `polars.LazyFrame` and a bare `DataFrame` all count
//! regardless of import alias. Resolution order: local name, imported name,
//! project index by fully qualified name; failure degrades to `Unknown`
//! without a diagnostic.

use std::collections::BTreeMap;
use std::sync::Arc;

use ruff_python_ast::{self as ast, Expr, Stmt};
use ruff_python_parser::parse_expression;
use serde::{Deserialize, Serialize};

use crate::index::ProjectIndex;
use crate::ingest::attribute_chain;
use crate::schema::Schema;

/// DataFrame class names of the two supported libraries, plus the frame
/// wrapper classes of the schema package itself.
pub const FRAME_TYPES: &[&str] = &["DataFrame", "LazyFrame", "PandasFrame", "PolarsFrame"];

/// An abstract annotation tree: enough structure to recognize annotation
/// shapes without resolving any names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnnExpr {
    Name(String),
    Attribute(Vec<String>),
    Subscript {
        value: Box<AnnExpr>,
        args: Vec<AnnExpr>,
    },
    Str(String),
    Opaque,
}

impl AnnExpr {
    fn last_segment(&self) -> Option<&str> {
        match self {
            AnnExpr::Name(n) => Some(n),
            AnnExpr::Attribute(segs) => segs.last().map(String::as_str),
            _ => None,
        }
    }
}

/// Lower a syntax-tree expression to an [`AnnExpr`].
pub fn annotation_tree(expr: &Expr) -> AnnExpr {
    match expr {
        Expr::Name(name) => AnnExpr::Name(name.id.to_string()),
        Expr::Attribute(_) => match attribute_chain(expr) {
            Some(segs) => AnnExpr::Attribute(segs),
            None => AnnExpr::Opaque,
        },
        Expr::Subscript(sub) => {
            let args = match &*sub.slice {
                Expr::Tuple(tuple) => tuple.elts.iter().map(annotation_tree).collect(),
                other => vec![annotation_tree(other)],
            };
            AnnExpr::Subscript {
                value: Box::new(annotation_tree(&sub.value)),
                args,
            }
        }
        Expr::StringLiteral(s) => AnnExpr::Str(s.value.to_str().to_string()),
        _ => AnnExpr::Opaque,
    }
}

/// A schema reference as written in source: dotted name segments, unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRef(pub Vec<String>);

fn ref_from(ann: &AnnExpr) -> Option<SchemaRef> {
    match ann {
        AnnExpr::Name(n) => Some(SchemaRef(vec![n.clone()])),
        AnnExpr::Attribute(segs) => Some(SchemaRef(segs.clone())),
        AnnExpr::Str(text) => ref_from(&parse_annotation_text(text)?),
        _ => None,
    }
}

/// Recognize the "container parameterized by metadata" shape and pull out
/// the schema reference. Handles `DataFrame[S]`, `Annotated[pd.DataFrame, S]`
/// and quoted variants of both.
pub fn schema_ref(ann: &AnnExpr) -> Option<SchemaRef> {
    match ann {
        AnnExpr::Subscript { value, args } => {
            let head = value.last_segment()?;
            if head == "Annotated" {
                if args.len() >= 2
                    && args[0]
                        .last_segment()
                        .is_some_and(|n| FRAME_TYPES.contains(&n))
                {
                    return ref_from(&args[1]);
                }
                None
            } else if FRAME_TYPES.contains(&head) {
                args.first().and_then(ref_from)
            } else {
                None
            }
        }
        AnnExpr::Str(text) => schema_ref(&parse_annotation_text(text)?),
        _ => None,
    }
}

/// Re-parse a quoted type hint (`"DataFrame[UserSchema]"`).
fn parse_annotation_text(text: &str) -> Option<AnnExpr> {
    let parsed = parse_expression(text).ok()?;
    Some(annotation_tree(&parsed.into_syntax().body))
}

/// Module-level imports of one file, sufficient to resolve dotted names
/// across modules. Relative imports are not tracked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportTable {
    /// local alias → dotted module path (`import pandas as pd`).
    modules: BTreeMap<String, String>,
    /// local name → (module path, original name) (`from m import n as a`).
    names: BTreeMap<String, (String, String)>,
}

impl ImportTable {
    pub fn collect(body: &[Stmt]) -> Self {
        let mut table = ImportTable::default();
        for stmt in body {
            match stmt {
                Stmt::Import(import) => {
                    for alias in &import.names {
                        let dotted = alias.name.id.to_string();
                        match &alias.asname {
                            Some(asname) => {
                                table.modules.insert(asname.id.to_string(), dotted);
                            }
                            None => {
                                // `import a.b` binds `a`.
                                let root = dotted.split('.').next().unwrap_or(&dotted);
                                table.modules.insert(root.to_string(), root.to_string());
                            }
                        }
                    }
                }
                Stmt::ImportFrom(import_from) => {
                    if import_from.level > 0 {
                        continue;
                    }
                    let Some(module) = &import_from.module else {
                        continue;
                    };
                    for alias in &import_from.names {
                        let original = alias.name.id.to_string();
                        if original == "*" {
                            continue;
                        }
                        let local = alias
                            .asname
                            .as_ref()
                            .map(|a| a.id.to_string())
                            .unwrap_or_else(|| original.clone());
                        table
                            .names
                            .insert(local, (module.id.to_string(), original));
                    }
                }
                _ => {}
            }
        }
        table
    }

    /// Every `from m import n` binding, as `(local, module, original)`.
    pub fn imported_names(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.names
            .iter()
            .map(|(local, (module, original))| (local.as_str(), module.as_str(), original.as_str()))
    }

    /// Map dotted segments written in this file to `(module, name)` in
    /// project-index terms.
    pub fn resolve(&self, segments: &[String]) -> Option<(String, String)> {
        let (first, rest) = segments.split_first()?;
        if rest.is_empty() {
            let (module, original) = self.names.get(first)?;
            return Some((module.clone(), original.clone()));
        }
        let base = if let Some(module) = self.modules.get(first) {
            module.clone()
        } else if let Some((module, original)) = self.names.get(first) {
            format!("{}.{}", module, original)
        } else {
            return None;
        };
        let mut module = base;
        for mid in &rest[..rest.len() - 1] {
            module.push('.');
            module.push_str(mid);
        }
        Some((module, rest.last().unwrap().clone()))
    }
}

/// Resolve a schema reference to a concrete schema.
///
/// `local` sees names already known to the current file (declared or
/// eagerly imported); the import table plus the project index cover the
/// cross-file cases.
pub fn resolve_schema_ref(
    schema_ref: &SchemaRef,
    local: impl Fn(&str) -> Option<Arc<Schema>>,
    imports: &ImportTable,
    index: Option<&ProjectIndex>,
) -> Option<Arc<Schema>> {
    let segments = &schema_ref.0;
    if segments.len() == 1 {
        if let Some(schema) = local(&segments[0]) {
            return Some(schema);
        }
    }
    if let Some(index) = index {
        if let Some((module, name)) = imports.resolve(segments) {
            if let Some(schema) = index.schema(&module, &name) {
                return Some(schema);
            }
        }
        if segments.len() > 1 {
            let module = segments[..segments.len() - 1].join(".");
            if let Some(schema) = index.schema(&module, segments.last().unwrap()) {
                return Some(schema);
            }
        }
    }
    None
}

/// Recognize an annotation expression and resolve it in one step.
pub fn resolve_annotation(
    expr: &Expr,
    local: impl Fn(&str) -> Option<Arc<Schema>>,
    imports: &ImportTable,
    index: Option<&ProjectIndex>,
) -> Option<Arc<Schema>> {
    let tree = annotation_tree(expr);
    let r = schema_ref(&tree)?;
    resolve_schema_ref(&r, local, imports, index)
}

/// Function-definition headers surfaced for the project index: parameter
/// annotations and the return annotation, as unresolved trees.
pub fn function_annotations(
    func_def: &ast::StmtFunctionDef,
) -> (Vec<(String, Option<AnnExpr>)>, Option<AnnExpr>) {
    let mut params = Vec::new();
    for param in func_def
        .parameters
        .posonlyargs
        .iter()
        .chain(&func_def.parameters.args)
        .chain(&func_def.parameters.kwonlyargs)
    {
        params.push((
            param.parameter.name.id.to_string(),
            param.parameter.annotation.as_deref().map(annotation_tree),
        ));
    }
    let returns = func_def.returns.as_deref().map(annotation_tree);
    (params, returns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::SourceModule;
    use std::path::Path;

    fn annotation_of(source: &str) -> AnnExpr {
        let module = SourceModule::from_source(source.to_string(), Path::new("t.py")).unwrap();
        let Stmt::AnnAssign(ann) = &module.body()[0] else {
            panic!("expected annotated assignment");
        };
        annotation_tree(&ann.annotation)
    }

    #[test]
    fn test_should_recognize_subscript_annotation() {
        // arrange
        let ann = annotation_of("df: DataFrame[UserSchema] = load()");

        // act
        let r = schema_ref(&ann);

        // assert
        assert_eq!(r, Some(SchemaRef(vec!["UserSchema".to_string()])));
    }

    #[test]
    fn test_should_recognize_annotated_form_with_dotted_frame() {
        // arrange
        let ann = annotation_of("df: Annotated[pl.DataFrame, UserSchema] = pl.read_csv(p)");

        // act
        let r = schema_ref(&ann);

        // assert
        assert_eq!(r, Some(SchemaRef(vec!["UserSchema".to_string()])));
    }

    #[test]
    fn test_should_recognize_quoted_annotation() {
        // arrange
        let ann = annotation_of("df: \"DataFrame[UserSchema]\" = load()");

        // act
        let r = schema_ref(&ann);

        // assert
        assert_eq!(r, Some(SchemaRef(vec!["UserSchema".to_string()])));
    }

    #[test]
    fn test_should_recognize_dotted_schema_reference() {
        // arrange
        let ann = annotation_of("df: DataFrame[schemas.UserSchema] = load()");

        // act
        let r = schema_ref(&ann);

        // assert
        assert_eq!(
            r,
            Some(SchemaRef(vec!["schemas".to_string(), "UserSchema".to_string()]))
        );
    }

    #[test]
    fn test_should_reject_non_frame_containers() {
        // arrange
        let ann = annotation_of("xs: list[UserSchema] = []");

        // act/assert
        assert_eq!(schema_ref(&ann), None);
    }

    #[test]
    fn test_should_collect_imports() {
        // arrange
        let module = SourceModule::from_source(
            "import pandas as pd\nimport mylib.schemas\nfrom mylib.loaders import load_users as load\n"
                .to_string(),
            Path::new("t.py"),
        )
        .unwrap();

        // act
        let imports = ImportTable::collect(module.body());

        // assert
        assert_eq!(
            imports.resolve(&["load".to_string()]),
            Some(("mylib.loaders".to_string(), "load_users".to_string()))
        );
        assert_eq!(
            imports.resolve(&["pd".to_string(), "DataFrame".to_string()]),
            Some(("pandas".to_string(), "DataFrame".to_string()))
        );
        assert_eq!(
            imports.resolve(&["mylib".to_string(), "schemas".to_string(), "S".to_string()]),
            Some(("mylib.schemas".to_string(), "S".to_string()))
        );
    }

    #[test]
    fn test_should_resolve_local_name_first() {
        // arrange
        let schema = Arc::new(Schema::new("S", vec![]));
        let r = SchemaRef(vec!["S".to_string()]);
        let local_schema = schema.clone();

        // act
        let resolved = resolve_schema_ref(
            &r,
            move |name| (name == "S").then(|| local_schema.clone()),
            &ImportTable::default(),
            None,
        );

        // assert
        assert_eq!(resolved.as_deref().map(Schema::name), Some("S"));
    }
}
