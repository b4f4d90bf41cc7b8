//! Schema declarations: turn `class S(BaseSchema): ...` bodies into
//! [`Schema`] values.
//!
//! Multiple inheritance goes through the schema algebra; conflicts are
//! reported to the caller so the analyzer can surface them at the
//! declaration site while still indexing the merged schema.

use std::sync::Arc;

use ruff_python_ast::{self as ast, Expr, Stmt};
use tracing::warn;

use crate::error::Error;
use crate::ingest::{attribute_chain, final_name, keyword, string_list_or_single, string_literal};
use crate::schema::{
    Column, ColumnGroup, ColumnPattern, ColumnSet, ColumnType, Member, Schema,
};

/// Base class names that mark a class as a schema declaration.
pub fn is_schema_base(name: &str) -> bool {
    matches!(
        name,
        "BaseSchema" | "DataFrameModel" | "DataFrame" | "BaseFrame"
    )
}

/// A schema extracted from a class definition, plus any combination
/// conflicts its parent list produced.
pub struct DeclaredSchema {
    pub schema: Schema,
    pub conflicts: Vec<Error>,
}

/// Extract a schema from a class definition, or None if the class is not a
/// schema declaration. `lookup` resolves parent names (dotted for imported
/// parents) to already-known schemas.
pub fn schema_from_class_def(
    class_def: &ast::StmtClassDef,
    lookup: impl Fn(&str) -> Option<Arc<Schema>>,
) -> Option<DeclaredSchema> {
    let mut parents: Vec<Arc<Schema>> = Vec::new();
    let mut is_schema = false;

    for base in class_def.bases() {
        let dotted = attribute_chain(base).map(|segs| segs.join("."));
        let Some(dotted) = dotted else { continue };
        let last = dotted.rsplit('.').next().unwrap_or(&dotted);
        if let Some(parent) = lookup(&dotted) {
            is_schema = true;
            parents.push(parent);
        } else if is_schema_base(last) {
            is_schema = true;
        }
    }

    if !is_schema {
        return None;
    }

    // Union the parents through the algebra, left to right.
    let mut conflicts = Vec::new();
    let mut members: Vec<Member> = Vec::new();
    for parent in parents {
        let acc = Schema::new("", members);
        let (combined, mut errs) = acc.combine_lenient(&parent);
        conflicts.append(&mut errs);
        members = combined.into_members();
    }

    let mut allow_extra_columns = false;

    for body_stmt in &class_def.body {
        let (attr_name, value) = match body_stmt {
            Stmt::AnnAssign(ann) => {
                let Expr::Name(name) = ann.target.as_ref() else {
                    continue;
                };
                let member =
                    member_from_value(name.id.as_str(), ann.value.as_deref(), Some(&ann.annotation));
                apply_member(
                    &mut members,
                    &mut allow_extra_columns,
                    name.id.as_str(),
                    ann.value.as_deref(),
                    member,
                );
                continue;
            }
            Stmt::Assign(assign) => {
                let Some(Expr::Name(name)) = assign.targets.first() else {
                    continue;
                };
                (name.id.as_str(), Some(&*assign.value))
            }
            _ => continue,
        };

        let member = member_from_value(attr_name, value, None);
        apply_member(&mut members, &mut allow_extra_columns, attr_name, value, member);
    }

    let schema = Schema::new(class_def.name.to_string(), members)
        .with_extra_columns(allow_extra_columns);
    Some(DeclaredSchema { schema, conflicts })
}

fn apply_member(
    members: &mut Vec<Member>,
    allow_extra_columns: &mut bool,
    attr_name: &str,
    value: Option<&Expr>,
    member: Option<Member>,
) {
    if attr_name == "allow_extra_columns" {
        if let Some(Expr::BooleanLiteral(lit)) = value {
            *allow_extra_columns = lit.value;
        }
        return;
    }
    if attr_name.starts_with('_') {
        return;
    }
    let Some(member) = member else { return };
    // A redefinition in a subclass body overrides the inherited member.
    members.retain(|m| m.attr_name() != attr_name);
    members.push(member);
}

/// Build a schema member from a class-body binding.
///
/// `Column(...)`, `ColumnSet(...)` and `ColumnGroup(...)` calls carry their
/// own structure; any other assigned or annotated name counts as a plain
/// column, typed by its annotation when one is present.
fn member_from_value(
    attr_name: &str,
    value: Option<&Expr>,
    annotation: Option<&Expr>,
) -> Option<Member> {
    if let Some(Expr::Call(call)) = value {
        match final_name(&call.func) {
            Some("Column") => return Some(Member::Column(column_from_call(attr_name, call))),
            Some("ColumnSet") => return column_set_from_call(attr_name, call).map(Member::Set),
            Some("ColumnGroup") => {
                return column_group_from_call(attr_name, call).map(Member::Group)
            }
            _ => {}
        }
    }

    let ty = annotation
        .and_then(final_name)
        .map(ColumnType::from_annotation)
        .unwrap_or(ColumnType::Any);
    Some(Member::Column(Column {
        name: attr_name.to_string(),
        ty,
        nullable: false,
        alias: None,
    }))
}

fn declared_type(call: &ast::ExprCall) -> ColumnType {
    keyword(call, "type")
        .and_then(final_name)
        .map(ColumnType::from_annotation)
        .unwrap_or(ColumnType::Any)
}

fn column_from_call(attr_name: &str, call: &ast::ExprCall) -> Column {
    let nullable = matches!(
        keyword(call, "nullable"),
        Some(Expr::BooleanLiteral(lit)) if lit.value
    );
    // DefinedLater sentinels leave the alias unset until runtime; the
    // analyzer can only use literal aliases.
    let alias = keyword(call, "alias")
        .and_then(string_literal)
        .map(str::to_string);
    Column {
        name: attr_name.to_string(),
        ty: declared_type(call),
        nullable,
        alias,
    }
}

fn column_set_from_call(attr_name: &str, call: &ast::ExprCall) -> Option<ColumnSet> {
    let members_expr = keyword(call, "members").or_else(|| call.arguments.args.first())?;
    let members = string_list_or_single(members_expr)?;
    let ty = declared_type(call);
    let is_regex = matches!(
        keyword(call, "regex"),
        Some(Expr::BooleanLiteral(lit)) if lit.value
    );
    if is_regex {
        // Multiple patterns collapse into one alternation.
        let raw = if members.len() == 1 {
            members.into_iter().next().unwrap()
        } else {
            members
                .iter()
                .map(|m| format!("(?:{})", m))
                .collect::<Vec<_>>()
                .join("|")
        };
        match ColumnPattern::new(&raw) {
            Ok(pattern) => Some(ColumnSet::regex(attr_name, ty, pattern)),
            Err(e) => {
                warn!(pattern = %raw, error = %e, "skipping column set with invalid pattern");
                None
            }
        }
    } else {
        Some(ColumnSet::explicit(attr_name, ty, members))
    }
}

fn column_group_from_call(attr_name: &str, call: &ast::ExprCall) -> Option<ColumnGroup> {
    let members_expr = keyword(call, "members").or_else(|| call.arguments.args.first())?;
    let Expr::List(list) = members_expr else {
        return None;
    };
    let mut members = Vec::new();
    for el in &list.elts {
        match el {
            Expr::Name(n) => members.push(n.id.to_string()),
            Expr::StringLiteral(s) => members.push(s.value.to_str().to_string()),
            // Descriptor references like UserSchema.user_id
            Expr::Attribute(attr) => members.push(attr.attr.to_string()),
            _ => return None,
        }
    }
    Some(ColumnGroup {
        name: attr_name.to_string(),
        members,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::SourceModule;
    use std::path::Path;

    fn first_class(source: &str) -> ast::StmtClassDef {
        let module = SourceModule::from_source(source.to_string(), Path::new("t.py")).unwrap();
        for stmt in module.body() {
            if let Stmt::ClassDef(class_def) = stmt {
                return class_def.clone();
            }
        }
        panic!("no class in source");
    }

    fn no_parents(_: &str) -> Option<Arc<Schema>> {
        None
    }

    #[test]
    fn test_should_extract_columns_with_types_and_alias() {
        // arrange
        let class_def = first_class(
            r#"
class UserSchema(BaseSchema):
    user_id = Column(type=int)
    email = Column(type=str, alias="user_email")
    age = Column(type=int, nullable=True)
"#,
        );

        // act
        let declared = schema_from_class_def(&class_def, no_parents).unwrap();

        // assert
        let schema = declared.schema;
        assert_eq!(schema.name(), "UserSchema");
        assert_eq!(schema.columns(), vec!["user_id", "user_email", "age"]);
        assert!(declared.conflicts.is_empty());
    }

    #[test]
    fn test_should_extract_explicit_and_regex_sets() {
        // arrange
        let class_def = first_class(
            r#"
class SensorData(BaseSchema):
    temperatures = ColumnSet(members=["temp_1", "temp_2"], type=float)
    pressures = ColumnSet(members="pressure_\\d+", type=float, regex=True)
"#,
        );

        // act
        let schema = schema_from_class_def(&class_def, no_parents).unwrap().schema;

        // assert
        assert_eq!(schema.columns(), vec!["temp_1", "temp_2"]);
        assert!(schema.has("pressure_9"));
        assert!(!schema.has("pressure_"));
    }

    #[test]
    fn test_should_ignore_non_schema_classes() {
        // arrange
        let class_def = first_class("class Plain:\n    x = 1\n");

        // act/assert
        assert!(schema_from_class_def(&class_def, no_parents).is_none());
    }

    #[test]
    fn test_should_inherit_parent_columns() {
        // arrange
        let parent = Arc::new(Schema::new(
            "UserPublic",
            vec![
                Member::Column(Column::new("user_id", ColumnType::Int)),
                Member::Column(Column::new("email", ColumnType::Str)),
            ],
        ));
        let class_def = first_class(
            r#"
class UserFull(UserPublic):
    password_hash = Column(type=str)
"#,
        );

        // act
        let schema = schema_from_class_def(&class_def, move |name| {
            (name == "UserPublic").then(|| parent.clone())
        })
        .unwrap()
        .schema;

        // assert — parent columns first, own columns after
        assert_eq!(schema.columns(), vec!["user_id", "email", "password_hash"]);
    }

    #[test]
    fn test_should_report_conflicts_from_multiple_inheritance() {
        // arrange — both parents declare `total` with different types
        let left = Arc::new(Schema::new(
            "A",
            vec![Member::Column(Column::new("total", ColumnType::Int))],
        ));
        let right = Arc::new(Schema::new(
            "B",
            vec![Member::Column(Column::new("total", ColumnType::Float))],
        ));
        let class_def = first_class("class Merged(A, B):\n    pass\n");

        // act
        let declared = schema_from_class_def(&class_def, move |name| match name {
            "A" => Some(left.clone()),
            "B" => Some(right.clone()),
            _ => None,
        })
        .unwrap();

        // assert — conflict reported, schema still usable with A's definition
        assert_eq!(declared.conflicts.len(), 1);
        assert_eq!(declared.schema.columns(), vec!["total"]);
    }

    #[test]
    fn test_should_read_allow_extra_columns_flag() {
        // arrange
        let class_def = first_class(
            r#"
class Open(BaseSchema):
    allow_extra_columns = True
    a = Column(type=int)
"#,
        );

        // act
        let schema = schema_from_class_def(&class_def, no_parents).unwrap().schema;

        // assert
        assert!(schema.allow_extra_columns());
        assert_eq!(schema.columns(), vec!["a"]);
    }

    #[test]
    fn test_should_type_bare_annotations() {
        // arrange
        let class_def = first_class(
            r#"
class Typed(DataFrameModel):
    user_id: int
    note: str
"#,
        );

        // act
        let schema = schema_from_class_def(&class_def, no_parents).unwrap().schema;

        // assert
        assert_eq!(schema.columns(), vec!["user_id", "note"]);
    }
}
