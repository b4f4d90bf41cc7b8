//! Schema model: typed columns, column sets, column groups, and the
//! combination algebra.
//!
//! A [`Schema`] is an ordered, named collection of members. It carries two
//! consistent views: by attribute name (descriptor access in the host
//! language) and by runtime column name (validation). Schemas describe shape
//! only; they never validate data.

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Closed set of column type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Int,
    Float,
    Str,
    Bool,
    Date,
    Any,
}

impl ColumnType {
    /// Map a Python annotation name to a type tag. Unrecognized names are
    /// `Any` — the analyzer does not reject types it has never seen.
    pub fn from_annotation(name: &str) -> Self {
        match name {
            "int" => ColumnType::Int,
            "float" => ColumnType::Float,
            "str" => ColumnType::Str,
            "bool" => ColumnType::Bool,
            "date" | "datetime" | "datetime64" => ColumnType::Date,
            _ => ColumnType::Any,
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ColumnType::Int => "int",
            ColumnType::Float => "float",
            ColumnType::Str => "str",
            ColumnType::Bool => "bool",
            ColumnType::Date => "date",
            ColumnType::Any => "any",
        };
        f.write_str(s)
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
    pub nullable: bool,
    pub alias: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: false,
            alias: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// The runtime column name: the alias when present, else the attribute
    /// name the column was declared under.
    pub fn effective_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// A compiled column-name pattern. Matches whole names only.
///
/// Equality, hashing, and serialization go through the raw pattern text so
/// the compiled automaton never leaks into comparisons or snapshots.
#[derive(Debug, Clone)]
pub struct ColumnPattern {
    raw: String,
    re: Regex,
}

impl ColumnPattern {
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let re = Regex::new(&format!("^(?:{})$", raw)).map_err(|e| Error::InvalidPattern {
            pattern: raw.clone(),
            message: e.to_string(),
        })?;
        Ok(Self { raw, re })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, name: &str) -> bool {
        self.re.is_match(name)
    }
}

impl PartialEq for ColumnPattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for ColumnPattern {}

impl Serialize for ColumnPattern {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for ColumnPattern {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ColumnPattern::new(raw).map_err(serde::de::Error::custom)
    }
}

/// The membership of a [`ColumnSet`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnSetKind {
    /// A finite list of member column names.
    Explicit(Vec<String>),
    /// A pattern matched against runtime column names. Cannot be enumerated.
    Regex(ColumnPattern),
}

/// A group of columns sharing one type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSet {
    pub name: String,
    pub ty: ColumnType,
    pub kind: ColumnSetKind,
}

impl ColumnSet {
    pub fn explicit(
        name: impl Into<String>,
        ty: ColumnType,
        members: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            ty,
            kind: ColumnSetKind::Explicit(members),
        }
    }

    pub fn regex(name: impl Into<String>, ty: ColumnType, pattern: ColumnPattern) -> Self {
        Self {
            name: name.into(),
            ty,
            kind: ColumnSetKind::Regex(pattern),
        }
    }

    /// Flat expansion to member names. A regex set has no concrete members.
    pub fn expand(&self) -> Result<Vec<String>> {
        match &self.kind {
            ColumnSetKind::Explicit(members) => Ok(members.clone()),
            ColumnSetKind::Regex(pattern) => Err(Error::RegexExpansion {
                pattern: pattern.raw().to_string(),
            }),
        }
    }

    /// Whether a column access by `name` is accepted by this set.
    pub fn accepts(&self, name: &str) -> bool {
        match &self.kind {
            ColumnSetKind::Explicit(members) => members.iter().any(|m| m == name),
            ColumnSetKind::Regex(pattern) => pattern.matches(name),
        }
    }
}

/// A logical bundle of sibling columns and explicit column sets, referenced
/// by their attribute names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnGroup {
    pub name: String,
    pub members: Vec<String>,
}

/// One schema member, indexed by attribute name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Member {
    Column(Column),
    Set(ColumnSet),
    Group(ColumnGroup),
}

impl Member {
    pub fn attr_name(&self) -> &str {
        match self {
            Member::Column(c) => &c.name,
            Member::Set(s) => &s.name,
            Member::Group(g) => &g.name,
        }
    }
}

/// What a descriptor attribute path resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum DescriptorTarget {
    Single(String),
    Many(Vec<String>),
    Pattern(String),
}

/// An ordered, named declaration of columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    name: String,
    members: Vec<Member>,
    allow_extra_columns: bool,
}

impl Schema {
    pub fn new(name: impl Into<String>, members: Vec<Member>) -> Self {
        Self {
            name: name.into(),
            members,
            allow_extra_columns: false,
        }
    }

    pub fn with_extra_columns(mut self, allow: bool) -> Self {
        self.allow_extra_columns = allow;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn allow_extra_columns(&self) -> bool {
        self.allow_extra_columns
    }

    /// Ordered list of enumerable column names: columns (by effective name)
    /// first-occurrence order, explicit set members inline. Regex sets do not
    /// appear — they cannot be enumerated.
    pub fn columns(&self) -> Vec<String> {
        let mut names = Vec::new();
        for member in &self.members {
            match member {
                Member::Column(c) => push_unique(&mut names, c.effective_name()),
                Member::Set(s) => {
                    if let ColumnSetKind::Explicit(members) = &s.kind {
                        for m in members {
                            push_unique(&mut names, m);
                        }
                    }
                }
                Member::Group(_) => {}
            }
        }
        names
    }

    /// Whether `name` resolves to a column, an explicit set member, or a
    /// regex set match.
    pub fn has(&self, name: &str) -> bool {
        self.column_signature(name).is_some() || self.resolve_regex(name)
    }

    /// Whether `name` matches any regex column set.
    pub fn resolve_regex(&self, name: &str) -> bool {
        self.members.iter().any(|m| match m {
            Member::Set(s) => matches!(s.kind, ColumnSetKind::Regex(_)) && s.accepts(name),
            _ => false,
        })
    }

    /// All regex patterns declared on this schema, in member order.
    pub fn regex_patterns(&self) -> Vec<ColumnPattern> {
        self.members
            .iter()
            .filter_map(|m| match m {
                Member::Set(ColumnSet {
                    kind: ColumnSetKind::Regex(p),
                    ..
                }) => Some(p.clone()),
                _ => None,
            })
            .collect()
    }

    /// The `(type, nullable)` signature of an enumerable column name.
    fn column_signature(&self, name: &str) -> Option<(ColumnType, bool)> {
        for member in &self.members {
            match member {
                Member::Column(c) if c.effective_name() == name => {
                    return Some((c.ty, c.nullable));
                }
                Member::Set(s) => {
                    if let ColumnSetKind::Explicit(members) = &s.kind {
                        if members.iter().any(|m| m == name) {
                            return Some((s.ty, false));
                        }
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Flat expansion of a group member: every referenced column and explicit
    /// set member name. Fails if the group references a regex set.
    pub fn expand_group(&self, group: &ColumnGroup) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for attr in &group.members {
            match self.members.iter().find(|m| m.attr_name() == attr) {
                Some(Member::Column(c)) => push_unique(&mut names, c.effective_name()),
                Some(Member::Set(s)) => {
                    for m in s.expand()? {
                        push_unique(&mut names, &m);
                    }
                }
                Some(Member::Group(inner)) => {
                    for m in self.expand_group(inner)? {
                        push_unique(&mut names, &m);
                    }
                }
                None => {}
            }
        }
        Ok(names)
    }

    /// Union of two schemas: `self` first, then `other`, skipping columns
    /// already present with an identical `(type, nullable)` signature. A
    /// signature mismatch is a [`Error::SchemaConflict`].
    pub fn combine(&self, other: &Schema) -> Result<Schema> {
        let (schema, conflicts) = self.combine_lenient(other);
        match conflicts.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(schema),
        }
    }

    /// The union of [`Schema::combine`], but conflicting columns are skipped
    /// (keeping `self`'s definition) and every conflict is reported. Used by
    /// declaration sites that must both diagnose and keep indexing.
    pub fn combine_lenient(&self, other: &Schema) -> (Schema, Vec<Error>) {
        let mut members = self.members.clone();
        let mut conflicts = Vec::new();
        for member in &other.members {
            match member {
                Member::Column(c) => match self.column_signature(c.effective_name()) {
                    Some(sig) if sig == (c.ty, c.nullable) => {}
                    Some((ty, nullable)) => {
                        conflicts.push(conflict(c.effective_name(), ty, nullable, c.ty, c.nullable));
                    }
                    None => members.push(member.clone()),
                },
                Member::Set(s) => {
                    if let ColumnSetKind::Explicit(set_members) = &s.kind {
                        for name in set_members {
                            match self.column_signature(name) {
                                Some(sig) if sig == (s.ty, false) => {}
                                Some((ty, nullable)) => {
                                    conflicts.push(conflict(name, ty, nullable, s.ty, false));
                                }
                                None => {}
                            }
                        }
                    }
                    if !self
                        .members
                        .iter()
                        .any(|m| matches!(m, Member::Set(existing) if existing == s))
                    {
                        members.push(member.clone());
                    }
                }
                Member::Group(g) => {
                    if !self
                        .members
                        .iter()
                        .any(|m| matches!(m, Member::Group(existing) if existing == g))
                    {
                        members.push(member.clone());
                    }
                }
            }
        }
        // Drop explicit-set members already enumerable from self, so the
        // combined columns() stays deduplicated.
        let base = self.columns();
        for member in members.iter_mut().skip(self.members.len()) {
            if let Member::Set(s) = member {
                if let ColumnSetKind::Explicit(set_members) = &mut s.kind {
                    set_members.retain(|m| !base.contains(m));
                }
            }
        }
        let schema = Schema {
            name: format!("{}+{}", self.name, other.name),
            members,
            allow_extra_columns: self.allow_extra_columns || other.allow_extra_columns,
        };
        (schema, conflicts)
    }

    pub(crate) fn into_members(self) -> Vec<Member> {
        self.members
    }

    pub(crate) fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Compile the descriptor idiom (`S.col.s`, `S.col.col`, `S.set.cols`)
    /// into a lookup table `attribute-path → column name(s) | pattern`.
    pub fn descriptor_table(&self) -> HashMap<String, DescriptorTarget> {
        let mut table = HashMap::new();
        for member in &self.members {
            match member {
                Member::Column(c) => {
                    let target = DescriptorTarget::Single(c.effective_name().to_string());
                    table.insert(format!("{}.s", c.name), target.clone());
                    table.insert(format!("{}.col", c.name), target);
                }
                Member::Set(s) => {
                    let target = match &s.kind {
                        ColumnSetKind::Explicit(members) => {
                            DescriptorTarget::Many(members.clone())
                        }
                        ColumnSetKind::Regex(p) => DescriptorTarget::Pattern(p.raw().to_string()),
                    };
                    table.insert(format!("{}.s", s.name), target.clone());
                    table.insert(format!("{}.cols", s.name), target);
                }
                Member::Group(g) => {
                    if let Ok(names) = self.expand_group(g) {
                        table.insert(format!("{}.s", g.name), DescriptorTarget::Many(names));
                    }
                }
            }
        }
        table
    }
}

fn conflict(
    column: &str,
    left_ty: ColumnType,
    left_nullable: bool,
    right_ty: ColumnType,
    right_nullable: bool,
) -> Error {
    let describe = |ty: ColumnType, nullable: bool| {
        if nullable {
            format!("{} (nullable)", ty)
        } else {
            ty.to_string()
        }
    };
    Error::SchemaConflict {
        column: column.to_string(),
        left: describe(left_ty, left_nullable),
        right: describe(right_ty, right_nullable),
    }
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_schema() -> Schema {
        Schema::new(
            "UserSchema",
            vec![
                Member::Column(Column::new("user_id", ColumnType::Int)),
                Member::Column(Column::new("email", ColumnType::Str).with_alias("user_email")),
                Member::Set(ColumnSet::explicit(
                    "scores",
                    ColumnType::Float,
                    vec!["score_a".into(), "score_b".into()],
                )),
            ],
        )
    }

    #[test]
    fn test_should_list_columns_in_declaration_order() {
        // arrange
        let schema = user_schema();

        // act
        let columns = schema.columns();

        // assert — the alias is the runtime name
        assert_eq!(columns, vec!["user_id", "user_email", "score_a", "score_b"]);
    }

    #[test]
    fn test_should_accept_regex_matches_without_enumerating() {
        // arrange
        let schema = Schema::new(
            "SensorData",
            vec![Member::Set(ColumnSet::regex(
                "pressures",
                ColumnType::Float,
                ColumnPattern::new(r"pressure_\d+").unwrap(),
            ))],
        );

        // act/assert
        assert!(schema.has("pressure_1"));
        assert!(schema.resolve_regex("pressure_42"));
        assert!(!schema.has("pressure_x"));
        assert!(schema.columns().is_empty());
    }

    #[test]
    fn test_should_fail_to_expand_regex_set() {
        // arrange
        let set = ColumnSet::regex(
            "pressures",
            ColumnType::Float,
            ColumnPattern::new(r"pressure_\d+").unwrap(),
        );

        // act
        let result = set.expand();

        // assert
        assert!(matches!(result, Err(Error::RegexExpansion { .. })));
    }

    #[test]
    fn test_should_fail_group_expansion_over_regex_set() {
        // arrange
        let schema = Schema::new(
            "S",
            vec![
                Member::Column(Column::new("a", ColumnType::Int)),
                Member::Set(ColumnSet::regex(
                    "rest",
                    ColumnType::Any,
                    ColumnPattern::new("x_.*").unwrap(),
                )),
                Member::Group(ColumnGroup {
                    name: "all".into(),
                    members: vec!["a".into(), "rest".into()],
                }),
            ],
        );

        let Member::Group(group) = &schema.members()[2] else {
            panic!("expected group");
        };

        // act
        let result = schema.expand_group(group);

        // assert
        assert!(matches!(result, Err(Error::RegexExpansion { .. })));
    }

    #[test]
    fn test_should_combine_disjoint_schemas_in_order() {
        // arrange
        let a = Schema::new(
            "A",
            vec![
                Member::Column(Column::new("x", ColumnType::Int)),
                Member::Column(Column::new("y", ColumnType::Str)),
            ],
        );
        let b = Schema::new("B", vec![Member::Column(Column::new("z", ColumnType::Float))]);

        // act
        let combined = a.combine(&b).unwrap();

        // assert
        assert_eq!(combined.name(), "A+B");
        assert_eq!(combined.columns(), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_should_merge_identical_overlap_silently() {
        // arrange — user_id appears in both with the same signature
        let a = Schema::new(
            "UserPublic",
            vec![
                Member::Column(Column::new("user_id", ColumnType::Int)),
                Member::Column(Column::new("email", ColumnType::Str)),
            ],
        );
        let b = Schema::new(
            "Orders",
            vec![
                Member::Column(Column::new("order_id", ColumnType::Int)),
                Member::Column(Column::new("user_id", ColumnType::Int)),
            ],
        );

        // act
        let combined = a.combine(&b).unwrap();

        // assert — one user_id, order preserved A-then-B
        assert_eq!(combined.columns(), vec!["user_id", "email", "order_id"]);
    }

    #[test]
    fn test_should_conflict_on_type_mismatch() {
        // arrange
        let a = Schema::new("A", vec![Member::Column(Column::new("c", ColumnType::Int))]);
        let b = Schema::new("B", vec![Member::Column(Column::new("c", ColumnType::Str))]);

        // act
        let result = a.combine(&b);

        // assert
        match result {
            Err(Error::SchemaConflict { column, left, right }) => {
                assert_eq!(column, "c");
                assert_eq!(left, "int");
                assert_eq!(right, "str");
            }
            other => panic!("expected SchemaConflict, got {:?}", other.map(|s| s.columns())),
        }
    }

    #[test]
    fn test_should_conflict_on_nullability_mismatch() {
        // arrange
        let a = Schema::new(
            "A",
            vec![Member::Column(Column::new("c", ColumnType::Int).nullable())],
        );
        let b = Schema::new("B", vec![Member::Column(Column::new("c", ColumnType::Int))]);

        // act/assert
        assert!(matches!(a.combine(&b), Err(Error::SchemaConflict { .. })));
    }

    #[test]
    fn test_should_build_descriptor_table() {
        // arrange
        let schema = user_schema();

        // act
        let table = schema.descriptor_table();

        // assert — alias resolves, sets expose member lists
        assert_eq!(
            table.get("email.s"),
            Some(&DescriptorTarget::Single("user_email".into()))
        );
        assert_eq!(
            table.get("scores.cols"),
            Some(&DescriptorTarget::Many(vec![
                "score_a".into(),
                "score_b".into()
            ]))
        );
    }

    #[test]
    fn test_should_reject_invalid_pattern() {
        // arrange/act
        let result = ColumnPattern::new("(unclosed");

        // assert
        assert!(matches!(result, Err(Error::InvalidPattern { .. })));
    }

    #[test]
    fn test_should_roundtrip_schema_through_serde() {
        // arrange
        let schema = Schema::new(
            "S",
            vec![
                Member::Column(Column::new("a", ColumnType::Int)),
                Member::Set(ColumnSet::regex(
                    "m",
                    ColumnType::Float,
                    ColumnPattern::new(r"m_\d+").unwrap(),
                )),
            ],
        );

        // act
        let bytes = rmp_serde::to_vec(&schema).unwrap();
        let back: Schema = rmp_serde::from_slice(&bytes).unwrap();

        // assert — the recompiled pattern still matches
        assert_eq!(back, schema);
        assert!(back.resolve_regex("m_7"));
    }
}
