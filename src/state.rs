//! Per-binding column-set states and the conservative meet used at
//! control-flow joins.

use std::collections::HashMap;
use std::sync::Arc;

use crate::schema::{ColumnPattern, Schema};

/// What the engine believes about the columns of one binding.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ColumnSetState {
    /// The binding conforms to a named schema.
    Schema(Arc<Schema>),
    /// Column names collected from load calls and propagated through
    /// operations; no schema identity is claimed.
    Inferred(InferredColumns),
    /// No column information. Validation is suppressed silently.
    #[default]
    Unknown,
    /// The binding was produced by an operation whose output columns are
    /// undecidable statically. Terminal: no validation, no propagation.
    Untracked,
}

/// The payload of an [`ColumnSetState::Inferred`] state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InferredColumns {
    /// Enumerable names, first-occurrence order.
    pub names: Vec<String>,
    /// Patterns inherited from regex column sets; they accept matching
    /// accesses but cannot be enumerated.
    pub regex_sets: Vec<ColumnPattern>,
}

impl InferredColumns {
    pub fn from_names(names: Vec<String>) -> Self {
        Self {
            names,
            regex_sets: Vec::new(),
        }
    }

    pub fn add(&mut self, name: &str) {
        if !self.names.iter().any(|n| n == name) {
            self.names.push(name.to_string());
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.names.retain(|n| n != name);
    }

    pub fn rename(&mut self, old: &str, new: &str) {
        self.remove(old);
        self.add(new);
    }

    pub fn accepts(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name) || self.regex_sets.iter().any(|p| p.matches(name))
    }
}

/// Outcome of checking one column reference against a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    Accepted,
    Missing,
    /// Unknown/Untracked — no diagnostic may be produced.
    Suppressed,
}

impl ColumnSetState {
    pub fn inferred(names: Vec<String>) -> Self {
        ColumnSetState::Inferred(InferredColumns::from_names(names))
    }

    /// Validate a column-name reference against this state.
    pub fn accepts(&self, name: &str) -> Acceptance {
        match self {
            ColumnSetState::Schema(schema) => {
                if schema.has(name) {
                    Acceptance::Accepted
                } else {
                    Acceptance::Missing
                }
            }
            ColumnSetState::Inferred(inferred) => {
                if inferred.accepts(name) {
                    Acceptance::Accepted
                } else {
                    Acceptance::Missing
                }
            }
            ColumnSetState::Unknown | ColumnSetState::Untracked => Acceptance::Suppressed,
        }
    }

    /// Enumerable names, for messages and typo suggestions. Empty for
    /// Unknown/Untracked.
    pub fn known_columns(&self) -> Vec<String> {
        match self {
            ColumnSetState::Schema(schema) => schema.columns(),
            ColumnSetState::Inferred(inferred) => inferred.names.clone(),
            ColumnSetState::Unknown | ColumnSetState::Untracked => Vec::new(),
        }
    }

    /// Degrade to an inferred column set, dropping any schema identity.
    /// Returns None when there is nothing to carry (Unknown/Untracked).
    pub fn to_inferred(&self) -> Option<InferredColumns> {
        match self {
            ColumnSetState::Schema(schema) => Some(InferredColumns {
                names: schema.columns(),
                regex_sets: schema.regex_patterns(),
            }),
            ColumnSetState::Inferred(inferred) => Some(inferred.clone()),
            ColumnSetState::Unknown | ColumnSetState::Untracked => None,
        }
    }

    /// How the state is described in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            ColumnSetState::Schema(schema) => format!("schema '{}'", schema.name()),
            ColumnSetState::Inferred(_) => "inferred column set".to_string(),
            ColumnSetState::Unknown => "unknown".to_string(),
            ColumnSetState::Untracked => "untracked".to_string(),
        }
    }
}

/// One tracked binding: its state, its rename ledger, and the line it was
/// (re)defined at.
#[derive(Debug, Clone, Default)]
pub struct Binding {
    pub state: ColumnSetState,
    /// old column name → the new name that replaced it.
    pub renames: HashMap<String, String>,
    pub line: usize,
}

impl Binding {
    pub fn new(state: ColumnSetState, line: usize) -> Self {
        Self {
            state,
            renames: HashMap::new(),
            line,
        }
    }

    pub fn untracked(line: usize) -> Self {
        Self::new(ColumnSetState::Untracked, line)
    }

    pub fn unknown(line: usize) -> Self {
        Self::new(ColumnSetState::Unknown, line)
    }

    /// Conservative meet of two post-branch bindings. Identical states meet
    /// to themselves; `Untracked` absorbs; anything else loses all column
    /// information. Rename ledgers intersect.
    pub fn meet(&self, other: &Binding) -> Binding {
        let state = match (&self.state, &other.state) {
            (a, b) if a == b => a.clone(),
            (ColumnSetState::Untracked, _) | (_, ColumnSetState::Untracked) => {
                ColumnSetState::Untracked
            }
            _ => ColumnSetState::Unknown,
        };
        let renames = self
            .renames
            .iter()
            .filter(|(old, new)| other.renames.get(*old) == Some(new))
            .map(|(old, new)| (old.clone(), new.clone()))
            .collect();
        Binding {
            state,
            renames,
            line: self.line.min(other.line),
        }
    }
}
