//! Cross-file project index: public schema declarations and annotated
//! function signatures, keyed by module qualified name.
//!
//! The index is built in a dedicated phase, then frozen; analyzers hold an
//! immutable reference. Scanning is file-order-independent: each module is
//! extracted against its own contents only, and cross-module schema
//! inheritance is resolved in a fix-up pass once every module is in. The
//! index never executes source code and retains no source text.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ruff_python_ast::Stmt;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::declare::schema_from_class_def;
use crate::diagnostics::{Code, Diagnostic, Severity};
use crate::error::{Error, Result};
use crate::ingest::SourceModule;
use crate::resolve::{
    function_annotations, resolve_schema_ref, schema_ref, AnnExpr, ImportTable, SchemaRef,
};
use crate::schema::Schema;

const INDEX_VERSION: u32 = 1;

/// A public function's annotations, as unresolved trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub params: Vec<(String, Option<AnnExpr>)>,
    pub returns: Option<AnnExpr>,
}

/// Everything the index keeps about one module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleRecord {
    pub schemas: BTreeMap<String, Schema>,
    pub functions: BTreeMap<String, FunctionRecord>,
    pub imports: ImportTable,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ProjectIndex {
    version: u32,
    modules: BTreeMap<String, ModuleRecord>,
}

impl ProjectIndex {
    /// Scan a directory root. Syntactically invalid files are skipped with
    /// one file-level diagnostic each; the rest of the index stays usable.
    pub fn build(root: &Path) -> (ProjectIndex, Vec<Diagnostic>) {
        let mut modules = BTreeMap::new();
        let mut diagnostics = Vec::new();
        // child schema name → (module, unresolved dotted parent names)
        let mut pending: Vec<(String, String, Vec<String>)> = Vec::new();

        for file in collect_py_files(root) {
            let Some(module_name) = module_name(root, &file) else {
                continue;
            };
            let module = match SourceModule::parse(&file) {
                Ok(module) => module,
                Err(Error::Syntax {
                    path,
                    line,
                    column,
                    message,
                }) => {
                    warn!(path = %path.display(), "skipping unparseable file");
                    diagnostics.push(Diagnostic::new(
                        path.display().to_string(),
                        line,
                        column,
                        Severity::Error,
                        Code::ParseError,
                        format!("syntax error: {}", message),
                    ));
                    continue;
                }
                Err(e) => {
                    warn!(path = %file.display(), error = %e, "skipping unreadable file");
                    continue;
                }
            };
            let record = scan_module(&module, &module_name, &mut pending);
            debug!(
                module = %module_name,
                schemas = record.schemas.len(),
                functions = record.functions.len(),
                "indexed module"
            );
            modules.insert(module_name, record);
        }

        let mut index = ProjectIndex {
            version: INDEX_VERSION,
            modules,
        };
        index.freeze(pending);
        (index, diagnostics)
    }

    /// Resolve schema declarations whose parents live in other modules.
    /// Parent chains may span several modules, so iterate until a pass makes
    /// no progress; schemas cannot reference each other cyclically.
    fn freeze(&mut self, mut pending: Vec<(String, String, Vec<String>)>) {
        loop {
            let mut remaining = Vec::new();
            let mut progressed = false;
            for (module_name, schema_name, parents) in pending {
                let resolved: Option<Vec<Arc<Schema>>> = {
                    let this: &ProjectIndex = &*self;
                    let record = &this.modules[&module_name];
                    parents
                        .iter()
                        .map(|parent| {
                            let segments: Vec<String> =
                                parent.split('.').map(str::to_string).collect();
                            resolve_schema_ref(
                                &SchemaRef(segments),
                                |name| record.schemas.get(name).cloned().map(Arc::new),
                                &record.imports,
                                Some(this),
                            )
                        })
                        .collect()
                };
                match resolved {
                    Some(parent_schemas) => {
                        let record = self.modules.get_mut(&module_name).expect("module exists");
                        let Some(own) = record.schemas.get(&schema_name) else {
                            continue;
                        };
                        let mut acc = Schema::new("", vec![]);
                        for parent in &parent_schemas {
                            (acc, _) = acc.combine_lenient(parent);
                        }
                        let (merged, _) = acc.combine_lenient(own);
                        let allow_extra = own.allow_extra_columns();
                        record.schemas.insert(
                            schema_name.clone(),
                            merged.with_name(schema_name).with_extra_columns(allow_extra),
                        );
                        progressed = true;
                    }
                    None => remaining.push((module_name, schema_name, parents)),
                }
            }
            pending = remaining;
            if pending.is_empty() || !progressed {
                break;
            }
        }
    }

    pub fn module(&self, name: &str) -> Option<&ModuleRecord> {
        self.modules.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// A declared schema, by module qualified name.
    pub fn schema(&self, module: &str, name: &str) -> Option<Arc<Schema>> {
        self.modules
            .get(module)?
            .schemas
            .get(name)
            .cloned()
            .map(Arc::new)
    }

    /// Resolve a function's return annotation to a schema, in the context of
    /// the module that declared the function.
    pub fn function_return_schema(&self, module: &str, name: &str) -> Option<Arc<Schema>> {
        let record = self.modules.get(module)?;
        let returns = record.functions.get(name)?.returns.as_ref()?;
        let r = schema_ref(returns)?;
        resolve_schema_ref(
            &r,
            |local| record.schemas.get(local).cloned().map(Arc::new),
            &record.imports,
            Some(self),
        )
    }

    /// Fold another index (e.g. from a second root directory) into this one.
    pub fn absorb(&mut self, other: ProjectIndex) {
        self.modules.extend(other.modules);
    }

    /// Compact snapshot for caching between runs. The snapshot is a cache
    /// key, not persisted state: a version mismatch invalidates it.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        rmp_serde::to_vec(self).map_err(|e| Error::Config(format!("cannot encode index: {}", e)))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<ProjectIndex> {
        let index: ProjectIndex = rmp_serde::from_slice(bytes)
            .map_err(|e| Error::Config(format!("cannot decode index: {}", e)))?;
        if index.version != INDEX_VERSION {
            return Err(Error::Config(format!(
                "incompatible index snapshot version {}",
                index.version
            )));
        }
        Ok(index)
    }
}

fn scan_module(
    module: &SourceModule,
    module_name: &str,
    pending: &mut Vec<(String, String, Vec<String>)>,
) -> ModuleRecord {
    let mut record = ModuleRecord {
        imports: ImportTable::collect(module.body()),
        ..ModuleRecord::default()
    };

    for stmt in module.body() {
        match stmt {
            Stmt::ClassDef(class_def) => {
                let local = &record.schemas;
                let Some(declared) = schema_from_class_def(class_def, |name| {
                    local.get(name).cloned().map(Arc::new)
                }) else {
                    continue;
                };
                // Parents not resolvable within this module get fixed up
                // once every module is scanned.
                let unresolved: Vec<String> = class_def
                    .bases()
                    .iter()
                    .filter_map(crate::ingest::attribute_chain)
                    .map(|segs| segs.join("."))
                    .filter(|dotted| {
                        let last = dotted.rsplit('.').next().unwrap_or(dotted);
                        !crate::declare::is_schema_base(last) && !record.schemas.contains_key(dotted)
                    })
                    .collect();
                if !unresolved.is_empty() {
                    pending.push((
                        module_name.to_string(),
                        declared.schema.name().to_string(),
                        unresolved,
                    ));
                }
                record
                    .schemas
                    .insert(declared.schema.name().to_string(), declared.schema);
            }
            Stmt::FunctionDef(func_def) => {
                if func_def.name.starts_with('_') {
                    continue;
                }
                let (params, returns) = function_annotations(func_def);
                record.functions.insert(
                    func_def.name.to_string(),
                    FunctionRecord { params, returns },
                );
            }
            _ => {}
        }
    }
    record
}

/// Dotted module name for a file under `root`. A leading `src/` component is
/// stripped; `pkg/__init__.py` maps to `pkg`.
fn module_name(root: &Path, file: &Path) -> Option<String> {
    let rel = file.strip_prefix(root).ok()?;
    let mut parts: Vec<String> = rel
        .components()
        .filter_map(|c| c.as_os_str().to_str().map(String::from))
        .collect();
    let last = parts.pop()?;
    let stem = last.strip_suffix(".py")?;
    if parts.first().map(String::as_str) == Some("src") {
        parts.remove(0);
    }
    if stem != "__init__" {
        parts.push(stem.to_string());
    }
    if parts.is_empty() {
        return Some(stem.to_string());
    }
    Some(parts.join("."))
}

/// All `.py` files under `dir`, sorted for deterministic scan order. Hidden
/// directories and `__pycache__` are skipped.
pub(crate) fn collect_py_files(dir: &Path) -> Vec<PathBuf> {
    let mut result = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        let Ok(entries) = fs::read_dir(&current) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if name_str.starts_with('.') || name_str == "__pycache__" {
                continue;
            }
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().and_then(|e| e.to_str()) == Some("py") {
                result.push(path);
            }
        }
    }
    result.sort();
    result
}
