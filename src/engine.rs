//! Column-set inference engine.
//!
//! Walks one parsed file, tracks a [`Binding`] per DataFrame-valued name,
//! applies the method-effect catalogue, and validates every column
//! reference. No state survives beyond one file; the project index is read
//! only.

use std::collections::HashMap;
use std::sync::Arc;

use ruff_python_ast::{self as ast, Expr, Stmt};
use ruff_text_size::Ranged;

use crate::config::Options;
use crate::declare::schema_from_class_def;
use crate::diagnostics::{
    best_suggestion, is_line_ignored, sort_and_dedup, Code, Diagnostic, Severity,
};
use crate::error::{Error, Result};
use crate::index::ProjectIndex;
use crate::ingest::{
    attribute_chain, final_name, is_int_one, keyword, string_dict, string_dict_keys,
    string_list, string_list_or_single, string_literal, SourceModule,
};
use crate::resolve::{
    resolve_annotation, resolve_schema_ref, ImportTable, SchemaRef, FRAME_TYPES,
};
use crate::schema::{ColumnPattern, DescriptorTarget, Schema};
use crate::state::{Acceptance, Binding, ColumnSetState, InferredColumns};
use crate::CancelToken;

/// Receiver modules of recognized load calls.
const LOAD_MODULES: &[&str] = &["pd", "pandas", "pl", "polars"];

/// Load functions of the two libraries, read and scan variants.
const LOAD_FUNCTIONS: &[&str] = &[
    "read_csv",
    "read_parquet",
    "read_json",
    "read_excel",
    "read_feather",
    "read_orc",
    "read_ndjson",
    "read_avro",
    "read_ipc",
    "scan_csv",
    "scan_parquet",
    "scan_ndjson",
    "scan_ipc",
];

/// Row-preserving operations: the result keeps the receiver's column set.
const ROW_PASSTHROUGH_METHODS: &[&str] = &[
    "filter",
    "query",
    "head",
    "tail",
    "sample",
    "sort_values",
    "sort",
    "reset_index",
    "nlargest",
    "nsmallest",
    "fillna",
    "dropna",
    "ffill",
    "bfill",
];

/// One scope frame: binding name → state.
type Frame = HashMap<String, Binding>;

pub struct Analyzer<'a> {
    module: &'a SourceModule,
    options: &'a Options,
    index: Option<&'a ProjectIndex>,
    cancel: &'a CancelToken,
    path: String,
    imports: ImportTable,
    /// Schemas visible in this file: declared locally or imported.
    schemas: HashMap<String, Arc<Schema>>,
    /// Functions whose return annotation resolved to a schema.
    functions: HashMap<String, Arc<Schema>>,
    scopes: Vec<Frame>,
    diags: Vec<Diagnostic>,
}

impl<'a> Analyzer<'a> {
    pub fn new(
        module: &'a SourceModule,
        options: &'a Options,
        index: Option<&'a ProjectIndex>,
        cancel: &'a CancelToken,
    ) -> Self {
        Self {
            module,
            options,
            index,
            cancel,
            path: module.path().display().to_string(),
            imports: ImportTable::default(),
            schemas: HashMap::new(),
            functions: HashMap::new(),
            scopes: vec![Frame::new()],
            diags: Vec::new(),
        }
    }

    /// Analyze the whole file. Diagnostics come back ordered by
    /// `(line, column, code)` with identical findings collapsed.
    pub fn run(mut self) -> Result<Vec<Diagnostic>> {
        if !self.options.enabled {
            return Ok(Vec::new());
        }
        self.imports = ImportTable::collect(self.module.body());
        self.load_imported_symbols();

        let body = self.module.body();
        for stmt in body {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            self.visit_stmt(stmt);
        }

        let source = self.module.source();
        let mut diags = self.diags;
        diags.retain(|d| !is_line_ignored(source, d.line, d.code));
        if !self.options.warnings {
            diags.retain(|d| d.severity != Severity::Warning);
        }
        Ok(sort_and_dedup(diags))
    }

    /// Pull imported schemas and schema-returning functions out of the
    /// project index, keyed under their local names.
    fn load_imported_symbols(&mut self) {
        let Some(index) = self.index else { return };
        let mut schemas = Vec::new();
        let mut functions = Vec::new();
        for (local, module, original) in self.imports.imported_names() {
            if let Some(schema) = index.schema(module, original) {
                schemas.push((local.to_string(), schema));
            } else if let Some(schema) = index.function_return_schema(module, original) {
                functions.push((local.to_string(), schema));
            }
        }
        self.schemas.extend(schemas);
        self.functions.extend(functions);
    }

    // ── Lookup helpers ─────────────────────────────────────────────────────

    fn lookup_binding(&self, name: &str) -> Option<&Binding> {
        self.scopes.iter().rev().find_map(|frame| frame.get(name))
    }

    fn bind(&mut self, name: &str, binding: Binding) {
        self.scopes
            .last_mut()
            .expect("scope stack is never empty")
            .insert(name.to_string(), binding);
    }

    fn lookup_schema_ref(&self, r: &SchemaRef) -> Option<Arc<Schema>> {
        resolve_schema_ref(
            r,
            |name| self.schemas.get(name).cloned(),
            &self.imports,
            self.index,
        )
    }

    fn lookup_schema(&self, dotted: &str) -> Option<Arc<Schema>> {
        let segments: Vec<String> = dotted.split('.').map(str::to_string).collect();
        self.lookup_schema_ref(&SchemaRef(segments))
    }

    /// Recognize and resolve a schema-bearing annotation expression.
    fn resolve_ann(&self, expr: &Expr) -> Option<Arc<Schema>> {
        resolve_annotation(
            expr,
            |name| self.schemas.get(name).cloned(),
            &self.imports,
            self.index,
        )
    }

    /// The return schema of a called function: defined in this file, or
    /// imported and resolvable through the index.
    fn resolve_called_function(&self, name: &str) -> Option<Arc<Schema>> {
        if let Some(schema) = self.functions.get(name) {
            return Some(schema.clone());
        }
        let index = self.index?;
        let (module, original) = self.imports.resolve(&[name.to_string()])?;
        index.function_return_schema(&module, &original)
    }

    fn loc<R: Ranged>(&self, node: &R) -> (usize, usize) {
        self.module.location(node.range().start())
    }

    // ── Diagnostics ────────────────────────────────────────────────────────

    fn push_diag(&mut self, line: usize, col: usize, severity: Severity, code: Code, message: String) {
        self.diags
            .push(Diagnostic::new(self.path.clone(), line, col, severity, code, message));
    }

    fn describe_binding(&self, binding: &Binding) -> String {
        format!("{} (defined at line {})", binding.state.describe(), binding.line)
    }

    /// Validate one column-name reference against a binding. The rename
    /// ledger wins over membership; Unknown/Untracked suppress everything.
    fn validate_column_ref(&mut self, binding: &Binding, name: &str, line: usize, col: usize) {
        match binding.state.accepts(name) {
            Acceptance::Suppressed => {}
            _ if binding.renames.contains_key(name) => {
                let new = &binding.renames[name];
                self.push_diag(
                    line,
                    col,
                    Severity::Error,
                    Code::E002,
                    format!("Column '{}' was renamed to '{}'", name, new),
                );
            }
            Acceptance::Accepted => {}
            Acceptance::Missing => {
                let known = binding.state.known_columns();
                let mut message = format!(
                    "Column '{}' does not exist in {}",
                    name,
                    self.describe_binding(binding)
                );
                if !known.is_empty() {
                    message.push_str(&format!(" (columns: {})", known.join(", ")));
                }
                if let Some(suggestion) = best_suggestion(name, &known) {
                    message.push_str(&format!(" (did you mean '{}'?)", suggestion));
                }
                self.push_diag(line, col, Severity::Error, Code::E001, message);
            }
        }
    }

    // ── Statements ─────────────────────────────────────────────────────────

    fn visit_body(&mut self, body: &[Stmt]) {
        for stmt in body {
            self.visit_stmt(stmt);
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::ClassDef(class_def) => self.visit_class_def(class_def),
            Stmt::FunctionDef(func_def) => self.visit_function_def(func_def),
            Stmt::Assign(assign) => self.visit_assign(assign),
            Stmt::AnnAssign(ann) => self.visit_ann_assign(ann),
            Stmt::AugAssign(aug) => {
                // `df += x` keeps the column set; only the value is a read.
                self.scan_expr(&aug.value);
            }
            Stmt::Expr(expr_stmt) => {
                self.eval_expr(&expr_stmt.value);
                self.scan_expr(&expr_stmt.value);
            }
            Stmt::Delete(delete) => {
                for target in &delete.targets {
                    if let Expr::Subscript(sub) = target {
                        if let (Expr::Name(recv), Some(col_name)) =
                            (&*sub.value, string_literal(&sub.slice))
                        {
                            let (line, col) = self.loc(sub);
                            let recv_name = recv.id.to_string();
                            let col_name = col_name.to_string();
                            self.remove_column_inplace(&recv_name, &col_name, line, col);
                        }
                    }
                }
            }
            Stmt::If(if_stmt) => self.visit_if(if_stmt),
            Stmt::While(while_stmt) => {
                self.scan_expr(&while_stmt.test);
                self.visit_loop(&while_stmt.body, &while_stmt.orelse);
            }
            Stmt::For(for_stmt) => {
                self.scan_expr(&for_stmt.iter);
                self.visit_loop(&for_stmt.body, &for_stmt.orelse);
            }
            Stmt::With(with_stmt) => {
                for item in &with_stmt.items {
                    self.scan_expr(&item.context_expr);
                }
                self.visit_body(&with_stmt.body);
            }
            Stmt::Try(try_stmt) => self.visit_try(try_stmt),
            Stmt::Return(ret) => {
                if let Some(value) = &ret.value {
                    self.eval_expr(value);
                    self.scan_expr(value);
                }
            }
            _ => {}
        }
    }

    fn visit_class_def(&mut self, class_def: &ast::StmtClassDef) {
        let declared = schema_from_class_def(class_def, |name| self.lookup_schema(name));
        let Some(declared) = declared else { return };
        let (line, col) = self.loc(class_def);
        for conflict in declared.conflicts {
            self.push_diag(
                line,
                col,
                Severity::Error,
                Code::SchemaConflict,
                conflict.to_string(),
            );
        }
        self.schemas.insert(
            declared.schema.name().to_string(),
            Arc::new(declared.schema),
        );
    }

    fn visit_function_def(&mut self, func_def: &ast::StmtFunctionDef) {
        if let Some(returns) = &func_def.returns {
            if let Some(schema) = self.resolve_ann(returns) {
                self.functions.insert(func_def.name.to_string(), schema);
            }
        }

        // A fresh scope seeded by annotated parameters; the enclosing
        // frames stay visible read-only, rebinds land in the new frame.
        self.scopes.push(Frame::new());
        let params: Vec<(String, usize, Option<Arc<Schema>>)> = func_def
            .parameters
            .posonlyargs
            .iter()
            .chain(&func_def.parameters.args)
            .chain(&func_def.parameters.kwonlyargs)
            .map(|param| {
                let (line, _) = self.loc(&param.parameter);
                let schema = param
                    .parameter
                    .annotation
                    .as_deref()
                    .and_then(|ann| self.resolve_ann(ann));
                (param.parameter.name.id.to_string(), line, schema)
            })
            .collect();
        for (name, line, schema) in params {
            if let Some(schema) = schema {
                self.bind(&name, Binding::new(ColumnSetState::Schema(schema), line));
            }
        }
        self.visit_body(&func_def.body);
        self.scopes.pop();
    }

    fn visit_assign(&mut self, assign: &ast::StmtAssign) {
        let (line, _col) = self.loc(assign);
        let value_binding = self.eval_expr(&assign.value);
        self.scan_expr(&assign.value);

        for target in &assign.targets {
            match target {
                // Subscript assignment `df["c"] = v` adds the column.
                Expr::Subscript(sub) => {
                    if let (Expr::Name(recv), Some(col_name)) =
                        (&*sub.value, string_literal(&sub.slice))
                    {
                        let recv_name = recv.id.to_string();
                        let col_name = col_name.to_string();
                        self.add_column_inplace(&recv_name, &col_name, line);
                    }
                }
                Expr::Name(name) => {
                    let mut binding = value_binding.clone();
                    binding.line = line;
                    self.bind(name.id.as_str(), binding);
                }
                _ => {}
            }
        }
    }

    fn visit_ann_assign(&mut self, ann: &ast::StmtAnnAssign) {
        let (line, _) = self.loc(ann);
        if let Some(schema) = self.resolve_ann(&ann.annotation) {
            // The annotation wins over whatever the value would infer.
            if let Expr::Name(target) = &*ann.target {
                self.bind(
                    target.id.as_str(),
                    Binding::new(ColumnSetState::Schema(schema), line),
                );
            }
            if let Some(value) = &ann.value {
                self.scan_expr(value);
            }
            return;
        }
        if let Some(value) = &ann.value {
            let binding = self.eval_expr(value);
            self.scan_expr(value);
            if let Expr::Name(target) = &*ann.target {
                let mut binding = binding;
                binding.line = line;
                self.bind(target.id.as_str(), binding);
            }
        }
    }

    fn visit_if(&mut self, if_stmt: &ast::StmtIf) {
        self.scan_expr(&if_stmt.test);
        let pre = self.scopes.clone();
        self.visit_body(&if_stmt.body);
        let mut outcomes = vec![std::mem::replace(&mut self.scopes, pre.clone())];
        let mut has_else = false;
        for clause in &if_stmt.elif_else_clauses {
            match &clause.test {
                Some(test) => self.scan_expr(test),
                None => has_else = true,
            }
            self.visit_body(&clause.body);
            outcomes.push(std::mem::replace(&mut self.scopes, pre.clone()));
        }
        if !has_else {
            outcomes.push(pre);
        }
        self.scopes = meet_scopes(outcomes);
    }

    /// Loop bodies are analyzed once; the post-body state meets the
    /// pre-loop state because the body may run zero times.
    fn visit_loop(&mut self, body: &[Stmt], orelse: &[Stmt]) {
        let pre = self.scopes.clone();
        self.visit_body(body);
        let post = std::mem::replace(&mut self.scopes, pre.clone());
        self.scopes = meet_scopes(vec![post, pre]);
        self.visit_body(orelse);
    }

    fn visit_try(&mut self, try_stmt: &ast::StmtTry) {
        let pre = self.scopes.clone();
        self.visit_body(&try_stmt.body);
        let mut outcomes = vec![std::mem::replace(&mut self.scopes, pre.clone())];
        for handler in &try_stmt.handlers {
            let ast::ExceptHandler::ExceptHandler(h) = handler;
            self.visit_body(&h.body);
            outcomes.push(std::mem::replace(&mut self.scopes, pre.clone()));
        }
        // The body may have stopped anywhere; keep the pre-state in the meet.
        outcomes.push(pre);
        self.scopes = meet_scopes(outcomes);
        self.visit_body(&try_stmt.orelse);
        self.visit_body(&try_stmt.finalbody);
    }

    // ── In-place effects ───────────────────────────────────────────────────

    /// `df["c"] = v` / `df.insert(pos, "c", v)`: add a column. Rebinds into
    /// the current frame so enclosing scopes are never mutated.
    fn add_column_inplace(&mut self, recv: &str, col_name: &str, line: usize) {
        let Some(binding) = self.lookup_binding(recv) else { return };
        let Some(mut inferred) = binding.state.to_inferred() else { return };
        let renames = binding.renames.clone();
        inferred.add(col_name);
        self.bind(
            recv,
            Binding {
                state: ColumnSetState::Inferred(inferred),
                renames,
                line,
            },
        );
    }

    /// `del df["c"]` / `df.pop("c")`: remove a column; a miss is a column
    /// reference that cannot exist, so it validates like any other.
    fn remove_column_inplace(&mut self, recv: &str, col_name: &str, line: usize, col: usize) {
        let Some(binding) = self.lookup_binding(recv).cloned() else {
            return;
        };
        self.validate_column_ref(&binding, col_name, line, col);
        let Some(mut inferred) = binding.state.to_inferred() else {
            return;
        };
        inferred.remove(col_name);
        self.bind(
            recv,
            Binding {
                state: ColumnSetState::Inferred(inferred),
                renames: binding.renames,
                line,
            },
        );
    }

    // ── Expression evaluation (state inference) ────────────────────────────

    fn eval_expr(&mut self, expr: &Expr) -> Binding {
        let (line, col) = self.loc(expr);
        match expr {
            Expr::Name(name) => self
                .lookup_binding(name.id.as_str())
                .cloned()
                .unwrap_or_else(|| Binding::unknown(line)),
            Expr::Call(call) => self.eval_call(call, line, col),
            Expr::Subscript(sub) => self.eval_subscript(sub, line, col),
            _ => Binding::unknown(line),
        }
    }

    fn eval_call(&mut self, call: &ast::ExprCall, line: usize, col: usize) -> Binding {
        match &*call.func {
            Expr::Attribute(attr) => {
                let method = attr.attr.as_str();
                if let Expr::Name(module) = &*attr.value {
                    let module = module.id.as_str();
                    if LOAD_MODULES.contains(&module) {
                        if LOAD_FUNCTIONS.contains(&method) {
                            return self.eval_load(call, line, col);
                        }
                        if method == "merge" {
                            return self.eval_module_merge(call, line, col);
                        }
                        if method == "concat" {
                            return self.eval_concat(call, line, col);
                        }
                        if method == "col" {
                            return Binding::unknown(line);
                        }
                    }
                }
                // Frame wrappers: PandasFrame.from_schema(df, S), S.from_pandas(df)
                if method == "from_schema" {
                    if let Some(Expr::Name(schema_name)) = call.arguments.args.get(1) {
                        if let Some(schema) = self.lookup_schema(schema_name.id.as_str()) {
                            return Binding::new(ColumnSetState::Schema(schema), line);
                        }
                    }
                }
                if matches!(method, "from_pandas" | "from_polars") {
                    if let Some(chain) = attribute_chain(&attr.value) {
                        if let Some(schema) = self.lookup_schema(&chain.join(".")) {
                            return Binding::new(ColumnSetState::Schema(schema), line);
                        }
                    }
                }

                let receiver = self.eval_expr(&attr.value);
                self.validate_builder_args(&receiver, call, line, col);
                let recv_name = match &*attr.value {
                    Expr::Name(name) => Some(name.id.as_str()),
                    _ => None,
                };
                self.apply_method(receiver, recv_name, method, call, line, col)
            }
            Expr::Name(func) => {
                let func = func.id.as_str();
                if LOAD_FUNCTIONS.contains(&func) {
                    return self.eval_load(call, line, col);
                }
                if func == "concat" {
                    return self.eval_concat(call, line, col);
                }
                if func == "merge" {
                    return self.eval_module_merge(call, line, col);
                }
                if let Some(schema) = self.resolve_called_function(func) {
                    return Binding::new(ColumnSetState::Schema(schema), line);
                }
                // Unknown callee: the result is undecidable statically.
                Binding::untracked(line)
            }
            Expr::Subscript(sub) => {
                // Generic instantiation: DataFrame[S](...)
                if let Some(name) = final_name(&sub.value) {
                    if FRAME_TYPES.contains(&name) {
                        if let Some(chain) = attribute_chain(&sub.slice) {
                            if let Some(schema) = self.lookup_schema(&chain.join(".")) {
                                return Binding::new(ColumnSetState::Schema(schema), line);
                            }
                        }
                    }
                }
                Binding::untracked(line)
            }
            _ => Binding::untracked(line),
        }
    }

    /// Load-call recognition: a literal `usecols`/`columns` list or a
    /// `schema`/`dtype` mapping yields an inferred column set; a bare load
    /// yields Unknown and, under strict ingest, W001 at the call site.
    fn eval_load(&mut self, call: &ast::ExprCall, line: usize, col: usize) -> Binding {
        for kw in &call.arguments.keywords {
            match kw.arg.as_ref().map(|a| a.as_str()) {
                Some("usecols") | Some("columns") => {
                    if let Some(names) = string_list(&kw.value) {
                        return Binding::new(ColumnSetState::inferred(names), line);
                    }
                }
                Some("schema") | Some("dtype") => {
                    if let Expr::Dict(dict) = &kw.value {
                        let keys = string_dict_keys(dict);
                        if !keys.is_empty() {
                            return Binding::new(ColumnSetState::inferred(keys), line);
                        }
                    }
                }
                _ => {}
            }
        }
        if self.options.strict_ingest {
            self.push_diag(
                line,
                col,
                Severity::Warning,
                Code::W001,
                "DataFrame columns unknown at load time; pass usecols/columns or \
                 annotate the binding with a schema"
                    .to_string(),
            );
        }
        Binding::unknown(line)
    }

    fn eval_module_merge(&mut self, call: &ast::ExprCall, line: usize, col: usize) -> Binding {
        let args = &call.arguments.args;
        if args.len() < 2 {
            return Binding::untracked(line);
        }
        let left = self.eval_expr(&args[0]);
        let right = self.eval_expr(&args[1]);
        self.validate_merge_keys(call, Some(&left), Some(&right), line, col);
        union_states(vec![left, right], line)
    }

    fn eval_concat(&mut self, call: &ast::ExprCall, line: usize, _col: usize) -> Binding {
        let list = match call.arguments.args.first() {
            Some(Expr::List(list)) => Some(list),
            _ => match keyword(call, "objs") {
                Some(Expr::List(list)) => Some(list),
                _ => None,
            },
        };
        let Some(list) = list else {
            return Binding::untracked(line);
        };
        let inputs: Vec<Binding> = list.elts.iter().map(|el| self.eval_expr(el)).collect();
        if inputs.is_empty() {
            return Binding::untracked(line);
        }
        union_states(inputs, line)
    }

    fn eval_subscript(&mut self, sub: &ast::ExprSubscript, line: usize, col: usize) -> Binding {
        let base = self.eval_expr(&sub.value);
        // Column read: `df["c"]` yields a Series, not a frame.
        if let Some(name) = string_literal(&sub.slice) {
            self.validate_column_ref(&base, name, line, col);
            return Binding::untracked(line);
        }
        // Projection: `df[["a", "b"]]` narrows into a new binding.
        if let Some(names) = string_list(&sub.slice) {
            for name in &names {
                self.validate_column_ref(&base, name, line, col);
            }
            return narrowed(&base, names, line);
        }
        // Descriptor access: `df[S.user_id.s]`, `df[S.scores.s]`.
        if let Some(target) = self.descriptor_target(&sub.slice) {
            return match target {
                DescriptorTarget::Single(name) => {
                    self.validate_column_ref(&base, &name, line, col);
                    Binding::untracked(line)
                }
                DescriptorTarget::Many(names) => {
                    for name in &names {
                        self.validate_column_ref(&base, name, line, col);
                    }
                    narrowed(&base, names, line)
                }
                DescriptorTarget::Pattern(raw) => match ColumnPattern::new(&raw) {
                    Ok(pattern) => Binding::new(
                        ColumnSetState::Inferred(InferredColumns {
                            names: Vec::new(),
                            regex_sets: vec![pattern],
                        }),
                        line,
                    ),
                    Err(_) => Binding::unknown(line),
                },
            };
        }
        // Boolean mask or computed index: row selection, columns unchanged.
        Binding { line, ..base }
    }

    /// Resolve a `Schema.attr.s`-style attribute chain through the
    /// descriptor table of a schema visible in this file.
    fn descriptor_target(&self, expr: &Expr) -> Option<DescriptorTarget> {
        let segments = attribute_chain(expr)?;
        if segments.len() < 3 {
            return None;
        }
        let schema = self.lookup_schema(&segments[0])?;
        let path = segments[1..].join(".");
        schema.descriptor_table().get(&path).cloned()
    }

    // ── Method effects ─────────────────────────────────────────────────────

    fn apply_method(
        &mut self,
        receiver: Binding,
        recv_name: Option<&str>,
        method: &str,
        call: &ast::ExprCall,
        line: usize,
        col: usize,
    ) -> Binding {
        if ROW_PASSTHROUGH_METHODS.contains(&method) {
            return Binding { line, ..receiver };
        }
        match method {
            "select" => {
                let names = selected_columns(call);
                match names {
                    Some(names) if !names.is_empty() => {
                        for name in &names {
                            self.validate_column_ref(&receiver, name, line, col);
                        }
                        narrowed(&receiver, names, line)
                    }
                    _ => Binding { line, ..receiver },
                }
            }
            "drop" => {
                let dropped = drop_columns(call);
                match (receiver.state.to_inferred(), dropped) {
                    (Some(mut inferred), Some(columns)) => {
                        for name in &columns {
                            if self.options.strict_ingest && !inferred.accepts(name) {
                                self.push_diag(
                                    line,
                                    col,
                                    Severity::Warning,
                                    Code::W002,
                                    format!(
                                        "Dropped column '{}' does not exist in {}",
                                        name,
                                        self.describe_binding(&receiver)
                                    ),
                                );
                            }
                            inferred.remove(name);
                        }
                        Binding {
                            state: ColumnSetState::Inferred(inferred),
                            renames: receiver.renames,
                            line,
                        }
                    }
                    _ => Binding { line, ..receiver },
                }
            }
            "rename" => {
                let mapping = rename_mapping(call);
                match (receiver.state.to_inferred(), mapping) {
                    (Some(mut inferred), Some(mapping)) => {
                        let mut renames = receiver.renames.clone();
                        // Absent old names are not an error: pandas renames
                        // leniently.
                        for (old, new) in &mapping {
                            if inferred.accepts(old) {
                                inferred.rename(old, new);
                            }
                            renames.insert(old.clone(), new.clone());
                        }
                        Binding {
                            state: ColumnSetState::Inferred(inferred),
                            renames,
                            line,
                        }
                    }
                    _ => Binding { line, ..receiver },
                }
            }
            "assign" => match receiver.state.to_inferred() {
                Some(mut inferred) => {
                    for kw in &call.arguments.keywords {
                        if let Some(name) = &kw.arg {
                            inferred.add(name.as_str());
                        }
                    }
                    Binding {
                        state: ColumnSetState::Inferred(inferred),
                        renames: receiver.renames,
                        line,
                    }
                }
                None => Binding { line, ..receiver },
            },
            "pop" => {
                if let (Some(recv), Some(col_name)) = (
                    recv_name,
                    call.arguments.args.first().and_then(string_literal),
                ) {
                    let recv = recv.to_string();
                    let col_name = col_name.to_string();
                    self.remove_column_inplace(&recv, &col_name, line, col);
                }
                // The popped column comes back as a Series.
                Binding::untracked(line)
            }
            "insert" => {
                if let (Some(recv), Some(col_name)) = (
                    recv_name,
                    call.arguments.args.get(1).and_then(string_literal),
                ) {
                    let recv = recv.to_string();
                    let col_name = col_name.to_string();
                    self.add_column_inplace(&recv, &col_name, line);
                }
                Binding::unknown(line)
            }
            "merge" | "join" => {
                // Keys are validated, the joined shape is not decidable.
                let right = call.arguments.args.first().map(|arg| self.eval_expr(arg));
                self.validate_merge_keys(call, Some(&receiver), right.as_ref(), line, col);
                Binding::untracked(line)
            }
            // pivot, melt, explode, apply, with_columns, groupby, agg, and
            // anything else we have never heard of.
            _ => Binding::untracked(line),
        }
    }

    /// Validate `on` / `left_on` / `right_on` string-literal keys against
    /// the corresponding side's state.
    fn validate_merge_keys(
        &mut self,
        call: &ast::ExprCall,
        left: Option<&Binding>,
        right: Option<&Binding>,
        line: usize,
        col: usize,
    ) {
        let sides = [("on", left, right), ("left_on", left, None), ("right_on", right, None)];
        for (kw_name, a, b) in sides {
            let Some(value) = keyword(call, kw_name) else { continue };
            let Some(names) = string_list_or_single(value) else {
                continue;
            };
            for name in &names {
                if let Some(binding) = a {
                    self.validate_column_ref(binding, name, line, col);
                }
                if let Some(binding) = b {
                    self.validate_column_ref(binding, name, line, col);
                }
            }
        }
    }

    /// Validate `pl.col("name")` / `col("name")` builders appearing in the
    /// arguments of a method call, against the receiver's state.
    fn validate_builder_args(
        &mut self,
        receiver: &Binding,
        call: &ast::ExprCall,
        line: usize,
        col: usize,
    ) {
        let names: Vec<String> = call
            .arguments
            .args
            .iter()
            .flat_map(collect_builder_columns)
            .chain(
                call.arguments
                    .keywords
                    .iter()
                    .flat_map(|kw| collect_builder_columns(&kw.value)),
            )
            .collect();
        for name in names {
            self.validate_column_ref(receiver, &name, line, col);
        }
    }

    // ── Generic validation walk ────────────────────────────────────────────

    /// Find validation sites anywhere in an expression: string-keyed and
    /// list subscripts on tracked names, builder arguments and merge keys on
    /// tracked receivers. State bookkeeping stays in `eval_expr`.
    fn scan_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Subscript(sub) => {
                if let Expr::Name(base) = &*sub.value {
                    if let Some(binding) = self.lookup_binding(base.id.as_str()).cloned() {
                        let (line, col) = self.loc(sub);
                        if let Some(name) = string_literal(&sub.slice) {
                            self.validate_column_ref(&binding, name, line, col);
                        } else if let Some(names) = string_list(&sub.slice) {
                            for name in &names {
                                self.validate_column_ref(&binding, name, line, col);
                            }
                        } else if let Some(target) = self.descriptor_target(&sub.slice) {
                            match target {
                                DescriptorTarget::Single(name) => {
                                    self.validate_column_ref(&binding, &name, line, col)
                                }
                                DescriptorTarget::Many(names) => {
                                    for name in &names {
                                        self.validate_column_ref(&binding, name, line, col);
                                    }
                                }
                                DescriptorTarget::Pattern(_) => {}
                            }
                        }
                    }
                }
                self.scan_expr(&sub.value);
                self.scan_expr(&sub.slice);
            }
            Expr::Call(call) => {
                for arg in call.arguments.args.iter() {
                    self.scan_expr(arg);
                }
                for kw in call.arguments.keywords.iter() {
                    self.scan_expr(&kw.value);
                }
                if let Expr::Attribute(attr) = &*call.func {
                    if let Expr::Name(recv) = &*attr.value {
                        if let Some(binding) = self.lookup_binding(recv.id.as_str()).cloned() {
                            let (line, col) = self.loc(call);
                            self.validate_builder_args(&binding, call, line, col);
                            if matches!(attr.attr.as_str(), "merge" | "join") {
                                // Read the right side without re-applying
                                // effects; eval_expr already ran once.
                                let right = call.arguments.args.first().and_then(|arg| match arg {
                                    Expr::Name(n) => self.lookup_binding(n.id.as_str()).cloned(),
                                    _ => None,
                                });
                                self.validate_merge_keys(
                                    call,
                                    Some(&binding),
                                    right.as_ref(),
                                    line,
                                    col,
                                );
                            }
                        }
                    }
                    self.scan_expr(&attr.value);
                } else {
                    self.scan_expr(&call.func);
                }
            }
            Expr::Attribute(attr) => self.scan_expr(&attr.value),
            Expr::List(list) => {
                for el in &list.elts {
                    self.scan_expr(el);
                }
            }
            Expr::Tuple(tuple) => {
                for el in &tuple.elts {
                    self.scan_expr(el);
                }
            }
            Expr::Set(set) => {
                for el in &set.elts {
                    self.scan_expr(el);
                }
            }
            Expr::Dict(dict) => {
                for item in &dict.items {
                    if let Some(key) = &item.key {
                        self.scan_expr(key);
                    }
                    self.scan_expr(&item.value);
                }
            }
            Expr::BinOp(binop) => {
                self.scan_expr(&binop.left);
                self.scan_expr(&binop.right);
            }
            Expr::BoolOp(boolop) => {
                for value in &boolop.values {
                    self.scan_expr(value);
                }
            }
            Expr::Compare(compare) => {
                self.scan_expr(&compare.left);
                for comparator in &compare.comparators {
                    self.scan_expr(comparator);
                }
            }
            Expr::UnaryOp(unary) => self.scan_expr(&unary.operand),
            Expr::Starred(starred) => self.scan_expr(&starred.value),
            Expr::Named(named) => self.scan_expr(&named.value),
            Expr::If(ternary) => {
                self.scan_expr(&ternary.test);
                self.scan_expr(&ternary.body);
                self.scan_expr(&ternary.orelse);
            }
            _ => {}
        }
    }
}

/// Narrow a binding to an explicit projection. Regex sets do not survive a
/// projection; the rename ledger does.
fn narrowed(base: &Binding, names: Vec<String>, line: usize) -> Binding {
    Binding {
        state: ColumnSetState::Inferred(InferredColumns::from_names(names)),
        renames: base.renames.clone(),
        line,
    }
}

/// Union of merge/concat input states. Two schemas go through the combine
/// algebra first; a combine conflict degrades leniently to the inferred
/// union (the hard error belongs to the explicit combine operator, not
/// here). Inputs without column information poison the union.
fn union_states(inputs: Vec<Binding>, line: usize) -> Binding {
    if let [Binding {
        state: ColumnSetState::Schema(a),
        ..
    }, Binding {
        state: ColumnSetState::Schema(b),
        ..
    }] = inputs.as_slice()
    {
        if let Ok(combined) = a.combine(b) {
            return Binding::new(ColumnSetState::Schema(Arc::new(combined)), line);
        }
    }
    let mut merged = InferredColumns::default();
    for input in &inputs {
        let Some(inferred) = input.state.to_inferred() else {
            return Binding::unknown(line);
        };
        for name in inferred.names {
            merged.add(&name);
        }
        for pattern in inferred.regex_sets {
            if !merged.regex_sets.contains(&pattern) {
                merged.regex_sets.push(pattern);
            }
        }
    }
    Binding::new(ColumnSetState::Inferred(merged), line)
}

/// Column names selected by `select(...)`: a literal list, positional
/// string literals, or `col("...")` builders.
fn selected_columns(call: &ast::ExprCall) -> Option<Vec<String>> {
    let args = &call.arguments.args;
    if args.is_empty() {
        return None;
    }
    if let Some(mut names) = string_list_or_single(&args[0]) {
        for arg in &args[1..] {
            names.push(string_literal(arg)?.to_string());
        }
        return Some(names);
    }
    let names: Vec<String> = args.iter().flat_map(collect_builder_columns).collect();
    if names.is_empty() {
        None
    } else {
        Some(names)
    }
}

/// Dropped column names from a `drop(...)` call. The `columns=` kwarg is
/// authoritative; positional arguments drop columns only for polars, or for
/// pandas under `axis=1`.
fn drop_columns(call: &ast::ExprCall) -> Option<Vec<String>> {
    if let Some(value) = keyword(call, "columns") {
        return string_list_or_single(value);
    }
    if let Some(axis) = keyword(call, "axis") {
        if is_int_one(axis) {
            return call.arguments.args.first().and_then(string_list_or_single);
        }
        return None; // axis present but not 1 → row drop
    }
    call.arguments.args.first().and_then(string_list_or_single)
}

/// Rename mapping from a `rename(...)` call: `columns={...}` kwarg (pandas)
/// or a positional dict (polars).
fn rename_mapping(call: &ast::ExprCall) -> Option<HashMap<String, String>> {
    if let Some(Expr::Dict(dict)) = keyword(call, "columns") {
        return string_dict(dict);
    }
    if let Some(Expr::Dict(dict)) = call.arguments.args.first() {
        return string_dict(dict);
    }
    None
}

/// A single `pl.col("name")` / `col("name")` builder call.
fn builder_column(expr: &Expr) -> Option<String> {
    if let Expr::Call(call) = expr {
        let is_col_call = match &*call.func {
            Expr::Attribute(attr) => {
                attr.attr.as_str() == "col"
                    && matches!(&*attr.value, Expr::Name(n) if matches!(n.id.as_str(), "pl" | "polars"))
            }
            Expr::Name(n) => n.id.as_str() == "col",
            _ => false,
        };
        if is_col_call {
            return call
                .arguments
                .args
                .first()
                .and_then(string_literal)
                .map(str::to_string);
        }
    }
    None
}

/// Recursively collect all builder column references in an expression tree:
/// chained calls, lists, tuples, comparisons, boolean and binary operators.
fn collect_builder_columns(expr: &Expr) -> Vec<String> {
    if let Some(name) = builder_column(expr) {
        return vec![name];
    }
    match expr {
        Expr::Call(call) => {
            let mut names = Vec::new();
            if let Expr::Attribute(attr) = &*call.func {
                names.extend(collect_builder_columns(&attr.value));
            }
            for arg in call.arguments.args.iter() {
                names.extend(collect_builder_columns(arg));
            }
            for kw in call.arguments.keywords.iter() {
                names.extend(collect_builder_columns(&kw.value));
            }
            names
        }
        Expr::List(list) => list.elts.iter().flat_map(collect_builder_columns).collect(),
        Expr::Tuple(tuple) => tuple.elts.iter().flat_map(collect_builder_columns).collect(),
        Expr::Compare(compare) => {
            let mut names = collect_builder_columns(&compare.left);
            for comparator in &compare.comparators {
                names.extend(collect_builder_columns(comparator));
            }
            names
        }
        Expr::BinOp(binop) => {
            let mut names = collect_builder_columns(&binop.left);
            names.extend(collect_builder_columns(&binop.right));
            names
        }
        Expr::BoolOp(boolop) => boolop
            .values
            .iter()
            .flat_map(collect_builder_columns)
            .collect(),
        Expr::UnaryOp(unary) => collect_builder_columns(&unary.operand),
        _ => Vec::new(),
    }
}

/// Pointwise conservative meet over whole scope stacks. A binding missing
/// from some branch loses all column information.
fn meet_scopes(mut outcomes: Vec<Vec<Frame>>) -> Vec<Frame> {
    let mut result = outcomes.remove(0);
    for other in outcomes {
        result = result
            .into_iter()
            .zip(other)
            .map(|(a, b)| meet_frames(a, b))
            .collect();
    }
    result
}

fn meet_frames(a: Frame, b: Frame) -> Frame {
    let mut merged = Frame::new();
    for (name, binding_a) in &a {
        match b.get(name) {
            Some(binding_b) => {
                merged.insert(name.clone(), binding_a.meet(binding_b));
            }
            None => {
                merged.insert(name.clone(), Binding::unknown(binding_a.line));
            }
        }
    }
    for (name, binding_b) in b {
        if !a.contains_key(&name) {
            merged.insert(name, Binding::unknown(binding_b.line));
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn lint_with(source: &str, options: &Options) -> Vec<Diagnostic> {
        let module = SourceModule::from_source(source.to_string(), Path::new("test.py")).unwrap();
        Analyzer::new(&module, options, None, &crate::CancelToken::new())
            .run()
            .unwrap()
    }

    fn lint(source: &str) -> Vec<Diagnostic> {
        lint_with(source, &Options::default())
    }

    fn strict() -> Options {
        Options {
            strict_ingest: true,
            ..Options::default()
        }
    }

    #[test]
    fn test_should_flag_unknown_column_after_inferred_load() {
        // arrange
        let source = r#"
df = read_csv("u.csv", usecols=["user_id", "email"])
df["age"]
"#;

        // act
        let errors = lint(source);

        // assert — no suggestion: "age" is too far from either column
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, Code::E001);
        assert_eq!(errors[0].line, 3);
        assert!(errors[0].message.contains("age"));
        assert!(errors[0].message.contains("user_id, email"));
        assert!(!errors[0].message.contains("did you mean"));
    }

    #[test]
    fn test_should_suggest_close_column_name() {
        // arrange
        let source = r#"
df = read_csv("u.csv", usecols=["revenue"])
df["revnue"]
"#;

        // act
        let errors = lint(source);

        // assert
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, Code::E001);
        assert!(errors[0].message.contains("did you mean 'revenue'"));
    }

    #[test]
    fn test_should_flag_renamed_column_via_ledger() {
        // arrange
        let source = r#"
df = read_csv("u.csv", usecols=["email"])
renamed = df.rename(columns={"email": "email_address"})
renamed["email"]
"#;

        // act
        let errors = lint(source);

        // assert
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, Code::E002);
        assert!(errors[0].message.contains("email_address"));
    }

    #[test]
    fn test_should_keep_ledger_precedence_over_membership() {
        // arrange — "old" is added back by assign, the ledger still wins
        let source = r#"
df = read_csv("u.csv", usecols=["old", "other"])
df2 = df.rename(columns={"old": "new"})
df3 = df2.assign(old=1)
df3["old"]
"#;

        // act
        let errors = lint(source);

        // assert
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, Code::E002);
        assert_eq!(errors[0].line, 5);
    }

    #[test]
    fn test_should_warn_on_dropping_absent_column_under_strict_ingest() {
        // arrange
        let source = r#"
df = read_csv("u.csv", usecols=["a", "b"])
df.drop(columns=["nope"])
"#;

        // act
        let relaxed = lint(source);
        let strict_diags = lint_with(source, &strict());

        // assert
        assert!(relaxed.is_empty());
        assert_eq!(strict_diags.len(), 1);
        assert_eq!(strict_diags[0].code, Code::W002);
        assert_eq!(strict_diags[0].severity, Severity::Warning);
        assert_eq!(strict_diags[0].line, 3);
    }

    #[test]
    fn test_should_warn_on_bare_load_under_strict_ingest() {
        // arrange
        let source = "df = pd.read_csv(\"u.csv\")\n";

        // act
        let relaxed = lint(source);
        let strict_diags = lint_with(source, &strict());

        // assert
        assert!(relaxed.is_empty());
        assert_eq!(strict_diags.len(), 1);
        assert_eq!(strict_diags[0].code, Code::W001);
    }

    #[test]
    fn test_should_suppress_warnings_when_disabled() {
        // arrange
        let source = "df = pd.read_csv(\"u.csv\")\n";
        let options = Options {
            strict_ingest: true,
            warnings: false,
            ..Options::default()
        };

        // act
        let diags = lint_with(source, &options);

        // assert
        assert!(diags.is_empty());
    }

    #[test]
    fn test_should_untrack_pivot_result() {
        // arrange
        let source = r#"
class S(BaseSchema):
    a = Column(type=int)

df: DataFrame[S] = read_csv("u.csv")
y = df.pivot(index="a", columns="b", values="a")
y["anything"]
"#;

        // act
        let errors = lint(source);

        // assert — the pivot result accepts any reference silently
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn test_should_not_validate_untracked_function_result() {
        // arrange
        let source = r#"
df = some_function()
result = df.filter(pl.col("nonexistent_column") > 0)
"#;

        // act
        let errors = lint(source);

        // assert
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn test_should_lint_schema_annotated_binding() {
        // arrange
        let source = r#"
class UserSchema(BaseSchema):
    user_id = Column(type=int)
    email = Column(type=str)

df: DataFrame[UserSchema] = load()
print(df["user_id"])
print(df["name"])
"#;

        // act
        let errors = lint(source);

        // assert
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("name"));
        assert!(errors[0].message.contains("UserSchema"));
    }

    #[test]
    fn test_should_lint_annotated_polars_pattern() {
        // arrange
        let source = r#"
class UserSchema(BaseSchema):
    user_id = Column(type=int)
    email = Column(type=str)

df: Annotated[pl.DataFrame, UserSchema] = pl.read_csv("data.csv")
print(df["user_id"])
print(df["wrong_column"])
"#;

        // act
        let errors = lint(source);

        // assert
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("wrong_column"));
        assert!(errors[0].message.contains("UserSchema"));
    }

    #[test]
    fn test_should_track_function_return_annotation() {
        // arrange
        let source = r#"
class UserSchema(BaseSchema):
    user_id = Column(type=int)
    email = Column(type=str)

def load_users() -> PandasFrame[UserSchema]:
    ...

df = load_users()
print(df["user_id"])
print(df["emai"])
"#;

        // act
        let errors = lint(source);

        // assert
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("emai"));
        assert!(errors[0].message.contains("did you mean 'email'"));
    }

    #[test]
    fn test_should_seed_function_scope_from_parameters() {
        // arrange
        let source = r#"
class S(BaseSchema):
    a = Column(type=int)

def process(df: DataFrame[S]):
    df["a"]
    df["b"]
"#;

        // act
        let errors = lint(source);

        // assert
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 7);
    }

    #[test]
    fn test_should_not_leak_function_bindings() {
        // arrange — df only exists inside process; the module-level access
        // has no state and stays silent
        let source = r#"
class S(BaseSchema):
    a = Column(type=int)

def process(df: DataFrame[S]):
    df["a"]

df["zzz"]
"#;

        // act
        let errors = lint(source);

        // assert
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn test_should_not_flag_method_names_as_columns() {
        // arrange
        let source = r#"
class UserData(BaseSchema):
    user_id = Column(type=int)
    email = Column(type=str)

df: PandasFrame[UserData] = pd.read_csv("users.csv")
augmented = df.assign(created_at="2024-01-01")
print(augmented["user_id"])
print(augmented["created_at"])
"#;

        // act
        let errors = lint(source);

        // assert
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn test_should_validate_builder_in_select() {
        // arrange
        let source = r#"
class OrderSchema(BaseSchema):
    order_id = Column(type=int)
    amount = Column(type=float)

df: PolarsFrame[OrderSchema] = pl.read_csv("orders.csv")
result = df.select(pl.col("amount"))
bad = df.select(pl.col("revenue"))
"#;

        // act
        let errors = lint(source);

        // assert
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("revenue"));
        assert!(errors[0].message.contains("OrderSchema"));
    }

    #[test]
    fn test_should_validate_chained_builder_in_filter() {
        // arrange
        let source = r#"
class StockSchema(BaseSchema):
    ticker = Column(type=str)
    close = Column(type=float)

df: PolarsFrame[StockSchema] = pl.read_csv("stocks.csv")
result = df.filter(pl.col("close").is_not_null())
bad = df.filter(pl.col("open").is_not_null())
"#;

        // act
        let errors = lint(source);

        // assert
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("open"));
    }

    #[test]
    fn test_should_validate_bare_col_import() {
        // arrange
        let source = r#"
class ItemSchema(BaseSchema):
    item_id = Column(type=int)
    price = Column(type=float)

df: PolarsFrame[ItemSchema] = load()
result = df.select(col("price"))
bad = df.select(col("cost"))
"#;

        // act
        let errors = lint(source);

        // assert
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("cost"));
    }

    #[test]
    fn test_should_narrow_through_chained_passthrough() {
        // arrange
        let source = r#"
df = read_csv("u.csv", usecols=["a", "b"])
slim = df.filter(x).select(["a"])
slim["a"]
slim["b"]
"#;

        // act
        let errors = lint(source);

        // assert — "b" was projected away
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 5);
        assert!(errors[0].message.contains("'b'"));
    }

    #[test]
    fn test_should_narrow_list_subscript_into_new_binding_only() {
        // arrange
        let source = r#"
df = read_csv("u.csv", usecols=["a", "b", "c"])
slim = df[["a", "b"]]
slim["c"]
df["c"]
"#;

        // act
        let errors = lint(source);

        // assert — slim lost "c", df kept it
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 4);
    }

    #[test]
    fn test_should_validate_each_name_in_list_subscript() {
        // arrange
        let source = r#"
df = read_csv("u.csv", usecols=["a", "b"])
slim = df[["a", "zzz"]]
"#;

        // act
        let errors = lint(source);

        // assert
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("zzz"));
    }

    #[test]
    fn test_should_add_column_on_subscript_assignment() {
        // arrange
        let source = r#"
df = read_csv("u.csv", usecols=["a"])
df["b"] = 1
df["b"]
"#;

        // act
        let errors = lint(source);

        // assert
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn test_should_remove_column_on_del() {
        // arrange
        let source = r#"
df = read_csv("u.csv", usecols=["a", "b"])
del df["b"]
df["b"]
"#;

        // act
        let errors = lint(source);

        // assert
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 4);
    }

    #[test]
    fn test_should_flag_pop_of_absent_column() {
        // arrange
        let source = r#"
df = read_csv("u.csv", usecols=["a"])
df.pop("zzz")
"#;

        // act
        let errors = lint(source);

        // assert
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, Code::E001);
    }

    #[test]
    fn test_should_add_column_on_insert() {
        // arrange
        let source = r#"
df = read_csv("u.csv", usecols=["a"])
df.insert(0, "b", values)
df["b"]
"#;

        // act
        let errors = lint(source);

        // assert
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn test_should_union_module_level_merge() {
        // arrange
        let source = r#"
users = read_csv("u.csv", usecols=["user_id", "email"])
orders = read_csv("o.csv", usecols=["order_id", "user_id"])
both = pd.merge(users, orders, on="user_id")
both["email"]
both["order_id"]
both["missing"]
"#;

        // act
        let errors = lint(source);

        // assert
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 7);
    }

    #[test]
    fn test_should_validate_merge_keys_against_both_sides() {
        // arrange
        let source = r#"
users = read_csv("u.csv", usecols=["user_id"])
orders = read_csv("o.csv", usecols=["user_id"])
both = pd.merge(users, orders, on="user_idx")
"#;

        // act
        let errors = lint(source);

        // assert — one miss per side, different defining lines
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.code == Code::E001));
    }

    #[test]
    fn test_should_untrack_instance_merge_but_validate_keys() {
        // arrange
        let source = r#"
users = read_csv("u.csv", usecols=["user_id", "email"])
orders = read_csv("o.csv", usecols=["order_id"])
joined = users.merge(orders, left_on="emial", right_on="order_id")
joined["whatever"]
"#;

        // act
        let errors = lint(source);

        // assert — left_on typo flagged, join result untracked
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 4);
        assert!(errors[0].message.contains("did you mean 'email'"));
    }

    #[test]
    fn test_should_union_concat_inputs() {
        // arrange
        let source = r#"
a = read_csv("a.csv", usecols=["x"])
b = read_csv("b.csv", usecols=["y"])
c = pd.concat([a, b])
c["x"]
c["y"]
c["z"]
"#;

        // act
        let errors = lint(source);

        // assert
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 7);
    }

    #[test]
    fn test_should_degrade_conflicting_schema_concat_without_error() {
        // arrange — A.c is int, B.c is str; the module-level union is
        // lenient, unlike the explicit combine operator
        let source = r#"
class A(BaseSchema):
    c = Column(type=int)
    x = Column(type=int)

class B(BaseSchema):
    c = Column(type=str)
    y = Column(type=int)

left: DataFrame[A] = load()
right: DataFrame[B] = load()
both = pd.concat([left, right])
both["x"]
both["y"]
both["c"]
both["zzz"]
"#;

        // act
        let errors = lint(source);

        // assert — no SCHEMA-CONFLICT, only the genuine miss
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, Code::E001);
        assert!(errors[0].message.contains("zzz"));
    }

    #[test]
    fn test_should_combine_disjoint_schemas_through_concat() {
        // arrange
        let source = r#"
class A(BaseSchema):
    x = Column(type=int)

class B(BaseSchema):
    y = Column(type=int)

left: DataFrame[A] = load()
right: DataFrame[B] = load()
both = pd.concat([left, right])
both["x"]
both["y"]
"#;

        // act
        let errors = lint(source);

        // assert
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn test_should_report_conflict_at_declaration_site() {
        // arrange — multiple inheritance with a type clash
        let source = r#"
class A(BaseSchema):
    total = Column(type=int)

class B(BaseSchema):
    total = Column(type=float)

class Merged(A, B):
    pass
"#;

        // act
        let errors = lint(source);

        // assert
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, Code::SchemaConflict);
        assert_eq!(errors[0].line, 8);
        assert!(errors[0].message.contains("total"));
    }

    #[test]
    fn test_should_meet_divergent_branches_to_unknown() {
        // arrange — only one branch adds "b"; afterwards nothing is known
        let source = r#"
df = read_csv("u.csv", usecols=["a"])
if cond:
    df = df.assign(b=1)
df["b"]
df["zzz"]
"#;

        // act
        let errors = lint(source);

        // assert
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn test_should_keep_state_agreed_by_both_branches() {
        // arrange
        let source = r#"
if cond:
    df = read_csv("u.csv", usecols=["a"])
else:
    df = read_csv("v.csv", usecols=["a"])
df["a"]
df["b"]
"#;

        // act
        let errors = lint(source);

        // assert — both branches agree on {a}, so "b" is still an error
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 7);
    }

    #[test]
    fn test_should_meet_loop_body_with_pre_state() {
        // arrange — the loop may run zero times
        let source = r#"
df = read_csv("u.csv", usecols=["a"])
for chunk in chunks:
    df = df.assign(b=1)
df["b"]
"#;

        // act
        let errors = lint(source);

        // assert
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn test_should_not_change_other_diagnostics_when_adding_unused_binding() {
        // arrange
        let base = r#"
df = read_csv("u.csv", usecols=["a"])
df["zzz"]
"#;
        let with_unused = r#"
df = read_csv("u.csv", usecols=["a"])
df["zzz"]
unused = read_csv("x.csv", usecols=["q"])
"#;

        // act
        let a = lint(base);
        let b = lint(with_unused);

        // assert
        assert_eq!(a, b);
    }

    #[test]
    fn test_should_alias_state_on_plain_assignment() {
        // arrange
        let source = r#"
df = read_csv("u.csv", usecols=["a"])
other = df
other["zzz"]
"#;

        // act
        let errors = lint(source);

        // assert
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 4);
    }

    #[test]
    fn test_should_resolve_descriptor_subscript() {
        // arrange
        let source = r#"
class UserSchema(BaseSchema):
    user_id = Column(type=int)
    email = Column(type=str, alias="user_email")
    scores = ColumnSet(members=["score_a", "score_b"], type=float)

df: DataFrame[UserSchema] = load()
df[UserSchema.user_id.s]
df[UserSchema.email.s]
picked = df[UserSchema.scores.s]
picked["score_a"]
picked["user_id"]
"#;

        // act
        let errors = lint(source);

        // assert — descriptor access validates and the set narrows
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 12);
        assert!(errors[0].message.contains("user_id"));
    }

    #[test]
    fn test_should_accept_regex_set_matches() {
        // arrange
        let source = r#"
class SensorData(BaseSchema):
    device = Column(type=str)
    pressures = ColumnSet(members="pressure_\\d+", type=float, regex=True)

df: DataFrame[SensorData] = load()
df["pressure_12"]
df["pressure_x"]
"#;

        // act
        let errors = lint(source);

        // assert
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 8);
    }

    #[test]
    fn test_should_keep_regex_sets_through_rename_degrade() {
        // arrange — after rename the schema identity is gone but the
        // pattern still accepts matches
        let source = r#"
class SensorData(BaseSchema):
    device = Column(type=str)
    pressures = ColumnSet(members="pressure_\\d+", type=float, regex=True)

df: DataFrame[SensorData] = load()
df2 = df.rename(columns={"device": "device_id"})
df2["pressure_3"]
df2["device_id"]
df2["device"]
"#;

        // act
        let errors = lint(source);

        // assert — only the renamed-away name is flagged
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, Code::E002);
        assert_eq!(errors[0].line, 10);
    }

    #[test]
    fn test_should_honor_ignore_comment() {
        // arrange
        let source = r#"
df = read_csv("data.csv", usecols=["user_id"])
print(df["revenue"])  # framelint: ignore
"#;

        // act
        let errors = lint(source);

        // assert
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn test_should_not_ignore_mismatched_code() {
        // arrange
        let source = r#"
df = read_csv("data.csv", usecols=["user_id"])
print(df["revenue"])  # framelint: ignore[W002]
"#;

        // act
        let errors = lint(source);

        // assert
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, Code::E001);
    }

    #[test]
    fn test_should_track_generic_instantiation() {
        // arrange
        let source = r#"
class S(BaseSchema):
    a = Column(type=int)

df = DataFrame[S](data)
df["a"]
df["b"]
"#;

        // act
        let errors = lint(source);

        // assert
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 7);
    }

    #[test]
    fn test_should_infer_from_dtype_mapping() {
        // arrange
        let source = r#"
df = pd.read_csv("u.csv", dtype={"a": "int64", "b": "float64"})
df["a"]
df["c"]
"#;

        // act
        let errors = lint(source);

        // assert
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 4);
    }

    #[test]
    fn test_should_keep_passthrough_state_equal() {
        // arrange — every passthrough op preserves the column set
        let source = r#"
df = read_csv("u.csv", usecols=["a", "b"])
x = df.sort_values("a").head(10).fillna(0).reset_index()
x["a"]
x["zzz"]
"#;

        // act
        let errors = lint(source);

        // assert
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 5);
    }

    #[test]
    fn test_should_preserve_receiver_when_chain_untracks() {
        // arrange — the groupby result is untracked, df itself is not
        let source = r#"
df = read_csv("u.csv", usecols=["a"])
g = df.groupby("a").agg(total=("a", "sum"))
g["anything"]
df["zzz"]
"#;

        // act
        let errors = lint(source);

        // assert
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 5);
    }
}
