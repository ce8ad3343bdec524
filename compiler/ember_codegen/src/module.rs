//! Module assembly.
//!
//! Renders one linked module as WebAssembly text, in this order: memory
//! import, function types (one per distinct encoded signature), imports,
//! globals, data segments, functions.

use std::fmt::Write as _;

use ember_diagnostic::{CompileError, CompileResult, SymbolKind};
use ember_ir::{Module, StmtKind, TypeRef};
use ember_link::LinkedModule;
use ember_symbols::literals::Constant;
use ember_symbols::{
    DataBlock, ExportDescriptor, FunctionEntry, FunctionSignature, GlobalDecl, ModuleMetadata,
    StorageScope,
};
use rustc_hash::FxHashSet;

use crate::config::EmitConfig;
use crate::context::{ContextStack, FunctionContext, VarDescriptor, VarScope};
use crate::expr::constant;
use crate::labels::LabelGenerator;
use crate::locals::declare_locals;
use crate::stmt::FunctionEmitter;
use crate::writer::WatWriter;

/// Emits one module.
pub struct ModuleEmitter<'a> {
    module: &'a Module,
    meta: &'a ModuleMetadata,
    config: &'a EmitConfig,
    stack: ContextStack,
}

impl<'a> ModuleEmitter<'a> {
    pub fn new(module: &'a Module, linked: &'a LinkedModule, config: &'a EmitConfig) -> Self {
        ModuleEmitter {
            module,
            meta: linked.metadata(),
            config,
            stack: ContextStack::new(),
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(module = %self.meta.name))]
    pub fn emit(&mut self, labels: &mut LabelGenerator) -> CompileResult<String> {
        for (_, import) in self.meta.imports.iter() {
            import.resolved()?;
        }

        let mut w = WatWriter::new();
        w.line("(module");
        w.indent();
        w.line(&self.config.memory_import());
        for signature in self.signatures() {
            w.line(&type_decl(signature));
        }
        self.emit_imports(&mut w);
        self.emit_globals(&mut w)?;
        for block in self.meta.data.segments() {
            if !block.bytes.is_empty() {
                w.line(&data_segment(block));
            }
        }
        let meta = self.meta;
        for (name, entry) in meta.functions.iter() {
            let text = self.emit_function(name, entry, labels)?;
            w.raw(&text);
        }
        w.dedent();
        w.line(")");
        Ok(w.take_output())
    }

    /// Distinct signatures of imported and defined functions, first
    /// occurrence first.
    fn signatures(&self) -> Vec<&'a FunctionSignature> {
        let meta = self.meta;
        let imported = meta
            .imports
            .iter()
            .filter_map(|(_, import)| import.descriptor().and_then(ExportDescriptor::as_function));
        let defined = meta.functions.iter().map(|(_, function)| &function.signature);
        let mut seen = FxHashSet::default();
        imported
            .chain(defined)
            .filter(|&signature| seen.insert(signature.encoded()))
            .collect()
    }

    fn emit_imports(&self, w: &mut WatWriter) {
        for (name, import) in self.meta.imports.iter() {
            let item = match import.descriptor() {
                Some(ExportDescriptor::Function(signature)) => {
                    format!("(func ${name} (type ${}_type))", signature.encoded())
                }
                Some(ExportDescriptor::Global {
                    memory_backed: true,
                    ..
                }) => format!("(global ${name} i32)"),
                Some(ExportDescriptor::Global { ty, .. }) => {
                    format!("(global ${name} (mut {}))", value_type(ty))
                }
                Some(ExportDescriptor::Struct(_)) | None => continue,
            };
            w.line(&format!(
                "(import \"{}\" \"{}\" {item})",
                import.module, import.name
            ));
        }
    }

    fn emit_globals(&self, w: &mut WatWriter) -> CompileResult<()> {
        for (name, global) in self.meta.globals.iter() {
            if let Some(decl) = self.global_decl(name, global)? {
                w.line(&decl);
            }
        }
        Ok(())
    }

    /// Register globals become mutable target globals. Memory-backed globals
    /// are only materialised when exported, as an immutable address.
    fn global_decl(&self, name: &str, global: &GlobalDecl) -> CompileResult<Option<String>> {
        let export = export_clause(name, global.exported);
        match global.storage {
            StorageScope::Register => {
                let value = Constant::of(global.init, &self.module.arena).ok_or_else(|| {
                    CompileError::not_implemented(format!(
                        "non-constant initializer for global `{name}`"
                    ))
                })?;
                Ok(Some(format!(
                    "(global ${name}{export} (mut {}) ({}))",
                    value_type(&global.ty),
                    constant(value, global.ty.lane())
                )))
            }
            StorageScope::Memory { address } if global.exported => Ok(Some(format!(
                "(global ${name}{export} i32 (i32.const {address}))"
            ))),
            StorageScope::Memory { .. } => Ok(None),
        }
    }

    #[tracing::instrument(level = "debug", skip(self, entry, labels))]
    fn emit_function(
        &mut self,
        name: &str,
        entry: &FunctionEntry,
        labels: &mut LabelGenerator,
    ) -> CompileResult<String> {
        let meta = self.meta;
        let arena = &self.module.arena;
        let StmtKind::Function(decl) = arena.stmt(entry.decl) else {
            return Err(CompileError::not_implemented(format!(
                "function `{name}` without a declaration"
            )));
        };

        let mut frame = FunctionContext::new(name, decl.result.clone());
        for param in &decl.params {
            let var = VarDescriptor::new(param.name.clone(), VarScope::Param, param.ty.clone());
            frame
                .params
                .insert(param.name.clone(), var)
                .map_err(|_| CompileError::duplicate(SymbolKind::Local, &param.name))?;
        }

        let mut guard = self.stack.push(frame);
        declare_locals(decl.body, meta, arena, &mut guard)?;
        FunctionEmitter::new(meta, arena, &mut guard, labels).emit_body(decl.body)?;
        let mut frame = guard.finish();

        let mut w = WatWriter::with_indent(1);
        let mut header = format!(
            "(func ${name}{} (type ${}_type)",
            export_clause(name, entry.exported),
            entry.signature.encoded()
        );
        for (param, var) in frame.params.iter() {
            let _ = write!(header, " (param ${param} {})", value_type(&var.ty));
        }
        if let Some(result) = decl.result.lane().wasm_type() {
            let _ = write!(header, " (result {result})");
        }
        w.line(&header);
        w.indent();
        for (local, var) in frame.locals.iter() {
            w.line(&format!("(local ${local} {})", value_type(&var.ty)));
        }
        w.raw(&frame.writer.take_output());
        w.dedent();
        w.line(")");
        Ok(w.take_output())
    }
}

/// Emit one linked module as WebAssembly text.
pub fn emit_module(
    module: &Module,
    linked: &LinkedModule,
    labels: &mut LabelGenerator,
    config: &EmitConfig,
) -> CompileResult<String> {
    ModuleEmitter::new(module, linked, config).emit(labels)
}

fn export_clause(name: &str, exported: bool) -> String {
    if exported {
        format!(" (export \"{name}\")")
    } else {
        String::new()
    }
}

fn value_type(ty: &TypeRef) -> &'static str {
    ty.lane().wasm_type().unwrap_or("i32")
}

fn type_decl(signature: &FunctionSignature) -> String {
    let mut func = String::from("(func");
    let params: Vec<&str> = signature
        .param_lanes()
        .filter_map(|lane| lane.wasm_type())
        .collect();
    if !params.is_empty() {
        let _ = write!(func, " (param {})", params.join(" "));
    }
    if let Some(result) = signature.result_lane().wasm_type() {
        let _ = write!(func, " (result {result})");
    }
    func.push(')');
    format!("(type ${}_type {func})", signature.encoded())
}

/// `(data (offset (i32.const A)) "\xx\xx...")`
fn data_segment(block: &DataBlock) -> String {
    let mut bytes = String::with_capacity(block.bytes.len() * 3);
    for byte in &block.bytes {
        let _ = write!(bytes, "\\{byte:02x}");
    }
    format!(
        "(data (offset (i32.const {})) \"{bytes}\")",
        block.address
    )
}

#[cfg(test)]
mod tests;
