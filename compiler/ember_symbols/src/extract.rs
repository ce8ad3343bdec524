//! Symbol and layout extraction.
//!
//! One module in, one [`ModuleMetadata`] out. Top-level statements are
//! processed in a fixed order so later passes can rely on earlier ones:
//!
//! 1. structs (layouts; export entries)
//! 2. functions (signatures; export entries)
//! 3. imports (one unresolved entry per imported name)
//! 4. top-level `let`s (globals; export entries)
//! 5. every string, array and struct literal in the module (constant data)
//!
//! The first duplicate or unsupported construct aborts extraction; there is
//! no partial result.

use ember_diagnostic::{CompileError, CompileResult, SymbolKind};
use ember_ir::visitor::Visitor;
use ember_ir::{AstArena, ExprKind, LetDecl, Module, PrefixOp, StmtKind, TypeRef};

use crate::literals::{array_element_type, LiteralCollector};
use crate::{
    ExportDescriptor, FunctionEntry, FunctionSignature, GlobalDecl, ImportEntry, ModuleMetadata,
    StorageScope, StructLayout, DEFAULT_DATA_BASE,
};

/// Extracts module metadata, allocating constant data from `data_base`.
#[derive(Copy, Clone, Debug)]
pub struct Extractor {
    data_base: u32,
}

impl Default for Extractor {
    fn default() -> Self {
        Extractor {
            data_base: DEFAULT_DATA_BASE,
        }
    }
}

impl Extractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data_base(data_base: u32) -> Self {
        Extractor { data_base }
    }

    pub fn data_base(&self) -> u32 {
        self.data_base
    }

    #[tracing::instrument(level = "debug", skip_all, fields(module = %module.name))]
    pub fn extract(&self, module: &Module) -> CompileResult<ModuleMetadata> {
        let mut meta = ModuleMetadata::new(module.name.clone(), self.data_base);

        collect_structs(module, &mut meta)?;
        collect_functions(module, &mut meta)?;
        collect_imports(module, &mut meta)?;
        collect_globals(module, &mut meta)?;

        LiteralCollector::new(&mut meta).visit_module(module)?;
        place_memory_globals(&mut meta);

        tracing::debug!(
            structs = meta.structs.len(),
            functions = meta.functions.len(),
            imports = meta.imports.len(),
            globals = meta.globals.len(),
            data_end = meta.data_end(),
            "extracted module"
        );
        Ok(meta)
    }
}

/// Extract with the default data base.
pub fn extract(module: &Module) -> CompileResult<ModuleMetadata> {
    Extractor::default().extract(module)
}

fn collect_structs(module: &Module, meta: &mut ModuleMetadata) -> CompileResult<()> {
    for (_, stmt) in module.item_stmts() {
        let StmtKind::Struct(decl) = stmt else {
            continue;
        };
        let layout = StructLayout::from_fields(&decl.name, &decl.fields, decl.exported)?;
        if decl.exported {
            meta.add_export(&decl.name, ExportDescriptor::Struct(layout.clone()))?;
        }
        meta.structs
            .insert(decl.name.clone(), layout)
            .map_err(|_| CompileError::duplicate(SymbolKind::Struct, &decl.name))?;
    }
    Ok(())
}

fn collect_functions(module: &Module, meta: &mut ModuleMetadata) -> CompileResult<()> {
    for (id, stmt) in module.item_stmts() {
        let StmtKind::Function(decl) = stmt else {
            continue;
        };
        let signature = FunctionSignature::new(
            decl.params.iter().map(|param| param.ty.clone()).collect(),
            decl.result.clone(),
        );
        tracing::trace!(name = decl.name.as_str(), signature = signature.encoded(), "function");
        if meta.functions.contains(&decl.name) {
            return Err(CompileError::duplicate(SymbolKind::Function, &decl.name));
        }
        if decl.exported {
            meta.add_export(&decl.name, ExportDescriptor::Function(signature.clone()))?;
        }
        let entry = FunctionEntry {
            signature,
            exported: decl.exported,
            decl: id,
        };
        meta.functions
            .insert(decl.name.clone(), entry)
            .map_err(|_| CompileError::duplicate(SymbolKind::Function, &decl.name))?;
    }
    Ok(())
}

fn collect_imports(module: &Module, meta: &mut ModuleMetadata) -> CompileResult<()> {
    for (_, stmt) in module.item_stmts() {
        let StmtKind::Import(decl) = stmt else {
            continue;
        };
        for name in &decl.names {
            if meta.functions.contains(name) {
                return Err(CompileError::duplicate(SymbolKind::Import, name));
            }
            meta.imports
                .insert(name.clone(), ImportEntry::new(decl.module.clone(), name.clone()))
                .map_err(|_| CompileError::duplicate(SymbolKind::Import, name))?;
        }
    }
    Ok(())
}

fn collect_globals(module: &Module, meta: &mut ModuleMetadata) -> CompileResult<()> {
    for (_, stmt) in module.item_stmts() {
        let StmtKind::Let(decl) = stmt else {
            continue;
        };
        if meta.imports.contains(&decl.name) {
            return Err(CompileError::duplicate(SymbolKind::Global, &decl.name));
        }
        let (ty, storage) = global_shape(decl, &module.arena)?;
        if decl.exported {
            let descriptor = ExportDescriptor::Global {
                ty: ty.clone(),
                memory_backed: storage.is_memory(),
            };
            meta.add_export(&decl.name, descriptor)?;
        }
        let global = GlobalDecl {
            ty,
            storage,
            exported: decl.exported,
            init: decl.init,
        };
        meta.globals
            .insert(decl.name.clone(), global)
            .map_err(|_| CompileError::duplicate(SymbolKind::Global, &decl.name))?;
    }
    Ok(())
}

/// Declared (or literal-implied) type and storage of a top-level `let`.
///
/// Memory-backed globals get their address once literals are placed.
fn global_shape(decl: &LetDecl, arena: &AstArena) -> CompileResult<(TypeRef, StorageScope)> {
    let init = arena.expr(decl.init);
    let (implied, storage) = match init {
        ExprKind::Int(_) | ExprKind::Char(_) => (TypeRef::I32, StorageScope::Register),
        ExprKind::Float(_) => (TypeRef::F32, StorageScope::Register),
        ExprKind::Bool(_) => (TypeRef::BOOL, StorageScope::Register),
        ExprKind::Prefix {
            op: PrefixOp::Neg,
            operand,
        } => match arena.expr(*operand) {
            ExprKind::Int(_) => (TypeRef::I32, StorageScope::Register),
            ExprKind::Float(_) => (TypeRef::F32, StorageScope::Register),
            other => return Err(non_constant(&decl.name, other)),
        },
        ExprKind::Str(_) => (TypeRef::named("string"), StorageScope::Memory { address: 0 }),
        ExprKind::Array {
            elements,
            element_type,
        } => {
            let hint = decl.ty.as_ref().and_then(TypeRef::element);
            let element = array_element_type(element_type.as_ref(), hint, elements, arena);
            (
                TypeRef::Array(Box::new(element)),
                StorageScope::Memory { address: 0 },
            )
        }
        ExprKind::Struct { name, .. } => {
            (TypeRef::named(name.clone()), StorageScope::Memory { address: 0 })
        }
        other => return Err(non_constant(&decl.name, other)),
    };
    Ok((decl.ty.clone().unwrap_or(implied), storage))
}

fn non_constant(name: &str, init: &ExprKind) -> CompileError {
    CompileError::not_implemented(format!(
        "non-constant initializer ({}) for global `{name}`",
        init.variant_name()
    ))
}

fn place_memory_globals(meta: &mut ModuleMetadata) {
    let locations = &meta.literal_locations;
    for (_, global) in meta.globals.iter_mut() {
        if let StorageScope::Memory { address } = &mut global.storage {
            if let Some(&location) = locations.get(&global.init) {
                *address = location;
            }
        }
    }
}
