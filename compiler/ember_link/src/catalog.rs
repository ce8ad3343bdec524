//! Standard-library catalog.
//!
//! Static metadata for the runtime-provided modules. Catalog modules are
//! never emitted; their functions become target imports.
//! Extend the tables below when adding a new built-in module or function.

use ember_diagnostic::{CompileError, CompileResult, SymbolKind};
use ember_ir::{FieldDecl, ScalarType, TypeRef};
use ember_symbols::{ExportDescriptor, FunctionSignature, ModuleMetadata, StructLayout};
use rustc_hash::FxHashMap;

/// Names of the built-in modules.
pub const STDLIB_MODULES: &[&str] = &["memory", "math", "string"];

const MEMORY_FUNCTIONS: &[(&str, &str)] = &[
    ("malloc", "i_i"),
    ("free", "i_v"),
    ("memcpy", "iii_v"),
    ("memset", "iii_v"),
];

const MATH_FUNCTIONS: &[(&str, &str)] = &[
    ("sqrt", "f_f"),
    ("floor", "f_f"),
    ("ceil", "f_f"),
    ("fabs", "f_f"),
    ("pow", "ff_f"),
    ("fmin", "ff_f"),
    ("fmax", "ff_f"),
    ("abs", "i_i"),
];

const STRING_FUNCTIONS: &[(&str, &str)] = &[
    ("strlen", "i_i"),
    ("strcmp", "ii_i"),
    ("concat", "ii_i"),
    ("print", "i_v"),
];

/// Built-in module metadata, looked up by module name.
#[derive(Clone, Debug, Default)]
pub struct StdlibCatalog {
    modules: FxHashMap<String, ModuleMetadata>,
}

impl StdlibCatalog {
    /// A catalog with no modules.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The `memory`, `math` and `string` modules.
    pub fn builtin() -> CompileResult<Self> {
        let mut catalog = StdlibCatalog::empty();

        catalog.insert(functions_module("memory", MEMORY_FUNCTIONS)?);
        catalog.insert(functions_module("math", MATH_FUNCTIONS)?);

        let mut string = functions_module("string", STRING_FUNCTIONS)?;
        let header = StructLayout::from_fields(
            "string",
            &[
                FieldDecl {
                    name: "length".to_string(),
                    ty: TypeRef::I32,
                },
                FieldDecl {
                    name: "data".to_string(),
                    ty: TypeRef::Pointer(Box::new(TypeRef::Scalar(ScalarType::U8))),
                },
            ],
            true,
        )?;
        string
            .exports
            .insert("string", ExportDescriptor::Struct(header))
            .map_err(|_| CompileError::duplicate(SymbolKind::Export, "string"))?;
        catalog.insert(string);

        Ok(catalog)
    }

    /// Add or replace a module.
    pub fn insert(&mut self, module: ModuleMetadata) {
        self.modules.insert(module.name.clone(), module);
    }

    pub fn get(&self, module: &str) -> Option<&ModuleMetadata> {
        self.modules.get(module)
    }

    pub fn contains(&self, module: &str) -> bool {
        self.modules.contains_key(module)
    }

    /// Module names, sorted.
    pub fn module_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn functions_module(name: &str, functions: &[(&str, &str)]) -> CompileResult<ModuleMetadata> {
    let mut module = ModuleMetadata::new(name, 0);
    for &(function, encoded) in functions {
        let signature = FunctionSignature::from_encoded(encoded)?;
        module
            .exports
            .insert(function, ExportDescriptor::Function(signature))
            .map_err(|_| CompileError::duplicate(SymbolKind::Export, function))?;
    }
    Ok(module)
}

#[cfg(test)]
mod tests;
