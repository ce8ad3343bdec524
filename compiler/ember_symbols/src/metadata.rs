//! Module metadata: the symbol and layout table of one translation unit.

use ember_diagnostic::{CompileError, CompileResult, SymbolKind};
use ember_ir::{ExprId, FieldDecl, StmtId, TypeRef};
use rustc_hash::FxHashMap;

use crate::{DataAllocator, FunctionSignature, SymbolTable};

/// Placement of one struct member.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct MemberLayout {
    pub offset: u32,
    pub size: u32,
    pub ty: TypeRef,
}

/// Flat struct layout: members in declaration order, no padding.
#[derive(Clone, PartialEq, Debug)]
pub struct StructLayout {
    pub name: String,
    pub size: u32,
    pub exported: bool,
    pub members: SymbolTable<MemberLayout>,
}

impl StructLayout {
    /// Lay out `fields` back to back starting at offset 0.
    pub fn from_fields(name: &str, fields: &[FieldDecl], exported: bool) -> CompileResult<Self> {
        let mut members = SymbolTable::new();
        let mut offset: u32 = 0;
        for field in fields {
            let size = field.ty.size();
            let member = MemberLayout {
                offset,
                size,
                ty: field.ty.clone(),
            };
            if members.insert(field.name.clone(), member).is_err() {
                return Err(CompileError::duplicate(
                    SymbolKind::Member,
                    format!("{name}.{}", field.name),
                ));
            }
            offset = offset
                .checked_add(size)
                .ok_or(CompileError::AddressOverflow {
                    size: u64::from(offset) + u64::from(size),
                })?;
        }
        Ok(StructLayout {
            name: name.to_string(),
            size: offset,
            exported,
            members,
        })
    }

    pub fn member(&self, member: &str) -> CompileResult<&MemberLayout> {
        self.members
            .get(member)
            .ok_or_else(|| CompileError::UnknownMember {
                struct_name: self.name.clone(),
                member: member.to_string(),
            })
    }
}

/// A function defined in this module.
#[derive(Clone, PartialEq, Debug)]
pub struct FunctionEntry {
    pub signature: FunctionSignature,
    pub exported: bool,
    /// The declaring `function` statement.
    pub decl: StmtId,
}

/// Where a global's value lives.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum StorageScope {
    /// A mutable target global holding the value.
    Register,
    /// The value is constant data at `address`; the variable evaluates to
    /// that address.
    Memory { address: u32 },
}

impl StorageScope {
    pub fn is_memory(self) -> bool {
        matches!(self, StorageScope::Memory { .. })
    }
}

/// A top-level `let`.
#[derive(Clone, PartialEq, Debug)]
pub struct GlobalDecl {
    pub ty: TypeRef,
    pub storage: StorageScope,
    pub exported: bool,
    pub init: ExprId,
}

/// Something a module publishes for other modules to import.
#[derive(Clone, PartialEq, Debug)]
pub enum ExportDescriptor {
    Function(FunctionSignature),
    Global { ty: TypeRef, memory_backed: bool },
    Struct(StructLayout),
}

impl ExportDescriptor {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ExportDescriptor::Function(_) => "function",
            ExportDescriptor::Global { .. } => "global",
            ExportDescriptor::Struct(_) => "struct",
        }
    }

    pub fn as_function(&self) -> Option<&FunctionSignature> {
        match self {
            ExportDescriptor::Function(signature) => Some(signature),
            _ => None,
        }
    }
}

/// One imported name.
#[derive(Clone, PartialEq, Debug)]
pub struct ImportEntry {
    /// Source module name.
    pub module: String,
    /// Exported name in the source module.
    pub name: String,
    descriptor: Option<ExportDescriptor>,
}

impl ImportEntry {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        ImportEntry {
            module: module.into(),
            name: name.into(),
            descriptor: None,
        }
    }

    /// Record the export this import refers to.
    ///
    /// Returns `false` and leaves the entry untouched if it was already
    /// resolved.
    pub fn resolve(&mut self, descriptor: ExportDescriptor) -> bool {
        if self.descriptor.is_some() {
            return false;
        }
        self.descriptor = Some(descriptor);
        true
    }

    pub fn is_resolved(&self) -> bool {
        self.descriptor.is_some()
    }

    pub fn descriptor(&self) -> Option<&ExportDescriptor> {
        self.descriptor.as_ref()
    }

    /// The resolved descriptor, or an unresolved-import error.
    pub fn resolved(&self) -> CompileResult<&ExportDescriptor> {
        self.descriptor
            .as_ref()
            .ok_or_else(|| CompileError::UnresolvedImport {
                name: self.name.clone(),
            })
    }
}

/// Everything extraction learns about one module.
#[derive(Clone, PartialEq, Debug)]
pub struct ModuleMetadata {
    pub name: String,
    pub structs: SymbolTable<StructLayout>,
    pub functions: SymbolTable<FunctionEntry>,
    /// Keyed by the imported name.
    pub imports: SymbolTable<ImportEntry>,
    pub exports: SymbolTable<ExportDescriptor>,
    pub globals: SymbolTable<GlobalDecl>,
    pub data: DataAllocator,
    /// Address of every string, array and struct literal.
    pub literal_locations: FxHashMap<ExprId, u32>,
}

impl ModuleMetadata {
    pub fn new(name: impl Into<String>, data_base: u32) -> Self {
        ModuleMetadata {
            name: name.into(),
            structs: SymbolTable::new(),
            functions: SymbolTable::new(),
            imports: SymbolTable::new(),
            exports: SymbolTable::new(),
            globals: SymbolTable::new(),
            data: DataAllocator::new(data_base),
            literal_locations: FxHashMap::default(),
        }
    }

    pub fn literal_location(&self, expr: ExprId) -> Option<u32> {
        self.literal_locations.get(&expr).copied()
    }

    /// Layout of a struct defined here or imported from another module.
    pub fn struct_layout(&self, name: &str) -> CompileResult<&StructLayout> {
        if let Some(layout) = self.structs.get(name) {
            return Ok(layout);
        }
        match self.imports.get(name).and_then(ImportEntry::descriptor) {
            Some(ExportDescriptor::Struct(layout)) => Ok(layout),
            _ => Err(CompileError::UnknownStruct {
                name: name.to_string(),
            }),
        }
    }

    /// Imports still waiting for the linker.
    pub fn unresolved_imports(&self) -> impl Iterator<Item = (&str, &ImportEntry)> + '_ {
        self.imports.iter().filter(|(_, entry)| !entry.is_resolved())
    }

    /// One past the last constant-data byte this module uses.
    pub fn data_end(&self) -> u32 {
        self.data.cursor()
    }

    pub(crate) fn add_export(&mut self, name: &str, descriptor: ExportDescriptor) -> CompileResult<()> {
        self.exports
            .insert(name, descriptor)
            .map_err(|_| CompileError::duplicate(SymbolKind::Export, name))
    }
}
