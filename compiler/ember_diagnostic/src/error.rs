//! The back end's error type.

use std::fmt;

use crate::ErrorCode;

/// What kind of symbol a duplicate-definition error names.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SymbolKind {
    Struct,
    Member,
    Function,
    Export,
    Import,
    Global,
    Local,
    Module,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SymbolKind::Struct => "struct",
            SymbolKind::Member => "member",
            SymbolKind::Function => "function",
            SymbolKind::Export => "export",
            SymbolKind::Import => "import",
            SymbolKind::Global => "global",
            SymbolKind::Local => "local",
            SymbolKind::Module => "module",
        })
    }
}

/// Error categories.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCategory {
    DuplicateDefinition,
    UnresolvedReference,
    UnsupportedConstruct,
    Layout,
}

/// A fatal error raised while extracting, linking or emitting a module.
#[derive(Clone, Eq, PartialEq, Debug, thiserror::Error)]
pub enum CompileError {
    #[error("duplicate {kind} definition `{name}`")]
    DuplicateDefinition { kind: SymbolKind, name: String },

    #[error("unknown variable `{name}`")]
    UnknownVariable { name: String },

    #[error("unknown struct `{name}`")]
    UnknownStruct { name: String },

    #[error("struct `{struct_name}` has no member `{member}`")]
    UnknownMember { struct_name: String, member: String },

    #[error("unknown function `{name}`")]
    UnknownFunction { name: String },

    #[error("module `{module}` is not in the working set")]
    MissingModule { module: String },

    #[error("standard library module `{module}` does not export `{name}`")]
    UnknownStdlibExport { module: String, name: String },

    #[error("module `{module}` does not export `{name}`")]
    UnknownExport { module: String, name: String },

    #[error("import `{name}` has not been resolved")]
    UnresolvedImport { name: String },

    #[error("`{statement}` outside of a loop")]
    NoEnclosingLoop { statement: &'static str },

    #[error("{construct} is not implemented")]
    NotImplemented { construct: String },

    #[error("unsupported literal: {reason}")]
    UnsupportedLiteral { reason: String },

    #[error("`{callee}` expects {expected} argument(s), found {found}")]
    ArityMismatch {
        callee: String,
        expected: usize,
        found: usize,
    },

    #[error("alignment must be positive, got {align}")]
    InvalidAlignment { align: u32 },

    #[error("malformed signature `{signature}`")]
    MalformedSignature { signature: String },

    #[error("constant data of {size} bytes does not fit in the 32-bit address space")]
    AddressOverflow { size: u64 },

    /// A linking failure, tagged with the module and import being resolved.
    #[error("in module `{module}`, import `{import}`: {source}")]
    Link {
        module: String,
        import: String,
        source: Box<CompileError>,
    },
}

impl CompileError {
    pub fn duplicate(kind: SymbolKind, name: impl Into<String>) -> Self {
        CompileError::DuplicateDefinition {
            kind,
            name: name.into(),
        }
    }

    pub fn not_implemented(construct: impl Into<String>) -> Self {
        CompileError::NotImplemented {
            construct: construct.into(),
        }
    }

    pub fn unsupported_literal(reason: impl Into<String>) -> Self {
        CompileError::UnsupportedLiteral {
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CompileError::DuplicateDefinition { .. } => ErrorCode::E1001,
            CompileError::UnknownVariable { .. } => ErrorCode::E2001,
            CompileError::UnknownStruct { .. } => ErrorCode::E2002,
            CompileError::UnknownMember { .. } => ErrorCode::E2003,
            CompileError::UnknownFunction { .. } => ErrorCode::E2004,
            CompileError::MissingModule { .. } => ErrorCode::E2005,
            CompileError::UnknownStdlibExport { .. } => ErrorCode::E2006,
            CompileError::UnknownExport { .. } => ErrorCode::E2007,
            CompileError::UnresolvedImport { .. } => ErrorCode::E2008,
            CompileError::NoEnclosingLoop { .. } => ErrorCode::E2009,
            CompileError::NotImplemented { .. } => ErrorCode::E3001,
            CompileError::UnsupportedLiteral { .. } => ErrorCode::E3002,
            CompileError::ArityMismatch { .. } => ErrorCode::E3003,
            CompileError::InvalidAlignment { .. } => ErrorCode::E4001,
            CompileError::MalformedSignature { .. } => ErrorCode::E4002,
            CompileError::AddressOverflow { .. } => ErrorCode::E4003,
            CompileError::Link { source, .. } => source.code(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.code().category()
    }

    /// Strip linker context and return the underlying error.
    pub fn root(&self) -> &CompileError {
        match self {
            CompileError::Link { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests;
