//! Ember Symbols - per-module symbol and layout extraction
//!
//! Turns one parsed module into a [`ModuleMetadata`]: struct layouts,
//! function signatures, globals, exports, unresolved imports and all
//! literal constant data. Nothing here looks at other modules; that is the
//! linker's job.
//!
//! # Architecture
//!
//! - [`DataAllocator`]: bump allocator for constant data and interned strings
//! - [`FunctionSignature`]: calling-convention signature and its encoding
//! - [`Extractor`]: the fixed-order extraction pass
//! - [`SymbolTable`]: insertion-ordered lookup table used for every symbol kind

mod allocator;
mod extract;
pub mod literals;
mod metadata;
pub mod signature;
mod table;

pub use allocator::{DataAllocator, DataBlock, DEFAULT_DATA_BASE, STRING_HEADER_SIZE};
pub use extract::{extract, Extractor};
pub use metadata::{
    ExportDescriptor, FunctionEntry, GlobalDecl, ImportEntry, MemberLayout, ModuleMetadata,
    StorageScope, StructLayout,
};
pub use signature::FunctionSignature;
pub use table::SymbolTable;
