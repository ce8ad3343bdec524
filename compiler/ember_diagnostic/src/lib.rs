//! Error reporting for the Ember back end.
//!
//! Every failure in extraction, linking and emission is a [`CompileError`].
//! Errors are fatal to the module being compiled; there is no recovery mode.
//! Each error belongs to one [`ErrorCategory`] and carries a stable
//! [`ErrorCode`] for documentation and test matching.

mod error;
mod error_code;

pub use error::{CompileError, ErrorCategory, SymbolKind};
pub use error_code::ErrorCode;

/// Result alias used throughout the back end.
pub type CompileResult<T> = Result<T, CompileError>;
