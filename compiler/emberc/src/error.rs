//! Driver errors.
//!
//! Core failures arrive as [`CompileError`]; everything the driver adds on
//! top (loading, configuration, external tools, output files) has its own
//! type, and [`DriverError`] wraps them all.

use std::path::PathBuf;

use ember_diagnostic::CompileError;

/// Failure to obtain a module's AST.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("module `{module}` not found at '{}'", path.display())]
    NotFound { module: String, path: PathBuf },

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse the AST in '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("'{}' holds module `{found}`, expected `{expected}`", path.display())]
    NameMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    #[error("malformed AST in '{}': {source}", path.display())]
    Malformed {
        path: PathBuf,
        source: ember_ir::DanglingNode,
    },

    #[error("module `{module}` is not available")]
    Unknown { module: String },
}

/// Invalid command line or environment.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing entry module path")]
    MissingEntry,

    #[error("`{flag}` expects a value")]
    MissingValue { flag: String },

    #[error("unknown option `{flag}`")]
    UnknownFlag { flag: String },

    #[error("unknown emit kind `{value}`, expected one of: wat, wasm, linked")]
    InvalidEmit { value: String },

    #[error("`{flag}` expects a number, got `{value}`")]
    InvalidNumber { flag: String, value: String },

    #[error("entry path '{}' has no module name", path.display())]
    InvalidEntry { path: PathBuf },
}

/// Failure in the external assembler or linker.
#[derive(Debug, thiserror::Error)]
pub enum ToolchainError {
    #[error("`{}` not found; install it or set {env_var}", tool.display())]
    NotFound { tool: PathBuf, env_var: &'static str },

    #[error("`{}` failed with exit code {code}: {stderr}", tool.display())]
    Failed {
        tool: PathBuf,
        code: i32,
        stderr: String,
    },

    #[error("failed to run `{}`: {source}", tool.display())]
    Spawn {
        tool: PathBuf,
        source: std::io::Error,
    },
}

/// Any failure of a driver run.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Toolchain(#[from] ToolchainError),

    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
