//! External assembler and linker handoff.
//!
//! Module text is assembled one module at a time, in module-name order, and
//! the resulting binaries are merged by a single linker invocation.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::{ToolPaths, WASM_MERGE_ENV, WAT2WASM_ENV};
use crate::error::ToolchainError;

/// Runs the configured external tools.
#[derive(Clone, Debug, Default)]
pub struct Toolchain {
    tools: ToolPaths,
}

impl Toolchain {
    pub fn new(tools: ToolPaths) -> Self {
        Toolchain { tools }
    }

    /// `wat2wasm <input> -o <output>`
    #[must_use]
    pub fn assemble_command(&self, input: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.tools.wat2wasm);
        cmd.arg(input).arg("-o").arg(output);
        cmd
    }

    /// `wasm-merge <a.wasm> <a> <b.wasm> <b> ... -o <output>`
    ///
    /// Each binary is registered under its module name so cross-module
    /// imports resolve against it.
    #[must_use]
    pub fn merge_command(&self, inputs: &[(String, PathBuf)], output: &Path) -> Command {
        let mut cmd = Command::new(&self.tools.wasm_merge);
        for (name, path) in inputs {
            cmd.arg(path).arg(name);
        }
        cmd.arg("-o").arg(output);
        cmd
    }

    pub fn assemble(&self, input: &Path, output: &Path) -> Result<(), ToolchainError> {
        tracing::debug!(input = %input.display(), output = %output.display(), "assembling");
        run(
            self.assemble_command(input, output),
            &self.tools.wat2wasm,
            WAT2WASM_ENV,
        )
    }

    pub fn merge(&self, inputs: &[(String, PathBuf)], output: &Path) -> Result<(), ToolchainError> {
        tracing::debug!(modules = inputs.len(), output = %output.display(), "merging");
        run(
            self.merge_command(inputs, output),
            &self.tools.wasm_merge,
            WASM_MERGE_ENV,
        )
    }
}

fn run(mut cmd: Command, tool: &Path, env_var: &'static str) -> Result<(), ToolchainError> {
    let output = cmd.output().map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ToolchainError::NotFound {
                tool: tool.to_path_buf(),
                env_var,
            }
        } else {
            ToolchainError::Spawn {
                tool: tool.to_path_buf(),
                source,
            }
        }
    })?;
    if !output.status.success() {
        return Err(ToolchainError::Failed {
            tool: tool.to_path_buf(),
            code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}
