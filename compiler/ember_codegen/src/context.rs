//! Emission contexts.
//!
//! Each function is generated inside its own [`FunctionContext`]: its
//! parameters, locals, active loop labels and output buffer. Contexts live on
//! a [`ContextStack`]; pushing returns a [`FrameGuard`] that pops the frame
//! when dropped, so a failure halfway through a function cannot leave its
//! frame behind for the next one.

use std::ops::{Deref, DerefMut};

use ember_diagnostic::{CompileError, CompileResult};
use ember_ir::{AstArena, TypeRef};
use ember_symbols::{ExportDescriptor, ModuleMetadata, StorageScope, SymbolTable};
use rustc_hash::FxHashSet;

use crate::labels::LoopLabels;
use crate::writer::WatWriter;

/// How a variable is reached.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum VarScope {
    /// A target global (`global.get`/`global.set`).
    Global,
    /// A function local (`local.get`/`local.set`).
    Local,
    /// A function parameter, accessed like a local.
    Param,
    /// Constant data; the variable's value is its address.
    Memory { address: u32 },
    /// Another module's constant data, reached through an immutable target
    /// global holding its address.
    ImportedMemory,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct VarDescriptor {
    pub name: String,
    pub scope: VarScope,
    pub ty: TypeRef,
}

impl VarDescriptor {
    pub fn new(name: impl Into<String>, scope: VarScope, ty: TypeRef) -> Self {
        VarDescriptor {
            name: name.into(),
            scope,
            ty,
        }
    }

    /// Whether `local.*` instructions reach this variable.
    pub fn is_local(&self) -> bool {
        matches!(self.scope, VarScope::Local | VarScope::Param)
    }
}

/// State of the function being generated.
#[derive(Debug)]
pub struct FunctionContext {
    pub name: String,
    pub params: SymbolTable<VarDescriptor>,
    pub locals: SymbolTable<VarDescriptor>,
    pub result: TypeRef,
    loops: Vec<LoopLabels>,
    /// Locals whose `let` has not been lowered yet; lookups skip them.
    pending: FxHashSet<String>,
    pub writer: WatWriter,
}

impl FunctionContext {
    pub fn new(name: impl Into<String>, result: TypeRef) -> Self {
        FunctionContext {
            name: name.into(),
            params: SymbolTable::new(),
            locals: SymbolTable::new(),
            result,
            loops: Vec::new(),
            pending: FxHashSet::default(),
            writer: WatWriter::with_indent(2),
        }
    }

    /// Hide every declared local until its `let` is lowered.
    pub fn hide_locals(&mut self) {
        self.pending = self.locals.names().map(str::to_string).collect();
    }

    /// Make `name` visible from here on.
    pub fn reveal(&mut self, name: &str) {
        self.pending.remove(name);
    }

    /// A local that is in scope at this point of the body.
    pub fn visible_local(&self, name: &str) -> Option<&VarDescriptor> {
        if self.pending.contains(name) {
            return None;
        }
        self.locals.get(name)
    }

    pub fn enter_loop(&mut self, labels: LoopLabels) {
        self.loops.push(labels);
    }

    pub fn exit_loop(&mut self) {
        self.loops.pop();
    }

    /// Labels of the innermost enclosing loop.
    pub fn innermost_loop(&self) -> Option<&LoopLabels> {
        self.loops.last()
    }

    pub fn loop_depth(&self) -> usize {
        self.loops.len()
    }
}

/// Stack of function contexts; the top is the function being generated.
#[derive(Debug, Default)]
pub struct ContextStack {
    frames: Vec<FunctionContext>,
}

impl ContextStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `frame` current until the returned guard is dropped or finished.
    pub fn push(&mut self, frame: FunctionContext) -> FrameGuard<'_> {
        let depth = self.frames.len();
        self.frames.push(frame);
        FrameGuard { stack: self, depth }
    }

    /// The function currently being generated, if any.
    pub fn current(&self) -> Option<&FunctionContext> {
        self.frames.last()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

/// Scoped ownership of the top frame of a [`ContextStack`].
///
/// Dropping the guard restores the stack to its depth before the push.
#[derive(Debug)]
pub struct FrameGuard<'s> {
    stack: &'s mut ContextStack,
    depth: usize,
}

impl FrameGuard<'_> {
    /// Pop the frame and hand it back.
    pub fn finish(self) -> FunctionContext {
        let frame = self.stack.frames.remove(self.depth);
        self.stack.frames.truncate(self.depth);
        frame
    }
}

impl Deref for FrameGuard<'_> {
    type Target = FunctionContext;

    fn deref(&self) -> &FunctionContext {
        &self.stack.frames[self.depth]
    }
}

impl DerefMut for FrameGuard<'_> {
    fn deref_mut(&mut self) -> &mut FunctionContext {
        &mut self.stack.frames[self.depth]
    }
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        self.stack.frames.truncate(self.depth);
    }
}

/// Read-only view of everything a name can resolve to.
#[derive(Copy, Clone)]
pub struct Scope<'a> {
    pub meta: &'a ModuleMetadata,
    pub arena: &'a AstArena,
    /// `None` while generating module-level code.
    pub frame: Option<&'a FunctionContext>,
}

impl<'a> Scope<'a> {
    pub fn new(
        meta: &'a ModuleMetadata,
        arena: &'a AstArena,
        frame: Option<&'a FunctionContext>,
    ) -> Self {
        Scope { meta, arena, frame }
    }

    /// Resolve a variable: locals, then parameters, then globals, then
    /// imported globals.
    pub fn lookup(&self, name: &str) -> CompileResult<VarDescriptor> {
        if let Some(frame) = self.frame {
            if let Some(local) = frame.visible_local(name) {
                return Ok(local.clone());
            }
            if let Some(param) = frame.params.get(name) {
                return Ok(param.clone());
            }
        }
        if let Some(global) = self.meta.globals.get(name) {
            let scope = match global.storage {
                StorageScope::Register => VarScope::Global,
                StorageScope::Memory { address } => VarScope::Memory { address },
            };
            return Ok(VarDescriptor::new(name, scope, global.ty.clone()));
        }
        if let Some(import) = self.meta.imports.get(name) {
            if let ExportDescriptor::Global { ty, memory_backed } = import.resolved()? {
                let scope = if *memory_backed {
                    VarScope::ImportedMemory
                } else {
                    VarScope::Global
                };
                return Ok(VarDescriptor::new(name, scope, ty.clone()));
            }
        }
        Err(CompileError::UnknownVariable {
            name: name.to_string(),
        })
    }

    /// A flattened struct member local (`{base}_{member}`), if one exists.
    pub fn flattened(&self, base: &str, member: &str) -> Option<&'a VarDescriptor> {
        self.frame?.visible_local(&format!("{base}_{member}"))
    }
}

#[cfg(test)]
mod tests;
