//! Local declarations.
//!
//! Target functions declare every local up front, so the function body is
//! scanned for `let`s before any code is generated. A `let` initialised with
//! a struct literal declares one local per member, named `{name}_{member}`,
//! next to the local holding the literal's address.

use ember_diagnostic::{CompileError, CompileResult, SymbolKind};
use ember_ir::{AstArena, ExprKind, LetDecl, StmtId, StmtKind, TypeRef, ValueLane};
use ember_stack::ensure_sufficient_stack;
use ember_symbols::literals::array_element_type;
use ember_symbols::ModuleMetadata;

use crate::context::{FunctionContext, Scope, VarDescriptor, VarScope};
use crate::infer::lane_of;

/// Declare the locals of every `let` reachable from `body`.
pub fn declare_locals(
    body: StmtId,
    meta: &ModuleMetadata,
    arena: &AstArena,
    frame: &mut FunctionContext,
) -> CompileResult<()> {
    ensure_sufficient_stack(|| match arena.stmt(body) {
        StmtKind::Block(stmts) => {
            for &stmt in stmts {
                declare_locals(stmt, meta, arena, frame)?;
            }
            Ok(())
        }
        StmtKind::Let(decl) => declare_let(decl, meta, arena, frame),
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        } => {
            declare_locals(*then_branch, meta, arena, frame)?;
            if let Some(else_branch) = else_branch {
                declare_locals(*else_branch, meta, arena, frame)?;
            }
            Ok(())
        }
        StmtKind::While { body, .. } => declare_locals(*body, meta, arena, frame),
        StmtKind::For { init, body, .. } => {
            if let Some(init) = init {
                declare_locals(*init, meta, arena, frame)?;
            }
            declare_locals(*body, meta, arena, frame)
        }
        StmtKind::Function(_)
        | StmtKind::Struct(_)
        | StmtKind::Import(_)
        | StmtKind::Return(_)
        | StmtKind::Break
        | StmtKind::Continue
        | StmtKind::Expr(_) => Ok(()),
    })
}

fn declare_let(
    decl: &LetDecl,
    meta: &ModuleMetadata,
    arena: &AstArena,
    frame: &mut FunctionContext,
) -> CompileResult<()> {
    if let ExprKind::Struct { name, .. } = arena.expr(decl.init) {
        let layout = meta.struct_layout(name)?;
        for (member, field) in layout.members.iter() {
            declare(frame, format!("{}_{member}", decl.name), field.ty.clone())?;
        }
        let ty = decl.ty.clone().unwrap_or_else(|| TypeRef::named(name.clone()));
        return declare(frame, decl.name.clone(), ty);
    }
    let ty = match &decl.ty {
        Some(ty) => ty.clone(),
        None => implied_type(decl, meta, arena, frame)?,
    };
    declare(frame, decl.name.clone(), ty)
}

/// Type of an unannotated `let`, from its initializer.
fn implied_type(
    decl: &LetDecl,
    meta: &ModuleMetadata,
    arena: &AstArena,
    frame: &FunctionContext,
) -> CompileResult<TypeRef> {
    Ok(match arena.expr(decl.init) {
        ExprKind::Str(_) => TypeRef::named("string"),
        ExprKind::Array {
            elements,
            element_type,
        } => TypeRef::Array(Box::new(array_element_type(
            element_type.as_ref(),
            None,
            elements,
            arena,
        ))),
        _ => match lane_of(decl.init, &Scope::new(meta, arena, Some(frame)))? {
            ValueLane::Float => TypeRef::F32,
            ValueLane::Bool => TypeRef::BOOL,
            ValueLane::Int => TypeRef::I32,
            ValueLane::Void => {
                return Err(CompileError::not_implemented(format!(
                    "`let {}` initialised with a void value",
                    decl.name
                )))
            }
        },
    })
}

/// Declare a local; re-declaring with the same type reuses it.
fn declare(frame: &mut FunctionContext, name: String, ty: TypeRef) -> CompileResult<()> {
    if frame.params.contains(&name) {
        return Err(CompileError::duplicate(SymbolKind::Local, name));
    }
    if let Some(existing) = frame.locals.get(&name) {
        if existing.ty == ty {
            return Ok(());
        }
        return Err(CompileError::duplicate(SymbolKind::Local, name));
    }
    let local = VarDescriptor::new(name.clone(), VarScope::Local, ty);
    frame
        .locals
        .insert(name, local)
        .map_err(|local| CompileError::duplicate(SymbolKind::Local, local.name))
}
