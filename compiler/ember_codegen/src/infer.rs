//! Expression type inference.
//!
//! The AST carries declared types only on declarations, so the emitter
//! re-derives the lane of every expression it needs to coerce or compare.

use ember_diagnostic::{CompileError, CompileResult};
use ember_ir::{ExprId, ExprKind, PrefixOp, ScalarType, TypeRef, ValueLane};
use ember_stack::ensure_sufficient_stack;
use ember_symbols::{signature, ExportDescriptor};

use crate::context::Scope;

/// Infer the lane `id` evaluates to.
///
/// Arithmetic promotes: if either operand is a float the result is a float.
/// Prefix, postfix and member expressions are not inferred.
pub fn infer(id: ExprId, scope: &Scope<'_>) -> CompileResult<ValueLane> {
    ensure_sufficient_stack(|| match scope.arena.expr(id) {
        ExprKind::Int(_) | ExprKind::Char(_) => Ok(ValueLane::Int),
        ExprKind::Float(_) => Ok(ValueLane::Float),
        ExprKind::Bool(_) => Ok(ValueLane::Bool),
        // data literals evaluate to their address
        ExprKind::Str(_) | ExprKind::Array { .. } | ExprKind::Struct { .. } => Ok(ValueLane::Int),
        ExprKind::Ident(name) => Ok(scope.lookup(name)?.ty.lane()),
        ExprKind::Index { base, .. } => infer_index(*base, scope),
        ExprKind::Infix { op, left, right } => {
            if op.is_comparison() || op.is_logical() {
                return Ok(ValueLane::Bool);
            }
            Ok(promote(infer(*left, scope)?, infer(*right, scope)?))
        }
        ExprKind::Call { callee, .. } => call_result(callee, scope),
        ExprKind::Assign { value, .. } => infer(*value, scope),
        kind @ (ExprKind::Prefix { .. }
        | ExprKind::Postfix { .. }
        | ExprKind::Member { .. }
        | ExprKind::PointerMember { .. }) => Err(CompileError::not_implemented(format!(
            "type inference for {}",
            kind.variant_name()
        ))),
    })
}

/// Like [`infer`], but `None` where inference is not implemented.
///
/// Resolution failures still propagate.
pub fn try_infer(id: ExprId, scope: &Scope<'_>) -> CompileResult<Option<ValueLane>> {
    match infer(id, scope) {
        Ok(lane) => Ok(Some(lane)),
        Err(CompileError::NotImplemented { .. }) => Ok(None),
        Err(err) => Err(err),
    }
}

/// The lane `id` evaluates to when lowered.
///
/// Extends [`infer`] to prefix, postfix and member expressions through the
/// declared types of the variables and struct members they reach. Fails
/// where no declared type is reachable.
pub fn lane_of(id: ExprId, scope: &Scope<'_>) -> CompileResult<ValueLane> {
    ensure_sufficient_stack(|| match scope.arena.expr(id) {
        ExprKind::Infix { op, left, right } => {
            if op.is_comparison() || op.is_logical() {
                return Ok(ValueLane::Bool);
            }
            Ok(promote(lane_of(*left, scope)?, lane_of(*right, scope)?))
        }
        ExprKind::Assign { value, .. } => lane_of(*value, scope),
        ExprKind::Prefix { op, operand } => match op {
            PrefixOp::Neg => {
                if lane_of(*operand, scope)?.is_float() {
                    Ok(ValueLane::Float)
                } else {
                    Ok(ValueLane::Int)
                }
            }
            PrefixOp::Not => Ok(ValueLane::Bool),
            PrefixOp::BitNot => Ok(ValueLane::Int),
            PrefixOp::Deref => Ok(pointee(*operand, scope)?.lane()),
        },
        ExprKind::Postfix { operand, .. } => match scope.arena.expr(*operand) {
            ExprKind::Ident(name) => Ok(scope.lookup(name)?.ty.lane()),
            kind => Err(CompileError::not_implemented(format!(
                "postfix update of {}",
                kind.variant_name()
            ))),
        },
        ExprKind::Member { base, member } => {
            if let ExprKind::Ident(name) = scope.arena.expr(*base) {
                if let Some(local) = scope.flattened(name, member) {
                    return Ok(local.ty.lane());
                }
            }
            Ok(member_type(*base, member, scope)?.lane())
        }
        ExprKind::PointerMember { base, member } => Ok(member_type(*base, member, scope)?.lane()),
        _ => infer(id, scope),
    })
}

/// Declared type of `base.member` where `base` names a struct or a pointer
/// to one.
pub(crate) fn member_type(base: ExprId, member: &str, scope: &Scope<'_>) -> CompileResult<TypeRef> {
    let kind = scope.arena.expr(base);
    let ExprKind::Ident(name) = kind else {
        return Err(CompileError::not_implemented(format!(
            "member access on {}",
            kind.variant_name()
        )));
    };
    let var = scope.lookup(name)?;
    let Some(struct_name) = var.ty.struct_name() else {
        return Err(CompileError::not_implemented(format!(
            "member access on `{name}` of type `{}`",
            var.ty
        )));
    };
    let layout = scope.meta.struct_layout(struct_name)?;
    Ok(layout.member(member)?.ty.clone())
}

/// Scalar a dereference of `operand` loads: the pointee of a variable
/// declared as a pointer, `i32` otherwise.
pub(crate) fn pointee(operand: ExprId, scope: &Scope<'_>) -> CompileResult<ScalarType> {
    let pointee = match scope.arena.expr(operand) {
        ExprKind::Ident(name) => scope.lookup(name)?.ty.element().cloned(),
        _ => None,
    };
    Ok(pointee
        .as_ref()
        .and_then(TypeRef::storage_scalar)
        .unwrap_or(ScalarType::I32))
}

fn promote(left: ValueLane, right: ValueLane) -> ValueLane {
    if left.is_float() || right.is_float() {
        ValueLane::Float
    } else {
        ValueLane::Int
    }
}

/// Element lane of an indexed variable's declared array or pointer type.
fn infer_index(base: ExprId, scope: &Scope<'_>) -> CompileResult<ValueLane> {
    match scope.arena.expr(base) {
        ExprKind::Ident(name) => {
            let var = scope.lookup(name)?;
            Ok(var.ty.element().map_or(ValueLane::Int, |element| element.lane()))
        }
        _ => Ok(ValueLane::Int),
    }
}

/// Result lane of a call to `callee`.
pub(crate) fn call_result(callee: &str, scope: &Scope<'_>) -> CompileResult<ValueLane> {
    if let Some(function) = scope.meta.functions.get(callee) {
        return Ok(function.signature.result_lane());
    }
    if let Some(import) = scope.meta.imports.get(callee) {
        if let ExportDescriptor::Function(sig) = import.resolved()? {
            return signature::decode_result(sig.encoded());
        }
    }
    Err(CompileError::UnknownFunction {
        name: callee.to_string(),
    })
}

#[cfg(test)]
mod tests;
