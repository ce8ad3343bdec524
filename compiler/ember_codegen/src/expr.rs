//! Expression lowering.
//!
//! Every expression becomes a flat list of stack-machine instructions.
//! Lowering reads the module metadata and the current function context but
//! never changes them; the statement emitter decides where the text goes.

use ember_diagnostic::{CompileError, CompileResult};
use ember_ir::{
    BinaryOp, ExprId, ExprKind, PostfixOp, PrefixOp, ScalarType, TypeRef, ValueLane,
};
use ember_stack::ensure_sufficient_stack;
use ember_symbols::literals::Constant;
use ember_symbols::{ExportDescriptor, FunctionSignature};

use crate::context::{Scope, VarDescriptor, VarScope};
use crate::infer::{lane_of, pointee};

/// Lowered instructions, one per entry.
pub type Code = Vec<String>;

/// Lowers expressions within one [`Scope`].
#[derive(Copy, Clone)]
pub struct ExprEmitter<'a> {
    scope: Scope<'a>,
}

impl<'a> ExprEmitter<'a> {
    pub fn new(scope: Scope<'a>) -> Self {
        ExprEmitter { scope }
    }

    pub fn scope(&self) -> &Scope<'a> {
        &self.scope
    }

    /// Lower `id`, leaving its value in its natural lane.
    pub fn emit(&self, id: ExprId, out: &mut Code) -> CompileResult<()> {
        ensure_sufficient_stack(|| {
            let kind = self.scope.arena.expr(id);
            match kind {
                ExprKind::Int(value) => {
                    out.push(format!("i32.const {}", wrap_i32(*value)));
                    Ok(())
                }
                ExprKind::Float(value) => {
                    out.push(format!("f32.const {}", format_f32(*value)));
                    Ok(())
                }
                ExprKind::Bool(value) => {
                    out.push(format!("i32.const {}", i32::from(*value)));
                    Ok(())
                }
                ExprKind::Char(value) => {
                    out.push(format!("i32.const {}", u32::from(*value)));
                    Ok(())
                }
                ExprKind::Str(_) | ExprKind::Array { .. } | ExprKind::Struct { .. } => {
                    let address = self.scope.meta.literal_location(id).ok_or_else(|| {
                        CompileError::unsupported_literal(format!(
                            "{} has no constant data",
                            kind.variant_name()
                        ))
                    })?;
                    out.push(format!("i32.const {address}"));
                    Ok(())
                }
                ExprKind::Ident(name) => {
                    let var = self.scope.lookup(name)?;
                    out.push(get_var(&var));
                    Ok(())
                }
                ExprKind::Infix { op, left, right } => self.emit_infix(*op, *left, *right, out),
                ExprKind::Prefix { op, operand } => self.emit_prefix(id, *op, *operand, out),
                ExprKind::Postfix { op, operand } => self.emit_postfix(*op, *operand, true, out),
                ExprKind::Call { callee, args } => self.emit_call(callee, args, out).map(|_| ()),
                ExprKind::Index { base, index } => {
                    let scalar = self.emit_element_address(*base, *index, out)?;
                    out.push(load(scalar, 0));
                    Ok(())
                }
                ExprKind::Member { base, member } => self.emit_member(*base, member, true, out),
                ExprKind::PointerMember { base, member } => {
                    self.emit_member(*base, member, false, out)
                }
                ExprKind::Assign { target, value } => self.emit_assign(*target, *value, true, out),
            }
        })
    }

    /// Lower `id` and convert it to `lane`.
    ///
    /// Numeric literals are written directly in the target lane.
    pub fn emit_as(&self, id: ExprId, lane: ValueLane, out: &mut Code) -> CompileResult<()> {
        if lane == ValueLane::Void {
            return self.emit(id, out);
        }
        if let Some(value) = Constant::of(id, self.scope.arena) {
            out.push(constant(value, lane));
            return Ok(());
        }
        let from = lane_of(id, &self.scope)?;
        self.emit(id, out)?;
        convert(from, lane, out);
        Ok(())
    }

    /// Lower `id` as a branch condition: an `i32`, non-zero for true.
    pub fn emit_condition(&self, id: ExprId, out: &mut Code) -> CompileResult<()> {
        let lane = lane_of(id, &self.scope)?;
        self.emit(id, out)?;
        if lane.is_float() {
            out.push("f32.const 0".to_string());
            out.push("f32.ne".to_string());
        }
        Ok(())
    }

    /// Lower `id` as a boolean: exactly 0 or 1.
    fn emit_bool(&self, id: ExprId, out: &mut Code) -> CompileResult<()> {
        let lane = lane_of(id, &self.scope)?;
        self.emit_condition(id, out)?;
        if lane == ValueLane::Int {
            out.push("i32.const 0".to_string());
            out.push("i32.ne".to_string());
        }
        Ok(())
    }

    /// Lower `id` as an expression statement; no value is left behind.
    pub fn emit_discarded(&self, id: ExprId, out: &mut Code) -> CompileResult<()> {
        match self.scope.arena.expr(id) {
            ExprKind::Assign { target, value } => self.emit_assign(*target, *value, false, out),
            ExprKind::Postfix { op, operand } => self.emit_postfix(*op, *operand, false, out),
            ExprKind::Call { callee, args } => {
                let result = self.emit_call(callee, args, out)?;
                if result != ValueLane::Void {
                    out.push("drop".to_string());
                }
                Ok(())
            }
            _ => {
                let lane = lane_of(id, &self.scope)?;
                self.emit(id, out)?;
                if lane != ValueLane::Void {
                    out.push("drop".to_string());
                }
                Ok(())
            }
        }
    }

    fn emit_infix(
        &self,
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
        out: &mut Code,
    ) -> CompileResult<()> {
        if op.is_logical() {
            self.emit_bool(left, out)?;
            out.push("if (result i32)".to_string());
            if op == BinaryOp::And {
                self.emit_bool(right, out)?;
                out.push("else".to_string());
                out.push("i32.const 0".to_string());
            } else {
                out.push("i32.const 1".to_string());
                out.push("else".to_string());
                self.emit_bool(right, out)?;
            }
            out.push("end".to_string());
            return Ok(());
        }

        let left_lane = lane_of(left, &self.scope)?;
        let right_lane = lane_of(right, &self.scope)?;
        let float = left_lane.is_float() || right_lane.is_float();
        if float && op.is_integer_only() {
            return Err(CompileError::not_implemented(format!(
                "operator `{}` on f32 operands",
                op.as_symbol()
            )));
        }
        let lane = if float {
            ValueLane::Float
        } else {
            ValueLane::Int
        };
        self.emit_as(left, lane, out)?;
        self.emit_as(right, lane, out)?;
        out.push(binary_opcode(op, float).to_string());
        Ok(())
    }

    fn emit_prefix(
        &self,
        id: ExprId,
        op: PrefixOp,
        operand: ExprId,
        out: &mut Code,
    ) -> CompileResult<()> {
        match op {
            PrefixOp::Neg => {
                if let Some(value) = Constant::of(id, self.scope.arena) {
                    let lane = match value {
                        Constant::Float(_) => ValueLane::Float,
                        Constant::Int(_) => ValueLane::Int,
                    };
                    out.push(constant(value, lane));
                    return Ok(());
                }
                if lane_of(operand, &self.scope)?.is_float() {
                    self.emit(operand, out)?;
                    out.push("f32.neg".to_string());
                } else {
                    out.push("i32.const 0".to_string());
                    self.emit_as(operand, ValueLane::Int, out)?;
                    out.push("i32.sub".to_string());
                }
            }
            PrefixOp::Not => {
                self.emit_condition(operand, out)?;
                out.push("i32.eqz".to_string());
            }
            PrefixOp::BitNot => {
                self.emit_as(operand, ValueLane::Int, out)?;
                out.push("i32.const -1".to_string());
                out.push("i32.xor".to_string());
            }
            PrefixOp::Deref => {
                let scalar = pointee(operand, &self.scope)?;
                self.emit(operand, out)?;
                out.push(load(scalar, 0));
            }
        }
        Ok(())
    }

    /// `x++` / `x--`. With `keep`, the old value is left on the stack.
    fn emit_postfix(
        &self,
        op: PostfixOp,
        operand: ExprId,
        keep: bool,
        out: &mut Code,
    ) -> CompileResult<()> {
        let kind = self.scope.arena.expr(operand);
        let ExprKind::Ident(name) = kind else {
            return Err(CompileError::not_implemented(format!(
                "postfix update of {}",
                kind.variant_name()
            )));
        };
        let var = self.scope.lookup(name)?;
        let set = set_var(&var)?;
        let (ty, one) = if var.ty.lane().is_float() {
            ("f32", "f32.const 1")
        } else {
            ("i32", "i32.const 1")
        };
        let update = match op {
            PostfixOp::Increment => "add",
            PostfixOp::Decrement => "sub",
        };
        if keep {
            out.push(get_var(&var));
        }
        out.push(get_var(&var));
        out.push(one.to_string());
        out.push(format!("{ty}.{update}"));
        out.push(set);
        Ok(())
    }

    /// Lower a call and return the callee's result lane.
    fn emit_call(&self, callee: &str, args: &[ExprId], out: &mut Code) -> CompileResult<ValueLane> {
        let signature = self.callee_signature(callee)?;
        if signature.arity() != args.len() {
            return Err(CompileError::ArityMismatch {
                callee: callee.to_string(),
                expected: signature.arity(),
                found: args.len(),
            });
        }
        for (&arg, lane) in args.iter().zip(signature.param_lanes()) {
            self.emit_as(arg, lane, out)?;
        }
        out.push(format!("call ${callee}"));
        Ok(signature.result_lane())
    }

    fn callee_signature(&self, callee: &str) -> CompileResult<&'a FunctionSignature> {
        let meta = self.scope.meta;
        if let Some(function) = meta.functions.get(callee) {
            return Ok(&function.signature);
        }
        if let Some(import) = meta.imports.get(callee) {
            if let ExportDescriptor::Function(signature) = import.resolved()? {
                return Ok(signature);
            }
        }
        Err(CompileError::UnknownFunction {
            name: callee.to_string(),
        })
    }

    /// Leave `base + index * size` on the stack and return the element
    /// scalar. A literal `0` index loads straight from the base.
    fn emit_element_address(
        &self,
        base: ExprId,
        index: ExprId,
        out: &mut Code,
    ) -> CompileResult<ScalarType> {
        let element = match self.scope.arena.expr(base) {
            ExprKind::Ident(name) => self.scope.lookup(name)?.ty.element().cloned(),
            _ => None,
        };
        let scalar = element
            .as_ref()
            .and_then(TypeRef::storage_scalar)
            .unwrap_or(ScalarType::I32);
        self.emit(base, out)?;
        if !matches!(self.scope.arena.expr(index), ExprKind::Int(0)) {
            self.emit_as(index, ValueLane::Int, out)?;
            if scalar.size() != 1 {
                out.push(format!("i32.const {}", scalar.size()));
                out.push("i32.mul".to_string());
            }
            out.push("i32.add".to_string());
        }
        Ok(scalar)
    }

    /// Leave a struct's address on the stack and return the member's
    /// scalar and offset.
    fn emit_member_address(
        &self,
        base: ExprId,
        member: &str,
        out: &mut Code,
    ) -> CompileResult<(ScalarType, u32)> {
        let kind = self.scope.arena.expr(base);
        let ExprKind::Ident(name) = kind else {
            return Err(CompileError::not_implemented(format!(
                "member access on {}",
                kind.variant_name()
            )));
        };
        let var = self.scope.lookup(name)?;
        let Some(struct_name) = var.ty.struct_name() else {
            return Err(CompileError::not_implemented(format!(
                "member access on `{name}` of type `{}`",
                var.ty
            )));
        };
        let layout = self.scope.meta.struct_layout(struct_name)?;
        let field = layout.member(member)?;
        let scalar = field.ty.storage_scalar().ok_or_else(|| {
            CompileError::not_implemented(format!("member `{member}` of type `void`"))
        })?;
        out.push(get_var(&var));
        Ok((scalar, field.offset))
    }

    fn emit_member(
        &self,
        base: ExprId,
        member: &str,
        allow_flattened: bool,
        out: &mut Code,
    ) -> CompileResult<()> {
        if allow_flattened {
            if let Some(local) = self.flattened(base, member) {
                out.push(get_var(local));
                return Ok(());
            }
        }
        let (scalar, offset) = self.emit_member_address(base, member, out)?;
        out.push(load(scalar, offset));
        Ok(())
    }

    /// The flattened local for `base.member`, when `base` is an identifier.
    fn flattened(&self, base: ExprId, member: &str) -> Option<&'a VarDescriptor> {
        match self.scope.arena.expr(base) {
            ExprKind::Ident(name) => self.scope.flattened(name, member),
            _ => None,
        }
    }

    /// `target = value`. With `keep`, the assigned value is left on the stack.
    ///
    /// A member with a flattened local is written to both the local and the
    /// struct's memory, so `p->x` and callees handed `p` see the update.
    pub fn emit_assign(
        &self,
        target: ExprId,
        value: ExprId,
        keep: bool,
        out: &mut Code,
    ) -> CompileResult<()> {
        let kind = self.scope.arena.expr(target);
        if let ExprKind::Member { base, member } = kind {
            if let Some(local) = self.flattened(*base, member) {
                let (scalar, offset) = self.emit_member_address(*base, member, out)?;
                self.emit_as(value, local.ty.lane(), out)?;
                out.push(format!("local.tee ${}", local.name));
                out.push(store(scalar, offset));
                if keep {
                    out.push(get_var(local));
                }
                return Ok(());
            }
        }
        let var = match kind {
            ExprKind::Ident(name) => Some(self.scope.lookup(name)?),
            _ => None,
        };
        if let Some(var) = var {
            let set = set_var(&var)?;
            self.emit_as(value, var.ty.lane(), out)?;
            if keep && var.is_local() {
                out.push(set.replacen("local.set", "local.tee", 1));
            } else {
                out.push(set);
                if keep {
                    out.push(get_var(&var));
                }
            }
            return Ok(());
        }

        if keep {
            return Err(CompileError::not_implemented(format!(
                "value of an assignment to {}",
                kind.variant_name()
            )));
        }
        let (scalar, offset) = match kind {
            ExprKind::Index { base, index } => (self.emit_element_address(*base, *index, out)?, 0),
            ExprKind::Member { base, member } | ExprKind::PointerMember { base, member } => {
                self.emit_member_address(*base, member, out)?
            }
            ExprKind::Prefix {
                op: PrefixOp::Deref,
                operand,
            } => {
                let scalar = pointee(*operand, &self.scope)?;
                self.emit(*operand, out)?;
                (scalar, 0)
            }
            _ => {
                return Err(CompileError::not_implemented(format!(
                    "assignment to {}",
                    kind.variant_name()
                )))
            }
        };
        self.emit_as(value, scalar.lane(), out)?;
        out.push(store(scalar, offset));
        Ok(())
    }
}

/// Lower one expression to instruction text.
pub fn emit_expr(id: ExprId, scope: Scope<'_>) -> CompileResult<String> {
    let mut out = Code::new();
    ExprEmitter::new(scope).emit(id, &mut out)?;
    Ok(out.join("\n"))
}

fn get_var(var: &VarDescriptor) -> String {
    match var.scope {
        VarScope::Local | VarScope::Param => format!("local.get ${}", var.name),
        VarScope::Global | VarScope::ImportedMemory => format!("global.get ${}", var.name),
        VarScope::Memory { address } => format!("i32.const {address}"),
    }
}

fn set_var(var: &VarDescriptor) -> CompileResult<String> {
    match var.scope {
        VarScope::Local | VarScope::Param => Ok(format!("local.set ${}", var.name)),
        VarScope::Global => Ok(format!("global.set ${}", var.name)),
        VarScope::Memory { .. } | VarScope::ImportedMemory => Err(
            CompileError::not_implemented(format!("assignment to constant data `{}`", var.name)),
        ),
    }
}

/// Conversion between lanes; booleans ride in the integer lane.
fn convert(from: ValueLane, to: ValueLane, out: &mut Code) {
    match (from.is_float(), to) {
        (false, ValueLane::Float) => out.push("f32.convert_i32_s".to_string()),
        (true, ValueLane::Int | ValueLane::Bool) => out.push("i32.trunc_f32_s".to_string()),
        _ => {}
    }
}

/// A constant written in `lane`.
pub(crate) fn constant(value: Constant, lane: ValueLane) -> String {
    if lane.is_float() {
        format!("f32.const {}", format_f32(value.as_f64()))
    } else {
        format!("i32.const {}", wrap_i32(value.as_i64()))
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "integer literals wrap to 32 bits"
)]
fn wrap_i32(value: i64) -> i32 {
    value as i32
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "float literals are single precision"
)]
fn format_f32(value: f64) -> String {
    let value = value as f32;
    if value.is_nan() {
        "nan".to_string()
    } else if value == f32::INFINITY {
        "inf".to_string()
    } else if value == f32::NEG_INFINITY {
        "-inf".to_string()
    } else {
        format!("{value:?}")
    }
}

fn binary_opcode(op: BinaryOp, float: bool) -> &'static str {
    if float {
        return match op {
            BinaryOp::Add => "f32.add",
            BinaryOp::Sub => "f32.sub",
            BinaryOp::Mul => "f32.mul",
            BinaryOp::Div => "f32.div",
            BinaryOp::Eq => "f32.eq",
            BinaryOp::NotEq => "f32.ne",
            BinaryOp::Lt => "f32.lt",
            BinaryOp::LtEq => "f32.le",
            BinaryOp::Gt => "f32.gt",
            BinaryOp::GtEq => "f32.ge",
            // integer-only and logical operators never reach the float lane
            _ => "unreachable",
        };
    }
    match op {
        BinaryOp::Add => "i32.add",
        BinaryOp::Sub => "i32.sub",
        BinaryOp::Mul => "i32.mul",
        BinaryOp::Div => "i32.div_s",
        BinaryOp::Rem => "i32.rem_s",
        BinaryOp::Eq => "i32.eq",
        BinaryOp::NotEq => "i32.ne",
        BinaryOp::Lt => "i32.lt_s",
        BinaryOp::LtEq => "i32.le_s",
        BinaryOp::Gt => "i32.gt_s",
        BinaryOp::GtEq => "i32.ge_s",
        BinaryOp::And | BinaryOp::BitAnd => "i32.and",
        BinaryOp::Or | BinaryOp::BitOr => "i32.or",
        BinaryOp::BitXor => "i32.xor",
        BinaryOp::Shl => "i32.shl",
        BinaryOp::Shr => "i32.shr_s",
    }
}

fn load(scalar: ScalarType, offset: u32) -> String {
    let opcode = match scalar {
        ScalarType::I8 => "i32.load8_s",
        ScalarType::U8 | ScalarType::Bool => "i32.load8_u",
        ScalarType::I16 => "i32.load16_s",
        ScalarType::U16 => "i32.load16_u",
        ScalarType::I32 | ScalarType::U32 => "i32.load",
        ScalarType::F32 => "f32.load",
    };
    with_offset(opcode, offset)
}

pub(crate) fn store(scalar: ScalarType, offset: u32) -> String {
    let opcode = match scalar {
        ScalarType::I8 | ScalarType::U8 | ScalarType::Bool => "i32.store8",
        ScalarType::I16 | ScalarType::U16 => "i32.store16",
        ScalarType::I32 | ScalarType::U32 => "i32.store",
        ScalarType::F32 => "f32.store",
    };
    with_offset(opcode, offset)
}

fn with_offset(opcode: &str, offset: u32) -> String {
    if offset == 0 {
        opcode.to_string()
    } else {
        format!("{opcode} offset={offset}")
    }
}
