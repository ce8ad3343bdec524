//! Constant data for string, array and struct literals.
//!
//! Walks every statement of a module (function bodies included) and
//! allocates each data literal, recording its address in the metadata's
//! literal table. Arrays are handled after their elements so nested literals
//! already have an address to embed.

use ember_diagnostic::{CompileError, CompileResult};
use ember_ir::visitor::{walk_expr, walk_stmt, Visitor};
use ember_ir::{AstArena, ExprId, ExprKind, FieldInit, PrefixOp, ScalarType, StmtId, StmtKind, TypeRef};
use rustc_hash::FxHashMap;

use crate::ModuleMetadata;

/// A compile-time numeric value.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Constant {
    Int(i64),
    Float(f64),
}

impl Constant {
    /// Evaluate a literal, or a negated numeric literal.
    pub fn of(id: ExprId, arena: &AstArena) -> Option<Self> {
        match arena.expr(id) {
            ExprKind::Int(value) => Some(Constant::Int(*value)),
            ExprKind::Float(value) => Some(Constant::Float(*value)),
            ExprKind::Bool(value) => Some(Constant::Int(i64::from(*value))),
            ExprKind::Char(value) => Some(Constant::Int(i64::from(u32::from(*value)))),
            ExprKind::Prefix {
                op: PrefixOp::Neg,
                operand,
            } => match arena.expr(*operand) {
                ExprKind::Int(value) => Some(Constant::Int(value.wrapping_neg())),
                ExprKind::Float(value) => Some(Constant::Float(-value)),
                _ => None,
            },
            _ => None,
        }
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "float constants stored in integer slots truncate"
    )]
    pub fn as_i64(self) -> i64 {
        match self {
            Constant::Int(value) => value,
            Constant::Float(value) => value as i64,
        }
    }

    #[allow(
        clippy::cast_precision_loss,
        reason = "integer constants stored in float slots round"
    )]
    pub fn as_f64(self) -> f64 {
        match self {
            Constant::Int(value) => value as f64,
            Constant::Float(value) => value,
        }
    }
}

/// Append `value` encoded little-endian at the width of `scalar`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "constants wrap to the declared width"
)]
pub fn push_scalar(out: &mut Vec<u8>, scalar: ScalarType, value: Constant) {
    match scalar {
        ScalarType::F32 => out.extend_from_slice(&(value.as_f64() as f32).to_le_bytes()),
        ScalarType::I8 | ScalarType::U8 | ScalarType::Bool => out.push(value.as_i64() as u8),
        ScalarType::I16 | ScalarType::U16 => {
            out.extend_from_slice(&(value.as_i64() as u16).to_le_bytes());
        }
        ScalarType::I32 | ScalarType::U32 => {
            out.extend_from_slice(&(value.as_i64() as u32).to_le_bytes());
        }
    }
}

/// Element type of an array literal.
///
/// Precedence: the literal's own annotation, the element type implied by
/// the declaration it initialises, `f32` if any element is a float literal,
/// otherwise `i32`.
pub fn array_element_type(
    annotation: Option<&TypeRef>,
    hint: Option<&TypeRef>,
    elements: &[ExprId],
    arena: &AstArena,
) -> TypeRef {
    if let Some(ty) = annotation.or(hint) {
        return ty.clone();
    }
    let any_float = elements
        .iter()
        .any(|&e| matches!(Constant::of(e, arena), Some(Constant::Float(_))));
    if any_float {
        TypeRef::F32
    } else {
        TypeRef::I32
    }
}

pub(crate) struct LiteralCollector<'m> {
    meta: &'m mut ModuleMetadata,
    /// Element types implied by enclosing declarations.
    hints: FxHashMap<ExprId, TypeRef>,
}

impl<'m> LiteralCollector<'m> {
    pub(crate) fn new(meta: &'m mut ModuleMetadata) -> Self {
        LiteralCollector {
            meta,
            hints: FxHashMap::default(),
        }
    }

    fn record(&mut self, id: ExprId, address: u32) {
        self.meta.literal_locations.insert(id, address);
    }

    fn encode_array(
        &mut self,
        elements: &[ExprId],
        element_ty: &TypeRef,
        arena: &AstArena,
    ) -> CompileResult<u32> {
        let scalar = element_ty.storage_scalar().ok_or_else(|| {
            CompileError::unsupported_literal("array of `void` elements")
        })?;
        let mut bytes = Vec::with_capacity(elements.len() * scalar.size() as usize);
        for &element in elements {
            let kind = arena.expr(element);
            if kind.is_data_literal() {
                let Some(address) = self.meta.literal_location(element) else {
                    return Err(CompileError::unsupported_literal(format!(
                        "nested {} without an address",
                        kind.variant_name()
                    )));
                };
                if scalar.size() != 4 || element_ty.lane().is_float() {
                    return Err(CompileError::unsupported_literal(format!(
                        "{} stored in a `{element_ty}` element",
                        kind.variant_name()
                    )));
                }
                bytes.extend_from_slice(&address.to_le_bytes());
                continue;
            }
            let Some(value) = Constant::of(element, arena) else {
                return Err(CompileError::unsupported_literal(format!(
                    "array element must be a constant, found {}",
                    kind.variant_name()
                )));
            };
            push_scalar(&mut bytes, scalar, value);
        }
        let align = scalar.size().min(4);
        self.meta.data.alloc_block(bytes, align)
    }

    fn encode_struct(
        &mut self,
        name: &str,
        fields: &[FieldInit],
        arena: &AstArena,
    ) -> CompileResult<u32> {
        let layout = self
            .meta
            .structs
            .get(name)
            .ok_or_else(|| CompileError::UnknownStruct {
                name: name.to_string(),
            })?;
        let mut bytes = vec![0u8; layout.size as usize];
        for field in fields {
            let member = layout.member(&field.name)?;
            let kind = arena.expr(field.value);
            let value = match kind {
                ExprKind::Bool(_) => None,
                _ if kind.is_data_literal() => None,
                _ => Constant::of(field.value, arena),
            };
            let Some(value) = value else {
                return Err(CompileError::unsupported_literal(format!(
                    "field `{}` of `{name}` must be a numeric constant, found {}",
                    field.name,
                    kind.variant_name()
                )));
            };
            let Some(scalar) = member.ty.storage_scalar() else {
                return Err(CompileError::unsupported_literal(format!(
                    "field `{}` of `{name}` has no storage",
                    field.name
                )));
            };
            let mut encoded = Vec::with_capacity(4);
            push_scalar(&mut encoded, scalar, value);
            let start = member.offset as usize;
            bytes[start..start + encoded.len()].copy_from_slice(&encoded);
        }
        self.meta.data.alloc_block(bytes, 4)
    }
}

impl<'ast> Visitor<'ast> for LiteralCollector<'_> {
    type Error = CompileError;

    fn visit_stmt(&mut self, id: StmtId, arena: &'ast AstArena) -> CompileResult<()> {
        if let StmtKind::Let(decl) = arena.stmt(id) {
            if let Some(element) = decl.ty.as_ref().and_then(TypeRef::element) {
                self.hints.insert(decl.init, element.clone());
            }
        }
        walk_stmt(self, id, arena)
    }

    fn visit_expr(&mut self, id: ExprId, arena: &'ast AstArena) -> CompileResult<()> {
        match arena.expr(id) {
            ExprKind::Str(content) => {
                let address = self.meta.data.string_header(content)?;
                self.record(id, address);
                Ok(())
            }
            ExprKind::Array {
                elements,
                element_type,
            } => {
                let element_ty = array_element_type(
                    element_type.as_ref(),
                    self.hints.get(&id),
                    elements,
                    arena,
                );
                if let Some(inner) = element_ty.element() {
                    for &element in elements {
                        if matches!(arena.expr(element), ExprKind::Array { .. }) {
                            self.hints.insert(element, inner.clone());
                        }
                    }
                }
                walk_expr(self, id, arena)?;
                let address = self.encode_array(elements, &element_ty, arena)?;
                tracing::debug!(address, len = elements.len(), ty = %element_ty, "array literal");
                self.record(id, address);
                Ok(())
            }
            ExprKind::Struct { name, fields } => {
                let address = self.encode_struct(name, fields, arena)?;
                tracing::debug!(address, name = name.as_str(), "struct literal");
                self.record(id, address);
                Ok(())
            }
            _ => walk_expr(self, id, arena),
        }
    }
}

#[cfg(test)]
mod tests;
