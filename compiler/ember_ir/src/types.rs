//! Declared types and value lanes.
//!
//! The parser hands declared types over as strings (`i32`, `*Point`, `u8[]`).
//! They are parsed once into a [`TypeRef`]; everything downstream works on
//! the parsed form. A [`ValueLane`] is what a type reduces to on the target
//! machine's value stack.

use std::fmt;

/// Primitive scalar types of the source language.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ScalarType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    Bool,
}

impl ScalarType {
    /// Look up a scalar by its source spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "i8" => ScalarType::I8,
            "u8" => ScalarType::U8,
            "i16" => ScalarType::I16,
            "u16" => ScalarType::U16,
            "i32" => ScalarType::I32,
            "u32" => ScalarType::U32,
            "f32" => ScalarType::F32,
            "bool" => ScalarType::Bool,
            _ => return None,
        })
    }

    /// Source spelling.
    pub fn name(self) -> &'static str {
        match self {
            ScalarType::I8 => "i8",
            ScalarType::U8 => "u8",
            ScalarType::I16 => "i16",
            ScalarType::U16 => "u16",
            ScalarType::I32 => "i32",
            ScalarType::U32 => "u32",
            ScalarType::F32 => "f32",
            ScalarType::Bool => "bool",
        }
    }

    /// Size in bytes when stored in linear memory.
    pub fn size(self) -> u32 {
        match self {
            ScalarType::I8 | ScalarType::U8 | ScalarType::Bool => 1,
            ScalarType::I16 | ScalarType::U16 => 2,
            ScalarType::I32 | ScalarType::U32 | ScalarType::F32 => 4,
        }
    }

    /// Whether loads of this scalar sign-extend.
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            ScalarType::I8 | ScalarType::I16 | ScalarType::I32 | ScalarType::F32
        )
    }

    pub fn lane(self) -> ValueLane {
        match self {
            ScalarType::F32 => ValueLane::Float,
            ScalarType::Bool => ValueLane::Bool,
            _ => ValueLane::Int,
        }
    }
}

/// A parsed declared type.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum TypeRef {
    /// `i8`, `u8`, ..., `f32`, `bool`
    Scalar(ScalarType),
    /// `*T`
    Pointer(Box<TypeRef>),
    /// `T[]`
    Array(Box<TypeRef>),
    /// A struct name.
    Named(String),
    /// `void`, only meaningful as a function result.
    Void,
}

/// Error parsing a declared type string.
#[derive(Clone, Eq, PartialEq, Debug, thiserror::Error)]
pub enum TypeParseError {
    #[error("empty type annotation")]
    Empty,
    #[error("invalid type annotation `{0}`")]
    Invalid(String),
}

impl TypeRef {
    pub const I32: TypeRef = TypeRef::Scalar(ScalarType::I32);
    pub const F32: TypeRef = TypeRef::Scalar(ScalarType::F32);
    pub const BOOL: TypeRef = TypeRef::Scalar(ScalarType::Bool);

    /// Parse a declared type string.
    ///
    /// Pointer prefixes bind looser than array suffixes: `*i32[]` is a
    /// pointer to an `i32` array.
    pub fn parse(source: &str) -> Result<Self, TypeParseError> {
        let text = source.trim();
        if text.is_empty() {
            return Err(TypeParseError::Empty);
        }
        if let Some(inner) = text.strip_prefix('*') {
            return Self::parse(inner)
                .map(|ty| TypeRef::Pointer(Box::new(ty)))
                .map_err(|_| TypeParseError::Invalid(source.to_string()));
        }
        if let Some(inner) = text.strip_suffix("[]") {
            return Self::parse(inner)
                .map(|ty| TypeRef::Array(Box::new(ty)))
                .map_err(|_| TypeParseError::Invalid(source.to_string()));
        }
        if text == "void" {
            return Ok(TypeRef::Void);
        }
        if let Some(scalar) = ScalarType::from_name(text) {
            return Ok(TypeRef::Scalar(scalar));
        }
        let mut chars = text.chars();
        let valid_start = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            Ok(TypeRef::Named(text.to_string()))
        } else {
            Err(TypeParseError::Invalid(source.to_string()))
        }
    }

    /// Convenience constructor for a named (struct) type.
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    /// Size in bytes of a value of this type held in memory or a struct field.
    ///
    /// References (pointers, arrays, structs) are 4-byte addresses.
    pub fn size(&self) -> u32 {
        match self {
            TypeRef::Scalar(scalar) => scalar.size(),
            TypeRef::Pointer(_) | TypeRef::Array(_) | TypeRef::Named(_) => 4,
            TypeRef::Void => 0,
        }
    }

    pub fn lane(&self) -> ValueLane {
        match self {
            TypeRef::Scalar(scalar) => scalar.lane(),
            TypeRef::Pointer(_) | TypeRef::Array(_) | TypeRef::Named(_) => ValueLane::Int,
            TypeRef::Void => ValueLane::Void,
        }
    }

    /// Element type of an array or pointer.
    pub fn element(&self) -> Option<&TypeRef> {
        match self {
            TypeRef::Array(inner) | TypeRef::Pointer(inner) => Some(inner),
            _ => None,
        }
    }

    /// Struct name for `S` and `*S`.
    pub fn struct_name(&self) -> Option<&str> {
        match self {
            TypeRef::Named(name) => Some(name),
            TypeRef::Pointer(inner) => match inner.as_ref() {
                TypeRef::Named(name) => Some(name),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Void)
    }

    /// The scalar a memory access of this type uses.
    ///
    /// References are stored as unsigned 32-bit addresses.
    pub fn storage_scalar(&self) -> Option<ScalarType> {
        match self {
            TypeRef::Scalar(scalar) => Some(*scalar),
            TypeRef::Pointer(_) | TypeRef::Array(_) | TypeRef::Named(_) => Some(ScalarType::U32),
            TypeRef::Void => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Scalar(scalar) => f.write_str(scalar.name()),
            TypeRef::Pointer(inner) => write!(f, "*{inner}"),
            TypeRef::Array(inner) => write!(f, "{inner}[]"),
            TypeRef::Named(name) => f.write_str(name),
            TypeRef::Void => f.write_str("void"),
        }
    }
}

impl TryFrom<String> for TypeRef {
    type Error = TypeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TypeRef::parse(&value)
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        value.to_string()
    }
}

impl std::str::FromStr for TypeRef {
    type Err = TypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeRef::parse(s)
    }
}

/// Value representation on the target machine's operand stack.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ValueLane {
    /// 32-bit integer lane (integers, pointers, references).
    Int,
    /// 32-bit float lane.
    Float,
    /// Booleans; carried in the integer lane on the target.
    Bool,
    Void,
}

impl ValueLane {
    /// Target value type name, `None` for void.
    pub fn wasm_type(self) -> Option<&'static str> {
        match self {
            ValueLane::Int | ValueLane::Bool => Some("i32"),
            ValueLane::Float => Some("f32"),
            ValueLane::Void => None,
        }
    }

    /// Calling-convention character: `i`, `f` or `v`.
    pub fn sig_char(self) -> char {
        match self {
            ValueLane::Int | ValueLane::Bool => 'i',
            ValueLane::Float => 'f',
            ValueLane::Void => 'v',
        }
    }

    pub fn is_float(self) -> bool {
        self == ValueLane::Float
    }
}
