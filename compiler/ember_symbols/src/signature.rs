//! Function signatures and their calling-convention encoding.
//!
//! A signature encodes as one character per parameter lane (`i` or `f`),
//! an underscore, and one result character (`i`, `f` or `v`): `ii_i`,
//! `f_f`, `_v`. The encoding keys deduplicated type declarations and is what
//! import signatures are compared by.

use std::fmt;

use ember_diagnostic::{CompileError, CompileResult};
use ember_ir::{TypeRef, ValueLane};

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FunctionSignature {
    pub params: Vec<TypeRef>,
    pub result: TypeRef,
    encoded: String,
}

impl FunctionSignature {
    pub fn new(params: Vec<TypeRef>, result: TypeRef) -> Self {
        let lanes: Vec<ValueLane> = params.iter().map(TypeRef::lane).collect();
        let encoded = encode(&lanes, result.lane());
        FunctionSignature {
            params,
            result,
            encoded,
        }
    }

    /// Build a signature from its encoded form, using `i32`/`f32` as the
    /// declared type of each lane.
    pub fn from_encoded(encoded: &str) -> CompileResult<Self> {
        let (params, result) = decode(encoded)?;
        let to_type = |lane: ValueLane| match lane {
            ValueLane::Float => TypeRef::F32,
            ValueLane::Void => TypeRef::Void,
            ValueLane::Int | ValueLane::Bool => TypeRef::I32,
        };
        Ok(FunctionSignature::new(
            params.into_iter().map(to_type).collect(),
            to_type(result),
        ))
    }

    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    pub fn param_lanes(&self) -> impl Iterator<Item = ValueLane> + '_ {
        self.params.iter().map(TypeRef::lane)
    }

    pub fn result_lane(&self) -> ValueLane {
        self.result.lane()
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

/// Encode parameter and result lanes.
pub fn encode(params: &[ValueLane], result: ValueLane) -> String {
    let mut encoded: String = params.iter().map(|lane| lane.sig_char()).collect();
    encoded.push('_');
    encoded.push(result.sig_char());
    encoded
}

/// Decode an encoded signature into parameter and result lanes.
pub fn decode(encoded: &str) -> CompileResult<(Vec<ValueLane>, ValueLane)> {
    let malformed = || CompileError::MalformedSignature {
        signature: encoded.to_string(),
    };
    let (params, result) = encoded.split_once('_').ok_or_else(malformed)?;
    let params = params
        .chars()
        .map(|c| match c {
            'i' => Ok(ValueLane::Int),
            'f' => Ok(ValueLane::Float),
            _ => Err(malformed()),
        })
        .collect::<CompileResult<Vec<_>>>()?;
    let result = match result {
        "i" => ValueLane::Int,
        "f" => ValueLane::Float,
        "v" => ValueLane::Void,
        _ => return Err(malformed()),
    };
    Ok((params, result))
}

/// Decode only the result lane of an encoded signature.
pub fn decode_result(encoded: &str) -> CompileResult<ValueLane> {
    decode(encoded).map(|(_, result)| result)
}
