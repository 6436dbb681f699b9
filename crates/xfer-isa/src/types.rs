//! Core types shared by the decoder and the control-transfer pass.

use std::fmt;

use wasmparser::RefType;

/// Byte offset into an instruction buffer.
pub type Pc = usize;

/// Signed distance between two offsets (`target - pc`).
pub type PcDelta = isize;

/// Signed distance from `from` to `to`.
///
/// Offsets index into slices, and slice lengths never exceed `isize::MAX`,
/// so both conversions are lossless.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub const fn pc_delta(from: Pc, to: Pc) -> PcDelta {
    to as PcDelta - from as PcDelta
}

/// Apply a delta to an offset. Returns `None` when the result would be negative.
#[inline]
#[must_use]
pub const fn apply_delta(pc: Pc, delta: PcDelta) -> Option<Pc> {
    pc.checked_add_signed(delta)
}

/// Value types that can appear in a block type or a typed `select`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValType {
    I32,
    I64,
    F32,
    F64,
    V128,
    FuncRef,
    ExternRef,
}

impl ValType {
    /// Convert a parsed value type. Returns `None` for reference types
    /// other than `funcref` and `externref`.
    #[must_use]
    pub fn from_wasm(ty: wasmparser::ValType) -> Option<Self> {
        Some(match ty {
            wasmparser::ValType::I32 => Self::I32,
            wasmparser::ValType::I64 => Self::I64,
            wasmparser::ValType::F32 => Self::F32,
            wasmparser::ValType::F64 => Self::F64,
            wasmparser::ValType::V128 => Self::V128,
            wasmparser::ValType::Ref(ty) if ty == RefType::FUNCREF => Self::FuncRef,
            wasmparser::ValType::Ref(ty) if ty == RefType::EXTERNREF => Self::ExternRef,
            wasmparser::ValType::Ref(_) => return None,
        })
    }

    /// Single-byte encoding.
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        match self {
            Self::I32 => 0x7F,
            Self::I64 => 0x7E,
            Self::F32 => 0x7D,
            Self::F64 => 0x7C,
            Self::V128 => 0x7B,
            Self::FuncRef => 0x70,
            Self::ExternRef => 0x6F,
        }
    }
}

impl fmt::Display for ValType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::V128 => "v128",
            Self::FuncRef => "funcref",
            Self::ExternRef => "externref",
        };
        f.write_str(name)
    }
}

/// Encoding byte of the empty block type.
pub const BLOCK_TYPE_EMPTY: u8 = 0x40;

/// Signature of a `block`/`loop`/`if`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockType {
    /// No parameters, no results (`0x40`).
    Empty,
    /// No parameters, a single result.
    Value(ValType),
    /// Index into the module's type section.
    TypeIndex(u32),
}

impl BlockType {
    /// Convert a parsed block type. See [`ValType::from_wasm`].
    #[must_use]
    pub fn from_wasm(ty: wasmparser::BlockType) -> Option<Self> {
        match ty {
            wasmparser::BlockType::Empty => Some(Self::Empty),
            wasmparser::BlockType::Type(ty) => ValType::from_wasm(ty).map(Self::Value),
            wasmparser::BlockType::FuncType(idx) => Some(Self::TypeIndex(idx)),
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Value(ty) => write!(f, " (result {ty})"),
            Self::TypeIndex(idx) => write!(f, " (type {idx})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pc_delta_signs() {
        assert_eq!(pc_delta(2, 4), 2);
        assert_eq!(pc_delta(4, 2), -2);
        assert_eq!(pc_delta(7, 7), 0);
    }

    #[test]
    fn test_apply_delta() {
        assert_eq!(apply_delta(2, -2), Some(0));
        assert_eq!(apply_delta(2, 3), Some(5));
        assert_eq!(apply_delta(1, -2), None);
    }

    #[test]
    fn test_valtype_from_wasm() {
        let cases = [
            (wasmparser::ValType::I32, 0x7F),
            (wasmparser::ValType::I64, 0x7E),
            (wasmparser::ValType::F32, 0x7D),
            (wasmparser::ValType::F64, 0x7C),
            (wasmparser::ValType::V128, 0x7B),
            (wasmparser::ValType::FUNCREF, 0x70),
            (wasmparser::ValType::EXTERNREF, 0x6F),
        ];
        for (ty, byte) in cases {
            assert_eq!(ValType::from_wasm(ty).unwrap().to_byte(), byte);
        }
        let nullable_any = wasmparser::ValType::Ref(RefType::ANYREF);
        assert_eq!(ValType::from_wasm(nullable_any), None);
    }

    #[test]
    fn test_block_type_from_wasm() {
        assert_eq!(
            BlockType::from_wasm(wasmparser::BlockType::Empty),
            Some(BlockType::Empty)
        );
        assert_eq!(
            BlockType::from_wasm(wasmparser::BlockType::FuncType(3)),
            Some(BlockType::TypeIndex(3))
        );
        assert_eq!(
            BlockType::from_wasm(wasmparser::BlockType::Type(wasmparser::ValType::F64))
                .map(|ty| ty.to_string()),
            Some(" (result f64)".to_string())
        );
    }
}
