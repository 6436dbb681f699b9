//! WebAssembly instruction decoding for control-transfer analysis.
//!
//! This crate provides the decoding capability the control-transfer pass relies
//! on: for any offset in a function body it reports the instruction's class and
//! its exact byte width. Operators are read with `wasmparser`; the
//! [`WasmSet`] maps them to control classes and further sets can be chained
//! behind it by [`CompositeDecoder`].

mod asm;
mod decode;
pub mod extensions;
pub mod leb;
pub mod opcodes;
mod types;

pub use asm::*;
pub use decode::*;
pub use extensions::*;
pub use opcodes::*;
pub use types::*;

use thiserror::Error;

/// Instruction decoding errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unexpected end of code at offset {pc}")]
    UnexpectedEof { pc: Pc },
    #[error("unknown opcode 0x{opcode:02x} at offset {pc}")]
    UnknownOpcode { pc: Pc, opcode: u8 },
    #[error("unsupported block type at offset {pc}")]
    UnsupportedBlockType { pc: Pc },
    #[error("instruction set `{set}` decoded an empty instruction at offset {pc}")]
    ZeroWidth { pc: Pc, set: &'static str },
    #[error("{message} (at offset {pc})")]
    Malformed { pc: Pc, message: String },
}

impl DecodeError {
    /// Offset the error refers to.
    #[must_use]
    pub const fn pc(&self) -> Pc {
        match self {
            Self::UnexpectedEof { pc }
            | Self::UnknownOpcode { pc, .. }
            | Self::UnsupportedBlockType { pc }
            | Self::ZeroWidth { pc, .. }
            | Self::Malformed { pc, .. } => *pc,
        }
    }
}

impl From<wasmparser::BinaryReaderError> for DecodeError {
    fn from(err: wasmparser::BinaryReaderError) -> Self {
        Self::Malformed {
            pc: err.offset(),
            message: err.message().to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;

/// Decode the instruction at `pc` using the standard instruction sets.
///
/// This is a convenience wrapper around `CompositeDecoder::standard().decode()`.
///
/// # Errors
/// Returns a [`DecodeError`] for unknown opcodes or malformed immediates.
pub fn decode(code: &[u8], pc: Pc) -> Result<DecodedInstr> {
    CompositeDecoder::standard().decode(code, pc)
}
