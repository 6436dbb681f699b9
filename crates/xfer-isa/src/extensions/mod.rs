//! WebAssembly instruction sets.
//!
//! Each set decodes and names its own opcodes. Sets are chained by
//! [`CompositeDecoder`]; the first one that recognizes an opcode wins, so a
//! caller can put a custom set in front of the standard ones to override or
//! extend decoding.

mod wasm;

pub use wasm::WasmSet;

use crate::{DecodeError, DecodedInstr, InstrKind, OpId, Pc, Result};

/// Extension point for instruction decoding.
pub trait InstructionSet: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Try to decode the instruction at `pc`. Return `Ok(None)` to fall
    /// through to the next set.
    ///
    /// # Errors
    /// A set that owns the opcode at `pc` reports malformed immediates.
    fn decode(&self, code: &[u8], pc: Pc) -> Result<Option<DecodedInstr>>;

    /// Mnemonic for an opcode this set decodes.
    fn mnemonic(&self, opid: OpId) -> Option<&'static str>;
}

/// Composite decoder that chains instruction sets.
///
/// Tries sets in order until one handles the instruction.
pub struct CompositeDecoder {
    sets: Vec<Box<dyn InstructionSet>>,
}

impl CompositeDecoder {
    /// Create a composite decoder with the given sets.
    #[must_use]
    pub fn new(sets: Vec<Box<dyn InstructionSet>>) -> Self {
        Self { sets }
    }

    /// Create a composite decoder with the standard sets.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![Box::new(WasmSet)])
    }

    /// Create an empty composite decoder (no sets).
    #[must_use]
    pub fn empty() -> Self {
        Self { sets: Vec::new() }
    }

    /// Add a set to the end of the chain.
    #[must_use]
    pub fn with_set(mut self, set: impl InstructionSet + 'static) -> Self {
        self.sets.push(Box::new(set));
        self
    }

    /// Names of the chained sets, in lookup order.
    pub fn set_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.sets.iter().map(|set| set.name())
    }

    /// Decode the instruction at `pc`.
    ///
    /// # Errors
    /// `UnexpectedEof` past the end of `code`, `UnknownOpcode` when no set
    /// claims the opcode, the owning set's immediate error, or `ZeroWidth`
    /// when a set does not advance past `pc`.
    pub fn decode(&self, code: &[u8], pc: Pc) -> Result<DecodedInstr> {
        let opcode = *code.get(pc).ok_or(DecodeError::UnexpectedEof { pc })?;
        for set in &self.sets {
            if let Some(instr) = set.decode(code, pc)? {
                if instr.next_pc() <= pc {
                    return Err(DecodeError::ZeroWidth {
                        pc,
                        set: set.name(),
                    });
                }
                return Ok(instr);
            }
        }
        Err(DecodeError::UnknownOpcode { pc, opcode })
    }

    /// Iterate over the instructions of `code`, starting at offset 0.
    ///
    /// Iteration stops after the first decode error.
    #[must_use]
    pub const fn instructions<'a>(&'a self, code: &'a [u8]) -> Instructions<'a> {
        Instructions {
            decoder: self,
            code,
            pc: 0,
            failed: false,
        }
    }

    /// Mnemonic for an opcode.
    #[must_use]
    pub fn mnemonic(&self, opid: OpId) -> Option<&'static str> {
        self.sets.iter().find_map(|set| set.mnemonic(opid))
    }

    /// Disassemble an instruction.
    #[must_use]
    pub fn disasm(&self, instr: &DecodedInstr) -> String {
        let name = self
            .mnemonic(instr.opid)
            .map_or_else(|| format!("??? {}", instr.opid), str::to_string);
        match &instr.kind {
            InstrKind::Block(ty) | InstrKind::Loop(ty) | InstrKind::If(ty) => format!("{name}{ty}"),
            InstrKind::Br { depth } | InstrKind::BrIf { depth } => format!("{name} {depth}"),
            InstrKind::BrTable { .. } => {
                let labels: Vec<String> = instr.label_depths().map(|d| d.to_string()).collect();
                format!("{name} {}", labels.join(" "))
            }
            InstrKind::Else | InstrKind::End | InstrKind::Other => name,
        }
    }
}

impl Default for CompositeDecoder {
    fn default() -> Self {
        Self::standard()
    }
}

/// Sequential decoding over a code buffer.
pub struct Instructions<'a> {
    decoder: &'a CompositeDecoder,
    code: &'a [u8],
    pc: Pc,
    failed: bool,
}

impl Iterator for Instructions<'_> {
    type Item = Result<DecodedInstr>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pc >= self.code.len() {
            return None;
        }
        let decoded = self.decoder.decode(self.code, self.pc);
        match &decoded {
            Ok(instr) => self.pc = instr.next_pc(),
            Err(_) => self.failed = true,
        }
        Some(decoded)
    }
}
