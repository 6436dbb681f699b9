//! Bytecode builder fluent API.
//!
//! Assembles instruction streams without hand-computing offsets or LEB128
//! encodings. Every emitted instruction's start offset is recorded so callers
//! can refer to it afterwards.

use crate::opcodes::{
    OP_BLOCK, OP_BR, OP_BR_IF, OP_BR_TABLE, OP_CALL, OP_DROP, OP_ELSE, OP_END, OP_I32_CONST,
    OP_I64_CONST, OP_IF, OP_LOCAL_GET, OP_LOOP, OP_NOP, OP_RETURN,
};
use crate::leb::{write_signed, write_unsigned};
use crate::{BLOCK_TYPE_EMPTY, BlockType, Pc};

/// Builder for wasm instruction streams.
#[derive(Clone, Debug, Default)]
pub struct CodeBuilder {
    code: Vec<u8>,
    offsets: Vec<Pc>,
}

impl CodeBuilder {
    /// Create an empty builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            code: Vec::new(),
            offsets: Vec::new(),
        }
    }

    /// Offset the next instruction will be emitted at.
    #[must_use]
    pub const fn here(&self) -> Pc {
        self.code.len()
    }

    /// Start offsets of every emitted instruction, in order.
    #[must_use]
    pub fn offsets(&self) -> &[Pc] {
        &self.offsets
    }

    fn op(mut self, opcode: u8) -> Self {
        self.offsets.push(self.code.len());
        self.code.push(opcode);
        self
    }

    fn u32(mut self, value: u32) -> Self {
        write_unsigned(&mut self.code, u64::from(value));
        self
    }

    fn block_type(mut self, ty: BlockType) -> Self {
        match ty {
            BlockType::Empty => self.code.push(BLOCK_TYPE_EMPTY),
            BlockType::Value(val) => self.code.push(val.to_byte()),
            BlockType::TypeIndex(idx) => write_signed(&mut self.code, i64::from(idx)),
        }
        self
    }

    /// `block <ty>`
    #[must_use]
    pub fn begin_block(self, ty: BlockType) -> Self {
        self.op(OP_BLOCK).block_type(ty)
    }

    /// `loop <ty>`
    #[must_use]
    pub fn begin_loop(self, ty: BlockType) -> Self {
        self.op(OP_LOOP).block_type(ty)
    }

    /// `if <ty>`
    #[must_use]
    pub fn begin_if(self, ty: BlockType) -> Self {
        self.op(OP_IF).block_type(ty)
    }

    #[must_use]
    pub fn begin_else(self) -> Self {
        self.op(OP_ELSE)
    }

    #[must_use]
    pub fn end(self) -> Self {
        self.op(OP_END)
    }

    #[must_use]
    pub fn br(self, depth: u32) -> Self {
        self.op(OP_BR).u32(depth)
    }

    #[must_use]
    pub fn br_if(self, depth: u32) -> Self {
        self.op(OP_BR_IF).u32(depth)
    }

    /// `br_table targets* default`
    #[must_use]
    pub fn br_table(self, targets: &[u32], default: u32) -> Self {
        let count = u32::try_from(targets.len()).unwrap_or(u32::MAX);
        let mut builder = self.op(OP_BR_TABLE).u32(count);
        for &depth in targets {
            builder = builder.u32(depth);
        }
        builder.u32(default)
    }

    #[must_use]
    pub fn nop(self) -> Self {
        self.op(OP_NOP)
    }

    #[must_use]
    pub fn ret(self) -> Self {
        self.op(OP_RETURN)
    }

    #[must_use]
    pub fn drop_value(self) -> Self {
        self.op(OP_DROP)
    }

    #[must_use]
    pub fn call(self, func: u32) -> Self {
        self.op(OP_CALL).u32(func)
    }

    #[must_use]
    pub fn local_get(self, local: u32) -> Self {
        self.op(OP_LOCAL_GET).u32(local)
    }

    #[must_use]
    pub fn i32_const(mut self, value: i32) -> Self {
        self = self.op(OP_I32_CONST);
        write_signed(&mut self.code, i64::from(value));
        self
    }

    #[must_use]
    pub fn i64_const(mut self, value: i64) -> Self {
        self = self.op(OP_I64_CONST);
        write_signed(&mut self.code, value);
        self
    }

    /// Emit one pre-encoded instruction.
    #[must_use]
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        if !bytes.is_empty() {
            self.offsets.push(self.code.len());
            self.code.extend_from_slice(bytes);
        }
        self
    }

    /// Consume the builder and return the encoded bytes.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.code
    }
}
