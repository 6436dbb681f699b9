//! Opcode bytes used by the builder, the mnemonic table and tests.

pub const OP_UNREACHABLE: u8 = 0x00;
pub const OP_NOP: u8 = 0x01;
pub const OP_BLOCK: u8 = 0x02;
pub const OP_LOOP: u8 = 0x03;
pub const OP_IF: u8 = 0x04;
pub const OP_ELSE: u8 = 0x05;
pub const OP_END: u8 = 0x0B;
pub const OP_BR: u8 = 0x0C;
pub const OP_BR_IF: u8 = 0x0D;
pub const OP_BR_TABLE: u8 = 0x0E;
pub const OP_RETURN: u8 = 0x0F;
pub const OP_CALL: u8 = 0x10;
pub const OP_CALL_INDIRECT: u8 = 0x11;
pub const OP_RETURN_CALL: u8 = 0x12;
pub const OP_RETURN_CALL_INDIRECT: u8 = 0x13;
pub const OP_DROP: u8 = 0x1A;
pub const OP_SELECT: u8 = 0x1B;
pub const OP_LOCAL_GET: u8 = 0x20;
pub const OP_LOCAL_SET: u8 = 0x21;
pub const OP_I32_CONST: u8 = 0x41;
pub const OP_I64_CONST: u8 = 0x42;

/// GC and typed-reference instructions.
pub const PREFIX_GC: u8 = 0xFB;
/// Saturating truncation, bulk memory and table instructions.
pub const PREFIX_MISC: u8 = 0xFC;
pub const PREFIX_SIMD: u8 = 0xFD;
pub const PREFIX_ATOMIC: u8 = 0xFE;

/// Whether `byte` introduces a LEB128 sub-opcode.
#[must_use]
pub const fn is_prefix(byte: u8) -> bool {
    matches!(byte, PREFIX_GC | PREFIX_MISC | PREFIX_SIMD | PREFIX_ATOMIC)
}
