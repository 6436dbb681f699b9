//! Control-transfer resolution for structured wasm bytecode.
//!
//! Given the raw instruction bytes of one function body, [`compute`] returns
//! a [`TransferTable`] mapping the offset of every `if`, `else`, `br`,
//! `br_if` and `br_table` entry to the signed delta an interpreter adds to its
//! program counter when that transfer is taken.
//!
//! Landing rules:
//! - `loop` labels land on the `loop` opcode itself.
//! - `block` and `if` labels land one past the matching `end`.
//! - A false `if` lands one past its `else`, or on its `end` without one.
//! - `else` (end of the then arm) lands one past the `end`.
//!
//! `br_table` with `N` labels (explicit targets then the default) is keyed at
//! `pc`, `pc + 1`, …, `pc + N - 1`; the interpreter reads the entry selected
//! by its index operand.

mod batch;
mod config;
mod error;
mod scope;
mod table;
mod transfer;
mod verify;

pub use batch::*;
pub use config::*;
pub use error::*;
pub use scope::*;
pub use table::*;
pub use transfer::*;
pub use verify::*;
