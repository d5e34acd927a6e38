//! RV32I instruction formats, encodings, and the weighted generation catalog.

/// Six-format field packing, extraction, and immediate bounds.
pub mod format;
pub use format::{
    extract_immediate, funct3_field, funct7_field, opcode_field, pack_b, pack_i, pack_j, pack_r,
    pack_s, pack_u, rd_field, rs1_field, rs2_field, InstructionFormat,
};

/// Instruction definitions, operand masking, and assembly rendering.
pub mod instruction;
pub use instruction::{GeneratedInstruction, ImmediateKind, InstructionDef, Operands};

/// Register file constants, ABI names, and validated sampling ranges.
pub mod registers;
pub use registers::{abi_name, RegisterRange, RA, REGISTER_COUNT, S0, SP, ZERO};

/// The RV32I table, offset windows, and weighted sampling configuration.
pub mod catalog;
pub use catalog::{lookup, of_format, Catalog, OffsetWindow, RV32I};

/// Configuration and sampling error taxonomy.
pub mod error;
pub use error::{ConfigError, SampleError};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
