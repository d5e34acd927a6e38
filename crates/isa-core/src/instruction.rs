//! Instruction definitions, operand bundles, and the total encoder.

use crate::format::{pack_b, pack_i, pack_j, pack_r, pack_s, pack_u, InstructionFormat};

/// How an instruction's immediate operand is produced and rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ImmediateKind {
    /// No immediate operand (R-format ALU ops and bare system instructions).
    None,
    /// Signed 12-bit ALU or jalr immediate.
    Signed12,
    /// 5-bit shift amount carried in the low bits of the immediate field.
    Shamt5,
    /// Signed 12-bit load/store offset drawn from the configured windows.
    MemoryOffset,
    /// Even 13-bit branch displacement.
    BranchOffset,
    /// Signed 20-bit upper-immediate payload.
    Upper20,
    /// Even 21-bit jump displacement.
    JumpOffset,
}

/// Operand fields fed to the encoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Operands {
    /// Destination register.
    pub rd: u8,
    /// First source register.
    pub rs1: u8,
    /// Second source register.
    pub rs2: u8,
    /// Immediate value, interpreted per the instruction's immediate kind.
    pub imm: i32,
}

impl Operands {
    /// All fields zero.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Bundles the four operand fields.
    #[must_use]
    pub const fn new(rd: u8, rs1: u8, rs2: u8, imm: i32) -> Self {
        Self { rd, rs1, rs2, imm }
    }
}

/// One generated instruction: the encoded word and its assembly rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedInstruction {
    /// 32-bit encoded instruction word.
    pub word: u32,
    /// Assembly-syntax string, possibly carrying a trailing comment.
    pub asm: String,
}

/// One RV32I instruction definition.
///
/// A plain record: behavior differences between instructions are expressed
/// through the format and the immediate kind tag, never through dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionDef {
    /// Mnemonic, lower case.
    pub name: &'static str,
    /// Encoding format.
    pub format: InstructionFormat,
    /// 7-bit major opcode.
    pub opcode: u8,
    /// funct3 discriminator, where the format carries one.
    pub funct3: Option<u8>,
    /// funct7 discriminator; for I-format entries this value occupies the
    /// high bits of the immediate field (shift and system encodings).
    pub funct7: Option<u8>,
    /// How the immediate operand is produced.
    pub immediate: ImmediateKind,
}

impl InstructionDef {
    /// Whether the instruction renders and encodes without any operands.
    ///
    /// In this catalog those are exactly the I-format entries with no
    /// immediate operand: ecall and ebreak.
    #[must_use]
    pub const fn is_bare(&self) -> bool {
        matches!(
            (self.format, self.immediate),
            (InstructionFormat::I, ImmediateKind::None)
        )
    }

    const fn funct3_bits(&self) -> u8 {
        match self.funct3 {
            Some(funct3) => funct3,
            None => 0,
        }
    }

    /// Immediate-field payload for I-format entries.
    ///
    /// Shift encodings store funct7 above the 5-bit shamt; bare system
    /// encodings store funct7 as the whole 12-bit payload (0 for ecall,
    /// 1 for ebreak). Everything else passes the immediate through.
    const fn i_immediate_payload(&self, imm: i32) -> i32 {
        match self.immediate {
            ImmediateKind::Shamt5 => {
                let shamt = imm & 0x1F;
                match self.funct7 {
                    Some(funct7) => ((funct7 as i32) << 5) | shamt,
                    None => shamt,
                }
            }
            ImmediateKind::None => match self.funct7 {
                Some(funct7) => funct7 as i32,
                None => 0,
            },
            _ => imm,
        }
    }

    /// Encodes the instruction into a 32-bit word.
    ///
    /// Total: register numbers are masked to five bits and immediates are
    /// truncated to the bits the format stores.
    #[must_use]
    pub const fn encode(&self, operands: Operands) -> u32 {
        let Operands { rd, rs1, rs2, imm } = operands;
        let funct3 = self.funct3_bits();
        match self.format {
            InstructionFormat::R => {
                let funct7 = match self.funct7 {
                    Some(funct7) => funct7,
                    None => 0,
                };
                pack_r(self.opcode, rd, funct3, rs1, rs2, funct7)
            }
            InstructionFormat::I => {
                pack_i(self.opcode, rd, funct3, rs1, self.i_immediate_payload(imm))
            }
            InstructionFormat::S => pack_s(self.opcode, funct3, rs1, rs2, imm),
            InstructionFormat::B => pack_b(self.opcode, funct3, rs1, rs2, imm),
            InstructionFormat::U => pack_u(self.opcode, rd, imm),
            InstructionFormat::J => pack_j(self.opcode, rd, imm),
        }
    }

    /// Replaces operand fields the encoding does not store with zeros.
    ///
    /// Keeps rendered assembly, recorded semantics, and the encoded word in
    /// agreement about which operands exist.
    #[must_use]
    pub const fn masked(&self, operands: Operands) -> Operands {
        if self.is_bare() {
            return Operands::ZERO;
        }
        Operands {
            rd: if self.format.encodes_rd() {
                operands.rd
            } else {
                0
            },
            rs1: if self.format.encodes_rs1() {
                operands.rs1
            } else {
                0
            },
            rs2: if self.format.encodes_rs2() {
                operands.rs2
            } else {
                0
            },
            imm: if self.format.encodes_immediate() {
                operands.imm
            } else {
                0
            },
        }
    }

    /// Renders the assembly string for the given operands.
    #[must_use]
    pub fn assembly(&self, operands: Operands) -> String {
        let Operands { rd, rs1, rs2, imm } = operands;
        if self.is_bare() {
            return self.name.to_owned();
        }
        match self.format {
            InstructionFormat::R => format!("{} x{rd}, x{rs1}, x{rs2}", self.name),
            InstructionFormat::I => match self.immediate {
                ImmediateKind::Shamt5 => {
                    format!("{} x{rd}, x{rs1}, {}", self.name, imm & 0x1F)
                }
                ImmediateKind::MemoryOffset => {
                    format!("{} x{rd}, {imm}(x{rs1})", self.name)
                }
                _ if self.name == "jalr" => format!("{} x{rd}, {imm}(x{rs1})", self.name),
                _ => format!("{} x{rd}, x{rs1}, {imm}", self.name),
            },
            InstructionFormat::S => format!("{} x{rs2}, {imm}(x{rs1})", self.name),
            InstructionFormat::B => format!("{} x{rs1}, x{rs2}, {imm}", self.name),
            InstructionFormat::U | InstructionFormat::J => {
                format!("{} x{rd}, {imm}", self.name)
            }
        }
    }

    /// Masks, encodes, and renders in one step.
    #[must_use]
    pub fn emit(&self, operands: Operands) -> GeneratedInstruction {
        let operands = self.masked(operands);
        GeneratedInstruction {
            word: self.encode(operands),
            asm: self.assembly(operands),
        }
    }
}
