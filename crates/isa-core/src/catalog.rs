//! The RV32I base catalog and its weighted sampling configuration.
//!
//! [`RV32I`] is the single source-of-truth instruction table. A [`Catalog`]
//! layers per-mnemonic selection weights, register ranges, and load/store
//! offset windows on top of it; all of that configuration is validated when
//! it is set, so the sampling paths stay infallible apart from the weighted
//! draw itself.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::error::{ConfigError, SampleError};
use crate::format::InstructionFormat;
use crate::instruction::{GeneratedInstruction, ImmediateKind, InstructionDef, Operands};
use crate::registers::RegisterRange;

const OP_REGISTER: u8 = 0b011_0011;
const OP_IMMEDIATE: u8 = 0b001_0011;
const OP_LOAD: u8 = 0b000_0011;
const OP_STORE: u8 = 0b010_0011;
const OP_BRANCH: u8 = 0b110_0011;
const OP_JALR: u8 = 0b110_0111;
const OP_JAL: u8 = 0b110_1111;
const OP_LUI: u8 = 0b011_0111;
const OP_AUIPC: u8 = 0b001_0111;
const OP_SYSTEM: u8 = 0b111_0011;

const fn alu(name: &'static str, funct3: u8, funct7: u8) -> InstructionDef {
    InstructionDef {
        name,
        format: InstructionFormat::R,
        opcode: OP_REGISTER,
        funct3: Some(funct3),
        funct7: Some(funct7),
        immediate: ImmediateKind::None,
    }
}

const fn alu_imm(name: &'static str, funct3: u8) -> InstructionDef {
    InstructionDef {
        name,
        format: InstructionFormat::I,
        opcode: OP_IMMEDIATE,
        funct3: Some(funct3),
        funct7: None,
        immediate: ImmediateKind::Signed12,
    }
}

const fn shift_imm(name: &'static str, funct3: u8, funct7: Option<u8>) -> InstructionDef {
    InstructionDef {
        name,
        format: InstructionFormat::I,
        opcode: OP_IMMEDIATE,
        funct3: Some(funct3),
        funct7,
        immediate: ImmediateKind::Shamt5,
    }
}

const fn load(name: &'static str, funct3: u8) -> InstructionDef {
    InstructionDef {
        name,
        format: InstructionFormat::I,
        opcode: OP_LOAD,
        funct3: Some(funct3),
        funct7: None,
        immediate: ImmediateKind::MemoryOffset,
    }
}

const fn store(name: &'static str, funct3: u8) -> InstructionDef {
    InstructionDef {
        name,
        format: InstructionFormat::S,
        opcode: OP_STORE,
        funct3: Some(funct3),
        funct7: None,
        immediate: ImmediateKind::MemoryOffset,
    }
}

const fn branch(name: &'static str, funct3: u8) -> InstructionDef {
    InstructionDef {
        name,
        format: InstructionFormat::B,
        opcode: OP_BRANCH,
        funct3: Some(funct3),
        funct7: None,
        immediate: ImmediateKind::BranchOffset,
    }
}

const fn upper(name: &'static str, opcode: u8) -> InstructionDef {
    InstructionDef {
        name,
        format: InstructionFormat::U,
        opcode,
        funct3: None,
        funct7: None,
        immediate: ImmediateKind::Upper20,
    }
}

const fn system(name: &'static str, funct7: Option<u8>) -> InstructionDef {
    InstructionDef {
        name,
        format: InstructionFormat::I,
        opcode: OP_SYSTEM,
        funct3: Some(0b000),
        funct7,
        immediate: ImmediateKind::None,
    }
}

const JALR: InstructionDef = InstructionDef {
    name: "jalr",
    format: InstructionFormat::I,
    opcode: OP_JALR,
    funct3: Some(0b000),
    funct7: None,
    immediate: ImmediateKind::Signed12,
};

const JAL: InstructionDef = InstructionDef {
    name: "jal",
    format: InstructionFormat::J,
    opcode: OP_JAL,
    funct3: None,
    funct7: None,
    immediate: ImmediateKind::JumpOffset,
};

/// Single source-of-truth RV32I base instruction table.
///
/// Any mnemonic not present here is unknown by definition.
pub const RV32I: &[InstructionDef] = &[
    alu("add", 0b000, 0b000_0000),
    alu("sub", 0b000, 0b010_0000),
    alu("xor", 0b100, 0b000_0000),
    alu("or", 0b110, 0b000_0000),
    alu("and", 0b111, 0b000_0000),
    alu("sll", 0b001, 0b000_0000),
    alu("srl", 0b101, 0b000_0000),
    alu("sra", 0b101, 0b010_0000),
    alu("slt", 0b010, 0b000_0000),
    alu("sltu", 0b011, 0b000_0000),
    alu_imm("addi", 0b000),
    alu_imm("xori", 0b100),
    alu_imm("ori", 0b110),
    alu_imm("andi", 0b111),
    shift_imm("slli", 0b001, None),
    shift_imm("srli", 0b101, Some(0b000_0000)),
    shift_imm("srai", 0b101, Some(0b010_0000)),
    alu_imm("slti", 0b010),
    alu_imm("sltiu", 0b011),
    load("lb", 0b000),
    load("lh", 0b001),
    load("lw", 0b010),
    load("lbu", 0b100),
    load("lhu", 0b101),
    JALR,
    store("sb", 0b000),
    store("sh", 0b001),
    store("sw", 0b010),
    branch("beq", 0b000),
    branch("bne", 0b001),
    branch("blt", 0b100),
    branch("bge", 0b101),
    branch("bltu", 0b110),
    branch("bgeu", 0b111),
    upper("lui", OP_LUI),
    upper("auipc", OP_AUIPC),
    JAL,
    system("ecall", None),
    system("ebreak", Some(0b000_0001)),
];

/// Finds a catalog entry by mnemonic.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static InstructionDef> {
    RV32I.iter().find(|def| def.name == name)
}

/// All catalog entries of the given format, in table order.
#[must_use]
pub fn of_format(format: InstructionFormat) -> Vec<&'static InstructionDef> {
    RV32I.iter().filter(|def| def.format == format).collect()
}

/// A contiguous span of load/store offsets, stored as inclusive bounds.
///
/// Windows are validated on construction; sampling from one can therefore
/// never fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetWindow {
    min: i32,
    max: i32,
}

impl OffsetWindow {
    /// The full signed 12-bit offset span, the default load/store window.
    pub const SIGNED12: Self = Self {
        min: -2048,
        max: 2047,
    };

    /// Builds a window covering `base..base + size`.
    ///
    /// # Errors
    ///
    /// Rejects a zero `size` and windows whose last offset leaves `i32`.
    #[allow(clippy::cast_lossless, clippy::cast_possible_truncation)]
    pub const fn new(base: i32, size: u32) -> Result<Self, ConfigError> {
        if size == 0 {
            return Err(ConfigError::EmptyOffsetWindow { base });
        }
        let last = base as i64 + (size - 1) as i64;
        if last > i32::MAX as i64 {
            return Err(ConfigError::OffsetWindowOverflow { base, size });
        }
        Ok(Self {
            min: base,
            max: last as i32,
        })
    }

    /// Builds a window from inclusive bounds.
    ///
    /// # Errors
    ///
    /// Rejects `min > max`.
    pub const fn from_bounds(min: i32, max: i32) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::InvertedOffsetBounds { min, max });
        }
        Ok(Self { min, max })
    }

    /// Lowest offset in the window.
    #[must_use]
    pub const fn min(self) -> i32 {
        self.min
    }

    /// Highest offset in the window.
    #[must_use]
    pub const fn max(self) -> i32 {
        self.max
    }

    /// Whether `offset` falls inside the window.
    #[must_use]
    pub const fn contains(self, offset: i32) -> bool {
        self.min <= offset && offset <= self.max
    }

    /// Draws an offset uniformly from the window.
    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> i32 {
        rng.gen_range(self.min..=self.max)
    }
}

/// Sampling configuration layered over the [`RV32I`] table.
///
/// Holds one selection weight per table entry (all 1.0 by default), the
/// register ranges operands are drawn from, and the union of offset windows
/// that memory-offset immediates are drawn from.
#[derive(Debug, Clone)]
pub struct Catalog {
    weights: Vec<f64>,
    offset_windows: Vec<OffsetWindow>,
    rd_range: RegisterRange,
    rs1_range: RegisterRange,
    rs2_range: RegisterRange,
}

impl Catalog {
    /// A catalog with uniform weights, full register ranges, and the full
    /// signed 12-bit offset window.
    #[must_use]
    pub fn new() -> Self {
        Self {
            weights: vec![1.0; RV32I.len()],
            offset_windows: vec![OffsetWindow::SIGNED12],
            rd_range: RegisterRange::FULL,
            rs1_range: RegisterRange::FULL,
            rs2_range: RegisterRange::FULL,
        }
    }

    fn weight_index(name: &str) -> Result<usize, ConfigError> {
        RV32I
            .iter()
            .position(|def| def.name == name)
            .ok_or_else(|| ConfigError::UnknownInstruction(name.to_owned()))
    }

    /// Current selection weight for a mnemonic.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownInstruction`] for names not in the table.
    pub fn weight(&self, name: &str) -> Result<f64, ConfigError> {
        Ok(self.weights[Self::weight_index(name)?])
    }

    /// Overrides the selection weight of a single mnemonic.
    ///
    /// A weight of zero removes the instruction from weighted draws without
    /// removing it from the table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownInstruction`] for names not in the
    /// table and [`ConfigError::NegativeWeight`] for weights below zero.
    pub fn set_weight_by_name(&mut self, name: &str, weight: f64) -> Result<(), ConfigError> {
        let index = Self::weight_index(name)?;
        if weight < 0.0 {
            return Err(ConfigError::NegativeWeight {
                target: name.to_owned(),
                weight,
            });
        }
        self.weights[index] = weight;
        Ok(())
    }

    /// Overrides the selection weight of every entry of one format.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NegativeWeight`] for weights below zero.
    pub fn set_weight_by_format(
        &mut self,
        format: InstructionFormat,
        weight: f64,
    ) -> Result<(), ConfigError> {
        if weight < 0.0 {
            return Err(ConfigError::NegativeWeight {
                target: format!("{}-format", format.letter()),
                weight,
            });
        }
        for (index, def) in RV32I.iter().enumerate() {
            if def.format == format {
                self.weights[index] = weight;
            }
        }
        Ok(())
    }

    /// Configured load/store offset windows.
    #[must_use]
    pub fn offset_windows(&self) -> &[OffsetWindow] {
        &self.offset_windows
    }

    /// Replaces the load/store offset windows.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoOffsetWindows`] when the list is empty.
    pub fn set_offset_windows(&mut self, windows: Vec<OffsetWindow>) -> Result<(), ConfigError> {
        if windows.is_empty() {
            return Err(ConfigError::NoOffsetWindows);
        }
        self.offset_windows = windows;
        Ok(())
    }

    /// Range destination registers are drawn from.
    #[must_use]
    pub const fn rd_range(&self) -> RegisterRange {
        self.rd_range
    }

    /// Range first source registers are drawn from.
    #[must_use]
    pub const fn rs1_range(&self) -> RegisterRange {
        self.rs1_range
    }

    /// Range second source registers are drawn from.
    #[must_use]
    pub const fn rs2_range(&self) -> RegisterRange {
        self.rs2_range
    }

    /// Sets the range destination registers are drawn from.
    pub const fn set_rd_range(&mut self, range: RegisterRange) {
        self.rd_range = range;
    }

    /// Sets the range first source registers are drawn from.
    pub const fn set_rs1_range(&mut self, range: RegisterRange) {
        self.rs1_range = range;
    }

    /// Sets the range second source registers are drawn from.
    pub const fn set_rs2_range(&mut self, range: RegisterRange) {
        self.rs2_range = range;
    }

    /// Draws one table entry according to the configured weights.
    ///
    /// # Errors
    ///
    /// Returns [`SampleError::ZeroTotalWeight`] when every weight is zero.
    pub fn random_definition<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<&'static InstructionDef, SampleError> {
        let distribution =
            WeightedIndex::new(&self.weights).map_err(|_| SampleError::ZeroTotalWeight)?;
        Ok(&RV32I[distribution.sample(rng)])
    }

    /// Draws one entry from a caller-supplied subset, still honouring the
    /// configured weights.
    ///
    /// Entries not present in the table sample at the default weight of 1.0.
    ///
    /// # Errors
    ///
    /// Returns [`SampleError::EmptyCandidates`] for an empty subset and
    /// [`SampleError::ZeroTotalWeight`] when every candidate weighs zero.
    pub fn weighted_from_list<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        candidates: &[&'static InstructionDef],
    ) -> Result<&'static InstructionDef, SampleError> {
        if candidates.is_empty() {
            return Err(SampleError::EmptyCandidates);
        }
        let weights: Vec<f64> = candidates
            .iter()
            .map(|def| {
                RV32I
                    .iter()
                    .position(|entry| entry.name == def.name)
                    .map_or(1.0, |index| self.weights[index])
            })
            .collect();
        let distribution =
            WeightedIndex::new(weights).map_err(|_| SampleError::ZeroTotalWeight)?;
        Ok(candidates[distribution.sample(rng)])
    }

    /// Draws a load/store offset: one window uniformly, then one offset
    /// uniformly within it.
    pub fn random_offset<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        let window = self.offset_windows[rng.gen_range(0..self.offset_windows.len())];
        window.sample(rng)
    }

    /// Draws an immediate appropriate for the given operand kind.
    ///
    /// Branch and jump offsets are forced even, matching what their
    /// encodings can hold.
    pub fn random_immediate<R: Rng + ?Sized>(&self, kind: ImmediateKind, rng: &mut R) -> i32 {
        match kind {
            ImmediateKind::None => 0,
            ImmediateKind::Signed12 => rng.gen_range(-2048..=2047),
            ImmediateKind::Shamt5 => rng.gen_range(0..=31),
            ImmediateKind::MemoryOffset => self.random_offset(rng),
            ImmediateKind::BranchOffset => rng.gen_range(-4096..=4094) & !1,
            ImmediateKind::Upper20 => rng.gen_range(-524_288..=524_287),
            ImmediateKind::JumpOffset => rng.gen_range(-1_048_576..=1_048_574) & !1,
        }
    }

    /// Draws a full operand set for one instruction from the configured
    /// ranges, with fields the encoding does not store already zeroed.
    pub fn random_operands<R: Rng + ?Sized>(
        &self,
        def: &InstructionDef,
        rng: &mut R,
    ) -> Operands {
        let operands = Operands::new(
            self.rd_range.sample(rng),
            self.rs1_range.sample(rng),
            self.rs2_range.sample(rng),
            self.random_immediate(def.immediate, rng),
        );
        def.masked(operands)
    }

    /// Generates one instruction of the given definition with random
    /// operands.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        def: &InstructionDef,
        rng: &mut R,
    ) -> GeneratedInstruction {
        let operands = self.random_operands(def, rng);
        def.emit(operands)
    }

    /// Draws a definition by weight and generates it with random operands.
    ///
    /// # Errors
    ///
    /// Returns [`SampleError::ZeroTotalWeight`] when every weight is zero.
    pub fn generate_random<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<GeneratedInstruction, SampleError> {
        let def = self.random_definition(rng)?;
        Ok(self.generate(def, rng))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
