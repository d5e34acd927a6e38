//! Hazard pairs, basic blocks, composite shapes, and mixed streams.
//!
//! [`PatternGenerator`] owns the catalog, the session RNG, and the optional
//! semantic tracker. Every instruction leaves through [`PatternGenerator::emit`]:
//! mask operands, encode, render, annotate from history, record, bump the
//! stream index. Patterns differ only in how they pick definitions and
//! operands before that funnel.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use isa_core::{
    lookup, of_format, Catalog, GeneratedInstruction, ImmediateKind, InstructionDef,
    InstructionFormat, Operands, RegisterRange, RA, RV32I, S0, SP, ZERO,
};

use crate::errors::PatternError;
use crate::semantic::{CommentDetail, CommentGenerator, SemanticState};

/// Two-slot dependency patterns available to the mixed stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairKind {
    /// Load followed by a store of the loaded register.
    LoadStore,
    /// Read-after-write dependency.
    Raw,
    /// Write-after-read dependency.
    War,
    /// Two writes to the same register.
    Waw,
}

impl PairKind {
    /// Every pair kind, in the order the mixed stream offers them.
    pub const ALL: [Self; 4] = [Self::LoadStore, Self::Raw, Self::War, Self::Waw];
}

/// Catalog entries that write a destination register.
fn writer_definitions() -> Vec<&'static InstructionDef> {
    RV32I
        .iter()
        .filter(|def| def.format.encodes_rd() && !def.is_bare())
        .collect()
}

/// Catalog entries that read at least one source register.
fn reader_definitions() -> Vec<&'static InstructionDef> {
    RV32I
        .iter()
        .filter(|def| {
            (def.format.encodes_rs1() || def.format.encodes_rs2()) && !def.is_bare()
        })
        .collect()
}

/// Catalog entries that are not control flow.
fn straight_definitions() -> Vec<&'static InstructionDef> {
    RV32I
        .iter()
        .filter(|def| {
            !matches!(
                def.format,
                InstructionFormat::B | InstructionFormat::J
            )
        })
        .collect()
}

fn fixed(name: &'static str) -> Result<&'static InstructionDef, PatternError> {
    lookup(name).ok_or(PatternError::MissingDefinition(name))
}

/// Byte offset spanning `slots` instructions, saturating instead of wrapping.
fn word_offset(slots: usize) -> i32 {
    i32::try_from(slots)
        .unwrap_or(i32::MAX / 4)
        .saturating_mul(4)
}

/// Stateful generator for instruction streams with controlled dependencies.
#[derive(Debug)]
pub struct PatternGenerator {
    catalog: Catalog,
    rng: ChaCha20Rng,
    state: Option<SemanticState>,
    annotator: CommentGenerator,
    index: usize,
}

impl PatternGenerator {
    /// Creates a generator over the given catalog with a deterministic seed.
    #[must_use]
    pub fn new(catalog: Catalog, seed: u64) -> Self {
        Self {
            catalog,
            rng: ChaCha20Rng::seed_from_u64(seed),
            state: None,
            annotator: CommentGenerator::default(),
            index: 0,
        }
    }

    /// Creates a generator seeded from operating-system entropy.
    #[must_use]
    pub fn from_entropy(catalog: Catalog) -> Self {
        Self {
            catalog,
            rng: ChaCha20Rng::from_entropy(),
            state: None,
            annotator: CommentGenerator::default(),
            index: 0,
        }
    }

    /// Enables semantic tracking for every subsequent emission.
    #[must_use]
    pub fn with_tracking(mut self) -> Self {
        if self.state.is_none() {
            self.state = Some(SemanticState::new());
        }
        self
    }

    /// Enables comment annotation at the given tier (implies tracking).
    #[must_use]
    pub fn with_comments(mut self, detail: CommentDetail) -> Self {
        self.annotator = CommentGenerator::new(detail);
        if detail == CommentDetail::Off {
            self
        } else {
            self.with_tracking()
        }
    }

    /// The catalog the generator samples from.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The semantic tracker, when tracking is enabled.
    #[must_use]
    pub const fn semantic_state(&self) -> Option<&SemanticState> {
        self.state.as_ref()
    }

    /// Number of instructions emitted so far.
    #[must_use]
    pub const fn stream_index(&self) -> usize {
        self.index
    }

    /// Mutable handle to the session RNG.
    ///
    /// Sequence template rendering draws from the same stream so that one
    /// seed reproduces one run end to end.
    pub fn rng_mut(&mut self) -> &mut ChaCha20Rng {
        &mut self.rng
    }

    fn scope_event(&mut self, event: impl FnOnce(&mut SemanticState)) {
        if let Some(state) = &mut self.state {
            event(state);
        }
    }

    /// Emits one instruction through the common funnel.
    ///
    /// Operands are masked to what the definition's format encodes, the
    /// word and assembly are rendered, the history annotator may append a
    /// `# note` suffix, and only then is the instruction recorded.
    pub fn emit(&mut self, def: &InstructionDef, operands: Operands) -> GeneratedInstruction {
        let operands = def.masked(operands);
        let mut generated = def.emit(operands);
        if let Some(state) = &self.state {
            if let Some(note) = self.annotator.annotate(state, def, operands) {
                generated.asm = format!("{}  # {note}", generated.asm);
            }
        }
        self.record(def, operands);
        self.index += 1;
        generated
    }

    fn record(&mut self, def: &InstructionDef, operands: Operands) {
        let index = self.index;
        let Some(state) = &mut self.state else {
            return;
        };
        let format = def.format;
        if format.encodes_rs1() && operands.rs1 != ZERO {
            state.record_read(operands.rs1, index);
        }
        if format.encodes_rs2() && operands.rs2 != ZERO {
            state.record_read(operands.rs2, index);
        }
        if format.encodes_rd() && !def.is_bare() && operands.rd != ZERO {
            state.record_write(operands.rd, index);
        }
        if def.immediate == ImmediateKind::MemoryOffset && operands.rs1 != ZERO {
            state.record_memory_access(operands.rs1, operands.imm, index);
        }
        if matches!(format, InstructionFormat::B | InstructionFormat::J) {
            state.record_branch(index, operands.imm);
        }
    }

    /// Emits one weighted random instruction from the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Sample`] when every weight is zero.
    pub fn single(&mut self) -> Result<GeneratedInstruction, PatternError> {
        let def = self.catalog.random_definition(&mut self.rng)?;
        let operands = self.catalog.random_operands(def, &mut self.rng);
        Ok(self.emit(def, operands))
    }

    /// Emits one weighted instruction drawn from the given subset.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Sample`] for an empty subset or one whose
    /// weights sum to zero.
    pub fn single_from(
        &mut self,
        candidates: &[&'static InstructionDef],
    ) -> Result<GeneratedInstruction, PatternError> {
        let def = self.catalog.weighted_from_list(&mut self.rng, candidates)?;
        let operands = self.catalog.random_operands(def, &mut self.rng);
        Ok(self.emit(def, operands))
    }

    /// Emits a plain weighted random stream of `count` instructions.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Sample`] when every weight is zero.
    pub fn stream(&mut self, count: usize) -> Result<Vec<GeneratedInstruction>, PatternError> {
        (0..count).map(|_| self.single()).collect()
    }

    /// Emits a load followed by a store of the loaded register.
    ///
    /// The store's rs2 is the load's rd, so the pair is connected through
    /// one never-zero register. Base registers are drawn independently and
    /// offsets come from the configured windows.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Sample`] when the load or store class has
    /// zero total weight.
    pub fn load_store_pair(&mut self) -> Result<Vec<GeneratedInstruction>, PatternError> {
        let loads: Vec<_> = of_format(InstructionFormat::I)
            .into_iter()
            .filter(|def| def.immediate == ImmediateKind::MemoryOffset)
            .collect();
        let stores = of_format(InstructionFormat::S);

        let load = self.catalog.weighted_from_list(&mut self.rng, &loads)?;
        let store = self.catalog.weighted_from_list(&mut self.rng, &stores)?;

        let value = RegisterRange::NONZERO.sample(&mut self.rng);
        let load_base = RegisterRange::NONZERO.sample(&mut self.rng);
        let store_base = RegisterRange::NONZERO.sample(&mut self.rng);
        let load_offset = self.catalog.random_offset(&mut self.rng);
        let store_offset = self.catalog.random_offset(&mut self.rng);

        let first = self.emit(load, Operands::new(value, load_base, ZERO, load_offset));
        let second = self.emit(store, Operands::new(ZERO, store_base, value, store_offset));
        Ok(vec![first, second])
    }

    fn operands_writing(&mut self, def: &InstructionDef, rd: u8) -> Operands {
        let rs1 = RegisterRange::NONZERO.sample(&mut self.rng);
        let rs2 = RegisterRange::NONZERO.sample(&mut self.rng);
        let imm = self.catalog.random_immediate(def.immediate, &mut self.rng);
        Operands::new(rd, rs1, rs2, imm)
    }

    fn operands_reading(&mut self, def: &InstructionDef, hazard: u8) -> Operands {
        let format = def.format;
        let use_rs1 = match (format.encodes_rs1(), format.encodes_rs2()) {
            (true, true) => self.rng.gen_bool(0.5),
            (true, false) => true,
            _ => false,
        };
        let rd = if format.encodes_rd() {
            RegisterRange::NONZERO.sample(&mut self.rng)
        } else {
            ZERO
        };
        let other = RegisterRange::NONZERO.sample(&mut self.rng);
        let (rs1, rs2) = if use_rs1 {
            (hazard, other)
        } else {
            (other, hazard)
        };
        let imm = self.catalog.random_immediate(def.immediate, &mut self.rng);
        Operands::new(rd, rs1, rs2, imm)
    }

    /// Emits two instructions with a read-after-write dependency.
    ///
    /// The first writes the hazard register; the second reads it as rs1 or
    /// rs2, restricted to roles its format actually encodes. The hazard
    /// register is never x0.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Sample`] when either candidate class has
    /// zero total weight.
    pub fn raw_hazard(&mut self) -> Result<Vec<GeneratedInstruction>, PatternError> {
        let writers = writer_definitions();
        let readers = reader_definitions();

        let producer = self.catalog.weighted_from_list(&mut self.rng, &writers)?;
        let consumer = self.catalog.weighted_from_list(&mut self.rng, &readers)?;

        let hazard = RegisterRange::NONZERO.sample(&mut self.rng);
        let producer_operands = self.operands_writing(producer, hazard);
        let first = self.emit(producer, producer_operands);

        let consumer_operands = self.operands_reading(consumer, hazard);
        let second = self.emit(consumer, consumer_operands);
        Ok(vec![first, second])
    }

    /// Emits two instructions with a write-after-read dependency.
    ///
    /// The first reads the hazard register; the second writes it.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Sample`] when either candidate class has
    /// zero total weight.
    pub fn war_hazard(&mut self) -> Result<Vec<GeneratedInstruction>, PatternError> {
        let readers = reader_definitions();
        let writers = writer_definitions();

        let consumer = self.catalog.weighted_from_list(&mut self.rng, &readers)?;
        let producer = self.catalog.weighted_from_list(&mut self.rng, &writers)?;

        let hazard = RegisterRange::NONZERO.sample(&mut self.rng);
        let consumer_operands = self.operands_reading(consumer, hazard);
        let first = self.emit(consumer, consumer_operands);

        let producer_operands = self.operands_writing(producer, hazard);
        let second = self.emit(producer, producer_operands);
        Ok(vec![first, second])
    }

    /// Emits two distinct instructions writing the same register.
    ///
    /// The two definitions are sampled without replacement.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Sample`] when the writer class has zero
    /// total weight, or fewer than two members remain.
    pub fn waw_hazard(&mut self) -> Result<Vec<GeneratedInstruction>, PatternError> {
        let writers = writer_definitions();
        let first_def = self.catalog.weighted_from_list(&mut self.rng, &writers)?;
        let rest: Vec<_> = writers
            .into_iter()
            .filter(|def| def.name != first_def.name)
            .collect();
        let second_def = self.catalog.weighted_from_list(&mut self.rng, &rest)?;

        let hazard = RegisterRange::NONZERO.sample(&mut self.rng);
        let first_operands = self.operands_writing(first_def, hazard);
        let first = self.emit(first_def, first_operands);
        let second_operands = self.operands_writing(second_def, hazard);
        let second = self.emit(second_def, second_operands);
        Ok(vec![first, second])
    }

    /// Emits `size` instructions where only the last may be control flow.
    ///
    /// With probability 0.5 the block closes with a branch or jump (an even
    /// split between the classes), otherwise with one more plain sample.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Sample`] when the sampled class has zero
    /// total weight.
    pub fn basic_block(&mut self, size: usize) -> Result<Vec<GeneratedInstruction>, PatternError> {
        if size < 2 {
            return self.stream(size);
        }

        let straight = straight_definitions();
        let mut out = Vec::with_capacity(size);
        for _ in 0..size - 1 {
            out.push(self.single_from(&straight)?);
        }

        if self.rng.gen_bool(0.5) {
            let closers = if self.rng.gen_bool(0.5) {
                of_format(InstructionFormat::B)
            } else {
                of_format(InstructionFormat::J)
            };
            let def = closers[self.rng.gen_range(0..closers.len())];
            let operands = self.catalog.random_operands(def, &mut self.rng);
            out.push(self.emit(def, operands));
        } else {
            out.push(self.single()?);
        }
        Ok(out)
    }

    /// Emits a stream where two-slot patterns appear with the given density.
    ///
    /// Density is clamped to [0, 1]. The result always holds exactly
    /// `count` instructions; overruns are truncated.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Sample`] when a sampled class has zero
    /// total weight.
    pub fn mixed(
        &mut self,
        count: usize,
        kinds: &[PairKind],
        density: f64,
    ) -> Result<Vec<GeneratedInstruction>, PatternError> {
        let density = if density.is_nan() {
            0.0
        } else {
            density.clamp(0.0, 1.0)
        };

        let mut out = Vec::with_capacity(count);
        while out.len() < count {
            let remaining = count - out.len();
            if remaining >= 2 && !kinds.is_empty() && self.rng.gen_bool(density) {
                let kind = kinds[self.rng.gen_range(0..kinds.len())];
                let pair = match kind {
                    PairKind::LoadStore => self.load_store_pair()?,
                    PairKind::Raw => self.raw_hazard()?,
                    PairKind::War => self.war_hazard()?,
                    PairKind::Waw => self.waw_hazard()?,
                };
                out.extend(pair);
            } else {
                out.push(self.single()?);
            }
        }
        out.truncate(count);
        Ok(out)
    }

    /// Emits a counted loop: counter init, body, decrement, back branch.
    ///
    /// The tracker sees the body bracketed by a loop scope with the counter
    /// register declared.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Sample`] when the body class has zero total
    /// weight, or [`PatternError::MissingDefinition`] if the catalog lacks
    /// the fixed shape instructions.
    pub fn loop_shape(
        &mut self,
        iterations: i32,
        body_size: usize,
    ) -> Result<Vec<GeneratedInstruction>, PatternError> {
        let addi = fixed("addi")?;
        let bne = fixed("bne")?;

        let counter = RegisterRange::NONZERO.sample(&mut self.rng);
        let mut out = Vec::with_capacity(body_size + 3);

        out.push(self.emit(addi, Operands::new(counter, ZERO, ZERO, iterations)));
        self.scope_event(|state| state.enter_loop(Some(counter)));

        let straight = straight_definitions();
        for _ in 0..body_size {
            out.push(self.single_from(&straight)?);
        }

        out.push(self.emit(addi, Operands::new(counter, counter, ZERO, -1)));

        // Back over the body and the decrement to the first body slot.
        let back = -word_offset(body_size + 1);
        out.push(self.emit(bne, Operands::new(ZERO, counter, ZERO, back)));
        self.scope_event(SemanticState::exit_loop);

        Ok(out)
    }

    /// Emits an if/else shape: a branch over the then-block, then a jump
    /// over the else-block.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Sample`] when the branch or body class has
    /// zero total weight, or [`PatternError::MissingDefinition`] if the
    /// catalog lacks the fixed shape instructions.
    pub fn conditional_shape(
        &mut self,
        then_size: usize,
        else_size: usize,
    ) -> Result<Vec<GeneratedInstruction>, PatternError> {
        let jal = fixed("jal")?;
        let branches = of_format(InstructionFormat::B);
        let branch = self.catalog.weighted_from_list(&mut self.rng, &branches)?;

        let lhs = RegisterRange::NONZERO.sample(&mut self.rng);
        let rhs = RegisterRange::NONZERO.sample(&mut self.rng);

        let mut out = Vec::with_capacity(then_size + else_size + 2);

        // Taken: skip the then-block and the jump guarding the else-block.
        let over_then = word_offset(then_size + 2);
        out.push(self.emit(branch, Operands::new(ZERO, lhs, rhs, over_then)));

        let straight = straight_definitions();
        for _ in 0..then_size {
            out.push(self.single_from(&straight)?);
        }

        let over_else = word_offset(else_size + 1);
        out.push(self.emit(jal, Operands::new(ZERO, ZERO, ZERO, over_else)));

        for _ in 0..else_size {
            out.push(self.single_from(&straight)?);
        }
        Ok(out)
    }

    /// Emits a lui establishing a base register, then `size - 1` loads and
    /// stores through it.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Sample`] when the memory class has zero
    /// total weight, or [`PatternError::MissingDefinition`] if the catalog
    /// lacks lui.
    pub fn memory_sequence(
        &mut self,
        size: usize,
    ) -> Result<Vec<GeneratedInstruction>, PatternError> {
        if size == 0 {
            return Ok(Vec::new());
        }
        let lui = fixed("lui")?;

        let base = RegisterRange::NONZERO.sample(&mut self.rng);
        let upper = self
            .catalog
            .random_immediate(ImmediateKind::Upper20, &mut self.rng);

        let mut out = Vec::with_capacity(size);
        out.push(self.emit(lui, Operands::new(base, ZERO, ZERO, upper)));

        let memory: Vec<_> = RV32I
            .iter()
            .filter(|def| def.immediate == ImmediateKind::MemoryOffset)
            .collect();
        for _ in 1..size {
            let def = self.catalog.weighted_from_list(&mut self.rng, &memory)?;
            let offset = self.catalog.random_offset(&mut self.rng);
            let operands = if def.format == InstructionFormat::S {
                let value = RegisterRange::NONZERO.sample(&mut self.rng);
                Operands::new(ZERO, base, value, offset)
            } else {
                let dest = RegisterRange::NONZERO.sample(&mut self.rng);
                Operands::new(dest, base, ZERO, offset)
            };
            out.push(self.emit(def, operands));
        }
        Ok(out)
    }

    /// Emits a function shape: stack prologue, body, restoring epilogue.
    ///
    /// ra and s0 are saved in a 16-byte frame; the tracker sees the whole
    /// shape as one function scope.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Sample`] when the body class has zero total
    /// weight, or [`PatternError::MissingDefinition`] if the catalog lacks
    /// the fixed shape instructions.
    pub fn function_sequence(
        &mut self,
        body_size: usize,
    ) -> Result<Vec<GeneratedInstruction>, PatternError> {
        let addi = fixed("addi")?;
        let sw = fixed("sw")?;
        let lw = fixed("lw")?;
        let jalr = fixed("jalr")?;

        let mut out = Vec::with_capacity(body_size + 7);
        self.scope_event(SemanticState::enter_function);

        out.push(self.emit(addi, Operands::new(SP, SP, ZERO, -16)));
        self.scope_event(|state| state.allocate_stack(16));
        out.push(self.emit(sw, Operands::new(ZERO, SP, RA, 12)));
        self.scope_event(|state| state.save_register(RA));
        out.push(self.emit(sw, Operands::new(ZERO, SP, S0, 8)));
        self.scope_event(|state| state.save_register(S0));

        let straight = straight_definitions();
        for _ in 0..body_size {
            out.push(self.single_from(&straight)?);
        }

        out.push(self.emit(lw, Operands::new(S0, SP, ZERO, 8)));
        out.push(self.emit(lw, Operands::new(RA, SP, ZERO, 12)));
        out.push(self.emit(addi, Operands::new(SP, SP, ZERO, 16)));
        self.scope_event(|state| state.deallocate_stack(16));
        out.push(self.emit(jalr, Operands::new(ZERO, RA, ZERO, 0)));
        self.scope_event(SemanticState::exit_function);

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use isa_core::{
        extract_immediate, lookup, opcode_field, rd_field, rs1_field, rs2_field, Catalog,
        InstructionFormat, OffsetWindow, Operands,
    };

    use super::{PairKind, PatternGenerator};
    use crate::semantic::CommentDetail;

    fn seeded(seed: u64) -> PatternGenerator {
        PatternGenerator::new(Catalog::new(), seed)
    }

    #[test]
    fn load_store_pair_connects_the_value_register() {
        for seed in 0..20 {
            let mut generator = seeded(seed);
            let pair = generator.load_store_pair().unwrap();
            assert_eq!(pair.len(), 2);

            let loaded = rd_field(pair[0].word);
            let stored = rs2_field(pair[1].word);
            assert_eq!(loaded, stored);
            assert_ne!(loaded, 0);

            assert_eq!(opcode_field(pair[0].word), lookup("lw").unwrap().opcode);
            assert_eq!(opcode_field(pair[1].word), lookup("sw").unwrap().opcode);
        }
    }

    #[test]
    fn load_store_offsets_respect_configured_windows() {
        let mut catalog = Catalog::new();
        catalog
            .set_offset_windows(vec![OffsetWindow::new(0, 16).unwrap()])
            .unwrap();
        let mut generator = PatternGenerator::new(catalog, 3);

        for _ in 0..50 {
            let pair = generator.load_store_pair().unwrap();
            let load_imm = extract_immediate(InstructionFormat::I, pair[0].word);
            let store_imm = extract_immediate(InstructionFormat::S, pair[1].word);
            assert!((0..16).contains(&load_imm));
            assert!((0..16).contains(&store_imm));
        }
    }

    #[test]
    fn raw_hazard_writes_then_reads_one_register() {
        for seed in 0..20 {
            let mut generator = seeded(seed).with_tracking();
            let pair = generator.raw_hazard().unwrap();
            assert_eq!(pair.len(), 2);

            let state = generator.semantic_state().unwrap();
            let hazard = (1..32).find(|&reg| {
                state.last_writer(reg) == Some(0) && state.readers(reg).contains(&1)
            });
            assert!(hazard.is_some(), "seed {seed} produced no raw dependency");
        }
    }

    #[test]
    fn war_hazard_reads_then_writes_one_register() {
        for seed in 0..20 {
            let mut generator = seeded(seed).with_tracking();
            let pair = generator.war_hazard().unwrap();
            assert_eq!(pair.len(), 2);

            let state = generator.semantic_state().unwrap();
            let hazard = (1..32).find(|&reg| {
                state.readers(reg).contains(&0) && state.last_writer(reg) == Some(1)
            });
            assert!(hazard.is_some(), "seed {seed} produced no war dependency");
        }
    }

    #[test]
    fn waw_hazard_uses_two_distinct_writers_of_one_register() {
        for seed in 0..20 {
            let mut generator = seeded(seed);
            let pair = generator.waw_hazard().unwrap();
            assert_eq!(pair.len(), 2);

            let first_rd = rd_field(pair[0].word);
            let second_rd = rd_field(pair[1].word);
            assert_eq!(first_rd, second_rd);
            assert_ne!(first_rd, 0);
            assert_ne!(
                pair[0].asm.split_whitespace().next(),
                pair[1].asm.split_whitespace().next(),
                "definitions must be sampled without replacement"
            );
        }
    }

    #[test]
    fn basic_block_keeps_control_flow_out_of_the_middle() {
        let branch_opcode = lookup("beq").unwrap().opcode;
        let jump_opcode = lookup("jal").unwrap().opcode;

        for seed in 0..20 {
            let mut generator = seeded(seed);
            let block = generator.basic_block(6).unwrap();
            assert_eq!(block.len(), 6);

            for inner in &block[..5] {
                let opcode = opcode_field(inner.word);
                assert_ne!(opcode, branch_opcode);
                assert_ne!(opcode, jump_opcode);
            }
        }
    }

    #[test]
    fn mixed_returns_exactly_the_requested_count() {
        let mut generator = seeded(9);
        let stream = generator.mixed(7, &PairKind::ALL, 1.0).unwrap();
        assert_eq!(stream.len(), 7);

        let mut generator = seeded(9);
        let stream = generator.mixed(5, &PairKind::ALL, 0.0).unwrap();
        assert_eq!(stream.len(), 5);

        let mut generator = seeded(9);
        let stream = generator.mixed(0, &PairKind::ALL, 0.5).unwrap();
        assert!(stream.is_empty());
    }

    #[test]
    fn mixed_density_is_clamped_not_rejected() {
        let mut generator = seeded(4);
        assert_eq!(generator.mixed(6, &PairKind::ALL, 7.5).unwrap().len(), 6);
        let mut generator = seeded(4);
        assert_eq!(generator.mixed(6, &PairKind::ALL, -3.0).unwrap().len(), 6);
        let mut generator = seeded(4);
        assert_eq!(
            generator.mixed(6, &PairKind::ALL, f64::NAN).unwrap().len(),
            6
        );
    }

    #[test]
    fn loop_shape_brackets_the_body_with_counter_control() {
        let mut generator = seeded(21).with_tracking();
        let stream = generator.loop_shape(3, 2).unwrap();
        assert_eq!(stream.len(), 5);

        assert!(stream[0].asm.starts_with("addi"));
        assert!(stream[0].asm.ends_with(", 3"));
        assert!(stream[3].asm.starts_with("addi"));
        assert!(stream[3].asm.ends_with(", -1"));
        assert!(stream[4].asm.starts_with("bne"));

        // Back branch spans the body plus the decrement.
        let back = extract_immediate(InstructionFormat::B, stream[4].word);
        assert_eq!(back, -12);

        let state = generator.semantic_state().unwrap();
        assert_eq!(state.loop_nesting(), 0);
        assert_eq!(state.branch_target(4), Some(-12));
    }

    #[test]
    fn conditional_shape_branches_over_then_and_jumps_over_else() {
        let mut generator = seeded(13);
        let stream = generator.conditional_shape(2, 2).unwrap();
        assert_eq!(stream.len(), 6);

        let branch_imm = extract_immediate(InstructionFormat::B, stream[0].word);
        assert_eq!(branch_imm, 16);

        assert!(stream[3].asm.starts_with("jal x0"));
        let jump_imm = extract_immediate(InstructionFormat::J, stream[3].word);
        assert_eq!(jump_imm, 12);
    }

    #[test]
    fn memory_sequence_funnels_through_one_base() {
        let lui_opcode = lookup("lui").unwrap().opcode;
        let mut generator = seeded(2);
        let stream = generator.memory_sequence(5).unwrap();
        assert_eq!(stream.len(), 5);

        assert_eq!(opcode_field(stream[0].word), lui_opcode);
        let base = rd_field(stream[0].word);
        assert_ne!(base, 0);

        for access in &stream[1..] {
            assert_eq!(rs1_field(access.word), base);
        }
    }

    #[test]
    fn function_sequence_saves_and_restores_the_frame() {
        let mut generator = seeded(17).with_tracking();
        let stream = generator.function_sequence(1).unwrap();
        assert_eq!(stream.len(), 8);

        assert_eq!(stream[0].asm, "addi x2, x2, -16");
        assert_eq!(stream[1].asm, "sw x1, 12(x2)");
        assert_eq!(stream[2].asm, "sw x8, 8(x2)");
        assert_eq!(stream[6].asm, "addi x2, x2, 16");
        assert_eq!(stream[7].asm, "jalr x0, 0(x1)");

        let state = generator.semantic_state().unwrap();
        assert!(!state.in_function());
        assert_eq!(state.stack_offset(), 0);
        assert!(state.saved_registers().is_empty());
    }

    #[test]
    fn stream_index_advances_with_every_emission() {
        let mut generator = seeded(5).with_tracking();
        let pair = generator.load_store_pair().unwrap();
        assert_eq!(pair.len(), 2);
        assert_eq!(generator.stream_index(), 2);
    }

    #[test]
    fn same_seed_reproduces_the_same_stream() {
        let mut first = seeded(123);
        let mut second = seeded(123);
        let lhs = first.mixed(20, &PairKind::ALL, 0.5).unwrap();
        let rhs = second.mixed(20, &PairKind::ALL, 0.5).unwrap();

        let lhs_words: Vec<u32> = lhs.iter().map(|g| g.word).collect();
        let rhs_words: Vec<u32> = rhs.iter().map(|g| g.word).collect();
        assert_eq!(lhs_words, rhs_words);
    }

    #[test]
    fn comments_appear_when_a_dependency_exists() {
        let add = lookup("add").unwrap();
        let mut generator = seeded(1).with_comments(CommentDetail::Medium);

        let first = generator.emit(add, Operands::new(5, 1, 2, 0));
        assert!(!first.asm.contains('#'));

        let second = generator.emit(add, Operands::new(6, 5, 2, 0));
        assert!(second.asm.contains("# raw on x5 (written at #0)"));
    }

    #[test]
    fn zeroed_weights_steer_every_pattern_class() {
        let mut catalog = Catalog::new();
        for def in isa_core::RV32I {
            if def.name != "lw" && def.name != "sw" {
                catalog.set_weight_by_name(def.name, 0.0).unwrap();
            }
        }
        let mut generator = PatternGenerator::new(catalog, 8);
        let pair = generator.load_store_pair().unwrap();
        assert!(pair[0].asm.starts_with("lw"));
        assert!(pair[1].asm.starts_with("sw"));
    }
}
