//! Dataflow and scope tracking for generated streams, plus the comment
//! annotator that turns the tracked history into human-readable notes.
//!
//! The tracker is deliberately dumb: callers decide what to record, and the
//! zero register must be filtered out before recording. Annotation always
//! happens before the instruction is recorded, so a note only ever refers to
//! prior history.

use std::collections::BTreeMap;
use std::str::FromStr;

use isa_core::{abi_name, ImmediateKind, InstructionDef, Operands, ZERO};

use crate::errors::ConfigFileError;

/// Running dataflow and scope model of an emitted instruction stream.
#[derive(Debug, Clone, Default)]
pub struct SemanticState {
    writers: BTreeMap<u8, usize>,
    readers: BTreeMap<u8, Vec<usize>>,
    memory: BTreeMap<u8, Vec<(i32, usize)>>,
    branch_targets: BTreeMap<usize, i32>,
    loop_nesting: u32,
    loop_counter: Option<u8>,
    in_function: bool,
    stack_offset: u32,
    saved: Vec<u8>,
}

impl SemanticState {
    /// Creates an empty tracker.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            writers: BTreeMap::new(),
            readers: BTreeMap::new(),
            memory: BTreeMap::new(),
            branch_targets: BTreeMap::new(),
            loop_nesting: 0,
            loop_counter: None,
            in_function: false,
            stack_offset: 0,
            saved: Vec::new(),
        }
    }

    /// Records that `reg` was written at stream position `index`.
    ///
    /// Also ensures the register has a (possibly empty) reader history, so a
    /// written register is always a known quantity to later queries.
    pub fn record_write(&mut self, reg: u8, index: usize) {
        self.writers.insert(reg, index);
        self.readers.entry(reg).or_default();
    }

    /// Records that `reg` was read at stream position `index`.
    pub fn record_read(&mut self, reg: u8, index: usize) {
        self.readers.entry(reg).or_default().push(index);
    }

    /// Records a load or store through `base` at the given offset.
    pub fn record_memory_access(&mut self, base: u8, offset: i32, index: usize) {
        self.memory.entry(base).or_default().push((offset, index));
    }

    /// Records a branch or jump at `index` with its relative target.
    pub fn record_branch(&mut self, index: usize, target: i32) {
        self.branch_targets.insert(index, target);
    }

    /// Enters a loop scope, optionally naming the counter register.
    ///
    /// Passing `None` keeps whatever counter the enclosing loop declared.
    pub fn enter_loop(&mut self, counter: Option<u8>) {
        self.loop_nesting += 1;
        if counter.is_some() {
            self.loop_counter = counter;
        }
    }

    /// Leaves the innermost loop scope.
    ///
    /// The depth floors at zero, and the counter register is only forgotten
    /// once every loop has been exited.
    pub fn exit_loop(&mut self) {
        self.loop_nesting = self.loop_nesting.saturating_sub(1);
        if self.loop_nesting == 0 {
            self.loop_counter = None;
        }
    }

    /// Enters a function scope with a fresh stack and saved-register record.
    pub fn enter_function(&mut self) {
        self.in_function = true;
        self.stack_offset = 0;
        self.saved.clear();
    }

    /// Leaves the function scope, discarding its stack bookkeeping.
    pub fn exit_function(&mut self) {
        self.in_function = false;
        self.stack_offset = 0;
        self.saved.clear();
    }

    /// Grows the tracked stack frame by `bytes`.
    pub fn allocate_stack(&mut self, bytes: u32) {
        self.stack_offset = self.stack_offset.saturating_add(bytes);
    }

    /// Shrinks the tracked stack frame by `bytes`, flooring at zero.
    pub fn deallocate_stack(&mut self, bytes: u32) {
        self.stack_offset = self.stack_offset.saturating_sub(bytes);
    }

    /// Marks `reg` as saved in the current frame. Idempotent.
    pub fn save_register(&mut self, reg: u8) {
        if !self.saved.contains(&reg) {
            self.saved.push(reg);
        }
    }

    /// Stream position of the most recent write to `reg`, if any.
    #[must_use]
    pub fn last_writer(&self, reg: u8) -> Option<usize> {
        self.writers.get(&reg).copied()
    }

    /// Stream positions that read `reg`, oldest first.
    #[must_use]
    pub fn readers(&self, reg: u8) -> &[usize] {
        self.readers.get(&reg).map_or(&[], Vec::as_slice)
    }

    /// Memory accesses through `base` as (offset, stream position) pairs.
    #[must_use]
    pub fn memory_accesses(&self, base: u8) -> &[(i32, usize)] {
        self.memory.get(&base).map_or(&[], Vec::as_slice)
    }

    /// Relative target recorded for the branch at `index`, if any.
    #[must_use]
    pub fn branch_target(&self, index: usize) -> Option<i32> {
        self.branch_targets.get(&index).copied()
    }

    /// Current loop nesting depth.
    #[must_use]
    pub const fn loop_nesting(&self) -> u32 {
        self.loop_nesting
    }

    /// Counter register of the innermost loop, if one was declared.
    #[must_use]
    pub const fn loop_counter(&self) -> Option<u8> {
        self.loop_counter
    }

    /// Whether the stream is currently inside a function shape.
    #[must_use]
    pub const fn in_function(&self) -> bool {
        self.in_function
    }

    /// Bytes currently allocated on the tracked stack frame.
    #[must_use]
    pub const fn stack_offset(&self) -> u32 {
        self.stack_offset
    }

    /// Registers saved in the current frame, in save order.
    #[must_use]
    pub fn saved_registers(&self) -> &[u8] {
        &self.saved
    }
}

/// Verbosity tier for semantic comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommentDetail {
    /// No comments at all.
    #[default]
    Off,
    /// First detected note only, terse form.
    Minimal,
    /// Up to two notes, each citing the relevant stream position.
    Medium,
    /// Every detected note, spelled out.
    Detailed,
}

impl FromStr for CommentDetail {
    type Err = ConfigFileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" | "off" => Ok(Self::Off),
            "minimal" => Ok(Self::Minimal),
            "medium" => Ok(Self::Medium),
            "detailed" => Ok(Self::Detailed),
            other => Err(ConfigFileError::UnknownDetail(other.to_owned())),
        }
    }
}

/// One detected relationship between the instruction being emitted and the
/// tracked history.
#[derive(Debug, Clone)]
enum Note {
    Raw { reg: u8, at: usize },
    MemReuse { base: u8, at: usize },
    Waw { reg: u8, at: usize },
    War { reg: u8, at: usize },
    Loop { depth: u32, counter: Option<u8> },
    Function { stack: u32, saved: Vec<u8> },
}

impl Note {
    fn terse(&self) -> String {
        match self {
            Self::Raw { reg, .. } => format!("raw on x{reg}"),
            Self::MemReuse { base, .. } => format!("base x{base} reused"),
            Self::Waw { reg, .. } => format!("waw on x{reg}"),
            Self::War { reg, .. } => format!("war on x{reg}"),
            Self::Loop { depth, .. } => format!("loop depth {depth}"),
            Self::Function { .. } => "in function".to_owned(),
        }
    }

    fn standard(&self) -> String {
        match self {
            Self::Raw { reg, at } => format!("raw on x{reg} (written at #{at})"),
            Self::MemReuse { base, at } => {
                format!("base x{base} reused (last access at #{at})")
            }
            Self::Waw { reg, at } => format!("waw on x{reg} (previous write at #{at})"),
            Self::War { reg, at } => format!("war on x{reg} (read at #{at})"),
            Self::Loop { depth, .. } => format!("loop depth {depth}"),
            Self::Function { .. } => "in function".to_owned(),
        }
    }

    fn verbose(&self) -> String {
        match self {
            Self::Raw { reg, at } => {
                format!("read-after-write on x{reg} (written at #{at})")
            }
            Self::MemReuse { base, at } => {
                format!("memory base x{base} reused (last access at #{at})")
            }
            Self::Waw { reg, at } => {
                format!("write-after-write on x{reg} (previous write at #{at})")
            }
            Self::War { reg, at } => {
                format!("write-after-read on x{reg} (read at #{at})")
            }
            Self::Loop { depth, counter } => counter.map_or_else(
                || format!("inside loop depth {depth}"),
                |reg| format!("inside loop depth {depth} (counter x{reg})"),
            ),
            Self::Function { stack, saved } => {
                let mut text = format!("inside function (stack {stack} bytes");
                if !saved.is_empty() {
                    let names: Vec<&str> =
                        saved.iter().map(|reg| abi_name(*reg)).collect();
                    text.push_str(", saved ");
                    text.push_str(&names.join(" "));
                }
                text.push(')');
                text
            }
        }
    }
}

/// Renders optional per-instruction notes from the tracked history.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommentGenerator {
    detail: CommentDetail,
}

impl CommentGenerator {
    /// Creates an annotator at the given detail tier.
    #[must_use]
    pub const fn new(detail: CommentDetail) -> Self {
        Self { detail }
    }

    /// Configured detail tier.
    #[must_use]
    pub const fn detail(self) -> CommentDetail {
        self.detail
    }

    /// Produces a note for the instruction about to be emitted, or `None`
    /// when nothing in the history relates to it.
    ///
    /// Call this before recording the instruction: notes describe prior
    /// stream positions only.
    #[must_use]
    pub fn annotate(
        self,
        state: &SemanticState,
        def: &InstructionDef,
        operands: Operands,
    ) -> Option<String> {
        if self.detail == CommentDetail::Off {
            return None;
        }

        let notes = collect_notes(state, def, operands);
        if notes.is_empty() {
            return None;
        }

        let rendered = match self.detail {
            CommentDetail::Off => return None,
            CommentDetail::Minimal => vec![notes[0].terse()],
            CommentDetail::Medium => notes.iter().take(2).map(Note::standard).collect(),
            CommentDetail::Detailed => notes.iter().map(Note::verbose).collect(),
        };
        Some(rendered.join("; "))
    }
}

/// Gathers notes in priority order: source-register hazards first, then
/// memory history, destination hazards, and finally scope context.
fn collect_notes(state: &SemanticState, def: &InstructionDef, operands: Operands) -> Vec<Note> {
    let mut notes = Vec::new();
    let format = def.format;

    if format.encodes_rs1() && operands.rs1 != ZERO {
        if let Some(at) = state.last_writer(operands.rs1) {
            notes.push(Note::Raw {
                reg: operands.rs1,
                at,
            });
        }
    }
    if format.encodes_rs2() && operands.rs2 != ZERO {
        if let Some(at) = state.last_writer(operands.rs2) {
            notes.push(Note::Raw {
                reg: operands.rs2,
                at,
            });
        }
    }

    if def.immediate == ImmediateKind::MemoryOffset && operands.rs1 != ZERO {
        if let Some((_, at)) = state.memory_accesses(operands.rs1).last() {
            notes.push(Note::MemReuse {
                base: operands.rs1,
                at: *at,
            });
        }
    }

    if format.encodes_rd() && !def.is_bare() && operands.rd != ZERO {
        match (
            state.last_writer(operands.rd),
            state.readers(operands.rd).last(),
        ) {
            (Some(at), _) => notes.push(Note::Waw {
                reg: operands.rd,
                at,
            }),
            (None, Some(at)) => notes.push(Note::War {
                reg: operands.rd,
                at: *at,
            }),
            (None, None) => {}
        }
    }

    if state.loop_nesting() > 0 {
        notes.push(Note::Loop {
            depth: state.loop_nesting(),
            counter: state.loop_counter(),
        });
    }

    if state.in_function() {
        notes.push(Note::Function {
            stack: state.stack_offset(),
            saved: state.saved_registers().to_vec(),
        });
    }

    notes
}

#[cfg(test)]
mod tests {
    use isa_core::lookup;

    use super::{CommentDetail, CommentGenerator, SemanticState};
    use isa_core::Operands;

    #[test]
    fn fresh_state_is_empty() {
        let state = SemanticState::new();
        assert_eq!(state.last_writer(5), None);
        assert!(state.readers(5).is_empty());
        assert!(state.memory_accesses(10).is_empty());
        assert_eq!(state.loop_nesting(), 0);
        assert_eq!(state.loop_counter(), None);
        assert!(!state.in_function());
        assert_eq!(state.stack_offset(), 0);
        assert!(state.saved_registers().is_empty());
    }

    #[test]
    fn write_tracks_last_index_and_opens_reader_history() {
        let mut state = SemanticState::new();
        state.record_write(5, 10);
        assert_eq!(state.last_writer(5), Some(10));
        assert!(state.readers(5).is_empty());

        state.record_write(5, 12);
        assert_eq!(state.last_writer(5), Some(12));
    }

    #[test]
    fn reads_accumulate_in_order() {
        let mut state = SemanticState::new();
        state.record_read(7, 3);
        state.record_read(7, 5);
        assert_eq!(state.readers(7), &[3, 5]);
    }

    #[test]
    fn memory_accesses_accumulate_per_base() {
        let mut state = SemanticState::new();
        state.record_memory_access(10, -4, 2);
        state.record_memory_access(10, 8, 3);
        assert_eq!(state.memory_accesses(10), &[(-4, 2), (8, 3)]);
        assert!(state.memory_accesses(11).is_empty());
    }

    #[test]
    fn loop_scope_nests_and_floors_at_zero() {
        let mut state = SemanticState::new();
        state.enter_loop(Some(5));
        assert_eq!(state.loop_nesting(), 1);
        assert_eq!(state.loop_counter(), Some(5));

        state.enter_loop(Some(7));
        assert_eq!(state.loop_nesting(), 2);
        assert_eq!(state.loop_counter(), Some(7));

        state.exit_loop();
        assert_eq!(state.loop_nesting(), 1);
        assert_eq!(state.loop_counter(), Some(7));

        state.exit_loop();
        assert_eq!(state.loop_nesting(), 0);
        assert_eq!(state.loop_counter(), None);

        state.exit_loop();
        assert_eq!(state.loop_nesting(), 0);
    }

    #[test]
    fn nested_enter_without_counter_keeps_the_outer_one() {
        let mut state = SemanticState::new();
        state.enter_loop(Some(9));
        state.enter_loop(None);
        assert_eq!(state.loop_nesting(), 2);
        assert_eq!(state.loop_counter(), Some(9));
    }

    #[test]
    fn function_scope_resets_stack_bookkeeping() {
        let mut state = SemanticState::new();
        state.enter_function();
        assert!(state.in_function());
        assert_eq!(state.stack_offset(), 0);

        state.allocate_stack(16);
        assert_eq!(state.stack_offset(), 16);
        state.save_register(5);
        state.save_register(5);
        assert_eq!(state.saved_registers(), &[5]);

        state.deallocate_stack(32);
        assert_eq!(state.stack_offset(), 0);

        state.exit_function();
        assert!(!state.in_function());
        assert_eq!(state.stack_offset(), 0);
        assert!(state.saved_registers().is_empty());
    }

    #[test]
    fn branch_targets_are_recorded_by_index() {
        let mut state = SemanticState::new();
        state.record_branch(4, -8);
        assert_eq!(state.branch_target(4), Some(-8));
        assert_eq!(state.branch_target(5), None);
    }

    #[test]
    fn off_tier_never_produces_notes() {
        let mut state = SemanticState::new();
        state.record_write(5, 0);

        let annotator = CommentGenerator::new(CommentDetail::Off);
        let add = lookup("add").unwrap();
        let note = annotator.annotate(&state, add, Operands::new(6, 5, 7, 0));
        assert_eq!(note, None);
    }

    #[test]
    fn minimal_tier_reports_the_first_hazard_tersely() {
        let mut state = SemanticState::new();
        state.record_write(5, 3);

        let annotator = CommentGenerator::new(CommentDetail::Minimal);
        let add = lookup("add").unwrap();
        let note = annotator.annotate(&state, add, Operands::new(6, 5, 7, 0));
        assert_eq!(note.as_deref(), Some("raw on x5"));
    }

    #[test]
    fn medium_tier_cites_the_writing_position() {
        let mut state = SemanticState::new();
        state.record_write(5, 3);

        let annotator = CommentGenerator::new(CommentDetail::Medium);
        let add = lookup("add").unwrap();
        let note = annotator.annotate(&state, add, Operands::new(6, 5, 7, 0));
        assert_eq!(note.as_deref(), Some("raw on x5 (written at #3)"));
    }

    #[test]
    fn medium_tier_caps_at_two_notes() {
        let mut state = SemanticState::new();
        state.record_write(5, 1);
        state.record_write(7, 2);
        state.record_write(6, 0);

        let annotator = CommentGenerator::new(CommentDetail::Medium);
        let add = lookup("add").unwrap();
        // rs1, rs2, and rd all collide with history; only two notes survive.
        let note = annotator
            .annotate(&state, add, Operands::new(6, 5, 7, 0))
            .unwrap();
        assert_eq!(note.matches(';').count(), 1);
        assert!(note.contains("raw on x5 (written at #1)"));
        assert!(note.contains("raw on x7 (written at #2)"));
    }

    #[test]
    fn detailed_tier_spells_out_every_note() {
        let mut state = SemanticState::new();
        state.record_write(5, 1);
        state.record_write(6, 0);
        state.enter_loop(Some(9));

        let annotator = CommentGenerator::new(CommentDetail::Detailed);
        let add = lookup("add").unwrap();
        let note = annotator
            .annotate(&state, add, Operands::new(6, 5, 7, 0))
            .unwrap();
        assert!(note.contains("read-after-write on x5 (written at #1)"));
        assert!(note.contains("write-after-write on x6 (previous write at #0)"));
        assert!(note.contains("inside loop depth 1 (counter x9)"));
    }

    #[test]
    fn war_is_reported_when_the_destination_was_only_read() {
        let mut state = SemanticState::new();
        state.record_read(6, 4);

        let annotator = CommentGenerator::new(CommentDetail::Medium);
        let add = lookup("add").unwrap();
        let note = annotator.annotate(&state, add, Operands::new(6, 1, 2, 0));
        assert_eq!(note.as_deref(), Some("war on x6 (read at #4)"));
    }

    #[test]
    fn memory_reuse_is_reported_for_loads() {
        let mut state = SemanticState::new();
        state.record_memory_access(10, 4, 2);

        let annotator = CommentGenerator::new(CommentDetail::Medium);
        let lw = lookup("lw").unwrap();
        let note = annotator.annotate(&state, lw, Operands::new(5, 10, 0, 8));
        assert_eq!(
            note.as_deref(),
            Some("base x10 reused (last access at #2)")
        );
    }

    #[test]
    fn zero_register_operands_never_generate_hazard_notes() {
        let mut state = SemanticState::new();
        state.record_write(1, 0);

        let annotator = CommentGenerator::new(CommentDetail::Detailed);
        let add = lookup("add").unwrap();
        // All-zero operands touch nothing the history knows about.
        let note = annotator.annotate(&state, add, Operands::ZERO);
        assert_eq!(note, None);
    }

    #[test]
    fn function_note_lists_saved_registers_by_abi_name() {
        let mut state = SemanticState::new();
        state.enter_function();
        state.allocate_stack(16);
        state.save_register(isa_core::RA);

        let annotator = CommentGenerator::new(CommentDetail::Detailed);
        let add = lookup("add").unwrap();
        let note = annotator
            .annotate(&state, add, Operands::new(6, 1, 2, 0))
            .unwrap();
        assert!(note.contains("inside function (stack 16 bytes, saved ra)"));
    }

    #[test]
    fn detail_tiers_parse_from_flag_values() {
        assert_eq!("none".parse::<CommentDetail>().unwrap(), CommentDetail::Off);
        assert_eq!(
            "minimal".parse::<CommentDetail>().unwrap(),
            CommentDetail::Minimal
        );
        assert_eq!(
            "medium".parse::<CommentDetail>().unwrap(),
            CommentDetail::Medium
        );
        assert_eq!(
            "detailed".parse::<CommentDetail>().unwrap(),
            CommentDetail::Detailed
        );
        assert!("loud".parse::<CommentDetail>().is_err());
    }
}
