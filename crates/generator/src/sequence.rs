//! YAML sequence templates: named multi-step instruction patterns.
//!
//! A document holds templates under a `sequence_patterns` mapping. Each
//! template declares pattern-scoped register variables and an ordered step
//! list; each step names candidate instructions, constrains registers per
//! field and immediates per format class, and may declare step variables
//! that capture its resolved fields for later steps:
//!
//! ```yaml
//! sequence_patterns:
//!   copy_word:
//!     weight: 2.0
//!     variables:
//!       base: { type: register }
//!     steps:
//!       - step_type: instruction
//!         instruction: { names: [lw] }
//!         constraints:
//!           registers:
//!             rd: { type: register, allowed: [5, 6, 7] }
//!             rs1: { type: variable, name: base }
//!           immediates:
//!             i_type: { min: 0, max: 64, alignment: 4 }
//!         variables:
//!           loaded: { type: register, source_field: rd }
//!       - instruction: { names: [sw] }
//!         constraints:
//!           registers:
//!             rs1: { type: variable, name: base }
//!             rs2: { type: variable, name: loaded }
//! ```
//!
//! Everything structural fails at load time with the pattern name and step
//! index attached; rendering can only fail when a `different_from` rule
//! runs out of candidates.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::Deserialize;

use isa_core::{
    lookup, GeneratedInstruction, InstructionDef, InstructionFormat, Operands, RegisterRange,
    ZERO,
};

use crate::errors::{SequenceError, TemplateIssue};
use crate::patterns::PatternGenerator;

fn default_weight() -> f64 {
    1.0
}

fn default_step_kind() -> String {
    "instruction".to_owned()
}

fn default_variable_kind() -> String {
    "register".to_owned()
}

#[derive(Debug, Deserialize)]
struct DocumentSchema {
    #[serde(default)]
    sequence_patterns: BTreeMap<String, PatternSchema>,
}

#[derive(Debug, Deserialize)]
struct PatternSchema {
    #[serde(default)]
    description: Option<String>,
    #[serde(default = "default_weight")]
    weight: f64,
    #[serde(default)]
    min_length: Option<usize>,
    #[serde(default)]
    max_length: Option<usize>,
    #[serde(default)]
    variables: BTreeMap<String, VariableSchema>,
    #[serde(default)]
    steps: Vec<StepSchema>,
}

#[derive(Debug, Deserialize)]
struct VariableSchema {
    #[serde(rename = "type", default = "default_variable_kind")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct StepSchema {
    #[serde(default = "default_step_kind")]
    step_type: String,
    #[serde(default)]
    instruction: InstructionSchema,
    #[serde(default)]
    constraints: ConstraintsSchema,
    #[serde(default)]
    variables: BTreeMap<String, StepVariableSchema>,
}

#[derive(Debug, Deserialize)]
struct InstructionSchema {
    #[serde(default)]
    names: Vec<String>,
    #[serde(default = "default_weight")]
    weight: f64,
}

impl Default for InstructionSchema {
    fn default() -> Self {
        Self {
            names: Vec::new(),
            weight: 1.0,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConstraintsSchema {
    #[serde(default)]
    registers: BTreeMap<String, RegisterRuleSchema>,
    #[serde(default)]
    immediates: BTreeMap<String, ImmediateRuleSchema>,
}

#[derive(Debug, Deserialize)]
struct StepVariableSchema {
    #[serde(rename = "type", default = "default_variable_kind")]
    kind: String,
    source_field: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RegisterRuleSchema {
    Literal(u8),
    Spec(RegisterSpecSchema),
}

#[derive(Debug, Deserialize)]
struct RegisterSpecSchema {
    #[serde(rename = "type", default = "default_variable_kind")]
    kind: String,
    value: Option<u8>,
    allowed: Option<Vec<u8>>,
    #[serde(default)]
    exclude_zero: bool,
    name: Option<String>,
    field: Option<String>,
    #[serde(default)]
    exclude: Vec<ExcludeEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExcludeEntry {
    Register(u8),
    Variable(ExcludeVariableSchema),
}

#[derive(Debug, Deserialize)]
struct ExcludeVariableSchema {
    #[serde(rename = "type")]
    kind: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ImmediateRuleSchema {
    value: Option<i32>,
    allowed_values: Option<Vec<i32>>,
    min: Option<i32>,
    max: Option<i32>,
    alignment: Option<i32>,
}

/// Operand field an instruction step can constrain or bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Field {
    Rd,
    Rs1,
    Rs2,
}

impl Field {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "rd" => Some(Self::Rd),
            "rs1" => Some(Self::Rs1),
            "rs2" => Some(Self::Rs2),
            _ => None,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Rd => "rd",
            Self::Rs1 => "rs1",
            Self::Rs2 => "rs2",
        }
    }
}

/// Register fields resolved so far while rendering one step.
#[derive(Debug, Default, Clone, Copy)]
struct ResolvedFields {
    rd: u8,
    rs1: u8,
    rs2: u8,
}

impl ResolvedFields {
    const fn get(self, field: Field) -> u8 {
        match field {
            Field::Rd => self.rd,
            Field::Rs1 => self.rs1,
            Field::Rs2 => self.rs2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum RegisterRule {
    Absent,
    Fixed(u8),
    Choice(Vec<u8>),
    Variable(String),
    SameAs(Field),
    DifferentFrom {
        allowed: Vec<u8>,
        literals: Vec<u8>,
        variables: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum ImmediateRule {
    Default,
    Fixed(i32),
    Choice(Vec<i32>),
    Range {
        min: i32,
        max: i32,
        alignment: Option<i32>,
    },
}

#[derive(Debug, Clone)]
struct SequenceStep {
    candidates: Vec<&'static InstructionDef>,
    weight: f64,
    rd: RegisterRule,
    rs1: RegisterRule,
    rs2: RegisterRule,
    immediates: Vec<(InstructionFormat, ImmediateRule)>,
    bindings: Vec<(String, Field)>,
}

impl SequenceStep {
    fn immediate_rule(&self, format: InstructionFormat) -> &ImmediateRule {
        self.immediates
            .iter()
            .find(|(class, _)| *class == format)
            .map_or(&ImmediateRule::Default, |(_, rule)| rule)
    }

    fn render(
        &self,
        context: &mut BTreeMap<String, u8>,
        generator: &mut PatternGenerator,
    ) -> Result<GeneratedInstruction, TemplateIssue> {
        let def = {
            let rng = generator.rng_mut();
            self.candidates[rng.gen_range(0..self.candidates.len())]
        };

        let mut resolved = ResolvedFields::default();
        resolved.rd = resolve_register(&self.rd, resolved, context, generator.rng_mut())?;
        resolved.rs1 = resolve_register(&self.rs1, resolved, context, generator.rng_mut())?;
        resolved.rs2 = resolve_register(&self.rs2, resolved, context, generator.rng_mut())?;
        let imm = resolve_immediate(
            self.immediate_rule(def.format),
            def.format,
            generator.rng_mut(),
        );

        let operands = Operands::new(resolved.rd, resolved.rs1, resolved.rs2, imm);
        let generated = generator.emit(def, operands);

        for (name, field) in &self.bindings {
            context.insert(name.clone(), resolved.get(*field));
        }
        Ok(generated)
    }
}

/// One named multi-step template, validated and ready to render.
#[derive(Debug, Clone)]
pub struct SequencePattern {
    name: String,
    description: Option<String>,
    weight: f64,
    min_length: Option<usize>,
    max_length: Option<usize>,
    variables: Vec<String>,
    steps: Vec<SequenceStep>,
}

impl SequencePattern {
    /// The template's name, as keyed in the document.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-form description carried from the document.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Selection weight relative to the other templates.
    #[must_use]
    pub const fn weight(&self) -> f64 {
        self.weight
    }

    /// Declared minimum applicable length; reserved for fitting heuristics.
    #[must_use]
    pub const fn min_length(&self) -> Option<usize> {
        self.min_length
    }

    /// Declared maximum applicable length; reserved for fitting heuristics.
    #[must_use]
    pub const fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    /// Declared per-step instruction weights; candidate selection within a
    /// step is uniform regardless.
    #[must_use]
    pub fn step_weights(&self) -> Vec<f64> {
        self.steps.iter().map(|step| step.weight).collect()
    }

    /// Number of instructions one rendering produces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the template has no steps at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Renders the template into concrete instructions.
    ///
    /// Pattern variables are bound to uniform nonzero registers once per
    /// rendering; step bindings then overwrite the context as the steps
    /// execute.
    ///
    /// # Errors
    ///
    /// Returns a step error when a `different_from` rule runs out of
    /// candidate registers.
    pub fn render(
        &self,
        generator: &mut PatternGenerator,
    ) -> Result<Vec<GeneratedInstruction>, SequenceError> {
        let mut context = BTreeMap::new();
        for variable in &self.variables {
            let register = RegisterRange::NONZERO.sample(generator.rng_mut());
            context.insert(variable.clone(), register);
        }

        let mut out = Vec::with_capacity(self.steps.len());
        for (index, step) in self.steps.iter().enumerate() {
            let rendered =
                step.render(&mut context, generator)
                    .map_err(|issue| SequenceError::Step {
                        pattern: self.name.clone(),
                        step: index,
                        issue,
                    })?;
            out.push(rendered);
        }
        Ok(out)
    }
}

/// A validated set of templates loaded from one YAML document.
#[derive(Debug, Clone, Default)]
pub struct SequenceLibrary {
    patterns: Vec<SequencePattern>,
}

impl SequenceLibrary {
    /// Loads and validates templates from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error naming the path, a parse error, or the first
    /// template error found during validation.
    pub fn from_path(path: &Path) -> Result<Self, SequenceError> {
        let text = std::fs::read_to_string(path).map_err(|source| SequenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    /// Parses and validates templates from YAML text.
    ///
    /// # Errors
    ///
    /// Returns a parse error or the first template error found during
    /// validation.
    pub fn from_yaml(text: &str) -> Result<Self, SequenceError> {
        let document: DocumentSchema = serde_yaml::from_str(text)?;
        let mut patterns = Vec::with_capacity(document.sequence_patterns.len());
        for (name, schema) in document.sequence_patterns {
            patterns.push(compile_pattern(name, &schema)?);
        }
        Ok(Self { patterns })
    }

    /// Every template in the library, sorted by name.
    #[must_use]
    pub fn patterns(&self) -> &[SequencePattern] {
        &self.patterns
    }

    /// Looks a template up by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&SequencePattern> {
        self.patterns.iter().find(|pattern| pattern.name == name)
    }

    /// Resolves requested template names, preserving request order.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::UnknownPattern`] for any name not present
    /// in the library.
    pub fn select(&self, names: &[String]) -> Result<Vec<&SequencePattern>, SequenceError> {
        names
            .iter()
            .map(|name| {
                self.find(name)
                    .ok_or_else(|| SequenceError::UnknownPattern(name.clone()))
            })
            .collect()
    }

    /// Assembles a density-gated stream from the selected templates.
    ///
    /// Each slot either renders a template that still fits the remaining
    /// room (weighted by template weight; zero or negative total weight
    /// falls back to a uniform choice) or takes one weighted single. The
    /// result holds exactly `count` instructions.
    ///
    /// # Errors
    ///
    /// Returns a step error when a template fails to resolve, or a
    /// generation error when single fill cannot sample.
    pub fn stream(
        &self,
        selection: &[&SequencePattern],
        count: usize,
        density: f64,
        generator: &mut PatternGenerator,
    ) -> Result<Vec<GeneratedInstruction>, SequenceError> {
        let density = if density.is_nan() {
            0.0
        } else {
            density.clamp(0.0, 1.0)
        };

        let mut out = Vec::with_capacity(count);
        while out.len() < count {
            let remaining = count - out.len();
            let fitting: Vec<&SequencePattern> = selection
                .iter()
                .copied()
                .filter(|pattern| !pattern.is_empty() && pattern.len() <= remaining)
                .collect();
            if !fitting.is_empty() && generator.rng_mut().gen_bool(density) {
                let pattern = choose_weighted(&fitting, generator.rng_mut());
                out.extend(pattern.render(generator)?);
            } else {
                out.push(generator.single()?);
            }
        }
        out.truncate(count);
        Ok(out)
    }
}

fn choose_weighted<'a, R: Rng + ?Sized>(
    patterns: &[&'a SequencePattern],
    rng: &mut R,
) -> &'a SequencePattern {
    let weights: Vec<f64> = patterns.iter().map(|pattern| pattern.weight).collect();
    match WeightedIndex::new(weights) {
        Ok(distribution) => patterns[distribution.sample(rng)],
        Err(_) => patterns[rng.gen_range(0..patterns.len())],
    }
}

fn compile_pattern(name: String, schema: &PatternSchema) -> Result<SequencePattern, SequenceError> {
    let mut bound = BTreeSet::new();
    let mut variables = Vec::with_capacity(schema.variables.len());
    for (variable, spec) in &schema.variables {
        if spec.kind != "register" {
            return Err(SequenceError::Pattern {
                pattern: name,
                issue: TemplateIssue::UnsupportedVariableType {
                    name: variable.clone(),
                    kind: spec.kind.clone(),
                },
            });
        }
        bound.insert(variable.clone());
        variables.push(variable.clone());
    }

    let mut steps = Vec::with_capacity(schema.steps.len());
    for (index, step) in schema.steps.iter().enumerate() {
        match compile_step(step, &mut bound) {
            Ok(compiled) => steps.push(compiled),
            Err(issue) => {
                return Err(SequenceError::Step {
                    pattern: name,
                    step: index,
                    issue,
                })
            }
        }
    }

    Ok(SequencePattern {
        name,
        description: schema.description.clone(),
        weight: schema.weight,
        min_length: schema.min_length,
        max_length: schema.max_length,
        variables,
        steps,
    })
}

fn compile_step(
    schema: &StepSchema,
    bound: &mut BTreeSet<String>,
) -> Result<SequenceStep, TemplateIssue> {
    if schema.step_type != "instruction" {
        return Err(TemplateIssue::UnsupportedStepType(schema.step_type.clone()));
    }
    if schema.instruction.names.is_empty() {
        return Err(TemplateIssue::NoNames);
    }
    let mut candidates = Vec::with_capacity(schema.instruction.names.len());
    for name in &schema.instruction.names {
        let def = lookup(name).ok_or_else(|| TemplateIssue::UnknownInstruction(name.clone()))?;
        candidates.push(def);
    }

    let mut rd = RegisterRule::Absent;
    let mut rs1 = RegisterRule::Absent;
    let mut rs2 = RegisterRule::Absent;
    for (field_name, rule) in &schema.constraints.registers {
        let Some(field) = Field::parse(field_name) else {
            return Err(TemplateIssue::UnknownField(field_name.clone()));
        };
        let compiled = compile_register_rule(field, rule, bound)?;
        match field {
            Field::Rd => rd = compiled,
            Field::Rs1 => rs1 = compiled,
            Field::Rs2 => rs2 = compiled,
        }
    }

    let mut immediates = Vec::with_capacity(schema.constraints.immediates.len());
    for (class, rule) in &schema.constraints.immediates {
        let Some(format) = format_class(class) else {
            return Err(TemplateIssue::UnknownField(class.clone()));
        };
        immediates.push((format, compile_immediate_rule(rule)?));
    }

    let mut bindings = Vec::with_capacity(schema.variables.len());
    for (name, spec) in &schema.variables {
        if spec.kind != "register" {
            return Err(TemplateIssue::UnsupportedVariableType {
                name: name.clone(),
                kind: spec.kind.clone(),
            });
        }
        let Some(source) = &spec.source_field else {
            return Err(TemplateIssue::MissingRuleKey {
                rule: "variable",
                key: "source_field",
            });
        };
        let Some(field) = Field::parse(source) else {
            return Err(TemplateIssue::UnknownField(source.clone()));
        };
        bindings.push((name.clone(), field));
    }
    // Step variables become visible only after this step renders.
    for (name, _) in &bindings {
        bound.insert(name.clone());
    }

    Ok(SequenceStep {
        candidates,
        weight: schema.instruction.weight,
        rd,
        rs1,
        rs2,
        immediates,
        bindings,
    })
}

fn compile_register_rule(
    field: Field,
    schema: &RegisterRuleSchema,
    bound: &BTreeSet<String>,
) -> Result<RegisterRule, TemplateIssue> {
    let spec = match schema {
        RegisterRuleSchema::Literal(register) => return Ok(RegisterRule::Fixed(*register)),
        RegisterRuleSchema::Spec(spec) => spec,
    };
    match spec.kind.as_str() {
        "register" => {
            if let Some(value) = spec.value {
                return Ok(RegisterRule::Fixed(value));
            }
            let Some(allowed) = &spec.allowed else {
                return Err(TemplateIssue::IncompleteRegisterRule);
            };
            let candidates: Vec<u8> = allowed
                .iter()
                .copied()
                .filter(|&register| !(spec.exclude_zero && register == ZERO))
                .collect();
            if candidates.is_empty() {
                return Err(TemplateIssue::NoAllowedRegisters);
            }
            Ok(RegisterRule::Choice(candidates))
        }
        "variable" => {
            let Some(name) = &spec.name else {
                return Err(TemplateIssue::MissingRuleKey {
                    rule: "variable",
                    key: "name",
                });
            };
            if !bound.contains(name) {
                return Err(TemplateIssue::UnboundVariable(name.clone()));
            }
            Ok(RegisterRule::Variable(name.clone()))
        }
        "same_as" => {
            let Some(other_name) = &spec.field else {
                return Err(TemplateIssue::MissingRuleKey {
                    rule: "same_as",
                    key: "field",
                });
            };
            let Some(other) = Field::parse(other_name) else {
                return Err(TemplateIssue::UnknownField(other_name.clone()));
            };
            if other >= field {
                return Err(TemplateIssue::SameAsOrder {
                    field: field.name(),
                    other: other.name(),
                });
            }
            Ok(RegisterRule::SameAs(other))
        }
        "different_from" => {
            let allowed = match &spec.allowed {
                Some(list) if list.is_empty() => return Err(TemplateIssue::NoAllowedRegisters),
                Some(list) => list.clone(),
                None => (RegisterRange::FULL.min()..=RegisterRange::FULL.max()).collect(),
            };
            let mut literals = Vec::new();
            let mut variables = Vec::new();
            for entry in &spec.exclude {
                match entry {
                    ExcludeEntry::Register(register) => literals.push(*register),
                    ExcludeEntry::Variable(reference) => {
                        if reference.kind != "variable" {
                            return Err(TemplateIssue::UnsupportedRuleType(
                                reference.kind.clone(),
                            ));
                        }
                        if !bound.contains(&reference.name) {
                            return Err(TemplateIssue::UnboundVariable(reference.name.clone()));
                        }
                        variables.push(reference.name.clone());
                    }
                }
            }
            Ok(RegisterRule::DifferentFrom {
                allowed,
                literals,
                variables,
            })
        }
        other => Err(TemplateIssue::UnsupportedRuleType(other.to_owned())),
    }
}

fn compile_immediate_rule(schema: &ImmediateRuleSchema) -> Result<ImmediateRule, TemplateIssue> {
    if let Some(alignment) = schema.alignment {
        if alignment < 1 {
            return Err(TemplateIssue::BadAlignment(alignment));
        }
    }
    if let Some(value) = schema.value {
        return Ok(ImmediateRule::Fixed(value));
    }
    if let Some(values) = &schema.allowed_values {
        if values.is_empty() {
            return Err(TemplateIssue::NoAllowedImmediates);
        }
        return Ok(ImmediateRule::Choice(values.clone()));
    }
    match (schema.min, schema.max) {
        (None, None) => Ok(ImmediateRule::Default),
        (Some(min), Some(max)) => {
            if min > max {
                return Err(TemplateIssue::InvertedImmediateRange { min, max });
            }
            Ok(ImmediateRule::Range {
                min,
                max,
                alignment: schema.alignment,
            })
        }
        _ => Err(TemplateIssue::PartialImmediateRange),
    }
}

fn format_class(key: &str) -> Option<InstructionFormat> {
    match key {
        "i_type" => Some(InstructionFormat::I),
        "s_type" => Some(InstructionFormat::S),
        "b_type" => Some(InstructionFormat::B),
        "u_type" => Some(InstructionFormat::U),
        "j_type" => Some(InstructionFormat::J),
        _ => None,
    }
}

fn resolve_register<R: Rng + ?Sized>(
    rule: &RegisterRule,
    resolved: ResolvedFields,
    context: &BTreeMap<String, u8>,
    rng: &mut R,
) -> Result<u8, TemplateIssue> {
    match rule {
        RegisterRule::Absent => Ok(ZERO),
        RegisterRule::Fixed(register) => Ok(*register),
        RegisterRule::Choice(candidates) => Ok(candidates[rng.gen_range(0..candidates.len())]),
        RegisterRule::Variable(name) => context
            .get(name)
            .copied()
            .ok_or_else(|| TemplateIssue::UnboundVariable(name.clone())),
        RegisterRule::SameAs(field) => Ok(resolved.get(*field)),
        RegisterRule::DifferentFrom {
            allowed,
            literals,
            variables,
        } => {
            let mut excluded = literals.clone();
            for name in variables {
                let register = context
                    .get(name)
                    .copied()
                    .ok_or_else(|| TemplateIssue::UnboundVariable(name.clone()))?;
                excluded.push(register);
            }
            let candidates: Vec<u8> = allowed
                .iter()
                .copied()
                .filter(|register| !excluded.contains(register))
                .collect();
            if candidates.is_empty() {
                return Err(TemplateIssue::NoCandidatesLeft);
            }
            Ok(candidates[rng.gen_range(0..candidates.len())])
        }
    }
}

fn resolve_immediate<R: Rng + ?Sized>(
    rule: &ImmediateRule,
    format: InstructionFormat,
    rng: &mut R,
) -> i32 {
    match rule {
        ImmediateRule::Default => default_immediate(format, rng),
        ImmediateRule::Fixed(value) => *value,
        ImmediateRule::Choice(values) => values[rng.gen_range(0..values.len())],
        ImmediateRule::Range {
            min,
            max,
            alignment,
        } => aligned_sample(*min, *max, *alignment, rng),
    }
}

fn default_immediate<R: Rng + ?Sized>(format: InstructionFormat, rng: &mut R) -> i32 {
    match format {
        InstructionFormat::I | InstructionFormat::S => rng.gen_range(-100..=100),
        InstructionFormat::B => {
            const DISPLACEMENTS: [i32; 10] = [-20, -16, -12, -8, -4, 4, 8, 12, 16, 20];
            DISPLACEMENTS[rng.gen_range(0..DISPLACEMENTS.len())]
        }
        _ => 0,
    }
}

/// Uniform draw from the multiples of `alignment` inside `[min, max]`.
///
/// An empty aligned range resolves to 0.
fn aligned_sample<R: Rng + ?Sized>(
    min: i32,
    max: i32,
    alignment: Option<i32>,
    rng: &mut R,
) -> i32 {
    let Some(step) = alignment else {
        return rng.gen_range(min..=max);
    };
    let lo = min.div_euclid(step) + i32::from(min.rem_euclid(step) != 0);
    let hi = max.div_euclid(step);
    if lo > hi {
        0
    } else {
        rng.gen_range(lo..=hi).saturating_mul(step)
    }
}
