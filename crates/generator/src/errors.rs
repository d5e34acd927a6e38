//! Error types for the generator crate.
//!
//! Three classes, mirroring where things can go wrong:
//! - [`PatternError`] for hazard/pair/block emission,
//! - [`SequenceError`] and [`TemplateIssue`] for YAML sequence templates,
//! - [`ConfigFileError`] for run-configuration files and flag values.
//!
//! [`RunError`] is the binary's catch-all; every variant renders as a
//! one-line message suitable for stderr.

use std::path::PathBuf;

use thiserror::Error;

use isa_core::SampleError;

/// Errors raised while emitting instruction patterns.
#[derive(Debug, Error)]
pub enum PatternError {
    /// A weighted draw over the candidate set failed.
    #[error(transparent)]
    Sample(#[from] SampleError),
    /// A fixed-shape pattern needs an instruction the catalog does not carry.
    #[error("instruction '{0}' is missing from the catalog")]
    MissingDefinition(&'static str),
}

/// Errors raised while loading or rendering sequence pattern templates.
#[derive(Debug, Error)]
pub enum SequenceError {
    /// The template file could not be read.
    #[error("failed to read '{path}': {source}")]
    Io {
        /// Path of the template file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The template file is not valid YAML for the expected schema.
    #[error("invalid sequence pattern file: {0}")]
    Parse(#[from] serde_yaml::Error),
    /// A pattern definition failed validation outside any particular step.
    #[error("pattern '{pattern}': {issue}")]
    Pattern {
        /// Name of the offending pattern.
        pattern: String,
        /// What is wrong with it.
        issue: TemplateIssue,
    },
    /// A step inside a pattern failed validation or rendering.
    #[error("pattern '{pattern}' step {step}: {issue}")]
    Step {
        /// Name of the offending pattern.
        pattern: String,
        /// Zero-based step index.
        step: usize,
        /// What is wrong with it.
        issue: TemplateIssue,
    },
    /// A pattern name requested at generation time does not exist.
    #[error("unknown sequence pattern '{0}'")]
    UnknownPattern(String),
    /// Filling between templates with single instructions failed.
    #[error(transparent)]
    Generation(#[from] PatternError),
}

/// Specific problems with a sequence pattern template.
///
/// Carried inside [`SequenceError::Pattern`] and [`SequenceError::Step`],
/// which add the pattern name and step index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateIssue {
    /// Only `instruction` steps are understood.
    #[error("unsupported step type '{0}'")]
    UnsupportedStepType(String),
    /// A step must offer at least one candidate instruction name.
    #[error("no candidate instruction names")]
    NoNames,
    /// A listed instruction name is not in the catalog.
    #[error("unknown instruction '{0}'")]
    UnknownInstruction(String),
    /// Pattern-scoped variables must have type `register`.
    #[error("variable '{name}' has unsupported type '{kind}'")]
    UnsupportedVariableType {
        /// Variable name as declared.
        name: String,
        /// The declared type.
        kind: String,
    },
    /// A register rule references a variable nothing has bound.
    #[error("variable '{0}' is not bound by the pattern or an earlier step")]
    UnboundVariable(String),
    /// A register rule has a type outside the understood set.
    #[error("unsupported register rule type '{0}'")]
    UnsupportedRuleType(String),
    /// A `register` rule needs either `value` or `allowed`.
    #[error("register rule needs 'value' or 'allowed'")]
    IncompleteRegisterRule,
    /// A rule's allowed register list has no usable entries.
    #[error("allowed register list is empty")]
    NoAllowedRegisters,
    /// `same_as` or a variable binding named a field outside rd/rs1/rs2.
    #[error("unknown field '{0}'")]
    UnknownField(String),
    /// `same_as` may only copy a field resolved earlier in rd, rs1, rs2 order.
    #[error("field '{field}' cannot copy '{other}'")]
    SameAsOrder {
        /// Field carrying the rule.
        field: &'static str,
        /// Field the rule points at.
        other: &'static str,
    },
    /// An immediate rule listed no allowed values.
    #[error("allowed immediate list is empty")]
    NoAllowedImmediates,
    /// An immediate range gave only one of its two endpoints.
    #[error("immediate range needs both 'min' and 'max'")]
    PartialImmediateRange,
    /// An immediate range has min above max.
    #[error("immediate range {min}..={max} is inverted")]
    InvertedImmediateRange {
        /// Declared lower bound.
        min: i32,
        /// Declared upper bound.
        max: i32,
    },
    /// Alignment must be at least 1.
    #[error("alignment {0} is not positive")]
    BadAlignment(i32),
    /// A `different_from` rule excluded every candidate register.
    #[error("no registers remain after exclusions")]
    NoCandidatesLeft,
    /// A typed rule is missing the key naming its referent.
    #[error("rule '{rule}' needs '{key}'")]
    MissingRuleKey {
        /// The rule's `type` value.
        rule: &'static str,
        /// The required key.
        key: &'static str,
    },
}

/// Errors raised while assembling the run configuration.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// The config file could not be read.
    #[error("failed to read '{path}': {source}")]
    Io {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The config file is not valid YAML for the expected schema.
    #[error("invalid config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    /// An integer field could not be parsed (decimal or 0x-prefixed hex).
    #[error("invalid integer '{0}'")]
    BadInteger(String),
    /// An offset window entry is not in `base:size` form.
    #[error("offset window '{0}' is not in base:size form")]
    MalformedWindow(String),
    /// Applying the configuration to the catalog failed.
    #[error(transparent)]
    Catalog(#[from] isa_core::ConfigError),
    /// An output format must be hex, bin, asm, hexasm, or all.
    #[error("unknown output format '{0}'")]
    UnknownFormat(String),
    /// A comment detail tier must be none, minimal, medium, or detailed.
    #[error("unknown comment detail '{0}'")]
    UnknownDetail(String),
    /// A pattern mode outside the supported set was requested.
    #[error("unknown pattern mode '{0}'")]
    UnknownPatternMode(String),
    /// A format letter outside R/I/S/B/U/J was requested.
    #[error("unknown instruction format '{0}'")]
    UnknownFormatLetter(String),
    /// The sequence pattern mode needs a template file.
    #[error("pattern mode 'sequence' requires a sequence pattern file")]
    MissingSequenceFile,
}

/// Top-level failure for one generator run.
#[derive(Debug, Error)]
pub enum RunError {
    /// Configuration could not be assembled or applied.
    #[error(transparent)]
    Config(#[from] ConfigFileError),
    /// Pattern generation failed.
    #[error(transparent)]
    Pattern(#[from] PatternError),
    /// Sequence template handling failed.
    #[error(transparent)]
    Sequence(#[from] SequenceError),
    /// The output file could not be written.
    #[error("failed to write '{path}': {source}")]
    Write {
        /// Requested output path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl From<SampleError> for RunError {
    fn from(e: SampleError) -> Self {
        Self::Pattern(PatternError::Sample(e))
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigFileError, PatternError, SequenceError, TemplateIssue};

    #[test]
    fn template_issues_render_with_context() {
        let err = SequenceError::Step {
            pattern: "loop_counter".to_owned(),
            step: 2,
            issue: TemplateIssue::UnboundVariable("counter".to_owned()),
        };
        assert_eq!(
            err.to_string(),
            "pattern 'loop_counter' step 2: variable 'counter' is not bound \
             by the pattern or an earlier step"
        );
    }

    #[test]
    fn pattern_error_is_transparent_over_sampling() {
        let err = PatternError::from(isa_core::SampleError::EmptyCandidates);
        assert_eq!(err.to_string(), "no candidate instructions to sample from");
    }

    #[test]
    fn config_file_errors_name_the_field() {
        assert_eq!(
            ConfigFileError::BadInteger("0xgg".to_owned()).to_string(),
            "invalid integer '0xgg'"
        );
        assert_eq!(
            ConfigFileError::MalformedWindow("1024".to_owned()).to_string(),
            "offset window '1024' is not in base:size form"
        );
    }
}
