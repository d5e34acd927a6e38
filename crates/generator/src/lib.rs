//! Pattern-driven generation of synthetic RV32I instruction streams.
//!
//! Everything samples through one seeded RNG: the same seed and settings
//! reproduce the same stream byte for byte.

/// Run settings, YAML config files, and catalog assembly.
pub mod config;
pub use config::{FileConfig, FormatWeights, PatternMode, RunConfig};

/// Error taxonomy for patterns, sequences, config files, and runs.
pub mod errors;
pub use errors::{ConfigFileError, PatternError, RunError, SequenceError, TemplateIssue};

/// Output formats and stream-to-text rendering.
pub mod output;
pub use output::{OutputFormat, StreamRenderer};

/// Hazard pairs, blocks, composite shapes, and the emission funnel.
pub mod patterns;
pub use patterns::{PairKind, PatternGenerator};

/// Register, memory, and control-flow history with comment annotation.
pub mod semantic;
pub use semantic::{CommentDetail, CommentGenerator, SemanticState};

/// YAML sequence templates and their interpreter.
pub mod sequence;
pub use sequence::{SequenceLibrary, SequencePattern};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use tempfile as _;
