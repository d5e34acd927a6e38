use thiserror::Error;

/// Errors raised while configuring register ranges, offset windows, or
/// selection weights.
///
/// Configuration is validated eagerly so the sampling paths never have to
/// re-check their inputs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Register range bounds are inverted or leave x0..x31.
    #[error("register range x{min}..=x{max} must satisfy min <= max <= 31")]
    InvalidRegisterRange {
        /// Requested lower bound.
        min: u8,
        /// Requested upper bound.
        max: u8,
    },
    /// The range containing only x0 cannot also exclude x0.
    #[error("register range x0..=x0 cannot exclude the zero register")]
    ZeroOnlyRange,
    /// An offset window was declared with a non-positive size.
    #[error("offset window at base {base} must have a positive size")]
    EmptyOffsetWindow {
        /// Window base offset.
        base: i32,
    },
    /// An offset window extends past the signed 32-bit offset space.
    #[error("offset window {base}:{size} leaves the signed 32-bit offset space")]
    OffsetWindowOverflow {
        /// Window base offset.
        base: i32,
        /// Requested window size.
        size: u32,
    },
    /// Bound-style offset window with min above max.
    #[error("offset window bounds {min}..={max} are inverted")]
    InvertedOffsetBounds {
        /// Requested lower bound.
        min: i32,
        /// Requested upper bound.
        max: i32,
    },
    /// The offset sampler needs at least one window.
    #[error("at least one load/store offset window is required")]
    NoOffsetWindows,
    /// A weight lookup or override named an instruction not in the catalog.
    #[error("unknown instruction '{0}'")]
    UnknownInstruction(String),
    /// Selection weights must be non-negative.
    #[error("selection weight {weight} for {target} is negative")]
    NegativeWeight {
        /// Instruction name or format the weight was aimed at.
        target: String,
        /// Offending weight.
        weight: f64,
    },
}

/// Errors raised when a weighted draw cannot produce a value.
///
/// Sampling never substitutes a different population: an impossible draw is
/// reported to the caller instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SampleError {
    /// The candidate list was empty before weighting was even considered.
    #[error("no candidate instructions to sample from")]
    EmptyCandidates,
    /// Every candidate carries weight zero.
    #[error("total selection weight of the candidate set is zero")]
    ZeroTotalWeight,
}
