//! Run configuration: defaults, YAML config files, and catalog assembly.
//!
//! Settings merge in three layers: built-in defaults, then an optional YAML
//! config file, then explicit command-line flags. A config file uses the
//! long flag names as keys:
//!
//! ```yaml
//! count: 64
//! format: hexasm
//! pattern: mixed
//! pattern_density: 0.5
//! base_address: "0x1000"
//! weights:
//!   r: 2.0
//!   special: 0.0
//! load_store_ranges:
//!   - "0:256"
//!   - [0x1000, 64]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use isa_core::{Catalog, ConfigError, InstructionFormat, OffsetWindow, RegisterRange};

use crate::errors::ConfigFileError;
use crate::output::{OutputFormat, StreamRenderer};
use crate::semantic::CommentDetail;

/// Generation mode selected by `--pattern`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PatternMode {
    /// Weighted random singles.
    #[default]
    Random,
    /// Load/store pairs.
    LoadStore,
    /// Read-after-write pairs.
    Raw,
    /// Write-after-read pairs.
    War,
    /// Write-after-write pairs.
    Waw,
    /// Straight-line block with one optional control-flow closer.
    BasicBlock,
    /// Density-gated mix of every pair kind.
    Mixed,
    /// Counted loop shape.
    Loop,
    /// If/else shape.
    Conditional,
    /// Memory accesses through one base register.
    Memory,
    /// Function prologue, body, and epilogue.
    Function,
    /// YAML sequence templates.
    Sequence,
}

impl FromStr for PatternMode {
    type Err = ConfigFileError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "random" => Ok(Self::Random),
            "load_store" => Ok(Self::LoadStore),
            "raw" => Ok(Self::Raw),
            "war" => Ok(Self::War),
            "waw" => Ok(Self::Waw),
            "basic_block" => Ok(Self::BasicBlock),
            "mixed" => Ok(Self::Mixed),
            "loop" => Ok(Self::Loop),
            "conditional" => Ok(Self::Conditional),
            "memory" => Ok(Self::Memory),
            "function" => Ok(Self::Function),
            "sequence" => Ok(Self::Sequence),
            other => Err(ConfigFileError::UnknownPatternMode(other.to_owned())),
        }
    }
}

/// Per-format selection weight multipliers.
///
/// A weight of exactly 1.0 leaves the catalog untouched; `special` covers
/// ecall and ebreak and wins over the I-format weight for them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormatWeights {
    /// R-format weight.
    pub r: f64,
    /// I-format weight.
    pub i: f64,
    /// S-format weight.
    pub s: f64,
    /// B-format weight.
    pub b: f64,
    /// U-format weight.
    pub u: f64,
    /// J-format weight.
    pub j: f64,
    /// ecall/ebreak weight.
    pub special: f64,
}

impl Default for FormatWeights {
    fn default() -> Self {
        Self {
            r: 1.0,
            i: 1.0,
            s: 1.0,
            b: 1.0,
            u: 1.0,
            j: 1.0,
            special: 1.0,
        }
    }
}

impl FormatWeights {
    /// Applies every non-default weight to the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NegativeWeight`] for weights below zero.
    pub fn apply(&self, catalog: &mut Catalog) -> Result<(), ConfigError> {
        let overrides = [
            (InstructionFormat::R, self.r),
            (InstructionFormat::I, self.i),
            (InstructionFormat::S, self.s),
            (InstructionFormat::B, self.b),
            (InstructionFormat::U, self.u),
            (InstructionFormat::J, self.j),
        ];
        for (format, weight) in overrides {
            if (weight - 1.0).abs() > f64::EPSILON {
                catalog.set_weight_by_format(format, weight)?;
            }
        }
        if (self.special - 1.0).abs() > f64::EPSILON {
            catalog.set_weight_by_name("ecall", self.special)?;
            catalog.set_weight_by_name("ebreak", self.special)?;
        }
        Ok(())
    }

    fn set_by_key(&mut self, key: &str, weight: f64) -> Result<(), ConfigFileError> {
        match key {
            "r" => self.r = weight,
            "i" => self.i = weight,
            "s" => self.s = weight,
            "b" => self.b = weight,
            "u" => self.u = weight,
            "j" => self.j = weight,
            "special" => self.special = weight,
            other => return Err(ConfigFileError::UnknownFormatLetter(other.to_owned())),
        }
        Ok(())
    }
}

/// Effective settings for one generation run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Number of instructions to generate.
    pub count: usize,
    /// Output rendering for the stream.
    pub format: OutputFormat,
    /// Deterministic seed; entropy-seeded when absent.
    pub seed: Option<u64>,
    /// Output file; stdout when absent.
    pub output: Option<PathBuf>,
    /// Generation mode.
    pub pattern: PatternMode,
    /// Pair density for the mixed mode.
    pub pattern_density: f64,
    /// Sequence template document for the sequence mode.
    pub sequence_file: Option<PathBuf>,
    /// Template names to use; the whole library when absent.
    pub sequence_names: Option<Vec<String>>,
    /// Template density for the sequence mode.
    pub sequence_density: f64,
    /// Track semantic state without emitting comments.
    pub semantic_correlation: bool,
    /// Append history comments to the assembly.
    pub semantic_comments: bool,
    /// Requested comment tier; effective only with comments on.
    pub comment_detail: CommentDetail,
    /// Per-format weight multipliers.
    pub weights: FormatWeights,
    /// Lower bound of the default load/store offset window.
    pub offset_min: i32,
    /// Upper bound of the default load/store offset window.
    pub offset_max: i32,
    /// Explicit offset windows; these win over the plain bounds.
    pub offset_windows: Option<Vec<OffsetWindow>>,
    /// Smallest rd the sampler may draw.
    pub rd_min: u8,
    /// Largest rd the sampler may draw.
    pub rd_max: u8,
    /// Smallest rs1 the sampler may draw.
    pub rs1_min: u8,
    /// Largest rs1 the sampler may draw.
    pub rs1_max: u8,
    /// Smallest rs2 the sampler may draw.
    pub rs2_min: u8,
    /// Largest rs2 the sampler may draw.
    pub rs2_max: u8,
    /// Address of the first instruction for PC comments.
    pub base_address: u32,
    /// Append PC comments to assembly-bearing lines.
    pub pc_comments: bool,
    /// Render hexasm's word as a trailing comment, not a leading field.
    pub hex_comments: bool,
    /// Restrict random sampling and fills to one format.
    pub by_format: Option<InstructionFormat>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            count: 10,
            format: OutputFormat::Hex,
            seed: None,
            output: None,
            pattern: PatternMode::Random,
            pattern_density: 0.3,
            sequence_file: None,
            sequence_names: None,
            sequence_density: 0.3,
            semantic_correlation: false,
            semantic_comments: false,
            comment_detail: CommentDetail::Medium,
            weights: FormatWeights::default(),
            offset_min: -2048,
            offset_max: 2047,
            offset_windows: None,
            rd_min: 0,
            rd_max: 31,
            rs1_min: 0,
            rs1_max: 31,
            rs2_min: 0,
            rs2_max: 31,
            base_address: 0,
            pc_comments: false,
            hex_comments: true,
            by_format: None,
        }
    }
}

impl RunConfig {
    /// Builds the catalog this run samples from.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for negative weights, inverted or
    /// invalid register ranges, and unusable offset windows.
    pub fn build_catalog(&self) -> Result<Catalog, ConfigFileError> {
        let mut catalog = Catalog::new();
        self.weights.apply(&mut catalog)?;
        match &self.offset_windows {
            Some(windows) => catalog.set_offset_windows(windows.clone())?,
            None => catalog.set_offset_windows(vec![OffsetWindow::from_bounds(
                self.offset_min,
                self.offset_max,
            )?])?,
        }
        catalog.set_rd_range(RegisterRange::new(self.rd_min, self.rd_max)?);
        catalog.set_rs1_range(RegisterRange::new(self.rs1_min, self.rs1_max)?);
        catalog.set_rs2_range(RegisterRange::new(self.rs2_min, self.rs2_max)?);
        Ok(catalog)
    }

    /// The comment tier the annotator should run at.
    #[must_use]
    pub const fn effective_detail(&self) -> CommentDetail {
        if self.semantic_comments {
            self.comment_detail
        } else {
            CommentDetail::Off
        }
    }

    /// The renderer matching the output settings.
    #[must_use]
    pub const fn renderer(&self) -> StreamRenderer {
        StreamRenderer::new(self.format)
            .with_pc_comments(self.pc_comments)
            .with_hex_comments(self.hex_comments)
            .with_base_address(self.base_address)
    }

    /// Checks cross-field requirements before a run starts.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigFileError::MissingSequenceFile`] when the sequence
    /// mode has no template document.
    pub fn validate(&self) -> Result<(), ConfigFileError> {
        if self.pattern == PatternMode::Sequence && self.sequence_file.is_none() {
            return Err(ConfigFileError::MissingSequenceFile);
        }
        Ok(())
    }

    /// Layers a parsed config file over the current settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for malformed values.
    #[allow(clippy::too_many_lines)]
    pub fn apply_file(&mut self, file: &FileConfig) -> Result<(), ConfigFileError> {
        if let Some(count) = file.count {
            self.count = usize::try_from(count)
                .map_err(|_| ConfigFileError::BadInteger(count.to_string()))?;
        }
        if let Some(format) = &file.format {
            self.format = format.parse()?;
        }
        if let Some(seed) = file.seed {
            self.seed = Some(seed);
        }
        if let Some(output) = &file.output {
            self.output = Some(PathBuf::from(output));
        }
        if let Some(pattern) = &file.pattern {
            self.pattern = pattern.parse()?;
        }
        if let Some(density) = file.pattern_density {
            self.pattern_density = density;
        }
        if let Some(path) = &file.sequence_patterns_file {
            self.sequence_file = Some(PathBuf::from(path));
        }
        if let Some(names) = &file.sequence_patterns {
            self.sequence_names = Some(split_names(names));
        }
        if let Some(density) = file.sequence_density {
            self.sequence_density = density;
        }
        if let Some(enabled) = file.semantic_correlation {
            self.semantic_correlation = enabled;
        }
        if let Some(enabled) = file.semantic_comments {
            self.semantic_comments = enabled;
        }
        if let Some(detail) = &file.comment_detail {
            self.comment_detail = detail.parse()?;
        }
        if let Some(weights) = &file.weights {
            for (key, weight) in weights {
                self.weights.set_by_key(key, *weight)?;
            }
        }
        if let Some(value) = &file.load_store_offset_min {
            self.offset_min = value.to_i32()?;
        }
        if let Some(value) = &file.load_store_offset_max {
            self.offset_max = value.to_i32()?;
        }
        if let Some(ranges) = &file.load_store_ranges {
            self.offset_windows = Some(ranges.resolve()?);
        }
        if let Some(bound) = file.rd_min {
            self.rd_min = bound;
        }
        if let Some(bound) = file.rd_max {
            self.rd_max = bound;
        }
        if let Some(bound) = file.rs1_min {
            self.rs1_min = bound;
        }
        if let Some(bound) = file.rs1_max {
            self.rs1_max = bound;
        }
        if let Some(bound) = file.rs2_min {
            self.rs2_min = bound;
        }
        if let Some(bound) = file.rs2_max {
            self.rs2_max = bound;
        }
        if let Some(value) = &file.base_address {
            let address = value.to_i64()?;
            self.base_address = u32::try_from(address)
                .map_err(|_| ConfigFileError::BadInteger(address.to_string()))?;
        }
        if let Some(enabled) = file.pc_comments {
            self.pc_comments = enabled;
        }
        if let Some(disabled) = file.no_hex_comments {
            self.hex_comments = !disabled;
        }
        if let Some(letter) = &file.by_format {
            self.by_format = Some(parse_format_letter(letter)?);
        }
        Ok(())
    }
}

/// Partial settings parsed from a YAML config file.
///
/// Keys mirror the long command-line flag names. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    count: Option<u64>,
    format: Option<String>,
    seed: Option<u64>,
    output: Option<String>,
    pattern: Option<String>,
    pattern_density: Option<f64>,
    sequence_patterns_file: Option<String>,
    sequence_patterns: Option<String>,
    sequence_density: Option<f64>,
    semantic_correlation: Option<bool>,
    semantic_comments: Option<bool>,
    comment_detail: Option<String>,
    weights: Option<BTreeMap<String, f64>>,
    load_store_offset_min: Option<IntValue>,
    load_store_offset_max: Option<IntValue>,
    load_store_ranges: Option<RangesValue>,
    rd_min: Option<u8>,
    rd_max: Option<u8>,
    rs1_min: Option<u8>,
    rs1_max: Option<u8>,
    rs2_min: Option<u8>,
    rs2_max: Option<u8>,
    base_address: Option<IntValue>,
    pc_comments: Option<bool>,
    no_hex_comments: Option<bool>,
    by_format: Option<String>,
}

impl FileConfig {
    /// Reads and parses a YAML config file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error naming the path or a parse error.
    pub fn from_path(path: &Path) -> Result<Self, ConfigFileError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_yaml::from_str(&text)?)
    }
}

/// An integer that may arrive as a YAML number or a prefixed string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum IntValue {
    Number(i64),
    Text(String),
}

impl IntValue {
    fn to_i64(&self) -> Result<i64, ConfigFileError> {
        match self {
            Self::Number(value) => Ok(*value),
            Self::Text(text) => parse_integer(text),
        }
    }

    fn to_i32(&self) -> Result<i32, ConfigFileError> {
        let value = self.to_i64()?;
        i32::try_from(value).map_err(|_| ConfigFileError::BadInteger(value.to_string()))
    }
}

/// Offset windows as a `base:size` string, a list of such strings, or a
/// list of `[base, size]` pairs.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RangesValue {
    Text(String),
    Entries(Vec<RangeEntry>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RangeEntry {
    Text(String),
    Pair([IntValue; 2]),
}

impl RangesValue {
    fn resolve(&self) -> Result<Vec<OffsetWindow>, ConfigFileError> {
        match self {
            Self::Text(text) => parse_offset_windows(text),
            Self::Entries(entries) => {
                let mut windows = Vec::with_capacity(entries.len());
                for entry in entries {
                    windows.push(entry.resolve()?);
                }
                if windows.is_empty() {
                    return Err(ConfigFileError::MalformedWindow(String::new()));
                }
                Ok(windows)
            }
        }
    }
}

impl RangeEntry {
    fn resolve(&self) -> Result<OffsetWindow, ConfigFileError> {
        match self {
            Self::Text(text) => parse_window_part(text),
            Self::Pair([base, size]) => {
                let base = base.to_i32()?;
                let size = size.to_i64()?;
                let size = u32::try_from(size)
                    .map_err(|_| ConfigFileError::BadInteger(size.to_string()))?;
                Ok(OffsetWindow::new(base, size)?)
            }
        }
    }
}

/// Parses an integer with an optional sign and 0x/0o/0b radix prefix.
///
/// # Errors
///
/// Returns [`ConfigFileError::BadInteger`] for anything else.
pub fn parse_integer(text: &str) -> Result<i64, ConfigFileError> {
    let trimmed = text.trim();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let lower = unsigned.to_ascii_lowercase();
    let (radix, digits) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, rest)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest)
    } else {
        (10, lower.as_str())
    };
    let magnitude = i64::from_str_radix(digits, radix)
        .map_err(|_| ConfigFileError::BadInteger(text.to_owned()))?;
    Ok(if negative { -magnitude } else { magnitude })
}

/// Parses comma-separated `base:size` offset windows.
///
/// # Errors
///
/// Returns [`ConfigFileError::MalformedWindow`] for entries not in
/// `base:size` form and propagates window validation failures.
pub fn parse_offset_windows(text: &str) -> Result<Vec<OffsetWindow>, ConfigFileError> {
    let mut windows = Vec::new();
    for part in text.split(',') {
        windows.push(parse_window_part(part.trim())?);
    }
    Ok(windows)
}

fn parse_window_part(part: &str) -> Result<OffsetWindow, ConfigFileError> {
    let Some((base_text, size_text)) = part.split_once(':') else {
        return Err(ConfigFileError::MalformedWindow(part.to_owned()));
    };
    let base_value = parse_integer(base_text)?;
    let base =
        i32::try_from(base_value).map_err(|_| ConfigFileError::BadInteger(base_text.to_owned()))?;
    let size_value = parse_integer(size_text)?;
    let size =
        u32::try_from(size_value).map_err(|_| ConfigFileError::MalformedWindow(part.to_owned()))?;
    Ok(OffsetWindow::new(base, size)?)
}

/// Parses a single-letter instruction format name.
///
/// # Errors
///
/// Returns [`ConfigFileError::UnknownFormatLetter`] for anything but the
/// six format letters.
pub fn parse_format_letter(text: &str) -> Result<InstructionFormat, ConfigFileError> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) => InstructionFormat::from_letter(letter)
            .ok_or_else(|| ConfigFileError::UnknownFormatLetter(text.to_owned())),
        _ => Err(ConfigFileError::UnknownFormatLetter(text.to_owned())),
    }
}

/// Splits a comma-separated name list, trimming whitespace.
#[must_use]
pub fn split_names(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}
