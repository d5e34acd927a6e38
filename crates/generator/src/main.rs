//! `rvgen` command-line front end for the instruction stream generator.

use std::env;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::PathBuf;

use generator::config::{
    parse_format_letter, parse_integer, parse_offset_windows, split_names, FileConfig, PatternMode,
    RunConfig,
};
use generator::errors::{ConfigFileError, RunError};
use generator::output::OutputFormat;
use generator::patterns::{PairKind, PatternGenerator};
use generator::semantic::CommentDetail;
use generator::sequence::{SequenceLibrary, SequencePattern};
use isa_core::{
    of_format, GeneratedInstruction, InstructionDef, InstructionFormat, OffsetWindow, RV32I,
};
use rand as _;
use rand_chacha as _;
use serde as _;
use serde_yaml as _;
use thiserror as _;
#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
#[cfg(test)]
use tempfile as _;

const USAGE_TEXT: &str = "\
Usage: rvgen [options]

Generate a synthetic RV32I instruction stream.

Generation:
  -n, --count <n>            Number of instructions to generate (default: 10)
  -s, --seed <n>             Seed the generator for a reproducible stream
      --pattern <mode>       random, load_store, raw, war, waw, basic_block,
                             mixed, loop, conditional, memory, function, sequence
      --pattern-density <p>  Pair share of the mixed mode (default: 0.3)
      --by-format <letter>   Keep random picks and fills to one format (R..J)

Output:
  -f, --format <fmt>         hex, bin, asm, hexasm, all (default: hex)
  -o, --output <file>        Write the stream to a file instead of stdout
      --base-address <addr>  Address of the first instruction (default: 0)
      --pc-comments          Append a PC comment to assembly lines
      --no-hex-comments      Lead hexasm lines with the word instead

Selection weights:
      --weight-r <w>  --weight-i <w>  --weight-s <w>  --weight-b <w>
      --weight-u <w>  --weight-j <w>  --weight-special <w>

Operands:
      --rd-min <n>   --rd-max <n>   --rs1-min <n>  --rs1-max <n>
      --rs2-min <n>  --rs2-max <n>
      --load-store-offset-min <n>  --load-store-offset-max <n>
      --load-store-ranges <base:size,...>

Sequence templates:
      --sequence-patterns-file <file>  YAML template document
      --sequence-patterns <names>      Comma-separated template names
      --sequence-density <p>           Template share of the stream (default: 0.3)

Semantics:
      --semantic-correlation  Track register, memory, and branch history
      --semantic-comments     Annotate assembly from that history
      --comment-detail <t>    minimal, medium, detailed (default: medium)

Misc:
      --config <file>         YAML config file; explicit flags override it
      --list-instructions     List the catalog and exit
  -h, --help                  Show this help

Examples:
  rvgen -n 32 -f hexasm -s 7
  rvgen --pattern mixed --pattern-density 0.5 -n 64 -f asm --pc-comments
  rvgen --pattern sequence --sequence-patterns-file templates.yaml -n 40
";

/// Iterations hard-wired into the loop pattern's counter setup.
const LOOP_ITERATIONS: i32 = 3;

/// Flags given explicitly on the command line.
///
/// Every value is optional so that the run can tell an explicit flag apart
/// from a config file entry; explicit flags win.
#[derive(Debug, Default)]
struct CliArgs {
    config: Option<PathBuf>,
    list_instructions: bool,
    count: Option<usize>,
    format: Option<OutputFormat>,
    seed: Option<u64>,
    output: Option<PathBuf>,
    pattern: Option<PatternMode>,
    pattern_density: Option<f64>,
    by_format: Option<InstructionFormat>,
    base_address: Option<u32>,
    pc_comments: bool,
    no_hex_comments: bool,
    weights: Vec<(&'static str, f64)>,
    rd_min: Option<u8>,
    rd_max: Option<u8>,
    rs1_min: Option<u8>,
    rs1_max: Option<u8>,
    rs2_min: Option<u8>,
    rs2_max: Option<u8>,
    offset_min: Option<i32>,
    offset_max: Option<i32>,
    offset_windows: Option<Vec<OffsetWindow>>,
    sequence_file: Option<PathBuf>,
    sequence_names: Option<Vec<String>>,
    sequence_density: Option<f64>,
    semantic_correlation: bool,
    semantic_comments: bool,
    comment_detail: Option<CommentDetail>,
}

impl CliArgs {
    /// Layers the explicit flags over defaults and config file values.
    #[allow(clippy::too_many_lines)]
    fn apply_to(&self, config: &mut RunConfig) {
        if let Some(count) = self.count {
            config.count = count;
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(output) = &self.output {
            config.output = Some(output.clone());
        }
        if let Some(pattern) = self.pattern {
            config.pattern = pattern;
        }
        if let Some(density) = self.pattern_density {
            config.pattern_density = density;
        }
        if let Some(format) = self.by_format {
            config.by_format = Some(format);
        }
        if let Some(address) = self.base_address {
            config.base_address = address;
        }
        if self.pc_comments {
            config.pc_comments = true;
        }
        if self.no_hex_comments {
            config.hex_comments = false;
        }
        for (key, weight) in &self.weights {
            match *key {
                "r" => config.weights.r = *weight,
                "i" => config.weights.i = *weight,
                "s" => config.weights.s = *weight,
                "b" => config.weights.b = *weight,
                "u" => config.weights.u = *weight,
                "j" => config.weights.j = *weight,
                _ => config.weights.special = *weight,
            }
        }
        if let Some(min) = self.rd_min {
            config.rd_min = min;
        }
        if let Some(max) = self.rd_max {
            config.rd_max = max;
        }
        if let Some(min) = self.rs1_min {
            config.rs1_min = min;
        }
        if let Some(max) = self.rs1_max {
            config.rs1_max = max;
        }
        if let Some(min) = self.rs2_min {
            config.rs2_min = min;
        }
        if let Some(max) = self.rs2_max {
            config.rs2_max = max;
        }
        if let Some(min) = self.offset_min {
            config.offset_min = min;
        }
        if let Some(max) = self.offset_max {
            config.offset_max = max;
        }
        if let Some(windows) = &self.offset_windows {
            config.offset_windows = Some(windows.clone());
        }
        if let Some(path) = &self.sequence_file {
            config.sequence_file = Some(path.clone());
        }
        if let Some(names) = &self.sequence_names {
            config.sequence_names = Some(names.clone());
        }
        if let Some(density) = self.sequence_density {
            config.sequence_density = density;
        }
        if self.semantic_correlation {
            config.semantic_correlation = true;
        }
        if self.semantic_comments {
            config.semantic_comments = true;
        }
        if let Some(detail) = self.comment_detail {
            config.comment_detail = detail;
        }
    }
}

#[derive(Debug)]
enum ParseResult {
    Run(Box<CliArgs>),
    Help,
}

#[allow(clippy::while_let_on_iterator, clippy::too_many_lines)]
fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let mut parsed = CliArgs::default();
    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Ok(ParseResult::Help);
        }
        if arg == "--list-instructions" {
            parsed.list_instructions = true;
            continue;
        }
        if arg == "--pc-comments" {
            parsed.pc_comments = true;
            continue;
        }
        if arg == "--no-hex-comments" {
            parsed.no_hex_comments = true;
            continue;
        }
        if arg == "--semantic-correlation" {
            parsed.semantic_correlation = true;
            continue;
        }
        if arg == "--semantic-comments" {
            parsed.semantic_comments = true;
            continue;
        }
        if arg == "--config" {
            parsed.config = Some(PathBuf::from(next_raw(&mut args, "--config")?));
            continue;
        }
        if arg == "-o" || arg == "--output" {
            parsed.output = Some(PathBuf::from(next_raw(&mut args, "--output")?));
            continue;
        }
        if arg == "--sequence-patterns-file" {
            let path = next_raw(&mut args, "--sequence-patterns-file")?;
            parsed.sequence_file = Some(PathBuf::from(path));
            continue;
        }
        if arg == "-n" || arg == "--count" {
            let value = next_text(&mut args, "--count")?;
            parsed.count = Some(
                value
                    .parse()
                    .map_err(|_| format!("invalid count '{value}'"))?,
            );
            continue;
        }
        if arg == "-s" || arg == "--seed" {
            let value = next_text(&mut args, "--seed")?;
            parsed.seed = Some(
                value
                    .parse()
                    .map_err(|_| format!("invalid seed '{value}'"))?,
            );
            continue;
        }
        if arg == "-f" || arg == "--format" {
            let value = next_text(&mut args, "--format")?;
            let format = value
                .parse::<OutputFormat>()
                .map_err(|error| error.to_string())?;
            parsed.format = Some(format);
            continue;
        }
        if arg == "--pattern" {
            let value = next_text(&mut args, "--pattern")?;
            let mode = value
                .parse::<PatternMode>()
                .map_err(|error| error.to_string())?;
            parsed.pattern = Some(mode);
            continue;
        }
        if arg == "--pattern-density" {
            parsed.pattern_density = Some(parse_density(&mut args, "--pattern-density")?);
            continue;
        }
        if arg == "--sequence-density" {
            parsed.sequence_density = Some(parse_density(&mut args, "--sequence-density")?);
            continue;
        }
        if arg == "--sequence-patterns" {
            let value = next_text(&mut args, "--sequence-patterns")?;
            parsed.sequence_names = Some(split_names(&value));
            continue;
        }
        if arg == "--by-format" {
            let value = next_text(&mut args, "--by-format")?;
            let format = parse_format_letter(&value).map_err(|error| error.to_string())?;
            parsed.by_format = Some(format);
            continue;
        }
        if arg == "--comment-detail" {
            let value = next_text(&mut args, "--comment-detail")?;
            let detail = value
                .parse::<CommentDetail>()
                .map_err(|error| error.to_string())?;
            parsed.comment_detail = Some(detail);
            continue;
        }
        if arg == "--base-address" {
            let value = next_text(&mut args, "--base-address")?;
            let address = parse_integer(&value).map_err(|error| error.to_string())?;
            parsed.base_address = Some(
                u32::try_from(address).map_err(|_| format!("invalid base address '{value}'"))?,
            );
            continue;
        }
        if arg == "--load-store-offset-min" {
            parsed.offset_min = Some(parse_offset(&mut args, "--load-store-offset-min")?);
            continue;
        }
        if arg == "--load-store-offset-max" {
            parsed.offset_max = Some(parse_offset(&mut args, "--load-store-offset-max")?);
            continue;
        }
        if arg == "--load-store-ranges" {
            let value = next_text(&mut args, "--load-store-ranges")?;
            let windows = parse_offset_windows(&value).map_err(|error| error.to_string())?;
            parsed.offset_windows = Some(windows);
            continue;
        }
        if arg == "--rd-min" {
            parsed.rd_min = Some(parse_register(&mut args, "--rd-min")?);
            continue;
        }
        if arg == "--rd-max" {
            parsed.rd_max = Some(parse_register(&mut args, "--rd-max")?);
            continue;
        }
        if arg == "--rs1-min" {
            parsed.rs1_min = Some(parse_register(&mut args, "--rs1-min")?);
            continue;
        }
        if arg == "--rs1-max" {
            parsed.rs1_max = Some(parse_register(&mut args, "--rs1-max")?);
            continue;
        }
        if arg == "--rs2-min" {
            parsed.rs2_min = Some(parse_register(&mut args, "--rs2-min")?);
            continue;
        }
        if arg == "--rs2-max" {
            parsed.rs2_max = Some(parse_register(&mut args, "--rs2-max")?);
            continue;
        }
        if let Some(key) = weight_flag(&arg) {
            let value = next_text(&mut args, &format!("--weight-{key}"))?;
            let weight = value
                .parse()
                .map_err(|_| format!("invalid weight '{value}'"))?;
            parsed.weights.push((key, weight));
            continue;
        }
        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }
        return Err(format!("unexpected argument: {}", arg.to_string_lossy()));
    }
    Ok(ParseResult::Run(Box::new(parsed)))
}

fn next_raw(args: &mut impl Iterator<Item = OsString>, flag: &str) -> Result<OsString, String> {
    args.next()
        .ok_or_else(|| format!("missing value for {flag}"))
}

fn next_text(args: &mut impl Iterator<Item = OsString>, flag: &str) -> Result<String, String> {
    Ok(next_raw(args, flag)?.to_string_lossy().into_owned())
}

fn parse_density(args: &mut impl Iterator<Item = OsString>, flag: &str) -> Result<f64, String> {
    let value = next_text(args, flag)?;
    value
        .parse()
        .map_err(|_| format!("invalid value for {flag}: '{value}'"))
}

fn parse_register(args: &mut impl Iterator<Item = OsString>, flag: &str) -> Result<u8, String> {
    let value = next_text(args, flag)?;
    value
        .parse()
        .map_err(|_| format!("invalid register '{value}' for {flag}"))
}

fn parse_offset(args: &mut impl Iterator<Item = OsString>, flag: &str) -> Result<i32, String> {
    let value = next_text(args, flag)?;
    let offset = parse_integer(&value).map_err(|error| error.to_string())?;
    i32::try_from(offset).map_err(|_| format!("offset '{value}' is out of range"))
}

fn weight_flag(arg: &OsStr) -> Option<&'static str> {
    const KEYS: [&str; 7] = ["r", "i", "s", "b", "u", "j", "special"];
    let text = arg.to_str()?;
    let key = text.strip_prefix("--weight-")?;
    KEYS.iter().find(|&&candidate| candidate == key).copied()
}

fn run(args: &CliArgs) -> Result<(), i32> {
    match execute(args) {
        Ok(()) => Ok(()),
        Err(error) => {
            eprintln!("error: {error}");
            Err(1)
        }
    }
}

fn execute(args: &CliArgs) -> Result<(), RunError> {
    let mut config = RunConfig::default();
    if let Some(path) = &args.config {
        config.apply_file(&FileConfig::from_path(path)?)?;
    }
    args.apply_to(&mut config);

    if args.list_instructions {
        list_catalog(config.by_format);
        return Ok(());
    }
    config.validate()?;

    let catalog = config.build_catalog()?;
    let mut generator = match config.seed {
        Some(seed) => PatternGenerator::new(catalog, seed),
        None => PatternGenerator::from_entropy(catalog),
    };
    if config.semantic_comments {
        generator = generator.with_comments(config.effective_detail());
    }
    if config.semantic_correlation {
        generator = generator.with_tracking();
    }

    let stream = generate_stream(&config, &mut generator)?;
    let lines = config.renderer().render(&stream);
    write_output(&config, &lines)
}

fn list_catalog(by_format: Option<InstructionFormat>) {
    let definitions: Vec<&'static InstructionDef> =
        by_format.map_or_else(|| RV32I.iter().collect(), of_format);
    println!("Total instructions: {}", definitions.len());
    for def in definitions {
        println!(
            "  {:<8} {:<4} opcode={:07b}",
            def.name,
            def.format.letter(),
            def.opcode
        );
    }
}

fn generate_stream(
    config: &RunConfig,
    generator: &mut PatternGenerator,
) -> Result<Vec<GeneratedInstruction>, RunError> {
    let count = config.count;
    let mut stream = match config.pattern {
        PatternMode::Random => {
            let mut out = Vec::with_capacity(count);
            fill(config, generator, &mut out, count)?;
            out
        }
        PatternMode::LoadStore => paired(config, generator, count, PairKind::LoadStore)?,
        PatternMode::Raw => paired(config, generator, count, PairKind::Raw)?,
        PatternMode::War => paired(config, generator, count, PairKind::War)?,
        PatternMode::Waw => paired(config, generator, count, PairKind::Waw)?,
        PatternMode::BasicBlock => generator.basic_block(count)?,
        PatternMode::Mixed => generator.mixed(count, &PairKind::ALL, config.pattern_density)?,
        PatternMode::Loop => {
            let body = count.saturating_sub(3).max(1);
            let mut out = generator.loop_shape(LOOP_ITERATIONS, body)?;
            fill(config, generator, &mut out, count)?;
            out
        }
        PatternMode::Conditional => {
            let then_size = (count / 2).saturating_sub(1).max(1);
            let else_size = count.saturating_sub(then_size + 2).max(1);
            let mut out = generator.conditional_shape(then_size, else_size)?;
            fill(config, generator, &mut out, count)?;
            out
        }
        PatternMode::Memory => generator.memory_sequence(count)?,
        PatternMode::Function => {
            let body = count.saturating_sub(8).max(1);
            let mut out = generator.function_sequence(body)?;
            fill(config, generator, &mut out, count)?;
            out
        }
        PatternMode::Sequence => sequences(config, generator, count)?,
    };
    stream.truncate(count);
    Ok(stream)
}

fn paired(
    config: &RunConfig,
    generator: &mut PatternGenerator,
    count: usize,
    kind: PairKind,
) -> Result<Vec<GeneratedInstruction>, RunError> {
    let mut out = Vec::with_capacity(count);
    for _ in 0..count / 2 {
        let pair = match kind {
            PairKind::LoadStore => generator.load_store_pair()?,
            PairKind::Raw => generator.raw_hazard()?,
            PairKind::War => generator.war_hazard()?,
            PairKind::Waw => generator.waw_hazard()?,
        };
        out.extend(pair);
    }
    fill(config, generator, &mut out, count)?;
    Ok(out)
}

/// Tops a stream up to `count` with weighted singles, honoring `--by-format`.
fn fill(
    config: &RunConfig,
    generator: &mut PatternGenerator,
    stream: &mut Vec<GeneratedInstruction>,
    count: usize,
) -> Result<(), RunError> {
    let candidates = config.by_format.map(of_format);
    while stream.len() < count {
        let single = match &candidates {
            Some(list) => generator.single_from(list)?,
            None => generator.single()?,
        };
        stream.push(single);
    }
    Ok(())
}

fn sequences(
    config: &RunConfig,
    generator: &mut PatternGenerator,
    count: usize,
) -> Result<Vec<GeneratedInstruction>, RunError> {
    let Some(path) = &config.sequence_file else {
        return Err(ConfigFileError::MissingSequenceFile.into());
    };
    let library = SequenceLibrary::from_path(path)?;
    let selection: Vec<&SequencePattern> = match &config.sequence_names {
        Some(names) => library.select(names)?,
        None => library.patterns().iter().collect(),
    };
    Ok(library.stream(&selection, count, config.sequence_density, generator)?)
}

fn write_output(config: &RunConfig, lines: &[String]) -> Result<(), RunError> {
    let text = lines.join("\n");
    match &config.output {
        Some(path) => {
            fs::write(path, format!("{text}\n")).map_err(|source| RunError::Write {
                path: path.clone(),
                source,
            })?;
            println!("Generated {} instructions to {}", lines.len(), path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Run(args)) => match run(&args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!("{USAGE_TEXT}");
            1
        }
    };
    std::process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(flags: &[&str]) -> CliArgs {
        let args = flags.iter().map(|flag| OsString::from(*flag));
        match parse_args(args).expect("flags should parse") {
            ParseResult::Run(parsed) => *parsed,
            ParseResult::Help => panic!("unexpected help result"),
        }
    }

    fn parse_err(flags: &[&str]) -> String {
        let args = flags.iter().map(|flag| OsString::from(*flag));
        parse_args(args).expect_err("flags should be rejected")
    }

    #[test]
    fn parses_generation_flags() {
        let args = parse_ok(&[
            "-n",
            "32",
            "-f",
            "hexasm",
            "-s",
            "7",
            "--pattern",
            "mixed",
            "--pattern-density",
            "0.8",
        ]);
        assert_eq!(args.count, Some(32));
        assert_eq!(args.format, Some(OutputFormat::HexAsm));
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.pattern, Some(PatternMode::Mixed));
        let density = args.pattern_density.expect("density should be set");
        assert!((density - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_weight_flags() {
        let args = parse_ok(&["--weight-r", "2.5", "--weight-special", "0"]);
        assert_eq!(args.weights.len(), 2);
        assert_eq!(args.weights[0].0, "r");
        assert!((args.weights[0].1 - 2.5).abs() < f64::EPSILON);
        assert_eq!(args.weights[1].0, "special");
        assert!(args.weights[1].1.abs() < f64::EPSILON);
    }

    #[test]
    fn parses_operand_flags() {
        let args = parse_ok(&[
            "--rd-min",
            "1",
            "--rs2-max",
            "15",
            "--load-store-offset-min",
            "-0x10",
            "--load-store-ranges",
            "0:16,0x100:8",
        ]);
        assert_eq!(args.rd_min, Some(1));
        assert_eq!(args.rs2_max, Some(15));
        assert_eq!(args.offset_min, Some(-16));
        let windows = args.offset_windows.expect("windows should be set");
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[1].min(), 0x100);
    }

    #[test]
    fn parses_sequence_and_semantic_flags() {
        let args = parse_ok(&[
            "--pattern",
            "sequence",
            "--sequence-patterns-file",
            "templates.yaml",
            "--sequence-patterns",
            "copy_word, counted_loop",
            "--sequence-density",
            "0.6",
            "--semantic-comments",
            "--comment-detail",
            "detailed",
        ]);
        assert_eq!(args.sequence_file, Some(PathBuf::from("templates.yaml")));
        assert_eq!(
            args.sequence_names,
            Some(vec!["copy_word".to_owned(), "counted_loop".to_owned()])
        );
        assert!(args.semantic_comments);
        assert_eq!(args.comment_detail, Some(CommentDetail::Detailed));
    }

    #[test]
    fn parses_output_flags() {
        let args = parse_ok(&[
            "-o",
            "stream.txt",
            "--base-address",
            "0x1000",
            "--pc-comments",
            "--no-hex-comments",
            "--by-format",
            "r",
        ]);
        assert_eq!(args.output, Some(PathBuf::from("stream.txt")));
        assert_eq!(args.base_address, Some(0x1000));
        assert!(args.pc_comments);
        assert!(args.no_hex_comments);
        assert_eq!(args.by_format, Some(InstructionFormat::R));
    }

    #[test]
    fn parses_help_flag() {
        let args = [OsString::from("--pc-comments"), OsString::from("-h")].into_iter();
        let result = parse_args(args).expect("help should parse");
        assert!(matches!(result, ParseResult::Help));
    }

    #[test]
    fn rejects_unknown_option() {
        let message = parse_err(&["--frobnicate"]);
        assert_eq!(message, "unknown option: --frobnicate");
    }

    #[test]
    fn rejects_positional_arguments() {
        let message = parse_err(&["stream.txt"]);
        assert_eq!(message, "unexpected argument: stream.txt");
    }

    #[test]
    fn rejects_missing_values() {
        assert_eq!(parse_err(&["-n"]), "missing value for --count");
        assert_eq!(
            parse_err(&["--load-store-ranges"]),
            "missing value for --load-store-ranges"
        );
    }

    #[test]
    fn rejects_malformed_values() {
        assert_eq!(parse_err(&["-n", "many"]), "invalid count 'many'");
        assert_eq!(parse_err(&["-s", "-4"]), "invalid seed '-4'");
        assert_eq!(
            parse_err(&["--pattern", "spiral"]),
            "unknown pattern mode 'spiral'"
        );
        assert_eq!(
            parse_err(&["--by-format", "Q"]),
            "unknown instruction format 'Q'"
        );
    }

    #[test]
    fn explicit_flags_override_config_files() {
        let file: FileConfig =
            serde_yaml::from_str("count: 50\nformat: bin\nseed: 99\n").expect("yaml should parse");
        let mut config = RunConfig::default();
        config.apply_file(&file).expect("file should apply");

        let args = parse_ok(&["-n", "7"]);
        args.apply_to(&mut config);

        assert_eq!(config.count, 7);
        assert_eq!(config.format, OutputFormat::Bin);
        assert_eq!(config.seed, Some(99));
    }

    #[test]
    fn boolean_flags_layer_onto_config() {
        let mut config = RunConfig::default();
        let args = parse_ok(&["--no-hex-comments", "--semantic-correlation"]);
        args.apply_to(&mut config);
        assert!(!config.hex_comments);
        assert!(config.semantic_correlation);
        assert!(!config.semantic_comments);
    }
}
