//! End-to-end generation: config to catalog to stream to rendered text.

#![allow(clippy::pedantic, clippy::nursery)]

use generator::config::{FileConfig, FormatWeights, RunConfig};
use generator::output::{OutputFormat, StreamRenderer};
use generator::patterns::{PairKind, PatternGenerator};
use generator::semantic::CommentDetail;
use isa_core::{
    extract_immediate, lookup, of_format, opcode_field, Catalog, InstructionFormat, OffsetWindow,
    Operands,
};
use proptest::prelude::*;
use rand as _;
use rand_chacha as _;
use rstest as _;
use serde as _;
use serde_yaml as _;
use thiserror as _;

const OP_LOAD: u8 = 0b000_0011;
const OP_STORE: u8 = 0b010_0011;
const OP_R: u8 = 0b011_0011;

fn pipeline_lines(config: &RunConfig) -> Vec<String> {
    let catalog = config.build_catalog().expect("catalog should build");
    let seed = config.seed.expect("test configs carry a seed");
    let mut generator = PatternGenerator::new(catalog, seed);
    let mut stream = generator
        .mixed(config.count, &PairKind::ALL, config.pattern_density)
        .expect("mixed stream should generate");
    stream.truncate(config.count);
    config.renderer().render(&stream)
}

#[test]
fn seeded_pipelines_reproduce_identical_output() {
    let config = RunConfig {
        count: 24,
        seed: Some(42),
        format: OutputFormat::All,
        pattern_density: 0.5,
        ..RunConfig::default()
    };
    let first = pipeline_lines(&config);
    let second = pipeline_lines(&config);
    assert_eq!(first.len(), 24);
    assert_eq!(first, second);
}

#[test]
fn zero_weight_formats_never_appear() {
    let config = RunConfig {
        weights: FormatWeights {
            r: 0.0,
            ..FormatWeights::default()
        },
        ..RunConfig::default()
    };
    let catalog = config.build_catalog().expect("catalog should build");
    let mut generator = PatternGenerator::new(catalog, 7);
    for _ in 0..200 {
        let single = generator.single().expect("sampling should succeed");
        assert_ne!(
            opcode_field(single.word),
            OP_R,
            "R-format leaked into {}",
            single.asm
        );
    }
}

#[test]
fn restricted_sampling_stays_in_one_format() {
    let candidates = of_format(InstructionFormat::R);
    let mut generator = PatternGenerator::new(Catalog::new(), 11);
    for _ in 0..40 {
        let single = generator
            .single_from(&candidates)
            .expect("sampling should succeed");
        assert_eq!(opcode_field(single.word), OP_R);
    }
}

#[test]
fn pair_offsets_respect_configured_windows() {
    let windows = vec![
        OffsetWindow::new(0, 16).expect("window should build"),
        OffsetWindow::new(256, 16).expect("window should build"),
    ];
    let config = RunConfig {
        offset_windows: Some(windows.clone()),
        ..RunConfig::default()
    };
    let catalog = config.build_catalog().expect("catalog should build");
    let mut generator = PatternGenerator::new(catalog, 3);
    for _ in 0..40 {
        for generated in generator.load_store_pair().expect("pair should generate") {
            let format = if opcode_field(generated.word) == OP_STORE {
                InstructionFormat::S
            } else {
                InstructionFormat::I
            };
            let offset = extract_immediate(format, generated.word);
            assert!(
                windows.iter().any(|window| window.contains(offset)),
                "offset {offset} escaped the windows in {}",
                generated.asm
            );
        }
    }
}

#[test]
fn pc_and_hex_comments_compose_in_order() {
    let def = lookup("add").expect("catalog entry");
    let stream = vec![def.emit(Operands::new(1, 2, 3, 0))];
    let renderer = StreamRenderer::new(OutputFormat::HexAsm)
        .with_pc_comments(true)
        .with_base_address(0x2000);
    let lines = renderer.render(&stream);
    assert_eq!(lines, vec!["add x1, x2, x3  # 0x00002000  # 003100b3"]);
}

#[test]
fn semantic_comments_reach_the_rendered_stream() {
    let mut generator =
        PatternGenerator::new(Catalog::new(), 5).with_comments(CommentDetail::Medium);
    let add = lookup("add").expect("catalog entry");
    generator.emit(add, Operands::new(5, 1, 2, 0));
    let dependent = generator.emit(add, Operands::new(6, 5, 2, 0));

    let lines = StreamRenderer::new(OutputFormat::Asm).render(&[dependent]);
    assert!(
        lines[0].contains("raw on x5"),
        "missing dependency note in {}",
        lines[0]
    );
}

#[test]
fn config_files_feed_the_whole_pipeline() {
    let dir = tempfile::tempdir().expect("tempdir should create");
    let path = dir.path().join("run.yaml");
    std::fs::write(&path, "count: 6\nformat: asm\nseed: 9\npattern: basic_block\n")
        .expect("config should write");

    let mut config = RunConfig::default();
    let file = FileConfig::from_path(&path).expect("config should load");
    config.apply_file(&file).expect("config should apply");
    assert_eq!(config.count, 6);
    assert_eq!(config.format, OutputFormat::Asm);

    let catalog = config.build_catalog().expect("catalog should build");
    let seed = config.seed.expect("seed should come from the file");
    let mut generator = PatternGenerator::new(catalog, seed);
    let stream = generator.basic_block(config.count).expect("block generates");
    let lines = config.renderer().render(&stream);
    assert_eq!(lines.len(), 6);
    assert!(lines.iter().all(|line| line
        .chars()
        .next()
        .is_some_and(|first| first.is_ascii_lowercase())));
}

#[test]
fn function_frames_render_intact() {
    let mut generator = PatternGenerator::new(Catalog::new(), 13);
    let stream = generator.function_sequence(1).expect("frame generates");
    let lines = StreamRenderer::new(OutputFormat::Asm).render(&stream);
    assert_eq!(lines.len(), 8);
    assert_eq!(lines[0], "addi x2, x2, -16");
    assert_eq!(lines[7], "jalr x0, 0(x1)");
}

#[test]
fn memory_streams_stay_on_loads_and_stores() {
    let mut generator = PatternGenerator::new(Catalog::new(), 17);
    let stream = generator.memory_sequence(12).expect("sequence generates");
    assert_eq!(stream.len(), 12);
    for generated in &stream[1..] {
        let opcode = opcode_field(generated.word);
        assert!(
            opcode == OP_LOAD || opcode == OP_STORE,
            "unexpected opcode in {}",
            generated.asm
        );
    }
}

proptest! {
    #[test]
    fn mixed_always_returns_the_exact_count(
        count in 0usize..96,
        density in 0.0f64..=1.0,
        seed in any::<u64>(),
    ) {
        let mut generator = PatternGenerator::new(Catalog::new(), seed);
        let stream = generator
            .mixed(count, &PairKind::ALL, density)
            .expect("mixed stream should generate");
        prop_assert_eq!(stream.len(), count);
    }

    #[test]
    fn pair_offsets_stay_inside_one_window(
        seed in any::<u64>(),
        base in -512i32..512,
        size in 1u32..64,
    ) {
        let window = OffsetWindow::new(base, size).expect("window should build");
        let mut catalog = Catalog::new();
        catalog
            .set_offset_windows(vec![window])
            .expect("windows should apply");
        let mut generator = PatternGenerator::new(catalog, seed);
        for generated in generator.load_store_pair().expect("pair should generate") {
            let format = if opcode_field(generated.word) == OP_STORE {
                InstructionFormat::S
            } else {
                InstructionFormat::I
            };
            prop_assert!(window.contains(extract_immediate(format, generated.word)));
        }
    }
}
