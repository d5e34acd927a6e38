//! Builds one seeded, annotated stream and prints every rendering of it.

use generator::config::FormatWeights;
use generator::output::{OutputFormat, StreamRenderer};
use generator::patterns::{PairKind, PatternGenerator};
use generator::semantic::CommentDetail;
use isa_core::{Catalog, GeneratedInstruction, OffsetWindow};
use proptest as _;
use rand as _;
use rand_chacha as _;
use rstest as _;
use serde as _;
use serde_yaml as _;
use tempfile as _;
use thiserror as _;

const SEED: u64 = 0x5eed;
const COUNT: usize = 12;

fn build_stream() -> Vec<GeneratedInstruction> {
    let weights = FormatWeights {
        s: 2.0,
        b: 0.5,
        special: 0.0,
        ..FormatWeights::default()
    };
    let mut catalog = Catalog::new();
    weights.apply(&mut catalog).expect("weights should apply");
    catalog
        .set_offset_windows(vec![OffsetWindow::new(0, 64).expect("window should build")])
        .expect("windows should apply");

    let mut generator =
        PatternGenerator::new(catalog, SEED).with_comments(CommentDetail::Detailed);
    let mut stream = generator
        .mixed(COUNT, &PairKind::ALL, 0.7)
        .expect("stream should generate");
    stream.truncate(COUNT);
    stream
}

fn print_section(title: &str, lines: &[String]) {
    println!("== {title} ==");
    for line in lines {
        println!("{line}");
    }
    println!();
}

fn main() {
    let stream = build_stream();

    let hex = StreamRenderer::new(OutputFormat::Hex);
    print_section("hex", &hex.render(&stream));

    let annotated = StreamRenderer::new(OutputFormat::Asm)
        .with_pc_comments(true)
        .with_base_address(0x8000_0000);
    print_section("assembly with PC comments", &annotated.render(&stream));

    let combined = StreamRenderer::new(OutputFormat::HexAsm);
    print_section("hexasm", &combined.render(&stream));
}
