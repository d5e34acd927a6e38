#![no_main]

use isa_core::{extract_immediate, opcode_field, InstructionFormat, Operands, RV32I};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }

    let def = &RV32I[usize::from(data[0]) % RV32I.len()];
    let imm = i32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    let operands = Operands::new(data[1], data[2], data[3], imm);

    let generated = def.emit(operands);
    assert_eq!(opcode_field(generated.word), def.opcode);
    assert_eq!(def.encode(def.masked(operands)), generated.word);
    assert!(!generated.asm.is_empty());

    let extracted = extract_immediate(def.format, generated.word);
    if matches!(def.format, InstructionFormat::B | InstructionFormat::J) {
        assert_eq!(extracted & 1, 0);
    }
});
