//! RV32I instruction formats, bit-level word packing, and field extraction.

/// The six RV32I instruction formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(missing_docs)]
pub enum InstructionFormat {
    R,
    I,
    S,
    B,
    U,
    J,
}

impl InstructionFormat {
    /// Single-letter name used in listings and format filters.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::R => 'R',
            Self::I => 'I',
            Self::S => 'S',
            Self::B => 'B',
            Self::U => 'U',
            Self::J => 'J',
        }
    }

    /// Resolves a format from its letter, case-insensitively.
    #[must_use]
    pub const fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'R' | 'r' => Some(Self::R),
            'I' | 'i' => Some(Self::I),
            'S' | 's' => Some(Self::S),
            'B' | 'b' => Some(Self::B),
            'U' | 'u' => Some(Self::U),
            'J' | 'j' => Some(Self::J),
            _ => None,
        }
    }

    /// Whether the format stores a destination register field.
    #[must_use]
    pub const fn encodes_rd(self) -> bool {
        !matches!(self, Self::S | Self::B)
    }

    /// Whether the format stores a first source register field.
    #[must_use]
    pub const fn encodes_rs1(self) -> bool {
        !matches!(self, Self::U | Self::J)
    }

    /// Whether the format stores a second source register field.
    #[must_use]
    pub const fn encodes_rs2(self) -> bool {
        matches!(self, Self::R | Self::S | Self::B)
    }

    /// Whether the format stores an immediate at all.
    #[must_use]
    pub const fn encodes_immediate(self) -> bool {
        !matches!(self, Self::R)
    }

    /// Inclusive immediate bounds representable by the format.
    ///
    /// B and J bounds are even: their low bit is implicit and never stored.
    /// R has no immediate and reports `(0, 0)`.
    #[must_use]
    pub const fn immediate_bounds(self) -> (i32, i32) {
        match self {
            Self::R => (0, 0),
            Self::I | Self::S => (-2048, 2047),
            Self::B => (-4096, 4094),
            Self::U => (-524_288, 524_287),
            Self::J => (-1_048_576, 1_048_574),
        }
    }
}

/// Masks `value` down to its low `bits` bits as stored in a word field.
///
/// Negative values contribute their two's-complement bit pattern, which is
/// exactly what the RV32I immediate encodings require.
#[allow(clippy::cast_sign_loss)]
#[must_use]
const fn field(value: i32, bits: u32) -> u32 {
    (value as u32) & ((1_u32 << bits) - 1)
}

/// Sign-extends the low `bits` bits of `raw` into an `i32`.
#[allow(clippy::cast_possible_wrap)]
#[must_use]
const fn sign_extend(raw: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((raw << shift) as i32) >> shift
}

/// Packs an R-format word: funct7, rs2, rs1, funct3, rd, opcode.
#[must_use]
pub const fn pack_r(opcode: u8, rd: u8, funct3: u8, rs1: u8, rs2: u8, funct7: u8) -> u32 {
    (((funct7 & 0x7F) as u32) << 25)
        | (((rs2 & 0x1F) as u32) << 20)
        | (((rs1 & 0x1F) as u32) << 15)
        | (((funct3 & 0x07) as u32) << 12)
        | (((rd & 0x1F) as u32) << 7)
        | ((opcode & 0x7F) as u32)
}

/// Packs an I-format word: imm[11:0], rs1, funct3, rd, opcode.
#[must_use]
pub const fn pack_i(opcode: u8, rd: u8, funct3: u8, rs1: u8, imm: i32) -> u32 {
    (field(imm, 12) << 20)
        | (((rs1 & 0x1F) as u32) << 15)
        | (((funct3 & 0x07) as u32) << 12)
        | (((rd & 0x1F) as u32) << 7)
        | ((opcode & 0x7F) as u32)
}

/// Packs an S-format word: imm[11:5], rs2, rs1, funct3, imm[4:0], opcode.
#[must_use]
pub const fn pack_s(opcode: u8, funct3: u8, rs1: u8, rs2: u8, imm: i32) -> u32 {
    (field(imm >> 5, 7) << 25)
        | (((rs2 & 0x1F) as u32) << 20)
        | (((rs1 & 0x1F) as u32) << 15)
        | (((funct3 & 0x07) as u32) << 12)
        | (field(imm, 5) << 7)
        | ((opcode & 0x7F) as u32)
}

/// Packs a B-format word: imm[12|10:5], rs2, rs1, funct3, imm[4:1|11], opcode.
///
/// The immediate's low bit is dropped; branch displacements are always even.
#[must_use]
pub const fn pack_b(opcode: u8, funct3: u8, rs1: u8, rs2: u8, imm: i32) -> u32 {
    (field(imm >> 12, 1) << 31)
        | (field(imm >> 5, 6) << 25)
        | (((rs2 & 0x1F) as u32) << 20)
        | (((rs1 & 0x1F) as u32) << 15)
        | (((funct3 & 0x07) as u32) << 12)
        | (field(imm >> 1, 4) << 8)
        | (field(imm >> 11, 1) << 7)
        | ((opcode & 0x7F) as u32)
}

/// Packs a U-format word: imm[31:12], rd, opcode.
#[must_use]
pub const fn pack_u(opcode: u8, rd: u8, imm: i32) -> u32 {
    (field(imm, 20) << 12) | (((rd & 0x1F) as u32) << 7) | ((opcode & 0x7F) as u32)
}

/// Packs a J-format word: imm[20|10:1|11|19:12], rd, opcode.
///
/// The immediate's low bit is dropped; jump displacements are always even.
#[must_use]
pub const fn pack_j(opcode: u8, rd: u8, imm: i32) -> u32 {
    (field(imm >> 20, 1) << 31)
        | (field(imm >> 1, 10) << 21)
        | (field(imm >> 11, 1) << 20)
        | (field(imm >> 12, 8) << 12)
        | (((rd & 0x1F) as u32) << 7)
        | ((opcode & 0x7F) as u32)
}

/// Extracts the 7-bit opcode field of a word.
#[must_use]
pub const fn opcode_field(word: u32) -> u8 {
    (word & 0x7F) as u8
}

/// Extracts the rd field of a word.
#[must_use]
pub const fn rd_field(word: u32) -> u8 {
    ((word >> 7) & 0x1F) as u8
}

/// Extracts the funct3 field of a word.
#[must_use]
pub const fn funct3_field(word: u32) -> u8 {
    ((word >> 12) & 0x07) as u8
}

/// Extracts the rs1 field of a word.
#[must_use]
pub const fn rs1_field(word: u32) -> u8 {
    ((word >> 15) & 0x1F) as u8
}

/// Extracts the rs2 field of a word.
#[must_use]
pub const fn rs2_field(word: u32) -> u8 {
    ((word >> 20) & 0x1F) as u8
}

/// Extracts the funct7 field of a word.
#[must_use]
pub const fn funct7_field(word: u32) -> u8 {
    ((word >> 25) & 0x7F) as u8
}

/// Re-extracts the sign-extended immediate a word stores for `format`.
///
/// R reports 0. B and J reconstruct the implicit zero low bit, so the
/// returned displacement is always even.
#[must_use]
pub const fn extract_immediate(format: InstructionFormat, word: u32) -> i32 {
    match format {
        InstructionFormat::R => 0,
        InstructionFormat::I => sign_extend((word >> 20) & 0xFFF, 12),
        InstructionFormat::S => {
            sign_extend((((word >> 25) & 0x7F) << 5) | ((word >> 7) & 0x1F), 12)
        }
        InstructionFormat::B => sign_extend(
            (((word >> 31) & 0x1) << 12)
                | (((word >> 7) & 0x1) << 11)
                | (((word >> 25) & 0x3F) << 5)
                | (((word >> 8) & 0xF) << 1),
            13,
        ),
        InstructionFormat::U => sign_extend((word >> 12) & 0xF_FFFF, 20),
        InstructionFormat::J => sign_extend(
            (((word >> 31) & 0x1) << 20)
                | (((word >> 12) & 0xFF) << 12)
                | (((word >> 20) & 0x1) << 11)
                | (((word >> 21) & 0x3FF) << 1),
            21,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        extract_immediate, funct3_field, funct7_field, opcode_field, pack_b, pack_i, pack_j,
        pack_r, pack_s, pack_u, rd_field, rs1_field, rs2_field, InstructionFormat,
    };

    #[test]
    fn r_format_packs_the_reference_add_word() {
        let word = pack_r(0b011_0011, 1, 0b000, 2, 3, 0b000_0000);
        assert_eq!(word, 0x0031_00B3);
    }

    #[test]
    fn s_format_splits_the_immediate_across_both_fields() {
        let word = pack_s(0b010_0011, 0b010, 2, 3, 0x44);
        assert_eq!((word >> 25) & 0x7F, 0b000_0010);
        assert_eq!((word >> 7) & 0x1F, 0b00100);
        assert_eq!(rs1_field(word), 2);
        assert_eq!(rs2_field(word), 3);
        assert_eq!(extract_immediate(InstructionFormat::S, word), 0x44);
    }

    #[test]
    fn register_fields_are_masked_to_five_bits() {
        let word = pack_r(0b011_0011, 0xFF, 0b000, 0xFF, 0xFF, 0b000_0000);
        assert_eq!(rd_field(word), 31);
        assert_eq!(rs1_field(word), 31);
        assert_eq!(rs2_field(word), 31);
    }

    #[test]
    fn field_extraction_recovers_packed_values() {
        let word = pack_r(0b011_0011, 5, 0b111, 9, 13, 0b010_0000);
        assert_eq!(opcode_field(word), 0b011_0011);
        assert_eq!(rd_field(word), 5);
        assert_eq!(funct3_field(word), 0b111);
        assert_eq!(rs1_field(word), 9);
        assert_eq!(rs2_field(word), 13);
        assert_eq!(funct7_field(word), 0b010_0000);
    }

    #[test]
    fn i_format_immediates_roundtrip_across_the_signed_range() {
        for imm in [-2048, -1, 0, 1, 2047] {
            let word = pack_i(0b001_0011, 1, 0b000, 2, imm);
            assert_eq!(extract_immediate(InstructionFormat::I, word), imm);
        }
    }

    #[test]
    fn branch_immediates_drop_the_low_bit() {
        let word = pack_b(0b110_0011, 0b000, 1, 2, 0x0FFF);
        let decoded = extract_immediate(InstructionFormat::B, word);
        assert_eq!(decoded % 2, 0);
        assert_eq!(decoded, 0x0FFE);
    }

    #[test]
    fn jump_immediates_drop_the_low_bit() {
        let word = pack_j(0b110_1111, 1, -5);
        let decoded = extract_immediate(InstructionFormat::J, word);
        assert_eq!(decoded % 2, 0);
        assert_eq!(decoded, -6);
    }

    #[test]
    fn upper_immediates_roundtrip_across_the_signed_range() {
        for imm in [-524_288, -1, 0, 524_287] {
            let word = pack_u(0b011_0111, 7, imm);
            assert_eq!(extract_immediate(InstructionFormat::U, word), imm);
        }
    }

    #[test]
    fn format_letters_roundtrip() {
        for format in [
            InstructionFormat::R,
            InstructionFormat::I,
            InstructionFormat::S,
            InstructionFormat::B,
            InstructionFormat::U,
            InstructionFormat::J,
        ] {
            assert_eq!(InstructionFormat::from_letter(format.letter()), Some(format));
            assert_eq!(
                InstructionFormat::from_letter(format.letter().to_ascii_lowercase()),
                Some(format)
            );
        }
        assert_eq!(InstructionFormat::from_letter('X'), None);
    }

    #[test]
    fn operand_relevance_follows_the_format_tables() {
        assert!(InstructionFormat::R.encodes_rd());
        assert!(!InstructionFormat::S.encodes_rd());
        assert!(!InstructionFormat::B.encodes_rd());
        assert!(!InstructionFormat::U.encodes_rs1());
        assert!(!InstructionFormat::J.encodes_rs1());
        assert!(InstructionFormat::S.encodes_rs2());
        assert!(!InstructionFormat::I.encodes_rs2());
        assert!(!InstructionFormat::R.encodes_immediate());
    }
}
