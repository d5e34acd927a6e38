//! Text rendering for generated instruction streams.

use std::str::FromStr;

use isa_core::GeneratedInstruction;

use crate::errors::ConfigFileError;

/// How generated instructions are written out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Eight lowercase hex digits per line.
    #[default]
    Hex,
    /// Thirty-two binary digits per line.
    Bin,
    /// Assembly text per line.
    Asm,
    /// Assembly with the hex word attached.
    HexAsm,
    /// Hex word, binary word, then assembly.
    All,
}

impl OutputFormat {
    /// Whether lines of this format carry assembly text.
    ///
    /// PC comments only make sense on such lines.
    #[must_use]
    pub const fn carries_assembly(self) -> bool {
        matches!(self, Self::Asm | Self::HexAsm | Self::All)
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigFileError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "hex" => Ok(Self::Hex),
            "bin" => Ok(Self::Bin),
            "asm" => Ok(Self::Asm),
            "hexasm" => Ok(Self::HexAsm),
            "all" => Ok(Self::All),
            other => Err(ConfigFileError::UnknownFormat(other.to_owned())),
        }
    }
}

/// Renders instruction streams as output lines.
///
/// Addresses start at the base address and advance four bytes per
/// instruction, wrapping on overflow.
#[derive(Debug, Clone, Copy)]
pub struct StreamRenderer {
    format: OutputFormat,
    pc_comments: bool,
    hex_comments: bool,
    base_address: u32,
}

impl StreamRenderer {
    /// Creates a renderer with PC comments off and hex comments on.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self {
            format,
            pc_comments: false,
            hex_comments: true,
            base_address: 0,
        }
    }

    /// Appends a `# 0x{pc:08x}` comment to assembly-bearing lines.
    #[must_use]
    pub const fn with_pc_comments(mut self, enabled: bool) -> Self {
        self.pc_comments = enabled;
        self
    }

    /// Controls whether `hexasm` renders the word as a trailing comment or
    /// as a leading field.
    #[must_use]
    pub const fn with_hex_comments(mut self, enabled: bool) -> Self {
        self.hex_comments = enabled;
        self
    }

    /// Sets the address of the first instruction.
    #[must_use]
    pub const fn with_base_address(mut self, address: u32) -> Self {
        self.base_address = address;
        self
    }

    /// Renders the whole stream, one line per instruction.
    #[must_use]
    pub fn render(&self, stream: &[GeneratedInstruction]) -> Vec<String> {
        let mut lines = Vec::with_capacity(stream.len());
        let mut address = self.base_address;
        for generated in stream {
            lines.push(self.line(generated, address));
            address = address.wrapping_add(4);
        }
        lines
    }

    fn line(&self, generated: &GeneratedInstruction, address: u32) -> String {
        let word = generated.word;
        let asm = if self.pc_comments && self.format.carries_assembly() {
            format!("{}  # 0x{address:08x}", generated.asm)
        } else {
            generated.asm.clone()
        };
        match self.format {
            OutputFormat::Hex => format!("{word:08x}"),
            OutputFormat::Bin => format!("{word:032b}"),
            OutputFormat::Asm => asm,
            OutputFormat::HexAsm => {
                if self.hex_comments {
                    format!("{asm}  # {word:08x}")
                } else {
                    format!("{word:08x} {asm}")
                }
            }
            OutputFormat::All => format!("{word:08x} {word:032b} {asm}"),
        }
    }
}
