//! Address trace extraction.
//!
//! Two input formats are supported:
//! 1. **Instruction traces:** Disassembly lines such as `sw a5,-20(s0)`. The
//!    load/store mnemonic is located anywhere in the line, so prefix columns
//!    (PC, raw encoding) and other noise are tolerated. The effective address
//!    is `register[base] + offset`; a store writes that address back into its
//!    base register.
//! 2. **Hex traces:** Whitespace-separated hexadecimal addresses, with or
//!    without a `0x` prefix.
//!
//! Register values are not known from the trace, so the register file starts
//! from a chosen initial state: all zero, one fixed value, or pseudo-random
//! values from a seed.

use std::fmt;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::common::{Address, TraceError};

/// Register names recognized as base registers.
pub const REGISTER_NAMES: [&str; 32] = [
    "ra", "sp", "a0", "a1", "a2", "a3", "a4", "a5", "a6", "a7", "t0", "t1", "t2", "t3", "t4",
    "t5", "t6", "s0", "s1", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "x0",
    "x1", "x2",
];

/// Load mnemonics.
pub const LOAD_MNEMONICS: &[&str] = &["lb", "lh", "lw", "ld", "lbu", "lhu", "lwu"];

/// Store mnemonics.
pub const STORE_MNEMONICS: &[&str] = &["sb", "sh", "sw", "sd"];

/// Initial register file contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegisterInit {
    /// Every register starts at zero.
    #[default]
    Zero,
    /// Every register starts at the given value.
    Fixed(u32),
    /// Registers start at pseudo-random values; equal seeds give equal values.
    Random {
        /// Generator seed.
        seed: u64,
    },
}

/// Seed used when a zero seed is requested; xorshift never leaves state 0.
const FALLBACK_SEED: u64 = 123_456_789;

/// The 32 named registers used to resolve base addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFile {
    values: [u32; REGISTER_NAMES.len()],
}

impl RegisterFile {
    /// Creates a register file in the given initial state.
    pub fn new(init: RegisterInit) -> Self {
        let mut values = [0u32; REGISTER_NAMES.len()];
        match init {
            RegisterInit::Zero => {}
            RegisterInit::Fixed(value) => values.fill(value),
            RegisterInit::Random { seed } => {
                let mut state = if seed == 0 { FALLBACK_SEED } else { seed };
                for value in &mut values {
                    state ^= state << 13;
                    state ^= state >> 7;
                    state ^= state << 17;
                    *value = (state >> 32) as u32;
                }
            }
        }
        Self { values }
    }

    /// Position of a register name, if it is known.
    pub fn index_of(name: &str) -> Option<usize> {
        REGISTER_NAMES.iter().position(|&r| r == name)
    }

    /// Value of the named register.
    pub fn get(&self, name: &str) -> Option<u32> {
        Self::index_of(name).map(|i| self.values[i])
    }

    /// Sets the named register; returns false for an unknown name.
    pub fn set(&mut self, name: &str, value: u32) -> bool {
        match Self::index_of(name) {
            Some(i) => {
                self.values[i] = value;
                true
            }
            None => false,
        }
    }

    /// `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u32)> + '_ {
        REGISTER_NAMES.iter().copied().zip(self.values.iter().copied())
    }
}

impl fmt::Display for RegisterFile {
    /// Four registers per line, as `name = 0x%08x`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.iter().enumerate() {
            write!(f, "{name:<3} = {value:#010x}")?;
            if i % 4 == 3 {
                writeln!(f)?;
            } else {
                f.write_str("   ")?;
            }
        }
        Ok(())
    }
}

/// What a trace line holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// No load/store mnemonic.
    NotMemory,
    /// A load/store mnemonic with operands that do not parse.
    Malformed,
    /// A well-formed load or store.
    Op(MemoryOp),
}

/// One decoded load or store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryOp {
    /// Lowercased mnemonic.
    pub mnemonic: String,
    /// True for stores.
    pub is_store: bool,
    /// Data register operand, as written.
    pub data_reg: String,
    /// Signed displacement.
    pub offset: i32,
    /// Base register name.
    pub base: String,
}

impl MemoryOp {
    /// Decodes the load or store found anywhere in `line`.
    pub fn decode(line: &str) -> Decoded {
        let mut tokens = line.split_whitespace();
        let Some(mnemonic) = tokens.by_ref().map(str::to_ascii_lowercase).find(|t| {
            LOAD_MNEMONICS.contains(&t.as_str()) || STORE_MNEMONICS.contains(&t.as_str())
        }) else {
            return Decoded::NotMemory;
        };
        let operands: String = tokens.collect();
        Self::parse_operands(mnemonic, &operands).map_or(Decoded::Malformed, Decoded::Op)
    }

    fn parse_operands(mnemonic: String, operands: &str) -> Option<Self> {
        let (data_reg, rest) = operands.split_once(',')?;
        let (offset, rest) = rest.split_once('(')?;
        let (base, _) = rest.split_once(')')?;
        if data_reg.is_empty() || RegisterFile::index_of(base).is_none() {
            return None;
        }
        Some(Self {
            is_store: STORE_MNEMONICS.contains(&mnemonic.as_str()),
            mnemonic,
            data_reg: data_reg.to_string(),
            offset: parse_offset(offset)?,
            base: base.to_string(),
        })
    }
}

/// Parses a decimal or `0x` hexadecimal displacement; empty means zero.
fn parse_offset(text: &str) -> Option<i32> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let magnitude = if digits.is_empty() {
        0
    } else if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16).ok()?
    } else {
        digits.parse::<i64>().ok()?
    };
    i32::try_from(if negative { -magnitude } else { magnitude }).ok()
}

/// Turns instruction trace lines into effective addresses.
#[derive(Debug, Clone)]
pub struct TraceExtractor {
    registers: RegisterFile,
    extracted: usize,
    skipped: usize,
}

impl TraceExtractor {
    /// Creates an extractor with the given initial register state.
    pub fn new(init: RegisterInit) -> Self {
        Self {
            registers: RegisterFile::new(init),
            extracted: 0,
            skipped: 0,
        }
    }

    /// Resolves the address accessed by `line`.
    ///
    /// Lines without a load/store return `None`. Lines with one that does not
    /// parse also return `None` and are counted in [`skipped`](Self::skipped).
    pub fn extract_line(&mut self, line: &str) -> Option<Address> {
        let op = match MemoryOp::decode(line) {
            Decoded::Op(op) => op,
            Decoded::NotMemory => return None,
            Decoded::Malformed => {
                self.skipped += 1;
                warn!(line, "skipping malformed load/store");
                return None;
            }
        };

        let base = self.registers.get(&op.base)?;
        let address = base.wrapping_add(op.offset as u32);
        if op.is_store {
            let _ = self.registers.set(&op.base, address);
        }
        self.extracted += 1;
        Some(Address::new(address))
    }

    /// Resolves every line of `text`, in order.
    pub fn extract_str(&mut self, text: &str) -> Vec<Address> {
        text.lines()
            .filter_map(|line| self.extract_line(line))
            .collect()
    }

    /// Reads and resolves an instruction trace file.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::Read`] if the file cannot be read.
    pub fn read_file(&mut self, path: impl AsRef<Path>) -> Result<Vec<Address>, TraceError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| TraceError::Read(path.to_path_buf(), e))?;
        let addresses = self.extract_str(&text);
        debug!(
            path = %path.display(),
            addresses = addresses.len(),
            skipped = self.skipped,
            "instruction trace loaded"
        );
        Ok(addresses)
    }

    /// Current register values.
    pub const fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// Number of addresses produced so far.
    pub const fn extracted(&self) -> usize {
        self.extracted
    }

    /// Number of malformed load/store lines skipped so far.
    pub const fn skipped(&self) -> usize {
        self.skipped
    }
}

/// Parses one 32-bit hexadecimal value, with or without a `0x` prefix.
pub fn parse_hex(token: &str) -> Option<u32> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    u32::from_str_radix(digits, 16).ok()
}

/// Parses whitespace-separated hexadecimal addresses.
///
/// Tokens that are not valid 32-bit hex values are skipped with a warning.
pub fn parse_hex_addresses(text: &str) -> Vec<Address> {
    text.split_whitespace()
        .filter_map(|token| {
            let value = parse_hex(token);
            if value.is_none() {
                warn!(token, "skipping malformed hex address");
            }
            value.map(Address::new)
        })
        .collect()
}

/// Reads a hex address trace file.
///
/// # Errors
///
/// Returns [`TraceError::Read`] if the file cannot be read.
pub fn read_hex_trace(path: impl AsRef<Path>) -> Result<Vec<Address>, TraceError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| TraceError::Read(path.to_path_buf(), e))?;
    Ok(parse_hex_addresses(&text))
}
