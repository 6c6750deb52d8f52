//! Direct-mapped cache level.
//!
//! Each level holds `size / block` line slots. An address selects exactly one
//! slot through its index bits; the remaining high bits form the tag. Lines
//! carry no data and no dirty bit, only presence.

use crate::common::{Address, ConfigError, bits_for, mask};
use crate::config::CacheConfig;

/// Cache line entry containing tag and validity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheLine {
    /// High address bits of the resident block.
    pub tag: u32,
    /// True when the slot holds a block.
    pub valid: bool,
}

/// One direct-mapped cache level.
#[derive(Debug, Clone)]
pub struct CacheLevel {
    lines: Vec<CacheLine>,
    block_bytes: usize,
    size_bytes: usize,
    latency: u64,
    offset_bits: u32,
    index_bits: u32,
}

impl CacheLevel {
    /// Creates a level with every line invalid.
    ///
    /// # Arguments
    ///
    /// * `config` - Size, block size, and latency of the level.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a zero or non-power-of-two size or block
    /// size, or a block larger than the whole cache.
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigError> {
        config.validate("cache")?;
        let num_lines = config.num_lines();
        Ok(Self {
            lines: vec![CacheLine::default(); num_lines],
            block_bytes: config.line_bytes,
            size_bytes: config.size_bytes,
            latency: config.latency,
            offset_bits: bits_for(config.line_bytes),
            index_bits: bits_for(num_lines),
        })
    }

    /// Slot index of `addr`.
    pub const fn index_of(&self, addr: Address) -> usize {
        ((addr.val() >> self.offset_bits) & mask(self.index_bits)) as usize
    }

    /// Tag of `addr`.
    pub const fn tag_of(&self, addr: Address) -> u32 {
        let shift = self.offset_bits + self.index_bits;
        if shift >= 32 { 0 } else { addr.val() >> shift }
    }

    /// Rebuilds the block-aligned address stored at `index` with `tag`.
    pub const fn line_address(&self, index: usize, tag: u32) -> Address {
        let shift = self.offset_bits + self.index_bits;
        let high = if shift >= 32 { 0 } else { tag << shift };
        Address::new(high | ((index as u32) << self.offset_bits))
    }

    /// Returns true when the block holding `addr` is resident.
    pub fn probe(&self, addr: Address) -> bool {
        let line = &self.lines[self.index_of(addr)];
        line.valid && line.tag == self.tag_of(addr)
    }

    /// Installs the block holding `addr`.
    ///
    /// # Returns
    ///
    /// The block-aligned address of the previous occupant, if the slot held a
    /// different block. Reinserting a resident block returns `None`.
    pub fn insert(&mut self, addr: Address) -> Option<Address> {
        let index = self.index_of(addr);
        let tag = self.tag_of(addr);
        let previous = self.lines[index];
        self.lines[index] = CacheLine { tag, valid: true };

        (previous.valid && previous.tag != tag).then(|| self.line_address(index, previous.tag))
    }

    /// Clears the slot of `addr` if it holds that block.
    pub fn invalidate(&mut self, addr: Address) -> bool {
        let index = self.index_of(addr);
        let tag = self.tag_of(addr);
        let line = &mut self.lines[index];
        if line.valid && line.tag == tag {
            *line = CacheLine::default();
            true
        } else {
            false
        }
    }

    /// The line stored in slot `index`.
    pub fn line(&self, index: usize) -> Option<&CacheLine> {
        self.lines.get(index)
    }

    /// Valid lines as `(index, block address)` pairs in index order.
    pub fn resident_lines(&self) -> impl Iterator<Item = (usize, Address)> + '_ {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.valid)
            .map(|(index, line)| (index, self.line_address(index, line.tag)))
    }

    /// Invalidates every line.
    pub fn clear(&mut self) {
        self.lines.fill(CacheLine::default());
    }

    /// Number of line slots.
    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }

    /// Block size in bytes.
    pub const fn block_size(&self) -> usize {
        self.block_bytes
    }

    /// Total size in bytes.
    pub const fn size(&self) -> usize {
        self.size_bytes
    }

    /// Access latency in cycles.
    pub const fn latency(&self) -> u64 {
        self.latency
    }

    /// Low address bits selecting a byte within a block.
    pub const fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    /// Address bits selecting a slot.
    pub const fn index_bits(&self) -> u32 {
        self.index_bits
    }

    /// Prints the valid lines in `Index | Tag` form.
    pub fn print_contents(&self, name: &str) {
        println!("{name} CACHE CONTENTS");
        println!("  index  | tag");
        for (index, line) in self.lines.iter().enumerate().filter(|(_, l)| l.valid) {
            println!("  {index:<6} | {:#010x}", line.tag);
        }
    }
}
