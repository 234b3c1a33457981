//! RAM nodes: counter tables addressed by a fixed subset of pattern bits.

use crate::rng::SeededLcg;

/// Hard ceiling on address width so `2^ram_bits` tables stay allocatable.
pub const MAX_RAM_BITS: usize = 24;

/// A counter table addressed by a fixed subset of input-pattern bits.
///
/// The mapping is drawn once at construction and never changes. Counters are
/// 16-bit: training saturates at `u16::MAX`, forgetting floors at zero. The
/// 16-bit width bounds the exported table to two bytes per entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RamNode {
    mapping: Vec<u32>,
    table: Vec<u16>,
}

impl RamNode {
    /// Builds a node whose mapping is `ram_bits` distinct positions drawn
    /// from `0..input_bits`.
    pub fn new(input_bits: usize, ram_bits: usize, rng: &mut SeededLcg) -> Self {
        let mapping = rng.sample_distinct(input_bits, ram_bits);
        Self {
            table: vec![0; 1 << mapping.len()],
            mapping,
        }
    }

    /// Reconstructs a node from a persisted mapping and counter table.
    pub fn from_parts(mapping: Vec<u32>, table: Vec<u16>) -> Self {
        debug_assert_eq!(table.len(), 1 << mapping.len());
        Self { mapping, table }
    }

    /// The table address selected by `pattern`: bit `j` of the address is
    /// the mapped pattern bit `mapping[j]`. Any nonzero byte reads as 1.
    pub fn address(&self, pattern: &[u8]) -> usize {
        let mut address = 0usize;
        for (j, &position) in self.mapping.iter().enumerate() {
            if pattern[position as usize] != 0 {
                address |= 1 << j;
            }
        }
        address
    }

    pub fn train(&mut self, pattern: &[u8]) {
        let address = self.address(pattern);
        self.table[address] = self.table[address].saturating_add(1);
    }

    pub fn forget(&mut self, pattern: &[u8]) {
        let address = self.address(pattern);
        self.table[address] = self.table[address].saturating_sub(1);
    }

    /// The raw vote for `pattern`.
    pub fn read_count(&self, pattern: &[u8]) -> u16 {
        self.table[self.address(pattern)]
    }

    /// 1 when the addressed counter exceeds `threshold`, 0 otherwise.
    pub fn read_bit(&self, pattern: &[u8], threshold: u16) -> u32 {
        (self.table[self.address(pattern)] > threshold) as u32
    }

    pub fn reset(&mut self) {
        self.table.fill(0);
    }

    pub fn mapping(&self) -> &[u32] {
        &self.mapping
    }

    pub fn table(&self) -> &[u16] {
        &self.table
    }
}
