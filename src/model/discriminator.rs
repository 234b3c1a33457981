//! Per-class memory: a bundle of RAM nodes covering the input pattern.

use crate::rng::SeededLcg;

use super::ram::RamNode;

/// One class's learned memory.
///
/// Owns `ceil(input_bits / ram_bits)` RAM nodes with independent address
/// mappings; every node sees the full pattern and reads its own subset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discriminator {
    nodes: Vec<RamNode>,
}

impl Discriminator {
    pub fn new(input_bits: usize, ram_bits: usize, rng: &mut SeededLcg) -> Self {
        let num_nodes = input_bits.div_ceil(ram_bits);
        let nodes = (0..num_nodes)
            .map(|_| RamNode::new(input_bits, ram_bits, rng))
            .collect();
        Self { nodes }
    }

    pub fn from_nodes(nodes: Vec<RamNode>) -> Self {
        Self { nodes }
    }

    pub fn train(&mut self, pattern: &[u8]) -> u16 {
        let mut highest = 0;
        for node in &mut self.nodes {
            node.train(pattern);
            highest = highest.max(node.read_count(pattern));
        }
        highest
    }

    pub fn forget(&mut self, pattern: &[u8]) {
        for node in &mut self.nodes {
            node.forget(pattern);
        }
    }

    /// Raw response: the sum of every node's counter for `pattern`.
    pub fn sum_counts(&self, pattern: &[u8]) -> u64 {
        self.nodes
            .iter()
            .map(|node| node.read_count(pattern) as u64)
            .sum()
    }

    /// Thresholded response: the number of nodes whose counter exceeds
    /// `threshold`. Equals `num_nodes` at threshold 0 when every node has a
    /// nonzero entry for `pattern`.
    pub fn sum_binary(&self, pattern: &[u8], threshold: u16) -> u32 {
        self.nodes
            .iter()
            .map(|node| node.read_bit(pattern, threshold))
            .sum()
    }

    /// Zeroes every counter in every node. The mappings stay fixed.
    pub fn reset(&mut self) {
        for node in &mut self.nodes {
            node.reset();
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[RamNode] {
        &self.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_count_is_ceil_of_input_over_ram_bits() {
        let mut rng = SeededLcg::new(1);
        assert_eq!(Discriminator::new(16, 4, &mut rng).num_nodes(), 4);
        assert_eq!(Discriminator::new(17, 4, &mut rng).num_nodes(), 5);
        assert_eq!(Discriminator::new(4, 4, &mut rng).num_nodes(), 1);
    }

    #[test]
    fn every_mapping_is_full_width_and_in_range() {
        let mut rng = SeededLcg::new(5);
        let d = Discriminator::new(10, 4, &mut rng);
        for node in d.nodes() {
            assert_eq!(node.mapping().len(), 4);
            assert!(node.mapping().iter().all(|&p| p < 10));
        }
    }

    #[test]
    fn training_is_monotone_in_sum_counts() {
        let mut rng = SeededLcg::new(9);
        let mut d = Discriminator::new(12, 3, &mut rng);
        let pattern = [1u8, 0, 1, 1, 0, 0, 1, 0, 1, 1, 0, 1];

        let mut previous = d.sum_counts(&pattern);
        for _ in 0..10 {
            d.train(&pattern);
            let current = d.sum_counts(&pattern);
            assert!(current > previous);
            previous = current;
        }
    }

    #[test]
    fn sum_binary_at_zero_counts_every_trained_node() {
        let mut rng = SeededLcg::new(2);
        let mut d = Discriminator::new(12, 4, &mut rng);
        let pattern = [1u8; 12];
        d.train(&pattern);
        assert_eq!(d.sum_binary(&pattern, 0), d.num_nodes() as u32);
        assert_eq!(d.sum_binary(&pattern, 1), 0);
    }

    #[test]
    fn forget_reverses_training_and_never_goes_negative() {
        let mut rng = SeededLcg::new(7);
        let mut d = Discriminator::new(8, 2, &mut rng);
        let pattern = [1u8, 0, 0, 1, 1, 1, 0, 0];

        d.train(&pattern);
        d.train(&pattern);
        d.forget(&pattern);
        assert_eq!(d.sum_counts(&pattern), d.num_nodes() as u64);

        d.forget(&pattern);
        d.forget(&pattern);
        assert_eq!(d.sum_counts(&pattern), 0);
    }

    #[test]
    fn reset_clears_counters_but_keeps_mappings() {
        let mut rng = SeededLcg::new(3);
        let mut d = Discriminator::new(8, 4, &mut rng);
        let pattern = [1u8, 1, 0, 0, 1, 0, 1, 1];
        d.train(&pattern);
        let mappings: Vec<Vec<u32>> =
            d.nodes().iter().map(|n| n.mapping().to_vec()).collect();

        d.reset();
        assert_eq!(d.sum_counts(&pattern), 0);
        let after: Vec<Vec<u32>> = d.nodes().iter().map(|n| n.mapping().to_vec()).collect();
        assert_eq!(mappings, after);
    }
}
