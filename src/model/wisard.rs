//! The weightless classifier: one discriminator per class, plus every
//! readout mode and the cached outcome of the most recent read.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::error::EngineError;
use crate::rng::SeededLcg;

use super::discriminator::Discriminator;
use super::persist;
use super::ram::MAX_RAM_BITS;

/// Construction parameters for a fresh model.
#[derive(Debug, Clone)]
pub struct WisardConfig {
    /// Length of every pattern the classifier consumes.
    pub input_bits: usize,
    /// Number of pattern bits addressing each RAM node (1..=24).
    pub ram_bits: usize,
    /// Number of classes.
    pub classes: usize,
    /// Seed for the address mappings.
    pub seed: u64,
}

impl Default for WisardConfig {
    fn default() -> Self {
        Self {
            input_bits: 16384,
            ram_bits: 16,
            classes: 2,
            seed: 42,
        }
    }
}

/// Where a model comes from: fresh parameters or a persisted file.
///
/// A single factory resolves both, so construction is a tagged choice rather
/// than overload-style guessing.
#[derive(Debug, Clone)]
pub enum ModelSource {
    Fresh(WisardConfig),
    File(PathBuf),
}

/// Scores, top-three ranking, and confidence from one read call.
#[derive(Debug, Clone)]
pub(crate) struct ReadOutcome {
    pub scores: Vec<u64>,
    pub ranks: [Option<usize>; 3],
    pub confidence: f32,
}

impl ReadOutcome {
    /// The outcome held before any read: identity ranking, zero confidence.
    fn initial(classes: usize) -> Self {
        let mut outcome = Self::from_scores(vec![0; classes]);
        outcome.confidence = 0.0;
        outcome
    }

    /// Ranks `scores` and derives the confidence.
    ///
    /// The first occurrence of each maximum wins, so equal scores resolve to
    /// the lowest class id. Confidence is `(top1 - top2) / top1` clamped to
    /// `[0, 1]`, `0` when the top score is zero, and `1` for a single-class
    /// model where no runner-up exists.
    fn from_scores(scores: Vec<u64>) -> Self {
        let mut ranks = [None; 3];
        for slot in 0..3 {
            for (class, &score) in scores.iter().enumerate() {
                if ranks[..slot].contains(&Some(class)) {
                    continue;
                }
                match ranks[slot] {
                    Some(best) if scores[best] >= score => {}
                    _ => ranks[slot] = Some(class),
                }
            }
        }

        let confidence = match (ranks[0], ranks[1]) {
            (Some(k1), Some(k2)) => {
                let top1 = scores[k1];
                if top1 == 0 {
                    0.0
                } else {
                    ((top1 - scores[k2]) as f32 / top1 as f32).clamp(0.0, 1.0)
                }
            }
            _ => 1.0,
        };

        Self {
            scores,
            ranks,
            confidence,
        }
    }

    /// Whether the top score strictly beats the runner-up.
    fn has_unique_maximum(&self) -> bool {
        match (self.ranks[0], self.ranks[1]) {
            (Some(k1), Some(k2)) => self.scores[k1] > self.scores[k2],
            _ => true,
        }
    }
}

pub(crate) struct ModelState {
    pub input_bits: usize,
    pub ram_bits: usize,
    pub discriminators: Vec<Discriminator>,
    /// Running upper bound on any counter value, bounding bleaching search.
    /// Forgetting may leave it stale high, which only lengthens the search.
    pub max_seen: u16,
    pub outcome: ReadOutcome,
}

impl ModelState {
    fn fresh(config: &WisardConfig) -> Result<Self, EngineError> {
        if config.input_bits == 0 {
            return Err(EngineError::InvalidParameter(
                "input_bits must be at least 1".into(),
            ));
        }
        if config.ram_bits == 0 || config.ram_bits > MAX_RAM_BITS {
            return Err(EngineError::InvalidParameter(format!(
                "ram_bits must be in 1..={}",
                MAX_RAM_BITS
            )));
        }
        if config.ram_bits > config.input_bits {
            return Err(EngineError::InvalidParameter(
                "ram_bits cannot exceed input_bits".into(),
            ));
        }
        if config.classes == 0 {
            return Err(EngineError::InvalidParameter(
                "classes must be at least 1".into(),
            ));
        }

        let mut rng = SeededLcg::new(config.seed);
        let discriminators = (0..config.classes)
            .map(|_| Discriminator::new(config.input_bits, config.ram_bits, &mut rng))
            .collect();

        Ok(Self {
            input_bits: config.input_bits,
            ram_bits: config.ram_bits,
            discriminators,
            max_seen: 0,
            outcome: ReadOutcome::initial(config.classes),
        })
    }

    pub(crate) fn from_parts(
        input_bits: usize,
        ram_bits: usize,
        discriminators: Vec<Discriminator>,
    ) -> Self {
        let max_seen = discriminators
            .iter()
            .flat_map(|d| d.nodes())
            .flat_map(|n| n.table())
            .copied()
            .max()
            .unwrap_or(0);
        let classes = discriminators.len();
        Self {
            input_bits,
            ram_bits,
            discriminators,
            max_seen,
            outcome: ReadOutcome::initial(classes),
        }
    }

    fn check_pattern(&self, pattern: &[u8]) -> Result<(), EngineError> {
        if pattern.is_empty() {
            return Err(EngineError::EmptyPattern);
        }
        if pattern.len() != self.input_bits {
            return Err(EngineError::InvalidPattern {
                expected: self.input_bits,
                actual: pattern.len(),
            });
        }
        Ok(())
    }

    fn check_target(&self, target: usize) -> Result<(), EngineError> {
        if target >= self.discriminators.len() {
            return Err(EngineError::InvalidTarget {
                target,
                classes: self.discriminators.len(),
            });
        }
        Ok(())
    }

    fn count_scores(&self, pattern: &[u8]) -> Vec<u64> {
        self.discriminators
            .par_iter()
            .map(|d| d.sum_counts(pattern))
            .collect()
    }

    fn binary_scores(&self, pattern: &[u8], threshold: u16) -> Vec<u64> {
        self.discriminators
            .par_iter()
            .map(|d| d.sum_binary(pattern, threshold) as u64)
            .collect()
    }
}

/// A WiSARD-style weightless classifier.
///
/// The classifier exclusively owns its discriminators and their counter
/// tables. It is `Open` from construction until [`Wisard::close`]; every
/// operation on a closed instance fails with
/// [`EngineError::ClosedResource`], including a second `close`. Dropping an
/// open classifier releases the tables without ceremony.
///
/// Calls are synchronous and CPU-bound; the type performs no internal
/// locking, and `&mut self` on every state-touching call makes the
/// single-owner assumption explicit.
///
/// # Examples
///
/// ```
/// use ramnet::Wisard;
///
/// let mut model = Wisard::new(4, 2, 2).unwrap();
/// model.learn(&[0, 0, 0, 0], 0).unwrap();
/// model.learn(&[1, 1, 1, 1], 1).unwrap();
///
/// assert_eq!(model.read_counts(&[1, 1, 1, 1]).unwrap(), 1);
/// assert_eq!(model.read_counts(&[0, 0, 0, 0]).unwrap(), 0);
/// ```
pub struct Wisard {
    state: Option<ModelState>,
}

impl Wisard {
    /// Resolves a model from its source: fresh parameters or a file.
    pub fn open(source: ModelSource) -> Result<Self, EngineError> {
        let state = match source {
            ModelSource::Fresh(config) => ModelState::fresh(&config)?,
            ModelSource::File(path) => persist::import(&path)?,
        };
        Ok(Self { state: Some(state) })
    }

    /// Fresh model with the default seed.
    pub fn new(input_bits: usize, ram_bits: usize, classes: usize) -> Result<Self, EngineError> {
        Self::open(ModelSource::Fresh(WisardConfig {
            input_bits,
            ram_bits,
            classes,
            ..WisardConfig::default()
        }))
    }

    /// Two-class model. A degenerate form kept for experiments; prefer
    /// [`Wisard::new`] with an explicit class count.
    pub fn binary(input_bits: usize, ram_bits: usize) -> Result<Self, EngineError> {
        Self::new(input_bits, ram_bits, 2)
    }

    pub fn with_config(config: WisardConfig) -> Result<Self, EngineError> {
        Self::open(ModelSource::Fresh(config))
    }

    /// Reconstructs a persisted model. Mappings and counters round-trip
    /// bit-exact; nothing is re-randomized.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        Self::open(ModelSource::File(path.as_ref().to_path_buf()))
    }

    fn state(&self) -> Result<&ModelState, EngineError> {
        self.state.as_ref().ok_or(EngineError::ClosedResource)
    }

    fn state_mut(&mut self) -> Result<&mut ModelState, EngineError> {
        self.state.as_mut().ok_or(EngineError::ClosedResource)
    }

    /// Trains class `target` on `pattern`.
    pub fn learn(&mut self, pattern: &[u8], target: usize) -> Result<(), EngineError> {
        let state = self.state_mut()?;
        state.check_pattern(pattern)?;
        state.check_target(target)?;
        let highest = state.discriminators[target].train(pattern);
        state.max_seen = state.max_seen.max(highest);
        Ok(())
    }

    /// Degrades class `target` by zeroing its discriminator's counters.
    ///
    /// The class keeps its slot and address mappings and can be retrained.
    pub fn forget(&mut self, target: usize) -> Result<(), EngineError> {
        let state = self.state_mut()?;
        state.check_target(target)?;
        state.discriminators[target].reset();
        Ok(())
    }

    /// Raw-count readout: argmax of summed counters, lowest id on ties.
    pub fn read_counts(&mut self, pattern: &[u8]) -> Result<usize, EngineError> {
        let state = self.state_mut()?;
        state.check_pattern(pattern)?;
        let outcome = ReadOutcome::from_scores(state.count_scores(pattern));
        let winner = outcome.ranks[0].unwrap_or(0);
        state.outcome = outcome;
        Ok(winner)
    }

    /// Binary readout: argmax of per-node hits at threshold 0.
    pub fn read_binary(&mut self, pattern: &[u8]) -> Result<usize, EngineError> {
        let state = self.state_mut()?;
        state.check_pattern(pattern)?;
        let outcome = ReadOutcome::from_scores(state.binary_scores(pattern, 0));
        let winner = outcome.ranks[0].unwrap_or(0);
        state.outcome = outcome;
        Ok(winner)
    }

    /// Default bleaching: raises the threshold from 1 until one class holds
    /// a unique maximum, falling back to the threshold-0 readout (lowest id
    /// on ties) when no threshold up to the largest observed counter
    /// resolves the tie.
    pub fn read_bleaching(&mut self, pattern: &[u8]) -> Result<usize, EngineError> {
        let state = self.state_mut()?;
        state.check_pattern(pattern)?;

        let max_threshold = state.max_seen.max(1);
        for threshold in 1..=max_threshold {
            let outcome = ReadOutcome::from_scores(state.binary_scores(pattern, threshold));
            if outcome.has_unique_maximum() {
                let winner = outcome.ranks[0].unwrap_or(0);
                state.outcome = outcome;
                return Ok(winner);
            }
        }

        let outcome = ReadOutcome::from_scores(state.binary_scores(pattern, 0));
        let winner = outcome.ranks[0].unwrap_or(0);
        state.outcome = outcome;
        Ok(winner)
    }

    /// Stepped bleaching: raises the threshold by `step` until the leading
    /// class's confidence exceeds `min_confidence`, returning the
    /// best-confidence result found once the threshold passes the largest
    /// observed counter. Search cost is bounded by `max_counter / step`
    /// evaluations.
    pub fn read_bleaching_with(
        &mut self,
        pattern: &[u8],
        step: u16,
        min_confidence: f32,
    ) -> Result<usize, EngineError> {
        if step == 0 {
            return Err(EngineError::InvalidParameter(
                "step must be larger than 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&min_confidence) {
            return Err(EngineError::InvalidParameter(
                "min_confidence must be between 0.0 and 1.0".into(),
            ));
        }

        let state = self.state_mut()?;
        state.check_pattern(pattern)?;

        let max_threshold = state.max_seen.max(1);
        let mut best: Option<ReadOutcome> = None;

        let mut threshold = 1u32;
        while threshold <= max_threshold as u32 {
            let outcome =
                ReadOutcome::from_scores(state.binary_scores(pattern, threshold as u16));
            if outcome.confidence > min_confidence {
                let winner = outcome.ranks[0].unwrap_or(0);
                state.outcome = outcome;
                return Ok(winner);
            }
            if best
                .as_ref()
                .map_or(true, |b| outcome.confidence > b.confidence)
            {
                best = Some(outcome);
            }
            threshold += step as u32;
        }

        let outcome = best.unwrap_or_else(|| ReadOutcome::initial(state.discriminators.len()));
        let winner = outcome.ranks[0].unwrap_or(0);
        state.outcome = outcome;
        Ok(winner)
    }

    /// Confidence of the most recent read call, in `[0, 1]`.
    pub fn confidence(&self) -> Result<f32, EngineError> {
        Ok(self.state()?.outcome.confidence)
    }

    /// The last-computed score for `target` from the most recent read call.
    pub fn excitation(&self, target: usize) -> Result<f32, EngineError> {
        let state = self.state()?;
        state.check_target(target)?;
        Ok(state.outcome.scores[target] as f32)
    }

    pub fn first_best(&self) -> Result<usize, EngineError> {
        self.ranked(0)
    }

    pub fn second_best(&self) -> Result<usize, EngineError> {
        self.ranked(1)
    }

    pub fn third_best(&self) -> Result<usize, EngineError> {
        self.ranked(2)
    }

    fn ranked(&self, slot: usize) -> Result<usize, EngineError> {
        let state = self.state()?;
        state
            .outcome
            .ranks[slot]
            .ok_or(EngineError::InsufficientClasses {
                classes: state.discriminators.len(),
                rank: slot + 1,
            })
    }

    /// Serializes the full model state to `path`.
    pub fn export_to<P: AsRef<Path>>(&self, path: P) -> Result<(), EngineError> {
        persist::export(self.state()?, path.as_ref())
    }

    pub fn classes(&self) -> Result<usize, EngineError> {
        Ok(self.state()?.discriminators.len())
    }

    pub fn ram_bits(&self) -> Result<usize, EngineError> {
        Ok(self.state()?.ram_bits)
    }

    pub fn input_bits(&self) -> Result<usize, EngineError> {
        Ok(self.state()?.input_bits)
    }

    /// Releases the counter tables. Not idempotent: a second call fails with
    /// [`EngineError::ClosedResource`], as does every other operation.
    pub fn close(&mut self) -> Result<(), EngineError> {
        self.state.take().map(drop).ok_or(EngineError::ClosedResource)
    }
}
