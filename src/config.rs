//! Engine configuration management via TOML files.
//!
//! This module provides configuration parsing from TOML format with sensible
//! defaults for the classifier, the kernel canvas, and the pipeline stages.

use std::fs;
use std::path::Path;

use serde::Serialize;
use toml::Value;

use crate::model::WisardConfig;
use crate::pipeline::CanvasConfig;

/// Engine configuration loaded from a TOML file.
///
/// # Examples
///
/// ```
/// use ramnet::EngineConfig;
///
/// let config = EngineConfig::from_str("[model]\nram_bits = 16").unwrap();
/// assert_eq!(config.ram_bits, 16);
/// assert_eq!(config.classes, 2);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct EngineConfig {
    /// Number of bits in the patterns the classifier consumes.
    pub input_bits: usize,
    /// Number of pattern bits addressing each RAM node.
    pub ram_bits: usize,
    /// Number of classes.
    pub classes: usize,
    /// Seed for deterministic address mappings and kernel banks.
    pub seed: u64,
    /// Number of reference kernels in the canvas.
    pub kernels: usize,
    /// Fraction of kernels marked per digested sample.
    pub activation: f64,
    /// Replication factor of the canvas bits in the terminal pattern.
    pub term_bits: usize,
    /// Decay factor of the smoothing stage.
    pub smooth_alpha: f64,
    /// Replication factor of the replicate stage.
    pub replicate: usize,
}

impl EngineConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(&path)?;
        Self::from_str(&contents)
    }

    pub fn from_str(toml_str: &str) -> Result<Self, ConfigError> {
        let value: Value =
            toml::from_str(toml_str).map_err(|err| ConfigError::Parse(err.to_string()))?;

        let model = value
            .get("model")
            .and_then(|v| v.as_table())
            .cloned()
            .unwrap_or_default();

        let input_bits = model
            .get("input_bits")
            .and_then(|v| v.as_integer())
            .map(|v| v.max(1) as usize)
            .unwrap_or(16384);
        let ram_bits = model
            .get("ram_bits")
            .and_then(|v| v.as_integer())
            .map(|v| v as usize)
            .unwrap_or(16)
            .clamp(1, 24);
        let classes = model
            .get("classes")
            .and_then(|v| v.as_integer())
            .map(|v| v.max(1) as usize)
            .unwrap_or(2);
        let seed = model
            .get("seed")
            .and_then(|v| v.as_integer())
            .map(|v| v as u64)
            .unwrap_or(42);

        let canvas = value
            .get("canvas")
            .and_then(|v| v.as_table())
            .cloned()
            .unwrap_or_default();

        let kernels = canvas
            .get("kernels")
            .and_then(|v| v.as_integer())
            .map(|v| v.max(1) as usize)
            .unwrap_or(1024);
        let activation = canvas
            .get("activation")
            .and_then(|v| v.as_float())
            .map(|v| v.clamp(1e-9, 1.0))
            .unwrap_or(0.01);
        let term_bits = canvas
            .get("term_bits")
            .and_then(|v| v.as_integer())
            .map(|v| v.max(1) as usize)
            .unwrap_or(16);

        let pipeline = value
            .get("pipeline")
            .and_then(|v| v.as_table())
            .cloned()
            .unwrap_or_default();

        let smooth_alpha = pipeline
            .get("smooth_alpha")
            .and_then(|v| v.as_float())
            .map(|v| v.clamp(1e-9, 1.0))
            .unwrap_or(0.25);
        let replicate = pipeline
            .get("replicate")
            .and_then(|v| v.as_integer())
            .map(|v| v.max(1) as usize)
            .unwrap_or(3);

        Ok(Self {
            input_bits,
            ram_bits,
            classes,
            seed,
            kernels,
            activation,
            term_bits,
            smooth_alpha,
            replicate,
        })
    }

    /// Projects the classifier section.
    pub fn wisard_config(&self) -> WisardConfig {
        WisardConfig {
            input_bits: self.input_bits,
            ram_bits: self.ram_bits,
            classes: self.classes,
            seed: self.seed,
        }
    }

    /// Projects the canvas section.
    pub fn canvas_config(&self) -> CanvasConfig {
        CanvasConfig {
            kernels: self.kernels,
            activation: self.activation,
            term_bits: self.term_bits,
            seed: self.seed,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            input_bits: 16384,
            ram_bits: 16,
            classes: 2,
            seed: 42,
            kernels: 1024,
            activation: 0.01,
            term_bits: 16,
            smooth_alpha: 0.25,
            replicate: 3,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "IO error: {}", err),
            ConfigError::Parse(err) => write!(f, "Parse error: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_when_sections_missing() {
        let config = EngineConfig::from_str("").unwrap();
        assert_eq!(config.input_bits, 16384);
        assert_eq!(config.ram_bits, 16);
        assert_eq!(config.classes, 2);
        assert_eq!(config.seed, 42);
        assert_eq!(config.kernels, 1024);
        assert_eq!(config.term_bits, 16);
    }

    #[test]
    fn config_parses_custom_values() {
        let toml = "[model]\ninput_bits = 128\nram_bits = 8\nclasses = 10\nseed = 7\n\
                    [canvas]\nkernels = 256\nactivation = 0.05\nterm_bits = 4\n\
                    [pipeline]\nsmooth_alpha = 0.5\nreplicate = 2";
        let config = EngineConfig::from_str(toml).unwrap();
        assert_eq!(config.input_bits, 128);
        assert_eq!(config.ram_bits, 8);
        assert_eq!(config.classes, 10);
        assert_eq!(config.seed, 7);
        assert_eq!(config.kernels, 256);
        assert_eq!(config.activation, 0.05);
        assert_eq!(config.term_bits, 4);
        assert_eq!(config.smooth_alpha, 0.5);
        assert_eq!(config.replicate, 2);
    }

    #[test]
    fn config_clamps_ram_bits() {
        let config = EngineConfig::from_str("[model]\nram_bits = 48").unwrap();
        assert_eq!(config.ram_bits, 24);
    }

    #[test]
    fn config_rejects_invalid_toml() {
        assert!(EngineConfig::from_str("not = [valid").is_err());
    }

    #[test]
    fn config_projects_sections() {
        let config = EngineConfig::from_str("[model]\ninput_bits = 64\nram_bits = 4").unwrap();
        let wisard = config.wisard_config();
        assert_eq!(wisard.input_bits, 64);
        assert_eq!(wisard.ram_bits, 4);
        let canvas = config.canvas_config();
        assert_eq!(canvas.kernels, 1024);
        assert_eq!(canvas.seed, 42);
    }
}
