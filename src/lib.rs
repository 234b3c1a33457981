//! # ramnet
//!
//! A weightless (RAM-based) neural classifier in the WiSARD family, paired
//! with a streaming pipeline that turns raw numeric feature streams into the
//! fixed-length binary patterns the classifier consumes.
//!
//! The model learns class-conditioned frequency statistics over subsets of
//! input bits; inference ranks classes by how well a novel pattern matches
//! each class's counters, with raw-count, binary, and bleaching readouts.
//! Everything is deterministic: address mappings and kernel banks flow from
//! explicit seeds.
//!
//! ## Quick Start
//!
//! ```rust
//! use ramnet::Wisard;
//!
//! let mut model = Wisard::new(4, 2, 2).unwrap();
//! model.learn(&[0, 0, 0, 0], 0).unwrap();
//! model.learn(&[1, 1, 1, 1], 1).unwrap();
//!
//! assert_eq!(model.read_bleaching(&[1, 1, 1, 1]).unwrap(), 1);
//! assert!(model.confidence().unwrap() >= 0.0);
//! ```
//!
//! ## Core Modules
//!
//! - [`config`] - Engine configuration via TOML
//! - [`model`] - RAM nodes, discriminators, the classifier, persistence
//! - [`pipeline`] - Transform stages and the kernel-canvas quantizer
//! - [`logging`] - JSON line-delimited event logging

pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod rng;

pub use config::EngineConfig;
pub use error::EngineError;
pub use model::{Discriminator, ModelSource, RamNode, Wisard, WisardConfig};
pub use pipeline::{CanvasConfig, KernelCanvas, Pipeline, PatternSink, Stage};
pub use rng::SeededLcg;
