//! Weightless classifier: RAM nodes, per-class discriminators, and the
//! WiSARD model with its readout modes and persistence.

pub mod discriminator;
mod persist;
pub mod ram;
pub mod wisard;

pub use discriminator::Discriminator;
pub use ram::{RamNode, MAX_RAM_BITS};
pub use wisard::{ModelSource, Wisard, WisardConfig};
