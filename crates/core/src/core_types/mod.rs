//! Core types and utilities

pub mod fuel;
pub mod pft;
pub mod rng;
pub mod soil;
pub mod units;
pub mod vegetation;
pub mod weather;

pub use fuel::*;
pub use pft::*;
pub use rng::{IgnitionRng, PatchRng};
pub use soil::*;
pub use units::*;
pub use vegetation::*;
pub use weather::*;
