//! Granula Engine - deterministic falling-sand simulation
//!
//! Architecture:
//! - core/      - RNG and shared primitives
//! - domain/    - Material catalog and per-material parameters
//! - world/     - Grid storage (parallel per-cell buffers)
//! - sim/       - Step engine, movement behaviors, simulation facade
//! - interact/  - Interaction router and stock reactions
//! - codec/     - Versioned RLE/raw world snapshots

pub mod codec;
pub mod core;
pub mod domain;
pub mod interact;
pub mod sim;
pub mod world;

pub use crate::codec::{CodecError, Snapshot};
pub use crate::core::rng::{Rng, XorShift32};
pub use crate::domain::catalog::MaterialCatalog;
pub use crate::domain::materials::{Category, MaterialId, MaterialKind, MaterialProps};
pub use crate::interact::{
    InteractionRouter, PairEvent, ReactionScope, ThermalEvent, DISPATCH_BUDGET,
};
pub use crate::sim::{Simulation, StepEngine};
pub use crate::world::{World, WorldError, MOVED_THIS_TICK};

/// Engine version, from the crate manifest.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
