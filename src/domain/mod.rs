//! Domain model: materials and the resolved catalog.

pub mod catalog;
pub mod materials;

pub use catalog::MaterialCatalog;
pub use materials::{
    Category, MaterialFlags, MaterialId, MaterialKind, MaterialProps, ReactionParams,
};
