//! Material definitions.
//!
//! Each material is a tagged variant over the four simulation categories,
//! carrying only the fields that category actually uses. Reaction parameters
//! live in an explicit optional sub-structure instead of ad hoc merged
//! properties.

/// Material identifier stored per cell. `0` is always empty.
pub type MaterialId = u16;

/// Flag bitfield carried by every material.
pub type MaterialFlags = u16;

pub const FLAG_NONE: MaterialFlags = 0;
pub const FLAG_FLAMMABLE: MaterialFlags = 1 << 0;
pub const FLAG_CORROSIVE: MaterialFlags = 1 << 1;
pub const FLAG_CRYOGENIC: MaterialFlags = 1 << 2;
pub const FLAG_OXIDIZER: MaterialFlags = 1 << 3;

// Built-in material ids.
pub const MAT_EMPTY: MaterialId = 0;
pub const MAT_WALL: MaterialId = 1;
pub const MAT_STONE: MaterialId = 2;
pub const MAT_WOOD: MaterialId = 3;
pub const MAT_ICE: MaterialId = 4;
pub const MAT_SAND: MaterialId = 5;
pub const MAT_DIRT: MaterialId = 6;
pub const MAT_WATER: MaterialId = 7;
pub const MAT_OIL: MaterialId = 8;
pub const MAT_ACID: MaterialId = 9;
pub const MAT_LAVA: MaterialId = 10;
pub const MAT_STEAM: MaterialId = 11;
pub const MAT_SMOKE: MaterialId = 12;
pub const MAT_FIRE: MaterialId = 13;

/// Simulation category of a material.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Solid,
    Powder,
    Liquid,
    Gas,
}

/// Category-specific physical parameters.
#[derive(Clone, Copy, Debug)]
pub enum MaterialKind {
    Solid {
        density: f32,
        immovable: bool,
    },
    Powder {
        density: f32,
        buoyancy: i8,
        lateral_run_max: u8,
    },
    Liquid {
        density: f32,
        buoyancy: i8,
        /// Probability in [0, 1] that lateral seeking is skipped this tick.
        viscosity: f32,
        lateral_run_max: u8,
    },
    Gas {
        density: f32,
        buoyancy: i8,
        lateral_run_max: u8,
        /// Non-zero marks a transient gas that decays to empty.
        lifetime: u16,
    },
}

/// Optional per-material reaction parameters: `(chance, product)` pairs.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReactionParams {
    pub ignite: Option<(f32, MaterialId)>,
    pub freeze: Option<(f32, MaterialId)>,
    pub evaporate: Option<(f32, MaterialId)>,
    pub dilute_chance: f32,
}

/// Resolved properties for one material id.
#[derive(Clone, Debug)]
pub struct MaterialProps {
    pub name: String,
    pub kind: MaterialKind,
    pub flags: MaterialFlags,
    pub reaction: Option<ReactionParams>,
}

impl MaterialProps {
    #[inline]
    pub fn category(&self) -> Category {
        match self.kind {
            MaterialKind::Solid { .. } => Category::Solid,
            MaterialKind::Powder { .. } => Category::Powder,
            MaterialKind::Liquid { .. } => Category::Liquid,
            MaterialKind::Gas { .. } => Category::Gas,
        }
    }

    #[inline]
    pub fn density(&self) -> f32 {
        match self.kind {
            MaterialKind::Solid { density, .. }
            | MaterialKind::Powder { density, .. }
            | MaterialKind::Liquid { density, .. }
            | MaterialKind::Gas { density, .. } => density,
        }
    }

    /// Vertical preference: negative sinks, positive rises, zero stays.
    #[inline]
    pub fn buoyancy(&self) -> i8 {
        match self.kind {
            MaterialKind::Solid { .. } => 0,
            MaterialKind::Powder { buoyancy, .. }
            | MaterialKind::Liquid { buoyancy, .. }
            | MaterialKind::Gas { buoyancy, .. } => buoyancy,
        }
    }

    #[inline]
    pub fn lateral_run_max(&self) -> u8 {
        match self.kind {
            MaterialKind::Solid { .. } => 0,
            MaterialKind::Powder {
                lateral_run_max, ..
            }
            | MaterialKind::Liquid {
                lateral_run_max, ..
            }
            | MaterialKind::Gas {
                lateral_run_max, ..
            } => lateral_run_max,
        }
    }

    #[inline]
    pub fn viscosity(&self) -> f32 {
        match self.kind {
            MaterialKind::Liquid { viscosity, .. } => viscosity,
            _ => 0.0,
        }
    }

    #[inline]
    pub fn immovable(&self) -> bool {
        match self.kind {
            MaterialKind::Solid { immovable, .. } => immovable,
            _ => false,
        }
    }

    /// Decay lifetime in ticks; zero means the material does not decay.
    #[inline]
    pub fn lifetime(&self) -> u16 {
        match self.kind {
            MaterialKind::Gas { lifetime, .. } => lifetime,
            _ => 0,
        }
    }

    #[inline]
    pub fn has_flag(&self, flag: MaterialFlags) -> bool {
        self.flags & flag != 0
    }
}
