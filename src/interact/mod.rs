//! Interaction router - decouples "what happens when A touches B" from the
//! movement algorithm.
//!
//! Handlers are registered per unordered material pair (contact and
//! adjacency events) or per single material (thermal events), and dispatched
//! with the world, the injected RNG and the catalog. A fixed per-frame
//! dispatch budget bounds worst-case work on pathological worlds; beyond it
//! dispatches are dropped silently and resume after `reset_frame`.

pub mod reactions;

use std::collections::HashMap;

use crate::core::rng::Rng;
use crate::domain::catalog::MaterialCatalog;
use crate::domain::materials::MaterialId;
use crate::world::World;

/// Maximum handler invocations per frame.
pub const DISPATCH_BUDGET: u32 = 4000;

/// Canonical unordered pair of material ids. Registration and dispatch agree
/// on the key regardless of argument order, and no strings are allocated on
/// the hot path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PairKey {
    lo: MaterialId,
    hi: MaterialId,
}

impl PairKey {
    #[inline]
    pub fn new(a: MaterialId, b: MaterialId) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }
}

/// A contact or adjacency between two cells. `a` is the cell whose update
/// triggered the dispatch.
#[derive(Clone, Copy, Debug)]
pub struct PairEvent {
    pub ax: i32,
    pub ay: i32,
    pub bx: i32,
    pub by: i32,
    pub id_a: MaterialId,
    pub id_b: MaterialId,
}

impl PairEvent {
    /// Split the event into (cell holding `id`, other cell), if either side
    /// matches. Handlers use this to orient an unordered pair.
    pub fn oriented(&self, id: MaterialId) -> Option<((i32, i32), (i32, i32, MaterialId))> {
        if self.id_a == id {
            Some(((self.ax, self.ay), (self.bx, self.by, self.id_b)))
        } else if self.id_b == id {
            Some(((self.bx, self.by), (self.ax, self.ay, self.id_a)))
        } else {
            None
        }
    }
}

/// A temperature event experienced by a single cell.
#[derive(Clone, Copy, Debug)]
pub struct ThermalEvent {
    pub x: i32,
    pub y: i32,
    pub id: MaterialId,
    pub temperature: f32,
}

/// Mutable state a handler is allowed to touch.
pub struct ReactionScope<'a> {
    pub world: &'a mut World,
    pub catalog: &'a MaterialCatalog,
    pub rng: &'a mut dyn Rng,
}

pub type PairHandler = Box<dyn Fn(&mut ReactionScope, &PairEvent)>;
pub type ThermalHandler = Box<dyn Fn(&mut ReactionScope, &ThermalEvent)>;

#[derive(Default)]
pub struct InteractionRouter {
    contact: HashMap<PairKey, PairHandler>,
    adjacent: HashMap<PairKey, PairHandler>,
    thermal: HashMap<MaterialId, ThermalHandler>,
    dispatched: u32,
}

impl InteractionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Router preloaded with the stock reaction set.
    pub fn with_default_reactions() -> Self {
        let mut router = Self::new();
        reactions::register_default_reactions(&mut router);
        router
    }

    /// Register a contact handler for the unordered pair `(a, b)`.
    /// Re-registering the same pair replaces the previous handler.
    pub fn on_contact(&mut self, a: MaterialId, b: MaterialId, handler: PairHandler) {
        self.contact.insert(PairKey::new(a, b), handler);
    }

    /// Register an adjacency handler for the unordered pair `(a, b)`.
    pub fn on_adjacent(&mut self, a: MaterialId, b: MaterialId, handler: PairHandler) {
        self.adjacent.insert(PairKey::new(a, b), handler);
    }

    /// Register a thermal handler for a single material.
    pub fn on_thermal(&mut self, id: MaterialId, handler: ThermalHandler) {
        self.thermal.insert(id, handler);
    }

    /// Dispatch a contact event. Returns true if a handler ran.
    pub fn contact(&mut self, scope: &mut ReactionScope, ev: &PairEvent) -> bool {
        if self.dispatched >= DISPATCH_BUDGET {
            return false;
        }
        let key = PairKey::new(ev.id_a, ev.id_b);
        let Some(handler) = self.contact.get(&key) else {
            return false;
        };
        self.dispatched += 1;
        handler(scope, ev);
        true
    }

    /// Dispatch an adjacency event. Returns true if a handler ran.
    pub fn adjacent_tick(&mut self, scope: &mut ReactionScope, ev: &PairEvent) -> bool {
        if self.dispatched >= DISPATCH_BUDGET {
            return false;
        }
        let key = PairKey::new(ev.id_a, ev.id_b);
        let Some(handler) = self.adjacent.get(&key) else {
            return false;
        };
        self.dispatched += 1;
        handler(scope, ev);
        true
    }

    /// Dispatch a thermal event. Returns true if a handler ran.
    pub fn thermal(&mut self, scope: &mut ReactionScope, ev: &ThermalEvent) -> bool {
        if self.dispatched >= DISPATCH_BUDGET {
            return false;
        }
        let Some(handler) = self.thermal.get(&ev.id) else {
            return false;
        };
        self.dispatched += 1;
        handler(scope, ev);
        true
    }

    /// Handler invocations so far this frame.
    pub fn dispatched(&self) -> u32 {
        self.dispatched
    }

    /// Restore full dispatch capacity. Call exactly once per frame.
    pub fn reset_frame(&mut self) {
        self.dispatched = 0;
    }
}
