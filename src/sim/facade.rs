//! Simulation facade - owns the world, catalog, router and RNG, and exposes
//! the small surface a host application actually needs: paint, tick, inject
//! thermal events, read buffers for rendering, snapshot and restore.

use crate::codec::{self, CodecError, Snapshot};
use crate::core::rng::XorShift32;
use crate::domain::catalog::MaterialCatalog;
use crate::domain::materials::{MaterialId, MAT_EMPTY};
use crate::interact::{InteractionRouter, ReactionScope, ThermalEvent};
use crate::world::World;

use super::StepEngine;

pub struct Simulation {
    world: World,
    catalog: MaterialCatalog,
    engine: StepEngine,
    router: InteractionRouter,
    rng: XorShift32,
    frame: u64,
}

impl Simulation {
    /// Simulation over the built-in material set and stock reactions.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_catalog(width, height, MaterialCatalog::builtin())
    }

    /// Simulation over a caller-supplied catalog. The stock reaction set is
    /// still registered; callers can re-register pairs to override it.
    pub fn with_catalog(width: u32, height: u32, catalog: MaterialCatalog) -> Self {
        Self {
            world: World::new(width, height),
            catalog,
            engine: StepEngine::new(),
            router: InteractionRouter::with_default_reactions(),
            rng: XorShift32::default(),
            frame: 0,
        }
    }

    /// Reseed the RNG, making the run reproducible from this point on.
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.rng = XorShift32::new(seed);
        self
    }

    /// Advance the world by exactly one tick.
    pub fn tick(&mut self) {
        StepEngine::begin_tick(&mut self.world);
        self.engine
            .step(&mut self.world, &self.catalog, &mut self.router, &mut self.rng);
        StepEngine::end_tick(&mut self.world);
        self.router.reset_frame();
        self.frame += 1;
    }

    /// Ticks completed since construction or the last restore.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    // === Editing ===

    /// Paint a filled circle of `id`. Returns the number of cells changed.
    pub fn paint(&mut self, x: i32, y: i32, radius: u32, id: MaterialId) -> usize {
        if id != MAT_EMPTY && !self.catalog.is_known(id) {
            log::warn!("paint with unknown material id {}", id);
            return 0;
        }
        self.world.paint_circle(x, y, radius, id)
    }

    /// Erase a filled circle back to empty.
    pub fn erase(&mut self, x: i32, y: i32, radius: u32) -> usize {
        self.world.paint_circle(x, y, radius, MAT_EMPTY)
    }

    /// Apply a temperature to one cell, dispatching its thermal handler if
    /// the cell holds a registered material.
    pub fn thermal_event(&mut self, x: i32, y: i32, temperature: f32) -> bool {
        let id = self.world.material_at(x, y);
        if id == MAT_EMPTY {
            return false;
        }
        let ev = ThermalEvent {
            x,
            y,
            id,
            temperature,
        };
        let mut scope = ReactionScope {
            world: &mut self.world,
            catalog: &self.catalog,
            rng: &mut self.rng,
        };
        self.router.thermal(&mut scope, &ev)
    }

    // === Access ===

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn catalog(&self) -> &MaterialCatalog {
        &self.catalog
    }

    pub fn router_mut(&mut self) -> &mut InteractionRouter {
        &mut self.router
    }

    /// Raw cell buffer, for renderers.
    pub fn cells(&self) -> &[MaterialId] {
        &self.world.cells
    }

    // === Persistence ===

    /// Snapshot the current world.
    pub fn snapshot(&self) -> Result<Snapshot, CodecError> {
        codec::serialize(&self.world)
    }

    /// Snapshot straight to JSON text.
    pub fn snapshot_string(&self) -> Result<String, CodecError> {
        codec::serialize_to_string(&self.world)
    }

    /// Replace the world from a snapshot. On a damaged snapshot the current
    /// world is left untouched and `false` is returned.
    pub fn restore(&mut self, snapshot: &Snapshot) -> bool {
        match codec::deserialize(snapshot) {
            Some(world) => {
                self.world = world;
                self.frame = 0;
                true
            }
            None => false,
        }
    }

    /// Replace the world from snapshot JSON text.
    pub fn restore_str(&mut self, text: &str) -> bool {
        match codec::deserialize_str(text) {
            Some(world) => {
                self.world = world;
                self.frame = 0;
                true
            }
            None => false,
        }
    }
}
