//! Step engine - advances a world by exactly one tick.
//!
//! Scan order is rows bottom-to-top, columns left-to-right. The bottom-up
//! scan plus the per-cell moved flag gives single-pass semantics: content
//! that falls into a lower row this tick is never re-examined, and nothing
//! moves more than one lattice row per tick.
//!
//! Ordering within a cell: decay, then movement, then one sampled adjacency
//! reaction - movement first, reactions after, per cell.

pub mod behaviors;
pub mod facade;

use crate::core::rng::Rng;
use crate::domain::catalog::MaterialCatalog;
use crate::domain::materials::{MaterialId, MAT_EMPTY};
use crate::interact::{InteractionRouter, PairEvent, ReactionScope};
use crate::world::World;

use behaviors::{BehaviorRegistry, UpdateContext};

pub use facade::Simulation;

#[derive(Default)]
pub struct StepEngine {
    behaviors: BehaviorRegistry,
}

impl StepEngine {
    pub fn new() -> Self {
        Self {
            behaviors: BehaviorRegistry::new(),
        }
    }

    /// Clear the moved flag on every cell. Idempotent; must run before
    /// movement is computed.
    pub fn begin_tick(world: &mut World) {
        world.clear_moved_flags();
    }

    /// Clear the moved flag again so tick-scoped state never leaks into the
    /// next tick.
    pub fn end_tick(world: &mut World) {
        world.clear_moved_flags();
    }

    /// One full pass over the grid. Call between `begin_tick` and
    /// `end_tick`; performs no I/O and never suspends mid-scan.
    pub fn step(
        &self,
        world: &mut World,
        catalog: &MaterialCatalog,
        router: &mut InteractionRouter,
        rng: &mut dyn Rng,
    ) {
        let w = world.width() as i32;
        let h = world.height() as i32;

        for y in (0..h).rev() {
            for x in 0..w {
                self.update_cell(world, catalog, router, rng, x, y);
            }
        }
    }

    fn update_cell(
        &self,
        world: &mut World,
        catalog: &MaterialCatalog,
        router: &mut InteractionRouter,
        rng: &mut dyn Rng,
        x: i32,
        y: i32,
    ) {
        let id = world.material_at(x, y);
        if id == MAT_EMPTY {
            return;
        }
        // Unknown ids are treated conservatively: immovable, non-reactive.
        if !catalog.is_known(id) {
            return;
        }
        if world.moved(x as u32, y as u32) {
            return;
        }

        let props = catalog.props(id);

        // Transient decay runs before movement. A painted cell carries
        // lifetime 0 until its first visit stamps the catalog value.
        let max_life = props.lifetime();
        if max_life > 0 {
            let life = world.lifetime_at(x as u32, y as u32);
            if life == 0 {
                world.set_lifetime(x as u32, y as u32, max_life);
            } else if life == 1 {
                world.clear_cell(x as u32, y as u32);
                return;
            } else {
                world.set_lifetime(x as u32, y as u32, life - 1);
            }
        }

        if !props.immovable() {
            let category = props.category();
            let mut ctx = UpdateContext {
                world,
                catalog,
                router,
                rng,
                x,
                y,
            };
            self.behaviors.update(category, &mut ctx);
        }

        // Reactions after movement: sample one random neighbor of wherever
        // content now sits at (x, y).
        let id_now = world.material_at(x, y);
        if id_now != MAT_EMPTY {
            sample_adjacent(world, catalog, router, rng, x, y, id_now);
        }
    }
}

/// Dispatch an adjacency event against one RNG-chosen neighbor.
fn sample_adjacent(
    world: &mut World,
    catalog: &MaterialCatalog,
    router: &mut InteractionRouter,
    rng: &mut dyn Rng,
    x: i32,
    y: i32,
    id: MaterialId,
) {
    let (nx, ny) = match rng.next_u32() & 3 {
        0 => (x, y - 1),
        1 => (x, y + 1),
        2 => (x - 1, y),
        _ => (x + 1, y),
    };

    if !world.in_bounds(nx, ny) {
        return;
    }
    let nid = world.material_at(nx, ny);
    if nid == MAT_EMPTY {
        return;
    }

    let ev = PairEvent {
        ax: x,
        ay: y,
        bx: nx,
        by: ny,
        id_a: id,
        id_b: nid,
    };
    let mut scope = ReactionScope {
        world,
        catalog,
        rng,
    };
    router.adjacent_tick(&mut scope, &ev);
}
