//! Movement behaviors, one per movable material category.
//!
//! All three share the same skeleton: try the buoyancy-preferred vertical
//! step, then seek support laterally along the adjacent row, bounded by the
//! material's `lateral_run_max`. The differences (viscosity rolls, same-row
//! spreading, rise vs. sink) live in the per-category implementations.

mod gas;
mod liquid;
mod powder;

pub use gas::GasBehavior;
pub use liquid::LiquidBehavior;
pub use powder::PowderBehavior;

use crate::core::rng::Rng;
use crate::domain::catalog::MaterialCatalog;
use crate::domain::materials::{Category, MaterialId, MAT_EMPTY};
use crate::interact::{InteractionRouter, PairEvent, ReactionScope};
use crate::world::World;

/// Update context passed to behaviors for a single cell.
pub struct UpdateContext<'a> {
    pub world: &'a mut World,
    pub catalog: &'a MaterialCatalog,
    pub router: &'a mut InteractionRouter,
    pub rng: &'a mut dyn Rng,
    pub x: i32,
    pub y: i32,
}

/// Behavior trait - each movable category implements this.
pub trait Behavior {
    fn update(&self, ctx: &mut UpdateContext);
}

/// Behavior registry - dispatch by category. Solids have no behavior.
pub struct BehaviorRegistry {
    powder: PowderBehavior,
    liquid: LiquidBehavior,
    gas: GasBehavior,
}

impl BehaviorRegistry {
    pub fn new() -> Self {
        Self {
            powder: PowderBehavior,
            liquid: LiquidBehavior,
            gas: GasBehavior,
        }
    }

    pub fn update(&self, category: Category, ctx: &mut UpdateContext) {
        match category {
            Category::Powder => self.powder.update(ctx),
            Category::Liquid => self.liquid.update(ctx),
            Category::Gas => self.gas.update(ctx),
            Category::Solid => {}
        }
    }
}

impl Default for BehaviorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of the vertical movement attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum VerticalOutcome {
    /// The cell moved (or a reaction consumed the attempt).
    Moved,
    /// The preferred neighbor exists but cannot be entered.
    Blocked,
    /// Zero buoyancy: no vertical preference.
    NoPreference,
}

/// Can content of density `my_density` swap into the cell holding `target`?
/// Sinking matter displaces strictly lighter cells; rising matter floats up
/// through strictly heavier ones. Immovable cells block either way.
#[inline]
pub(crate) fn can_displace(
    catalog: &MaterialCatalog,
    target: MaterialId,
    my_density: f32,
    rising: bool,
) -> bool {
    if target == MAT_EMPTY {
        return true;
    }
    let props = catalog.props(target);
    if props.immovable() {
        return false;
    }
    if rising {
        props.density() > my_density
    } else {
        props.density() < my_density
    }
}

/// Commit a move from `(x, y)` to `(tx, ty)`: swap the cells, mark the
/// destination moved, unmark the source, and record the horizontal
/// direction on the destination.
pub(crate) fn commit_move(world: &mut World, x: i32, y: i32, tx: i32, ty: i32, dir: i8) {
    world.swap_cells(x as u32, y as u32, tx as u32, ty as u32);
    world.set_moved(tx as u32, ty as u32);
    world.clear_moved(x as u32, y as u32);
    world.set_dir(tx as u32, ty as u32, dir);
}

/// Try the buoyancy-preferred vertical step. Dispatches the contact hook
/// before committing or rejecting a swap with foreign matter, and re-reads
/// both cells afterwards so it never acts on stale ids.
pub(crate) fn try_vertical(ctx: &mut UpdateContext, id: MaterialId, my_density: f32, buoyancy: i8) -> VerticalOutcome {
    if buoyancy == 0 {
        return VerticalOutcome::NoPreference;
    }
    // Positive buoyancy prefers the cell above.
    let rising = buoyancy > 0;
    let dy = if rising { -1 } else { 1 };
    let (tx, ty) = (ctx.x, ctx.y + dy);

    if !ctx.world.in_bounds(tx, ty) {
        return VerticalOutcome::Blocked;
    }

    let target = ctx.world.material_at(tx, ty);
    if target == MAT_EMPTY {
        commit_move(ctx.world, ctx.x, ctx.y, tx, ty, 0);
        return VerticalOutcome::Moved;
    }

    if target != id {
        let ev = PairEvent {
            ax: ctx.x,
            ay: ctx.y,
            bx: tx,
            by: ty,
            id_a: id,
            id_b: target,
        };
        let mut scope = ReactionScope {
            world: &mut *ctx.world,
            catalog: ctx.catalog,
            rng: &mut *ctx.rng,
        };
        ctx.router.contact(&mut scope, &ev);

        // A reaction may have rewritten either cell; never act on stale ids.
        if ctx.world.material_at(ctx.x, ctx.y) != id || ctx.world.material_at(tx, ty) != target {
            return VerticalOutcome::Moved;
        }
    }

    if can_displace(ctx.catalog, target, my_density, rising) {
        commit_move(ctx.world, ctx.x, ctx.y, tx, ty, 0);
        return VerticalOutcome::Moved;
    }

    VerticalOutcome::Blocked
}

/// Probe up to `run` cells in `dir` along `row`, returning the distance of
/// the first empty cell, or `None` if a wall, a boundary or heavier matter
/// blocks the path first. Swappable (strictly lighter, movable) cells may be
/// passed through.
fn probe(
    world: &World,
    catalog: &MaterialCatalog,
    x: i32,
    row: i32,
    dir: i32,
    run: i32,
    my_density: f32,
    rising: bool,
) -> Option<i32> {
    for d in 1..=run {
        let tx = x + dir * d;
        if !world.in_bounds(tx, row) {
            return None;
        }
        let t = world.material_at(tx, row);
        if t == MAT_EMPTY {
            return Some(d);
        }
        if !can_displace(catalog, t, my_density, rising) {
            return None;
        }
    }
    None
}

/// Pick a direction given the two probe results. The nearer side wins; on an
/// exact tie the previous direction is continued when viable, otherwise the
/// RNG decides.
fn choose_dir(last_dir: i8, left: Option<i32>, right: Option<i32>, rng: &mut dyn Rng) -> Option<(i32, i32)> {
    match (left, right) {
        (Some(dl), Some(dr)) => {
            if dl < dr {
                Some((-1, dl))
            } else if dr < dl {
                Some((1, dr))
            } else if last_dir < 0 {
                Some((-1, dl))
            } else if last_dir > 0 {
                Some((1, dr))
            } else if rng.coin() {
                Some((-1, dl))
            } else {
                Some((1, dr))
            }
        }
        (Some(dl), None) => Some((-1, dl)),
        (None, Some(dr)) => Some((1, dr)),
        (None, None) => None,
    }
}

/// Seek support along the row `vdir` steps away (below for sinking matter,
/// above for rising), bounded by `run`. Returns true if the cell moved.
pub(crate) fn seek_lateral(ctx: &mut UpdateContext, my_density: f32, run: i32, vdir: i32) -> bool {
    if run <= 0 {
        return false;
    }
    let rising = vdir < 0;
    let row = ctx.y + vdir;
    let last_dir = ctx.world.dir_at(ctx.x as u32, ctx.y as u32);

    let left = probe(ctx.world, ctx.catalog, ctx.x, row, -1, run, my_density, rising);
    let right = probe(ctx.world, ctx.catalog, ctx.x, row, 1, run, my_density, rising);

    let Some((dir, dist)) = choose_dir(last_dir, left, right, ctx.rng) else {
        return false;
    };
    commit_move(ctx.world, ctx.x, ctx.y, ctx.x + dir * dist, row, dir as i8);
    true
}

/// Spread along the cell's own row into the nearest reachable empty cell.
/// Used by liquids and gases when no supported position exists on the
/// adjacent row.
pub(crate) fn spread_same_row(ctx: &mut UpdateContext, my_density: f32, run: i32, rising: bool) -> bool {
    if run <= 0 {
        return false;
    }
    let last_dir = ctx.world.dir_at(ctx.x as u32, ctx.y as u32);

    let left = probe(ctx.world, ctx.catalog, ctx.x, ctx.y, -1, run, my_density, rising);
    let right = probe(ctx.world, ctx.catalog, ctx.x, ctx.y, 1, run, my_density, rising);

    let Some((dir, dist)) = choose_dir(last_dir, left, right, ctx.rng) else {
        return false;
    };
    commit_move(ctx.world, ctx.x, ctx.y, ctx.x + dir * dist, ctx.y, dir as i8);
    true
}
