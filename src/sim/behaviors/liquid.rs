//! Liquid movement: fall, seek support one row down within the lateral run,
//! and otherwise level out along the current row. Viscosity is the per-tick
//! probability that a blocked liquid skips lateral seeking entirely.

use crate::domain::materials::MAT_EMPTY;

use super::{seek_lateral, spread_same_row, try_vertical, Behavior, UpdateContext, VerticalOutcome};

pub struct LiquidBehavior;

impl Behavior for LiquidBehavior {
    fn update(&self, ctx: &mut UpdateContext) {
        let id = ctx.world.material_at(ctx.x, ctx.y);
        if id == MAT_EMPTY {
            return;
        }
        let props = ctx.catalog.props(id);
        let density = props.density();
        let buoyancy = props.buoyancy();
        let viscosity = props.viscosity();
        let run = props.lateral_run_max() as i32;

        match try_vertical(ctx, id, density, buoyancy) {
            VerticalOutcome::Moved | VerticalOutcome::NoPreference => {}
            VerticalOutcome::Blocked => {
                if viscosity > 0.0 && ctx.rng.chance(viscosity) {
                    return;
                }
                let vdir = if buoyancy > 0 { -1 } else { 1 };
                if !seek_lateral(ctx, density, run, vdir) {
                    spread_same_row(ctx, density, run, buoyancy > 0);
                }
            }
        }
    }
}
