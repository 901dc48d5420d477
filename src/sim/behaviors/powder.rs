//! Powder movement: fall, then pile by slipping into a supported position
//! one row down. Powders can sink through strictly lighter movable matter.

use crate::domain::materials::MAT_EMPTY;

use super::{seek_lateral, try_vertical, Behavior, UpdateContext, VerticalOutcome};

pub struct PowderBehavior;

impl Behavior for PowderBehavior {
    fn update(&self, ctx: &mut UpdateContext) {
        let id = ctx.world.material_at(ctx.x, ctx.y);
        if id == MAT_EMPTY {
            return;
        }
        let props = ctx.catalog.props(id);
        let density = props.density();
        let buoyancy = props.buoyancy();

        match try_vertical(ctx, id, density, buoyancy) {
            VerticalOutcome::Moved | VerticalOutcome::NoPreference => {}
            VerticalOutcome::Blocked => {
                let run = props.lateral_run_max() as i32;
                let vdir = if buoyancy > 0 { -1 } else { 1 };
                seek_lateral(ctx, density, run, vdir);
            }
        }
    }
}
