//! Gas movement: the powder/liquid algorithm with buoyancy inverted (rise)
//! and typically wider lateral runs. Transient-gas decay is handled by the
//! step engine before movement.

use crate::domain::materials::MAT_EMPTY;

use super::{seek_lateral, spread_same_row, try_vertical, Behavior, UpdateContext, VerticalOutcome};

pub struct GasBehavior;

impl Behavior for GasBehavior {
    fn update(&self, ctx: &mut UpdateContext) {
        let id = ctx.world.material_at(ctx.x, ctx.y);
        if id == MAT_EMPTY {
            return;
        }
        let props = ctx.catalog.props(id);
        let density = props.density();
        let buoyancy = props.buoyancy();
        let run = props.lateral_run_max() as i32;

        match try_vertical(ctx, id, density, buoyancy) {
            VerticalOutcome::Moved | VerticalOutcome::NoPreference => {}
            VerticalOutcome::Blocked => {
                let vdir = if buoyancy > 0 { -1 } else { 1 };
                if !seek_lateral(ctx, density, run, vdir) {
                    spread_same_row(ctx, density, run, buoyancy > 0);
                }
            }
        }
    }
}
