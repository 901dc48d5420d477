//! Stock reaction set for the built-in materials.
//!
//! Rules are data-shaped and bilateral: both the aggressor and the victim
//! can transform, and a byproduct (smoke, steam) may spawn above the
//! reaction site when there is room.

use crate::domain::materials::{
    MaterialId, MAT_ACID, MAT_DIRT, MAT_EMPTY, MAT_FIRE, MAT_ICE, MAT_LAVA, MAT_OIL, MAT_SAND,
    MAT_SMOKE, MAT_STEAM, MAT_STONE, MAT_WATER, MAT_WOOD,
};

use super::{InteractionRouter, PairEvent, PairHandler, ReactionScope, ThermalEvent};

/// Register the built-in reaction rules on a router.
pub fn register_default_reactions(router: &mut InteractionRouter) {
    // Acid corrodes mineral and organic matter, consuming itself.
    for victim in [MAT_STONE, MAT_WOOD, MAT_SAND, MAT_DIRT] {
        router.on_contact(MAT_ACID, victim, corrode());
        router.on_adjacent(MAT_ACID, victim, corrode());
    }

    // Water extinguishes fire and quenches lava.
    router.on_contact(MAT_WATER, MAT_FIRE, extinguish());
    router.on_adjacent(MAT_WATER, MAT_FIRE, extinguish());
    router.on_contact(MAT_WATER, MAT_LAVA, quench());
    router.on_adjacent(MAT_WATER, MAT_LAVA, quench());

    // Fire and lava ignite flammables according to the victim's parameters.
    for heat in [MAT_FIRE, MAT_LAVA] {
        for victim in [MAT_WOOD, MAT_OIL] {
            router.on_contact(heat, victim, ignite(heat, victim));
            router.on_adjacent(heat, victim, ignite(heat, victim));
        }
    }

    // Cryogenic contact freezes adjacent water.
    router.on_adjacent(MAT_ICE, MAT_WATER, freeze_water());

    // Thermal transitions.
    router.on_thermal(MAT_ICE, Box::new(thermal_ice));
    router.on_thermal(MAT_WATER, Box::new(thermal_water));
    router.on_thermal(MAT_STEAM, Box::new(thermal_steam));
}

/// Spawn a byproduct directly above either reaction cell, if there is room.
fn spawn_above(scope: &mut ReactionScope, x: i32, y: i32, id: MaterialId) {
    if scope.world.is_empty(x, y - 1) {
        scope.world.rewrite_cell(x as u32, (y - 1) as u32, id);
    }
}

fn corrode() -> PairHandler {
    Box::new(|scope, ev| {
        let Some(((ax, ay), (vx, vy, _))) = ev.oriented(MAT_ACID) else {
            return;
        };
        if !scope.rng.chance(0.25) {
            return;
        }
        scope.world.clear_cell(vx as u32, vy as u32);
        spawn_above(scope, vx, vy, MAT_SMOKE);

        // Acid is consumed as it eats through matter.
        let dilute = scope
            .catalog
            .props(MAT_ACID)
            .reaction
            .map(|r| r.dilute_chance)
            .unwrap_or(0.0);
        if scope.rng.chance(0.5 + dilute) {
            scope.world.clear_cell(ax as u32, ay as u32);
        }
    })
}

fn extinguish() -> PairHandler {
    Box::new(|scope, ev| {
        let Some(((wx, wy), (fx, fy, _))) = ev.oriented(MAT_WATER) else {
            return;
        };
        if !scope.rng.chance(0.30) {
            return;
        }
        scope.world.clear_cell(fx as u32, fy as u32);
        scope.world.rewrite_cell(wx as u32, wy as u32, MAT_STEAM);
    })
}

fn quench() -> PairHandler {
    Box::new(|scope, ev| {
        let Some(((wx, wy), (lx, ly, _))) = ev.oriented(MAT_WATER) else {
            return;
        };
        if !scope.rng.chance(0.15) {
            return;
        }
        scope.world.rewrite_cell(lx as u32, ly as u32, MAT_STONE);
        scope.world.rewrite_cell(wx as u32, wy as u32, MAT_STEAM);
        spawn_above(scope, wx, wy, MAT_STEAM);
    })
}

fn ignite(heat: MaterialId, victim: MaterialId) -> PairHandler {
    Box::new(move |scope, ev| {
        let Some((_, (vx, vy, vid))) = ev.oriented(heat) else {
            return;
        };
        if vid != victim {
            return;
        }
        let Some((chance, product)) = scope.catalog.props(vid).reaction.and_then(|r| r.ignite)
        else {
            return;
        };
        if !scope.rng.chance(chance) {
            return;
        }
        scope.world.rewrite_cell(vx as u32, vy as u32, product);
        spawn_above(scope, vx, vy, MAT_SMOKE);
    })
}

fn freeze_water() -> PairHandler {
    Box::new(|scope, ev| {
        let Some((_, (wx, wy, _))) = ev.oriented(MAT_ICE) else {
            return;
        };
        let Some((chance, product)) = scope
            .catalog
            .props(MAT_WATER)
            .reaction
            .and_then(|r| r.freeze)
        else {
            return;
        };
        if scope.rng.chance(chance) {
            scope.world.rewrite_cell(wx as u32, wy as u32, product);
        }
    })
}

fn thermal_ice(scope: &mut ReactionScope, ev: &ThermalEvent) {
    if ev.temperature > 0.0 && scope.world.material_at(ev.x, ev.y) == MAT_ICE {
        scope.world.rewrite_cell(ev.x as u32, ev.y as u32, MAT_WATER);
    }
}

fn thermal_water(scope: &mut ReactionScope, ev: &ThermalEvent) {
    if scope.world.material_at(ev.x, ev.y) != MAT_WATER {
        return;
    }
    let params = scope.catalog.props(MAT_WATER).reaction.unwrap_or_default();
    if ev.temperature >= 100.0 {
        if let Some((chance, product)) = params.evaporate {
            if scope.rng.chance(chance) {
                scope.world.rewrite_cell(ev.x as u32, ev.y as u32, product);
            }
        }
    } else if ev.temperature <= 0.0 {
        if let Some((chance, product)) = params.freeze {
            if scope.rng.chance(chance) {
                scope.world.rewrite_cell(ev.x as u32, ev.y as u32, product);
            }
        }
    }
}

fn thermal_steam(scope: &mut ReactionScope, ev: &ThermalEvent) {
    if ev.temperature >= 100.0 || scope.world.material_at(ev.x, ev.y) != MAT_STEAM {
        return;
    }
    if let Some((chance, product)) = scope
        .catalog
        .props(MAT_STEAM)
        .reaction
        .and_then(|r| r.freeze)
    {
        if scope.rng.chance(chance) {
            scope.world.rewrite_cell(ev.x as u32, ev.y as u32, product);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::{Rng, XorShift32};
    use crate::domain::catalog::MaterialCatalog;
    use crate::world::World;

    /// RNG stub that always rolls under any positive probability.
    struct AlwaysHit;

    impl Rng for AlwaysHit {
        fn next_u32(&mut self) -> u32 {
            0
        }
        fn next_f32(&mut self) -> f32 {
            0.0
        }
    }

    fn dispatch_contact(
        router: &mut InteractionRouter,
        world: &mut World,
        catalog: &MaterialCatalog,
        rng: &mut dyn Rng,
        ev: PairEvent,
    ) -> bool {
        let mut scope = ReactionScope {
            world,
            catalog,
            rng,
        };
        router.contact(&mut scope, &ev)
    }

    #[test]
    fn acid_dissolves_stone() {
        let mut world = World::new(8, 8);
        let catalog = MaterialCatalog::builtin();
        let mut rng = AlwaysHit;
        let mut router = InteractionRouter::with_default_reactions();

        world.set_cell(2, 3, MAT_ACID);
        world.set_cell(2, 4, MAT_STONE);

        let ev = PairEvent {
            ax: 2,
            ay: 3,
            bx: 2,
            by: 4,
            id_a: MAT_ACID,
            id_b: MAT_STONE,
        };
        assert!(dispatch_contact(
            &mut router,
            &mut world,
            &catalog,
            &mut rng,
            ev
        ));
        assert_eq!(world.material_at(2, 4), MAT_EMPTY);
    }

    #[test]
    fn water_extinguishes_fire_into_steam() {
        let mut world = World::new(8, 8);
        let catalog = MaterialCatalog::builtin();
        let mut rng = AlwaysHit;
        let mut router = InteractionRouter::with_default_reactions();

        world.set_cell(4, 4, MAT_FIRE);
        world.set_cell(4, 5, MAT_WATER);

        // Dispatched from the fire side; handler orients on water.
        let ev = PairEvent {
            ax: 4,
            ay: 4,
            bx: 4,
            by: 5,
            id_a: MAT_FIRE,
            id_b: MAT_WATER,
        };
        assert!(dispatch_contact(
            &mut router,
            &mut world,
            &catalog,
            &mut rng,
            ev
        ));
        assert_eq!(world.material_at(4, 4), MAT_EMPTY);
        assert_eq!(world.material_at(4, 5), MAT_STEAM);
    }

    #[test]
    fn fire_ignites_wood_using_its_parameters() {
        let mut world = World::new(8, 8);
        let catalog = MaterialCatalog::builtin();
        let mut rng = AlwaysHit;
        let mut router = InteractionRouter::with_default_reactions();

        world.set_cell(3, 3, MAT_FIRE);
        world.set_cell(3, 4, MAT_WOOD);

        let ev = PairEvent {
            ax: 3,
            ay: 3,
            bx: 3,
            by: 4,
            id_a: MAT_FIRE,
            id_b: MAT_WOOD,
        };
        dispatch_contact(&mut router, &mut world, &catalog, &mut rng, ev);
        assert_eq!(world.material_at(3, 4), MAT_FIRE);
    }

    #[test]
    fn thermal_melts_ice_above_freezing() {
        let mut world = World::new(8, 8);
        let catalog = MaterialCatalog::builtin();
        let mut rng = XorShift32::new(9);
        let mut router = InteractionRouter::with_default_reactions();

        world.set_cell(1, 1, MAT_ICE);
        let mut scope = ReactionScope {
            world: &mut world,
            catalog: &catalog,
            rng: &mut rng,
        };
        let ev = ThermalEvent {
            x: 1,
            y: 1,
            id: MAT_ICE,
            temperature: 15.0,
        };
        assert!(router.thermal(&mut scope, &ev));
        assert_eq!(world.material_at(1, 1), MAT_WATER);
    }
}
