//! Material catalog: the resolved, immutable id -> properties table.
//!
//! The catalog is built once (from the built-in set or a JSON bundle) and
//! then injected into the step engine and interaction router. Nothing in the
//! engine looks materials up through global state, and unknown ids resolve
//! to a conservative immovable, non-reactive fallback.

use std::collections::HashMap;

use serde::Deserialize;

use super::materials::{
    Category, MaterialId, MaterialKind, MaterialProps, ReactionParams, FLAG_CORROSIVE,
    FLAG_CRYOGENIC, FLAG_FLAMMABLE, FLAG_NONE, FLAG_OXIDIZER, MAT_ACID, MAT_DIRT, MAT_EMPTY,
    MAT_FIRE, MAT_ICE, MAT_LAVA, MAT_OIL, MAT_SAND, MAT_SMOKE, MAT_STEAM, MAT_STONE, MAT_WALL,
    MAT_WATER, MAT_WOOD,
};

#[derive(Clone)]
pub struct MaterialCatalog {
    materials: Vec<MaterialProps>,
    name_to_id: HashMap<String, MaterialId>,
    /// Returned for ids outside the table: immovable and non-reactive.
    fallback: MaterialProps,
}

impl MaterialCatalog {
    /// The stock material set.
    pub fn builtin() -> Self {
        let mut b = CatalogBuilder::new();

        b.push(MAT_EMPTY, "empty", MaterialKind::Solid { density: 0.0, immovable: false }, FLAG_NONE, None);
        b.push(MAT_WALL, "wall", MaterialKind::Solid { density: 1000.0, immovable: true }, FLAG_NONE, None);
        b.push(MAT_STONE, "stone", MaterialKind::Solid { density: 2.6, immovable: true }, FLAG_NONE, None);
        b.push(
            MAT_WOOD,
            "wood",
            MaterialKind::Solid { density: 0.7, immovable: true },
            FLAG_FLAMMABLE,
            Some(ReactionParams { ignite: Some((0.10, MAT_FIRE)), ..Default::default() }),
        );
        b.push(
            MAT_ICE,
            "ice",
            MaterialKind::Solid { density: 0.9, immovable: true },
            FLAG_CRYOGENIC,
            Some(ReactionParams { evaporate: Some((0.02, MAT_WATER)), ..Default::default() }),
        );
        b.push(
            MAT_SAND,
            "sand",
            MaterialKind::Powder { density: 1.5, buoyancy: -1, lateral_run_max: 1 },
            FLAG_NONE,
            None,
        );
        b.push(
            MAT_DIRT,
            "dirt",
            MaterialKind::Powder { density: 1.4, buoyancy: -1, lateral_run_max: 1 },
            FLAG_NONE,
            None,
        );
        b.push(
            MAT_WATER,
            "water",
            MaterialKind::Liquid { density: 1.0, buoyancy: -1, viscosity: 0.0, lateral_run_max: 5 },
            FLAG_NONE,
            Some(ReactionParams {
                freeze: Some((0.05, MAT_ICE)),
                evaporate: Some((0.20, MAT_STEAM)),
                ..Default::default()
            }),
        );
        b.push(
            MAT_OIL,
            "oil",
            MaterialKind::Liquid { density: 0.8, buoyancy: -1, viscosity: 0.2, lateral_run_max: 4 },
            FLAG_FLAMMABLE,
            Some(ReactionParams { ignite: Some((0.20, MAT_FIRE)), ..Default::default() }),
        );
        b.push(
            MAT_ACID,
            "acid",
            MaterialKind::Liquid { density: 1.1, buoyancy: -1, viscosity: 0.1, lateral_run_max: 3 },
            FLAG_CORROSIVE,
            Some(ReactionParams { dilute_chance: 0.02, ..Default::default() }),
        );
        b.push(
            MAT_LAVA,
            "lava",
            MaterialKind::Liquid { density: 3.0, buoyancy: -1, viscosity: 0.7, lateral_run_max: 2 },
            FLAG_NONE,
            None,
        );
        b.push(
            MAT_STEAM,
            "steam",
            MaterialKind::Gas { density: 0.10, buoyancy: 1, lateral_run_max: 8, lifetime: 180 },
            FLAG_NONE,
            Some(ReactionParams { freeze: Some((0.10, MAT_WATER)), ..Default::default() }),
        );
        b.push(
            MAT_SMOKE,
            "smoke",
            MaterialKind::Gas { density: 0.20, buoyancy: 1, lateral_run_max: 6, lifetime: 120 },
            FLAG_NONE,
            None,
        );
        b.push(
            MAT_FIRE,
            "fire",
            MaterialKind::Gas { density: 0.05, buoyancy: 1, lateral_run_max: 2, lifetime: 40 },
            FLAG_OXIDIZER,
            None,
        );

        b.finish()
    }

    /// Build a catalog from a JSON material bundle.
    pub fn from_bundle_json(json: &str) -> Result<Self, String> {
        let bundle: BundleRoot = serde_json::from_str(json).map_err(|e| e.to_string())?;
        Self::from_bundle(bundle)
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn is_known(&self, id: MaterialId) -> bool {
        (id as usize) < self.materials.len()
    }

    /// Total lookup: out-of-table ids get the conservative fallback.
    #[inline]
    pub fn props(&self, id: MaterialId) -> &MaterialProps {
        self.materials.get(id as usize).unwrap_or(&self.fallback)
    }

    pub fn id_by_name(&self, name: &str) -> Option<MaterialId> {
        self.name_to_id.get(name).copied()
    }

    #[inline]
    pub fn category(&self, id: MaterialId) -> Category {
        self.props(id).category()
    }

    fn from_bundle(bundle: BundleRoot) -> Result<Self, String> {
        let mut max_id: u16 = 0;
        for m in bundle.materials.iter() {
            if m.id > max_id {
                max_id = m.id;
            }
        }

        let len = (max_id as usize) + 1;
        let mut by_id: Vec<Option<MaterialProps>> = vec![None; len];
        let mut name_to_id = HashMap::new();

        for m in bundle.materials.into_iter() {
            let idx = m.id as usize;
            if by_id[idx].is_some() {
                return Err(format!("duplicate material id: {}", idx));
            }

            let kind = match m.category.as_str() {
                "solid" => MaterialKind::Solid {
                    density: m.density,
                    immovable: m.immovable.unwrap_or(true),
                },
                "powder" => MaterialKind::Powder {
                    density: m.density,
                    buoyancy: m.buoyancy.unwrap_or(-1),
                    lateral_run_max: m.lateral_run_max.unwrap_or(1),
                },
                "liquid" => MaterialKind::Liquid {
                    density: m.density,
                    buoyancy: m.buoyancy.unwrap_or(-1),
                    viscosity: m.viscosity.unwrap_or(0.0),
                    lateral_run_max: m.lateral_run_max.unwrap_or(4),
                },
                "gas" => MaterialKind::Gas {
                    density: m.density,
                    buoyancy: m.buoyancy.unwrap_or(1),
                    lateral_run_max: m.lateral_run_max.unwrap_or(6),
                    lifetime: m.lifetime.unwrap_or(0),
                },
                other => return Err(format!("unknown category: {}", other)),
            };

            let mut flags = FLAG_NONE;
            if m.flags.flammable {
                flags |= FLAG_FLAMMABLE;
            }
            if m.flags.corrosive {
                flags |= FLAG_CORROSIVE;
            }
            if m.flags.cryogenic {
                flags |= FLAG_CRYOGENIC;
            }
            if m.flags.oxidizer {
                flags |= FLAG_OXIDIZER;
            }

            let reaction = m.reaction.map(|r| ReactionParams {
                ignite: r.ignite.map(|e| (e.chance, e.to_id)),
                freeze: r.freeze.map(|e| (e.chance, e.to_id)),
                evaporate: r.evaporate.map(|e| (e.chance, e.to_id)),
                dilute_chance: r.dilute_chance.unwrap_or(0.0),
            });

            name_to_id.insert(m.name.clone(), m.id);
            by_id[idx] = Some(MaterialProps {
                name: m.name,
                kind,
                flags,
                reaction,
            });
        }

        if by_id.first().map_or(true, |v| v.is_none()) {
            return Err("missing material id 0 (empty)".to_string());
        }

        let mut materials = Vec::with_capacity(by_id.len());
        for (idx, slot) in by_id.into_iter().enumerate() {
            materials.push(slot.ok_or_else(|| format!("missing material id {}", idx))?);
        }

        Ok(Self {
            materials,
            name_to_id,
            fallback: fallback_props(),
        })
    }
}

impl Default for MaterialCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn fallback_props() -> MaterialProps {
    MaterialProps {
        name: "unknown".to_string(),
        kind: MaterialKind::Solid {
            density: f32::INFINITY,
            immovable: true,
        },
        flags: FLAG_NONE,
        reaction: None,
    }
}

struct CatalogBuilder {
    materials: Vec<MaterialProps>,
    name_to_id: HashMap<String, MaterialId>,
}

impl CatalogBuilder {
    fn new() -> Self {
        Self {
            materials: Vec::new(),
            name_to_id: HashMap::new(),
        }
    }

    fn push(
        &mut self,
        id: MaterialId,
        name: &str,
        kind: MaterialKind,
        flags: u16,
        reaction: Option<ReactionParams>,
    ) {
        debug_assert_eq!(id as usize, self.materials.len(), "ids must be dense");
        self.name_to_id.insert(name.to_string(), id);
        self.materials.push(MaterialProps {
            name: name.to_string(),
            kind,
            flags,
            reaction,
        });
    }

    fn finish(self) -> MaterialCatalog {
        MaterialCatalog {
            materials: self.materials,
            name_to_id: self.name_to_id,
            fallback: fallback_props(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BundleRoot {
    materials: Vec<BundleMaterial>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BundleMaterial {
    id: u16,
    name: String,
    category: String,
    density: f32,
    #[serde(default)]
    buoyancy: Option<i8>,
    #[serde(default)]
    viscosity: Option<f32>,
    #[serde(default)]
    lateral_run_max: Option<u8>,
    #[serde(default)]
    lifetime: Option<u16>,
    #[serde(default)]
    immovable: Option<bool>,
    #[serde(default)]
    flags: BundleFlags,
    #[serde(default)]
    reaction: Option<BundleReaction>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BundleFlags {
    #[serde(default)]
    flammable: bool,
    #[serde(default)]
    corrosive: bool,
    #[serde(default)]
    cryogenic: bool,
    #[serde(default)]
    oxidizer: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BundleReaction {
    #[serde(default)]
    ignite: Option<BundleEndpoint>,
    #[serde(default)]
    freeze: Option<BundleEndpoint>,
    #[serde(default)]
    evaporate: Option<BundleEndpoint>,
    #[serde(default)]
    dilute_chance: Option<f32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BundleEndpoint {
    chance: f32,
    to_id: MaterialId,
}
