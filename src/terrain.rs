use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TerrainType {
    Grass,
    Water,
    Forest,
    Mountain,
    /// Out-of-bounds or uninitialized. The generator never emits this for
    /// in-bounds cells.
    Empty,
}

impl TerrainType {
    pub fn is_buildable(self) -> bool {
        !matches!(self, TerrainType::Water | TerrainType::Mountain)
    }
}

/// Per-cycle yield of a tile, keyed by resource name. Food and wood are the
/// two counters the collection pass reads; anything else rides along in
/// `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceYield {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub food: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub wood: u32,
    #[serde(flatten)]
    pub extra: BTreeMap<String, u32>,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    pub x: i32,
    pub y: i32,
    pub terrain_type: TerrainType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupied_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_yield: Option<ResourceYield>,
}

impl Tile {
    pub fn new(x: i32, y: i32, terrain_type: TerrainType) -> Self {
        Self {
            x,
            y,
            terrain_type,
            occupied_by: None,
            resource_yield: None,
        }
    }
}
