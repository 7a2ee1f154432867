use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mapgen::{self, InvalidDimensions};
use crate::save::{self, SaveError};
use crate::terrain::{ResourceYield, TerrainType, Tile};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePool {
    pub food: i64,
    pub wood: i64,
}

impl ResourcePool {
    pub fn new(food: i64, wood: i64) -> Self {
        Self { food, wood }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSize {
    pub rows: i32,
    pub cols: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YurtUnit {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub morale: i32,
    /// Per-yurt counters. Tracked and persisted, but the shipped collection
    /// pass only moves the global pool; these stay put until a per-yurt
    /// economy lands.
    pub resources: ResourcePool,
}

/// The whole persisted game: the unit of serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub map: Vec<Vec<Tile>>,
    pub yurt_units: Vec<YurtUnit>,
    pub resources: ResourcePool,
    pub map_size: MapSize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("cannot build on water")]
    Water,
    #[error("cannot build on mountains")]
    Mountain,
    #[error("tile is already occupied")]
    Occupied,
    #[error("not enough wood (need {needed}, have {available})")]
    InsufficientWood { needed: i64, available: i64 },
    #[error("tile ({x}, {y}) is outside the map")]
    OutOfBounds { x: i32, y: i32 },
}

/// Authoritative owner of the mutable game state. Reads hand out borrows of
/// the live state; writes go through the operations below.
pub struct World {
    state: GameState,
}

impl World {
    pub fn new<R: Rng>(
        rows: i32,
        cols: i32,
        resources: ResourcePool,
        rng: &mut R,
    ) -> Result<Self, InvalidDimensions> {
        let map = mapgen::generate(rows, cols, rng)?;
        Ok(Self {
            state: GameState {
                map,
                yurt_units: Vec::new(),
                resources,
                map_size: MapSize { rows, cols },
            },
        })
    }

    pub fn from_state(state: GameState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn map(&self) -> &[Vec<Tile>] {
        &self.state.map
    }

    pub fn map_size(&self) -> MapSize {
        self.state.map_size
    }

    pub fn resources(&self) -> ResourcePool {
        self.state.resources
    }

    pub fn yurt_units(&self) -> &[YurtUnit] {
        &self.state.yurt_units
    }

    /// Out-of-bounds coordinates are an absent tile, never an error.
    pub fn tile(&self, x: i32, y: i32) -> Option<&Tile> {
        if x >= 0 && x < self.state.map_size.cols && y >= 0 && y < self.state.map_size.rows {
            Some(&self.state.map[y as usize][x as usize])
        } else {
            None
        }
    }

    pub fn tile_mut(&mut self, x: i32, y: i32) -> Option<&mut Tile> {
        if x >= 0 && x < self.state.map_size.cols && y >= 0 && y < self.state.map_size.rows {
            Some(&mut self.state.map[y as usize][x as usize])
        } else {
            None
        }
    }

    /// Appends a unit and stamps its tile's occupant. No occupancy or id
    /// uniqueness check here: last write wins. `place_yurt` is the validated
    /// wrapper.
    pub fn add_yurt_unit(&mut self, unit: YurtUnit) {
        let (x, y) = (unit.x, unit.y);
        let id = unit.id.clone();
        self.state.yurt_units.push(unit);
        if let Some(tile) = self.tile_mut(x, y) {
            tile.occupied_by = Some(id);
        }
    }

    pub fn update_resources(&mut self, food_delta: i64, wood_delta: i64) {
        self.state.resources.food += food_delta;
        self.state.resources.wood += wood_delta;
    }

    pub fn set_resources(&mut self, food: i64, wood: i64) {
        self.state.resources = ResourcePool { food, wood };
    }

    /// Stamps every tile of a listed terrain with the given yield table.
    pub fn set_terrain_yields(&mut self, yields: &BTreeMap<TerrainType, ResourceYield>) {
        for row in &mut self.state.map {
            for tile in row {
                if let Some(tile_yield) = yields.get(&tile.terrain_type) {
                    tile.resource_yield = Some(tile_yield.clone());
                }
            }
        }
    }

    /// Validated placement: rejects water, mountains, occupied tiles and
    /// insufficient wood, mutating nothing on rejection. On success the unit
    /// is added, the cost deducted, and the new unit's id returned.
    pub fn place_yurt<R: Rng>(
        &mut self,
        x: i32,
        y: i32,
        cost_wood: i64,
        rng: &mut R,
    ) -> Result<String, PlacementError> {
        let (terrain, occupied) = match self.tile(x, y) {
            Some(tile) => (tile.terrain_type, tile.occupied_by.is_some()),
            None => return Err(PlacementError::OutOfBounds { x, y }),
        };
        match terrain {
            TerrainType::Water => return Err(PlacementError::Water),
            TerrainType::Mountain => return Err(PlacementError::Mountain),
            _ => {}
        }
        if occupied {
            return Err(PlacementError::Occupied);
        }
        let available = self.state.resources.wood;
        if available < cost_wood {
            return Err(PlacementError::InsufficientWood {
                needed: cost_wood,
                available,
            });
        }

        let id = format!("yurt_{}", self.state.yurt_units.len() + 1);
        self.add_yurt_unit(YurtUnit {
            id: id.clone(),
            x,
            y,
            morale: rng.gen_range(70..100),
            resources: ResourcePool::default(),
        });
        self.update_resources(0, -cost_wood);
        Ok(id)
    }

    /// Founds the settlement's first yurt: map center if buildable, otherwise
    /// random buildable tiles, falling back to a full scan. Returns the unit
    /// id, or None on a map with nowhere to build.
    pub fn place_initial_yurt<R: Rng>(&mut self, rng: &mut R) -> Option<String> {
        let MapSize { rows, cols } = self.state.map_size;
        let mut x = cols / 2;
        let mut y = rows / 2;
        let mut attempts = 0;
        while !self.is_buildable(x, y) {
            if attempts >= 1_000 {
                let (scan_x, scan_y) = self.first_buildable_tile()?;
                x = scan_x;
                y = scan_y;
                break;
            }
            x = rng.gen_range(0..cols);
            y = rng.gen_range(0..rows);
            attempts += 1;
        }

        let id = "first_yurt".to_string();
        self.add_yurt_unit(YurtUnit {
            id: id.clone(),
            x,
            y,
            morale: 100,
            resources: ResourcePool::default(),
        });
        Some(id)
    }

    fn is_buildable(&self, x: i32, y: i32) -> bool {
        self.tile(x, y).map_or(false, |tile| {
            tile.terrain_type.is_buildable() && tile.occupied_by.is_none()
        })
    }

    fn first_buildable_tile(&self) -> Option<(i32, i32)> {
        for row in &self.state.map {
            for tile in row {
                if tile.terrain_type.is_buildable() && tile.occupied_by.is_none() {
                    return Some((tile.x, tile.y));
                }
            }
        }
        None
    }

    pub fn save_to_json(&self) -> Result<String, SaveError> {
        save::to_json(&self.state)
    }

    /// Atomic replace: the incoming blob is parsed in full first, and the
    /// current state survives any failure byte for byte.
    pub fn restore_from_json(&mut self, text: &str) -> Result<(), SaveError> {
        self.state = save::from_json(text)?;
        Ok(())
    }
}
