use anyhow::Result;
use serde::Serialize;

use crate::{
    engine::{System, SystemContext},
    rng::SystemRng,
    world::World,
};

/// What one collection cycle moved, for presentation messaging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CollectionReport {
    pub food_gain: i64,
    pub wood_gain: i64,
    pub food_upkeep: i64,
}

/// One collection cycle: every yurt gathers from the eight tiles around it,
/// then the pool pays one food of upkeep per yurt. A pure function of the
/// current state, so running it twice doubles the deltas. Nothing stops the
/// pool from going negative.
pub fn collect(world: &mut World) -> CollectionReport {
    let mut total_food_gain: i64 = 0;
    let mut total_wood_gain: i64 = 0;

    for yurt in world.yurt_units() {
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                // Out-of-bounds neighbors read as absent, so map edges need
                // no special casing here.
                if let Some(tile) = world.tile(yurt.x + dx, yurt.y + dy) {
                    if let Some(tile_yield) = &tile.resource_yield {
                        total_food_gain += i64::from(tile_yield.food);
                        total_wood_gain += i64::from(tile_yield.wood);
                    }
                }
            }
        }
    }

    let food_upkeep = world.yurt_units().len() as i64;
    world.update_resources(total_food_gain - food_upkeep, total_wood_gain);

    CollectionReport {
        food_gain: total_food_gain,
        wood_gain: total_wood_gain,
        food_upkeep,
    }
}

pub struct CollectionSystem;

impl CollectionSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CollectionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for CollectionSystem {
    fn name(&self) -> &str {
        "collection"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut World,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        collect(world);
        Ok(())
    }
}
