use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{
    rng::RngManager,
    terrain::{ResourceYield, TerrainType},
    world::{ResourcePool, World},
};

fn default_yurt_cost_wood() -> i64 {
    25
}

fn default_autosave_interval_ticks() -> u64 {
    12
}

fn default_initial_yurt() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    pub rows: i32,
    pub cols: i32,
    pub resources: ResourceInit,
    #[serde(default = "default_yurt_cost_wood")]
    pub yurt_cost_wood: i64,
    #[serde(default = "default_autosave_interval_ticks")]
    pub autosave_interval_ticks: u64,
    #[serde(default)]
    pub ticks: Option<u64>,
    /// Found a first yurt at world build, like a fresh game does.
    #[serde(default = "default_initial_yurt")]
    pub initial_yurt: bool,
    /// Optional terrain -> yield table stamped onto the generated map. Left
    /// empty, tiles yield nothing and collection is pure upkeep.
    #[serde(default)]
    pub yields: BTreeMap<TerrainType, ResourceYield>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceInit {
    pub food: i64,
    pub wood: i64,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    pub fn build_world(&self) -> Result<World> {
        let mut rng = RngManager::new(self.seed);
        let mut world = World::new(
            self.rows,
            self.cols,
            ResourcePool::new(self.resources.food, self.resources.wood),
            &mut rng.stream("mapgen"),
        )?;
        if !self.yields.is_empty() {
            world.set_terrain_yields(&self.yields);
        }
        if self.initial_yurt {
            let _ = world.place_initial_yurt(&mut rng.stream("setup"));
        }
        Ok(world)
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.or(self.ticks).unwrap_or(120)
    }
}
