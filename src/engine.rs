use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::{
    rng::{RngManager, SystemRng},
    save::SaveWriter,
    world::{ResourcePool, World},
};

pub struct EngineSettings {
    pub settlement_name: String,
    pub seed: u64,
    pub autosave_interval_ticks: u64,
    pub save_dir: PathBuf,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn push_system(&mut self, system: impl System + 'static) {
        self.systems.push(Box::new(system));
    }

    pub fn build(self) -> Engine {
        Engine {
            rng: RngManager::new(self.settings.seed),
            systems: self.systems,
            save_writer: SaveWriter::new(
                &self.settings.save_dir,
                self.settings.autosave_interval_ticks,
            ),
            tick: 0,
            settings: self.settings,
        }
    }
}

/// Drives the logical clock: each tick runs every registered system once,
/// then offers the tick to the autosave writer. Ticks never overlap; a tick
/// always runs to completion.
pub struct Engine {
    rng: RngManager,
    systems: Vec<Box<dyn System>>,
    save_writer: SaveWriter,
    tick: u64,
    settings: EngineSettings,
}

impl Engine {
    pub fn run(&mut self, world: &mut World, ticks: u64) -> Result<()> {
        self.run_with_hook(world, ticks, |_| {})
    }

    pub fn run_with_hook(
        &mut self,
        world: &mut World,
        ticks: u64,
        mut hook: impl FnMut(TickSnapshot),
    ) -> Result<()> {
        for _ in 0..ticks {
            self.tick += 1;
            let current_tick = self.tick;
            for system in &mut self.systems {
                let mut rng_stream = self.rng.stream(system.name());
                let ctx = SystemContext {
                    tick: current_tick,
                    settlement_name: &self.settings.settlement_name,
                };
                system.run(&ctx, world, &mut rng_stream)?;
            }
            self.save_writer
                .maybe_write(current_tick, &self.settings.settlement_name, world)?;
            hook(TickSnapshot {
                tick: current_tick,
                resources: world.resources(),
                yurts: world.yurt_units().len(),
            });
        }
        Ok(())
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn settlement_name(&self) -> &str {
        &self.settings.settlement_name
    }
}

pub struct SystemContext<'a> {
    pub tick: u64,
    pub settlement_name: &'a str,
}

pub trait System: Send {
    fn name(&self) -> &str;
    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()>;
}

/// Per-tick view handed to the run hook; what the web viewer streams.
#[derive(Clone, Debug, Serialize)]
pub struct TickSnapshot {
    pub tick: u64,
    pub resources: ResourcePool,
    pub yurts: usize,
}
