pub mod engine;
pub mod mapgen;
pub mod rng;
pub mod save;
pub mod scenario;
pub mod systems;
pub mod terrain;
pub mod web;
pub mod world;

pub use scenario::Scenario;
pub use world::{GameState, World};
