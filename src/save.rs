use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::world::{GameState, World};

#[derive(Debug, Error)]
pub enum SaveError {
    /// The single decode signal: malformed text and well-formed but
    /// structurally incomplete saves both land here, and callers cannot tell
    /// them apart.
    #[error("invalid save data")]
    InvalidFormat,
    #[error("failed to encode save data: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("save io error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn to_json(state: &GameState) -> Result<String, SaveError> {
    serde_json::to_string(state).map_err(SaveError::Encode)
}

/// Parses a save blob in full before anything is replaced, so a failing load
/// leaves the caller's state untouched.
pub fn from_json(text: &str) -> Result<GameState, SaveError> {
    serde_json::from_str(text).map_err(|_| SaveError::InvalidFormat)
}

/// Interval-gated autosave: one blob per settlement, overwritten in place.
pub struct SaveWriter {
    save_dir: PathBuf,
    interval_ticks: u64,
}

impl SaveWriter {
    pub fn new(save_dir: &Path, interval_ticks: u64) -> Self {
        Self {
            save_dir: save_dir.to_path_buf(),
            interval_ticks,
        }
    }

    pub fn maybe_write(
        &self,
        tick: u64,
        settlement_name: &str,
        world: &World,
    ) -> Result<Option<PathBuf>, SaveError> {
        if self.interval_ticks == 0 {
            return Ok(None);
        }
        if tick % self.interval_ticks != 0 {
            return Ok(None);
        }

        let dir = self.save_dir.join(settlement_name);
        fs::create_dir_all(&dir)?;
        let file_path = dir.join("autosave.json");
        let json = to_json(world.state())?;
        fs::write(&file_path, json)?;
        Ok(Some(file_path))
    }
}
