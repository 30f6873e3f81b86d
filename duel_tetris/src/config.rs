//! Game configuration, loaded from an optional JSON file

use std::path::Path;

use anyhow::{Context, Result};
use duel_arena::SessionConfig;
use serde::Deserialize;

use crate::tetris::DEFAULT_GRAVITY_TICKS;

/// Session settings plus the game's own knobs
///
/// ```json
/// { "tick_ms": 20, "match_secs": 90, "gravity_ticks": 24 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    #[serde(flatten)]
    pub session: SessionConfig,

    /// Ticks between two gravity drops
    pub gravity_ticks: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            gravity_ticks: DEFAULT_GRAVITY_TICKS,
        }
    }
}

impl GameConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: GameConfig = serde_json::from_str(text).context("Invalid game config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Failed to load {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        self.session.validate()?;
        if self.gravity_ticks == 0 {
            anyhow::bail!("gravity_ticks must be positive");
        }
        Ok(())
    }
}

/// Default TCP port
pub const DEFAULT_PORT: u16 = 50000;

/// Parse a `--port` value; the well-known range 0-1023 is refused
pub fn parse_port(value: &str) -> std::result::Result<u16, String> {
    let port: u16 = value
        .parse()
        .map_err(|_| format!("'{}' is not a port number (1024-65535)", value))?;
    if port < 1024 {
        return Err(format!("port {} is in the well-known range 0-1023", port));
    }
    Ok(port)
}

/// Ports 1024-49151 may belong to registered services
pub fn is_registered_port(port: u16) -> bool {
    (1024..=49151).contains(&port)
}
