//! Configuration for a duel session

use std::time::Duration;

use serde::Deserialize;

use crate::error::{ArenaError, Result};

/// Longest accepted match, one day
pub const MAX_MATCH_SECS: u64 = 24 * 60 * 60;

/// Main configuration for a duel session
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Local player name (auto-generated if None)
    pub player_name: Option<String>,

    /// Length of one tick of the control loop in milliseconds
    pub tick_ms: u64,

    /// Match length in seconds; when the clock reaches zero the scores decide
    pub match_secs: u64,

    /// How long to wait for the peer's Hello (in milliseconds)
    pub handshake_timeout_ms: u64,

    /// Largest frame payload accepted from the peer
    pub max_frame_len: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            player_name: None,
            tick_ms: 20,
            match_secs: 60,
            handshake_timeout_ms: 10_000,
            max_frame_len: 64 * 1024,
        }
    }
}

impl SessionConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the player name
    pub fn with_player_name(mut self, name: String) -> Self {
        self.player_name = Some(name);
        self
    }

    /// Set the tick length in milliseconds
    pub fn with_tick_ms(mut self, tick_ms: u64) -> Self {
        self.tick_ms = tick_ms;
        self
    }

    /// Set the match length in seconds
    pub fn with_match_secs(mut self, match_secs: u64) -> Self {
        self.match_secs = match_secs;
        self
    }

    /// Set the handshake timeout in milliseconds
    pub fn with_handshake_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.handshake_timeout_ms = timeout_ms;
        self
    }

    /// Set the largest accepted frame payload
    pub fn with_max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn match_duration(&self) -> Duration {
        Duration::from_secs(self.match_secs)
    }

    /// Number of ticks in a full match, rounded up
    pub fn match_ticks(&self) -> u64 {
        self.match_secs
            .saturating_mul(1000)
            .div_ceil(self.tick_ms.max(1))
    }

    /// Reject values the session cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.tick_ms == 0 {
            return Err(ArenaError::Config("tick_ms must be positive".to_string()));
        }
        if self.match_secs == 0 || self.match_secs > MAX_MATCH_SECS {
            return Err(ArenaError::Config(format!(
                "match_secs must be between 1 and {}",
                MAX_MATCH_SECS
            )));
        }
        if self.max_frame_len == 0 {
            return Err(ArenaError::Config(
                "max_frame_len must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
