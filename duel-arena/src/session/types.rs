/// Core types for the duel session
use std::time::Duration;

use crate::error::{ArenaError, Result};
use crate::session::name_generator;

/// Longest accepted player name, in characters
pub(crate) const MAX_NAME_LEN: usize = 32;

/// Player identifier shown to the opponent
///
/// PlayerId must be:
/// - Non-empty after trimming
/// - At most 32 characters
/// - Free of control characters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerId(String);

impl PlayerId {
    /// Generate a callsign with a numeric tag, like "Kestra-417"
    pub fn generate() -> Self {
        PlayerId(name_generator::generate_player_name())
    }

    /// Create from a specific name
    /// Returns error if the name is empty, too long or contains control characters
    pub fn from_name(name: String) -> Result<Self> {
        Self::validate(&name)?;
        Ok(PlayerId(name))
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<()> {
        if s.trim().is_empty() {
            return Err(ArenaError::InvalidPlayerName(
                "Player name cannot be empty".to_string(),
            ));
        }
        if s.chars().count() > MAX_NAME_LEN {
            return Err(ArenaError::InvalidPlayerName(format!(
                "Player name '{}' is longer than {} characters",
                s, MAX_NAME_LEN
            )));
        }
        if let Some(ch) = s.chars().find(|c| c.is_control()) {
            return Err(ArenaError::InvalidPlayerName(format!(
                "Player name {:?} contains control character {:?}",
                s, ch
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The peer could not place a new piece
    OpponentToppedOut,
    /// We could not place a new piece
    ToppedOut,
    /// The match clock ran out and the scores decided
    TimeUp,
    /// The peer aborted the match
    PeerInterrupt,
    /// The local player aborted the match
    LocalInterrupt,
    /// The stream closed between frames or a write failed
    Disconnected,
    /// The stream carried something we cannot recover from
    Desync,
}

impl std::fmt::Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            EndReason::OpponentToppedOut => "opponent topped out",
            EndReason::ToppedOut => "topped out",
            EndReason::TimeUp => "time up",
            EndReason::PeerInterrupt => "opponent quit",
            EndReason::LocalInterrupt => "aborted",
            EndReason::Disconnected => "connection lost",
            EndReason::Desync => "protocol error",
        };
        write!(f, "{}", text)
    }
}

/// State of the match as seen by the local player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchState {
    /// Match in progress
    #[default]
    Running,
    Won(EndReason),
    Lost(EndReason),
    /// Clock ran out with equal scores
    Draw,
    /// Match ended abnormally on either side
    Interrupted(EndReason),
}

impl MatchState {
    pub fn is_running(&self) -> bool {
        matches!(self, MatchState::Running)
    }

    /// Only a normal ending (win, loss or draw) counts as success
    pub fn is_interrupted(&self) -> bool {
        matches!(self, MatchState::Interrupted(_))
    }

    /// One-line message for the result screen
    pub fn headline(&self) -> &'static str {
        match self {
            MatchState::Running => "",
            MatchState::Won(_) => "You win!",
            MatchState::Lost(_) => "You lose!",
            MatchState::Draw => "Draw Game!",
            MatchState::Interrupted(_) => "Interrupted!",
        }
    }
}

impl std::fmt::Display for MatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchState::Running => write!(f, "Running"),
            MatchState::Draw => write!(f, "{} (time up)", self.headline()),
            MatchState::Won(reason) | MatchState::Lost(reason) | MatchState::Interrupted(reason) => {
                write!(f, "{} ({})", self.headline(), reason)
            }
        }
    }
}

/// Result of a single session tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// Match still in progress
    Running,
    /// Match is over; further ticks return the same state
    Finished(MatchState),
}

/// Commands that can be sent to the session
#[derive(Debug, Clone)]
pub enum SessionCommand<A> {
    /// Apply a player action to the local engine
    Action(A),
    /// Abort the match and tell the peer
    Interrupt,
}

/// Snapshot of everything the renderer needs
#[derive(Debug, Clone)]
pub struct DuelView {
    pub own_name: String,
    pub own_field: Vec<u8>,
    pub own_score: u32,
    /// Name from the peer's Hello, if the handshake ran
    pub peer_name: Option<String>,
    /// Last field received from the peer
    pub peer_field: Option<Vec<u8>>,
    pub peer_score: u32,
    /// Time left on the match clock
    pub remaining: Duration,
    pub state: MatchState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_validation() {
        assert!(PlayerId::from_name("Theron_42".to_string()).is_ok());
        assert!(PlayerId::from_name("two words".to_string()).is_ok());
        assert!(PlayerId::from_name("".to_string()).is_err());
        assert!(PlayerId::from_name("   ".to_string()).is_err());
        assert!(PlayerId::from_name("tab\there".to_string()).is_err());
        assert!(PlayerId::from_name("x".repeat(33)).is_err());
    }

    #[test]
    fn test_generated_id_is_valid() {
        let id = PlayerId::generate();
        assert!(PlayerId::from_name(id.as_str().to_string()).is_ok());
    }

    #[test]
    fn test_headlines() {
        assert_eq!(MatchState::Won(EndReason::TimeUp).headline(), "You win!");
        assert_eq!(MatchState::Lost(EndReason::ToppedOut).headline(), "You lose!");
        assert_eq!(MatchState::Draw.headline(), "Draw Game!");
        assert_eq!(
            MatchState::Interrupted(EndReason::Disconnected).headline(),
            "Interrupted!"
        );
        assert_eq!(
            MatchState::Lost(EndReason::ToppedOut).to_string(),
            "You lose! (topped out)"
        );
    }

    #[test]
    fn test_only_interrupted_is_failure() {
        assert!(MatchState::Interrupted(EndReason::PeerInterrupt).is_interrupted());
        assert!(!MatchState::Draw.is_interrupted());
        assert!(!MatchState::Lost(EndReason::TimeUp).is_interrupted());
        assert!(MatchState::default().is_running());
    }
}
