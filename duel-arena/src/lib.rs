//! # duel-arena
//!
//! A two-player session framework for real-time duel games over a single byte stream.
//!
//! ## Overview
//!
//! Each side of a match owns a [`DuelSession`]: the local game engine, a framed link to
//! the peer over any `AsyncRead + AsyncWrite` stream (TCP in practice, an in-memory
//! duplex in tests) and the match clock. Every tick the session applies the queued
//! player actions, advances the engine, sends the local field and score and takes in
//! whatever the peer has sent so far without waiting for it.
//!
//! ## Key Features
//!
//! - Length-prefixed frames: Hello, Field, Score, Control
//! - Game over, interrupt and time up signalled as control frames
//! - Non-blocking reads; the tick never waits on the peer
//! - Cooperative cancellation through the command channel
//! - Support for custom game engines via trait
//!
//! ## Example
//!
//! ```rust,no_run
//! use duel_arena::{PlayerId, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create configuration
//!     let config = SessionConfig::default().with_match_secs(90);
//!
//!     // Generate a player name
//!     let player = PlayerId::generate();
//!     println!("Player: {} ({} s match)", player, config.match_secs);
//!
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod error;
pub mod network;
pub mod session;

// Re-exports for convenience
pub use error::{ArenaError, Result};
pub use network::{Control, Frame};
pub use session::{
    DuelEngine, DuelSession, DuelView, EndReason, LinkStats, MatchState, PlayerId,
    SessionCommand, SessionConfig, StepResult,
};
