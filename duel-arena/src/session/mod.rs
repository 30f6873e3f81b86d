// Module declarations
pub mod config;
pub(crate) mod duel_session;
pub(crate) mod game_engine;
pub(crate) mod name_generator;
pub mod stats;
pub(crate) mod types;

pub use config::SessionConfig;
pub use duel_session::DuelSession;
pub use game_engine::DuelEngine;
pub use name_generator::generate_player_name;
pub use stats::LinkStats;
pub use types::{DuelView, EndReason, MatchState, PlayerId, SessionCommand, StepResult};
