use duel_arena::DuelEngine;

use crate::grid::{STAGE_HEIGHT, STAGE_WIDTH};
use crate::piece::PieceSource;
use crate::tetris::{Action, Tetris};

/// Game engine that runs the local player's Tetris for a duel session
pub struct TetrisEngine {
    tetris: Tetris,
}

impl TetrisEngine {
    /// Clock-seeded pieces, gravity every `gravity_ticks` ticks
    pub fn new(gravity_ticks: usize) -> Self {
        Self::with_source(PieceSource::clock(), gravity_ticks)
    }

    pub fn with_source(source: PieceSource, gravity_ticks: usize) -> Self {
        Self {
            tetris: Tetris::new(source, gravity_ticks),
        }
    }

    pub fn from_tetris(tetris: Tetris) -> Self {
        Self { tetris }
    }

    pub fn tetris(&self) -> &Tetris {
        &self.tetris
    }
}

impl DuelEngine for TetrisEngine {
    type Action = Action;

    fn apply_action(&mut self, action: Action) {
        if !self.tetris.apply(action) {
            tracing::trace!("{:?} rejected", action);
        }
    }

    fn tick(&mut self) {
        self.tetris.tick();
    }

    fn field_dims(&self) -> (u16, u16) {
        (STAGE_WIDTH as u16, STAGE_HEIGHT as u16)
    }

    fn field_bytes(&self) -> Vec<u8> {
        self.tetris.field().to_bytes()
    }

    fn score(&self) -> u32 {
        self.tetris.score()
    }

    fn is_topped_out(&self) -> bool {
        self.tetris.is_topped_out()
    }
}
