use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 4x4 occupancy grid of a piece, indexed `[row][column]`; 1 is occupied
pub type PieceMask = [[u8; 4]; 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    J,
    Z,
    S,
    T,
    O,
    L,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::Z,
        PieceKind::S,
        PieceKind::T,
        PieceKind::O,
        PieceKind::L,
    ];

    /// Shape in its spawn orientation
    pub fn mask(self) -> PieceMask {
        match self {
            PieceKind::I => [[0, 1, 0, 0], [0, 1, 0, 0], [0, 1, 0, 0], [0, 1, 0, 0]],
            PieceKind::J => [[0, 0, 0, 0], [0, 1, 1, 0], [0, 1, 0, 0], [0, 1, 0, 0]],
            PieceKind::Z => [[0, 0, 1, 0], [0, 1, 1, 0], [0, 1, 0, 0], [0, 0, 0, 0]],
            PieceKind::S => [[0, 1, 0, 0], [0, 1, 1, 0], [0, 0, 1, 0], [0, 0, 0, 0]],
            PieceKind::T => [[0, 0, 0, 0], [0, 1, 0, 0], [1, 1, 1, 0], [0, 0, 0, 0]],
            PieceKind::O => [[0, 0, 0, 0], [0, 1, 1, 0], [0, 1, 1, 0], [0, 0, 0, 0]],
            PieceKind::L => [[0, 0, 0, 0], [0, 1, 1, 0], [0, 0, 1, 0], [0, 0, 1, 0]],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

/// Rotate a mask a quarter turn inside its 4x4 box
pub fn rotate(mask: &PieceMask, direction: Direction) -> PieceMask {
    let mut rotated = [[0u8; 4]; 4];
    for (i, row) in rotated.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = match direction {
                Direction::Clockwise => mask[3 - j][i],
                Direction::CounterClockwise => mask[j][3 - i],
            };
        }
    }
    rotated
}

/// Where new pieces come from
pub enum PieceSource {
    /// Reseeded from the wall clock on every draw
    Clock,
    /// Reproducible stream
    Seeded(StdRng),
    /// Scripted list, repeated forever
    Sequence { kinds: Vec<PieceKind>, next: usize },
}

impl PieceSource {
    pub fn clock() -> Self {
        PieceSource::Clock
    }

    pub fn seeded(seed: u64) -> Self {
        PieceSource::Seeded(StdRng::seed_from_u64(seed))
    }

    /// An empty list falls back to the clock
    pub fn sequence(kinds: Vec<PieceKind>) -> Self {
        if kinds.is_empty() {
            return PieceSource::Clock;
        }
        PieceSource::Sequence { kinds, next: 0 }
    }

    pub fn next_piece(&mut self) -> PieceKind {
        match self {
            PieceSource::Clock => {
                let millis = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_millis() as u64)
                    .unwrap_or_default();
                let mut rng = StdRng::seed_from_u64(millis);
                PieceKind::ALL[rng.random_range(0..PieceKind::ALL.len())]
            }
            PieceSource::Seeded(rng) => PieceKind::ALL[rng.random_range(0..PieceKind::ALL.len())],
            PieceSource::Sequence { kinds, next } => {
                let kind = kinds[*next % kinds.len()];
                *next = (*next + 1) % kinds.len();
                kind
            }
        }
    }
}
