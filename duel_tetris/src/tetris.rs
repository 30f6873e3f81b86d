use crate::frequency_regulator::FrequencyRegulator;
use crate::grid::{overlay, Field, Stage, EMPTY, FILLED, STAGE_HEIGHT};
use crate::piece::{rotate, Direction, PieceKind, PieceMask, PieceSource};

/// Anchor of a freshly spawned piece
pub const SPAWN_X: isize = 4;
pub const SPAWN_Y: isize = 0;

/// Default gravity: one row every this many ticks
pub const DEFAULT_GRAVITY_TICKS: usize = 32;

// Enum with all possible player actions
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Action {
    MoveLeft,
    MoveRight,
    /// One row down if free; never locks the piece
    SoftDrop,
    RotateClockwise,
    RotateCounterClockwise,
}

/// What happened when a piece was locked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockReport {
    /// Rows cleared, cascades included
    pub lines: usize,
    /// Points awarded for those rows
    pub points: u32,
    /// The next piece was placed; false means topped out
    pub spawned: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropResult {
    /// Piece went down one row
    Moved,
    /// Piece could not go down and was locked
    Locked(LockReport),
    /// Game is over, nothing to drop
    Idle,
}

/// Points for clearing `lines` rows with one piece
pub fn points_for(lines: usize) -> u32 {
    match lines {
        0 => 0,
        1 => 100,
        2 => 300,
        3 => 500,
        _ => 1000,
    }
}

/// True if any occupied cell of `mask` placed at (x, y) lands on a wall,
/// a locked cell, or outside the grid
pub fn check_overlap(stage: &Stage, mask: &PieceMask, x: isize, y: isize) -> bool {
    mask.iter().enumerate().any(|(i, row)| {
        row.iter().enumerate().any(|(j, &occupied)| {
            occupied != EMPTY && stage.get(x + j as isize, y + i as isize) != EMPTY
        })
    })
}

/// Single-player falling-block game
pub struct Tetris {
    // Locked cells
    stage: Stage,
    // Active piece
    kind: PieceKind,
    mask: PieceMask,
    x: isize,
    y: isize,
    score: u32,
    topped_out: bool,
    source: PieceSource,
    gravity: FrequencyRegulator,
}

impl Tetris {
    /// New game on an empty stage; the first piece is spawned right away
    pub fn new(source: PieceSource, gravity_ticks: usize) -> Self {
        Self::with_stage(Stage::new(), source, gravity_ticks)
    }

    /// New game on a prepared stage
    pub fn with_stage(stage: Stage, source: PieceSource, gravity_ticks: usize) -> Self {
        let mut tetris = Tetris {
            stage,
            kind: PieceKind::I,
            mask: PieceKind::I.mask(),
            x: SPAWN_X,
            y: SPAWN_Y,
            score: 0,
            topped_out: false,
            source,
            gravity: FrequencyRegulator::new(1, gravity_ticks),
        };
        tetris.spawn();
        tetris
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn mask(&self) -> &PieceMask {
        &self.mask
    }

    pub fn anchor(&self) -> (isize, isize) {
        (self.x, self.y)
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_topped_out(&self) -> bool {
        self.topped_out
    }

    /// Stage with the active piece drawn in
    pub fn field(&self) -> Field {
        overlay(&self.stage, &self.mask, self.x, self.y)
    }

    /// Put the active piece at (x, y) without checking
    pub fn move_to(&mut self, x: isize, y: isize) {
        self.x = x;
        self.y = y;
    }

    /// Move the active piece by (dx, dy) if the target is free
    pub fn try_move(&mut self, dx: isize, dy: isize) -> bool {
        if self.topped_out || check_overlap(&self.stage, &self.mask, self.x + dx, self.y + dy) {
            return false;
        }
        self.move_to(self.x + dx, self.y + dy);
        true
    }

    /// Rotate in place; a blocked rotation changes nothing
    pub fn rotate(&mut self, direction: Direction) -> bool {
        if self.topped_out {
            return false;
        }
        let rotated = rotate(&self.mask, direction);
        if check_overlap(&self.stage, &rotated, self.x, self.y) {
            return false;
        }
        self.mask = rotated;
        true
    }

    /// Place the next piece at the spawn anchor
    ///
    /// If it does not fit the game is topped out; the stage is left as it was.
    pub fn spawn(&mut self) -> bool {
        if self.topped_out {
            return false;
        }
        self.kind = self.source.next_piece();
        self.mask = self.kind.mask();
        self.move_to(SPAWN_X, SPAWN_Y);
        if check_overlap(&self.stage, &self.mask, self.x, self.y) {
            tracing::info!("Cannot place {:?}, topped out with score {}", self.kind, self.score);
            self.topped_out = true;
            return false;
        }
        true
    }

    /// Merge the active piece into the stage, clear full rows, spawn the next piece
    ///
    /// A topped-out game has no piece to lock; the stage is left alone.
    pub fn lock_and_clear(&mut self) -> LockReport {
        if self.topped_out {
            return LockReport {
                lines: 0,
                points: 0,
                spawned: false,
            };
        }
        for (i, row) in self.mask.iter().enumerate() {
            for (j, &occupied) in row.iter().enumerate() {
                if occupied != EMPTY {
                    self.stage.set(self.x + j as isize, self.y + i as isize, FILLED);
                }
            }
        }

        // Bottom to top; a cleared row pulls the one above into its place
        let mut lines = 0;
        let mut row = STAGE_HEIGHT - 2;
        loop {
            if self.stage.is_row_full(row) {
                self.stage.clear_row_and_collapse(row);
                lines += 1;
                continue;
            }
            if row == 0 {
                break;
            }
            row -= 1;
        }

        let points = points_for(lines);
        self.score += points;
        if lines > 0 {
            tracing::debug!("Cleared {} rows for {} points", lines, points);
        }

        let spawned = self.spawn();
        LockReport {
            lines,
            points,
            spawned,
        }
    }

    /// Gravity step: down one row, or lock if blocked
    pub fn drop_one_row(&mut self) -> DropResult {
        if self.topped_out {
            return DropResult::Idle;
        }
        if self.try_move(0, 1) {
            DropResult::Moved
        } else {
            DropResult::Locked(self.lock_and_clear())
        }
    }

    /// Apply a player action; returns false if it was rejected
    pub fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::MoveLeft => self.try_move(-1, 0),
            Action::MoveRight => self.try_move(1, 0),
            Action::SoftDrop => self.try_move(0, 1),
            Action::RotateClockwise => self.rotate(Direction::Clockwise),
            Action::RotateCounterClockwise => self.rotate(Direction::CounterClockwise),
        }
    }

    /// Advance the gravity clock by one tick
    pub fn tick(&mut self) -> Option<DropResult> {
        let mut last = None;
        for _ in 0..self.gravity.step() {
            let result = self.drop_one_row();
            last = Some(result);
            if self.topped_out {
                break;
            }
        }
        last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{STAGE_WIDTH, WALL};

    fn only(kinds: &[PieceKind]) -> PieceSource {
        PieceSource::sequence(kinds.to_vec())
    }

    /// Stage whose `rows` are full except for column `gap`
    fn gapped_rows(rows: &[isize], gap: isize) -> Stage {
        let mut stage = Stage::new();
        for &y in rows {
            for x in 1..STAGE_WIDTH as isize - 1 {
                if x != gap {
                    stage.set(x, y, FILLED);
                }
            }
        }
        stage
    }

    #[test]
    fn test_check_overlap_walls_and_blocks() {
        let stage = Stage::new();
        let i = PieceKind::I.mask();
        // I occupies column 1 of its mask
        assert!(!check_overlap(&stage, &i, 0, 0));
        assert!(check_overlap(&stage, &i, -1, 0));
        assert!(!check_overlap(&stage, &i, 9, 0));
        assert!(check_overlap(&stage, &i, 10, 0));
        assert!(!check_overlap(&stage, &i, 4, 16));
        assert!(check_overlap(&stage, &i, 4, 17));
        assert!(check_overlap(&stage, &i, 4, -1));

        let mut stage = Stage::new();
        stage.set(5, 10, FILLED);
        assert!(check_overlap(&stage, &i, 4, 8));
        assert!(!check_overlap(&stage, &i, 3, 8));
    }

    #[test]
    fn test_check_overlap_matches_cell_by_cell() {
        let mut stage = gapped_rows(&[19], 3);
        stage.set(6, 10, FILLED);
        stage.set(2, 4, FILLED);

        let expected = |mask: &PieceMask, x: isize, y: isize| {
            (0..4).any(|i| {
                (0..4).any(|j| {
                    let (cx, cy) = (x + j as isize, y + i as isize);
                    let inside = (0..STAGE_WIDTH as isize).contains(&cx)
                        && (0..STAGE_HEIGHT as isize).contains(&cy);
                    mask[i][j] != EMPTY && (!inside || stage.get(cx, cy) != EMPTY)
                })
            })
        };

        for kind in PieceKind::ALL {
            let mut mask = kind.mask();
            for _ in 0..4 {
                for x in -4..=14 {
                    for y in -4..=23 {
                        assert_eq!(
                            check_overlap(&stage, &mask, x, y),
                            expected(&mask, x, y),
                            "{:?} {:?} at ({}, {})",
                            kind,
                            mask,
                            x,
                            y
                        );
                    }
                }
                mask = rotate(&mask, Direction::Clockwise);
            }
        }
    }

    #[test]
    fn test_new_game_spawns_at_anchor() {
        let tetris = Tetris::new(only(&[PieceKind::T]), DEFAULT_GRAVITY_TICKS);
        assert_eq!(tetris.anchor(), (SPAWN_X, SPAWN_Y));
        assert_eq!(tetris.kind(), PieceKind::T);
        assert!(!tetris.is_topped_out());
        assert_eq!(tetris.field().get(5, 1), FILLED);
    }

    #[test]
    fn test_moves_stop_at_walls() {
        let mut tetris = Tetris::new(only(&[PieceKind::O]), DEFAULT_GRAVITY_TICKS);
        // O fills mask columns 1 and 2
        for _ in 0..4 {
            assert!(tetris.apply(Action::MoveLeft));
        }
        assert!(!tetris.apply(Action::MoveLeft));
        assert_eq!(tetris.anchor(), (0, 0));

        for _ in 0..8 {
            assert!(tetris.apply(Action::MoveRight));
        }
        assert!(!tetris.apply(Action::MoveRight));
        assert_eq!(tetris.anchor(), (8, 0));
    }

    #[test]
    fn test_rejected_rotation_changes_nothing() {
        let mut tetris = Tetris::new(only(&[PieceKind::I]), DEFAULT_GRAVITY_TICKS);
        tetris.move_to(0, 5);
        let mask = *tetris.mask();

        // Horizontal I would need column 0, the wall
        assert!(!tetris.rotate(Direction::Clockwise));
        assert_eq!(*tetris.mask(), mask);
        assert_eq!(tetris.anchor(), (0, 5));

        tetris.move_to(4, 5);
        assert!(tetris.rotate(Direction::Clockwise));
        assert_ne!(*tetris.mask(), mask);
    }

    #[test]
    fn test_locked_block_blocks_rotation() {
        // Clockwise puts the I on row 6, counter-clockwise on row 7
        let mut stage = Stage::new();
        stage.set(7, 6, FILLED);
        let mut tetris = Tetris::with_stage(stage, only(&[PieceKind::I]), DEFAULT_GRAVITY_TICKS);
        tetris.move_to(4, 5);
        let mask = *tetris.mask();

        assert!(!tetris.rotate(Direction::Clockwise));
        assert!(!tetris.apply(Action::RotateClockwise));
        assert_eq!(*tetris.mask(), mask);
        assert_eq!(tetris.anchor(), (4, 5));

        assert!(tetris.rotate(Direction::CounterClockwise));
        assert_eq!(tetris.mask()[2], [1, 1, 1, 1]);
        assert_eq!(tetris.anchor(), (4, 5));
    }

    #[test]
    fn test_vertical_i_lands_on_floor_and_next_piece_spawns() {
        let mut tetris = Tetris::new(only(&[PieceKind::I, PieceKind::O]), DEFAULT_GRAVITY_TICKS);
        let mut moves = 0;
        let report = loop {
            match tetris.drop_one_row() {
                DropResult::Moved => moves += 1,
                DropResult::Locked(report) => break report,
                DropResult::Idle => panic!("game ended"),
            }
        };
        assert_eq!(moves, 16);
        assert_eq!(report.lines, 0);
        assert!(report.spawned);

        let bottom = STAGE_HEIGHT as isize - 2;
        for y in bottom - 3..=bottom {
            assert_eq!(tetris.stage().get(5, y), FILLED);
        }
        assert_eq!(tetris.stage().get(5, bottom - 4), EMPTY);
        assert_eq!(tetris.kind(), PieceKind::O);
        assert_eq!(tetris.anchor(), (SPAWN_X, SPAWN_Y));
    }

    #[test]
    fn test_single_row_clear() {
        let mut stage = gapped_rows(&[18], 5);
        stage.set(2, 19, FILLED);
        stage.set(3, 17, FILLED);
        let mut tetris = Tetris::with_stage(stage, only(&[PieceKind::I]), DEFAULT_GRAVITY_TICKS);
        tetris.move_to(4, 15);

        let report = tetris.lock_and_clear();
        assert_eq!(report.lines, 1);
        assert_eq!(report.points, 100);
        assert_eq!(tetris.score(), 100);

        let stage = tetris.stage();
        // Row below untouched
        assert_eq!(stage.get(2, 19), FILLED);
        assert_eq!(stage.get(5, 19), EMPTY);
        // Rows above shifted down one
        assert_eq!(stage.get(3, 18), FILLED);
        assert_eq!(stage.get(3, 17), EMPTY);
        for y in 16..=18 {
            assert_eq!(stage.get(5, y), FILLED);
        }
        assert_eq!(stage.get(5, 15), EMPTY);
        assert_eq!(stage.get(1, 18), EMPTY);
        assert_eq!(stage.get(0, 18), WALL);
    }

    #[test]
    fn test_multi_row_scores() {
        for (rows, points) in [
            (vec![], 0),
            (vec![19], 100),
            (vec![18, 19], 300),
            (vec![17, 18, 19], 500),
            (vec![16, 17, 18, 19], 1000),
        ] {
            let stage = gapped_rows(&rows, 5);
            let mut tetris =
                Tetris::with_stage(stage, only(&[PieceKind::I]), DEFAULT_GRAVITY_TICKS);
            tetris.move_to(4, 16);
            let report = tetris.lock_and_clear();
            assert_eq!(report.lines, rows.len());
            assert_eq!(tetris.score(), points);
            for y in 20 - rows.len() as isize..20 {
                assert!(!tetris.stage().is_row_full(y as usize));
            }
        }
    }

    #[test]
    fn test_non_adjacent_rows_cascade() {
        // Rows 17 and 19 are full once the I drops in; row 18 keeps its gap at 7
        let mut stage = gapped_rows(&[17, 19], 5);
        for x in 1..STAGE_WIDTH as isize - 1 {
            if x != 7 {
                stage.set(x, 18, FILLED);
            }
        }
        let mut tetris = Tetris::with_stage(stage, only(&[PieceKind::I]), DEFAULT_GRAVITY_TICKS);
        tetris.move_to(4, 16);

        let report = tetris.lock_and_clear();
        assert_eq!(report.lines, 2);
        assert_eq!(tetris.score(), 300);
        // Old row 18 ends up on the bottom
        assert_eq!(tetris.stage().get(7, 19), EMPTY);
        assert_eq!(tetris.stage().get(5, 19), FILLED);
        assert_eq!(tetris.stage().get(5, 18), FILLED);
        assert_eq!(tetris.stage().get(5, 17), EMPTY);
    }

    #[test]
    fn test_blocked_spawn_tops_out_without_touching_stage() {
        let mut stage = Stage::new();
        stage.set(5, 1, FILLED);
        stage.set(6, 1, FILLED);
        let before = stage.clone();

        let mut tetris = Tetris::with_stage(stage, only(&[PieceKind::O]), DEFAULT_GRAVITY_TICKS);
        assert!(tetris.is_topped_out());
        assert!(tetris.field().has_overlap());
        assert_eq!(*tetris.stage(), before);

        assert!(!tetris.spawn());
        assert!(tetris.is_topped_out());
        assert_eq!(*tetris.stage(), before);

        // Nothing moves once topped out
        assert!(!tetris.apply(Action::MoveLeft));
        assert_eq!(tetris.drop_one_row(), DropResult::Idle);
    }

    #[test]
    fn test_lock_after_top_out_leaves_stage_alone() {
        let mut stage = Stage::new();
        stage.set(5, 1, FILLED);
        stage.set(6, 1, FILLED);
        let before = stage.clone();

        let mut tetris = Tetris::with_stage(stage, only(&[PieceKind::O]), DEFAULT_GRAVITY_TICKS);
        assert!(tetris.is_topped_out());
        assert_eq!(
            tetris.lock_and_clear(),
            LockReport {
                lines: 0,
                points: 0,
                spawned: false,
            }
        );
        assert_eq!(*tetris.stage(), before);
        assert_eq!(tetris.score(), 0);
    }

    #[test]
    fn test_lock_into_full_spawn_zone_tops_out() {
        let mut stage = Stage::new();
        stage.set(5, 4, FILLED);
        let mut tetris = Tetris::with_stage(stage, only(&[PieceKind::I]), DEFAULT_GRAVITY_TICKS);
        // I at spawn rests on the block below it
        assert_eq!(tetris.drop_one_row(), DropResult::Locked(LockReport {
            lines: 0,
            points: 0,
            spawned: false,
        }));
        assert!(tetris.is_topped_out());
    }

    #[test]
    fn test_soft_drop_never_locks() {
        let mut tetris = Tetris::new(only(&[PieceKind::I]), DEFAULT_GRAVITY_TICKS);
        tetris.move_to(4, 16);
        assert!(!tetris.apply(Action::SoftDrop));
        assert_eq!(tetris.anchor(), (4, 16));
        assert_eq!(*tetris.stage(), Stage::new());
    }

    #[test]
    fn test_gravity_follows_regulator() {
        let mut tetris = Tetris::new(only(&[PieceKind::T]), 4);
        for _ in 0..3 {
            assert_eq!(tetris.tick(), None);
        }
        assert_eq!(tetris.tick(), Some(DropResult::Moved));
        assert_eq!(tetris.anchor(), (SPAWN_X, SPAWN_Y + 1));
    }
}
