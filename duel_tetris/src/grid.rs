//! Playfield model: the stage of locked cells and the field sent to the peer

use crate::piece::PieceMask;

/// Columns, walls included
pub const STAGE_WIDTH: usize = 12;
/// Rows, floor included
pub const STAGE_HEIGHT: usize = 21;
/// Bytes in a serialized field
pub const FIELD_LEN: usize = STAGE_WIDTH * STAGE_HEIGHT;

pub const EMPTY: u8 = 0;
pub const FILLED: u8 = 1;
pub const WALL: u8 = 9;

/// How a raw cell value should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Empty,
    Wall,
    Block,
    /// Piece drawn on top of something solid; only seen when topping out
    Overlap,
}

impl CellKind {
    pub fn classify(value: u8) -> CellKind {
        match value {
            EMPTY => CellKind::Empty,
            FILLED => CellKind::Block,
            WALL => CellKind::Wall,
            _ => CellKind::Overlap,
        }
    }
}

/// Locked cells and walls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    cells: [[u8; STAGE_WIDTH]; STAGE_HEIGHT],
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage {
    /// Empty well: walls on the left, right and bottom
    pub fn new() -> Self {
        let mut cells = [[EMPTY; STAGE_WIDTH]; STAGE_HEIGHT];
        for row in cells.iter_mut() {
            row[0] = WALL;
            row[STAGE_WIDTH - 1] = WALL;
        }
        cells[STAGE_HEIGHT - 1] = [WALL; STAGE_WIDTH];
        Stage { cells }
    }

    /// Cell value; anything outside the grid reads as WALL
    pub fn get(&self, x: isize, y: isize) -> u8 {
        if x < 0 || y < 0 || x >= STAGE_WIDTH as isize || y >= STAGE_HEIGHT as isize {
            return WALL;
        }
        self.cells[y as usize][x as usize]
    }

    /// True for the walls, the floor and everything outside the grid
    pub fn is_out_of_interior(x: isize, y: isize) -> bool {
        x <= 0 || y < 0 || x >= STAGE_WIDTH as isize - 1 || y >= STAGE_HEIGHT as isize - 1
    }

    /// Write an interior cell; border cells are never written
    pub fn set(&mut self, x: isize, y: isize, value: u8) -> bool {
        if Self::is_out_of_interior(x, y) {
            return false;
        }
        self.cells[y as usize][x as usize] = value;
        true
    }

    /// Every interior cell of row `y` is occupied
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= STAGE_HEIGHT - 1 {
            return false;
        }
        self.cells[y][1..STAGE_WIDTH - 1].iter().all(|&c| c != EMPTY)
    }

    /// Remove row `y` and shift every row above it down by one
    pub fn clear_row_and_collapse(&mut self, y: usize) {
        if y >= STAGE_HEIGHT - 1 {
            return;
        }
        for row in (1..=y).rev() {
            let above = self.cells[row - 1];
            self.cells[row][1..STAGE_WIDTH - 1].copy_from_slice(&above[1..STAGE_WIDTH - 1]);
        }
        for cell in self.cells[0][1..STAGE_WIDTH - 1].iter_mut() {
            *cell = EMPTY;
        }
    }

    /// Field with no active piece
    pub fn to_field(&self) -> Field {
        Field { cells: self.cells }
    }
}

/// Stage with the active piece added on top
///
/// Cells are sums, so a piece cell over a solid cell shows up as a value above 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    cells: [[u8; STAGE_WIDTH]; STAGE_HEIGHT],
}

impl Field {
    /// Row-major bytes, exactly `FIELD_LEN` long
    pub fn to_bytes(&self) -> Vec<u8> {
        self.cells.iter().flatten().copied().collect()
    }

    /// Parse bytes produced by `to_bytes`; any other length is rejected
    pub fn from_bytes(bytes: &[u8]) -> Option<Field> {
        if bytes.len() != FIELD_LEN {
            return None;
        }
        let mut cells = [[EMPTY; STAGE_WIDTH]; STAGE_HEIGHT];
        for (row, chunk) in cells.iter_mut().zip(bytes.chunks_exact(STAGE_WIDTH)) {
            row.copy_from_slice(chunk);
        }
        Some(Field { cells })
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.cells
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(WALL)
    }

    /// Some piece cell sits on a wall or a locked cell
    pub fn has_overlap(&self) -> bool {
        self.cells
            .iter()
            .flatten()
            .any(|&c| CellKind::classify(c) == CellKind::Overlap)
    }
}

/// Draw `mask` with its top-left corner at (x, y); the stage is left untouched
///
/// Piece cells falling outside the grid are dropped.
pub fn overlay(stage: &Stage, mask: &PieceMask, x: isize, y: isize) -> Field {
    let mut field = stage.to_field();
    for (i, mask_row) in mask.iter().enumerate() {
        for (j, &occupied) in mask_row.iter().enumerate() {
            if occupied == EMPTY {
                continue;
            }
            let cx = x + j as isize;
            let cy = y + i as isize;
            if cx < 0 || cy < 0 || cx >= STAGE_WIDTH as isize || cy >= STAGE_HEIGHT as isize {
                continue;
            }
            let cell = &mut field.cells[cy as usize][cx as usize];
            *cell = cell.saturating_add(FILLED);
        }
    }
    field
}
