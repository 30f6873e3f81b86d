pub mod config;
pub mod engine;
pub mod frequency_regulator;
pub mod grid;
pub mod keymap;
pub mod piece;
pub mod term_render;
pub mod tetris;

pub use config::GameConfig;
pub use engine::TetrisEngine;
pub use grid::{CellKind, Field, Stage};
pub use keymap::{KeyCommand, map_key};
pub use piece::{Direction, PieceKind, PieceSource};
pub use term_render::{AnsiTermStyle, DuelScreen, PlainTermStyle, TermRender, TermStyle};
pub use tetris::{Action, Tetris};
