use console::Key;

use crate::tetris::Action;

/// What a key press asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Action(Action),
    /// Abort the match
    Interrupt,
}

// Ctrl-B, Ctrl-F and Ctrl-N as raw control characters
const CTRL_B: char = '\u{2}';
const CTRL_C: char = '\u{3}';
const CTRL_F: char = '\u{6}';
const CTRL_N: char = '\u{e}';

/// Map a key to a command; unknown keys map to None
pub fn map_key(key: &Key) -> Option<KeyCommand> {
    let action = match key {
        Key::ArrowLeft | Key::Char('h') | Key::Char(CTRL_B) => Action::MoveLeft,
        Key::ArrowRight | Key::Char('l') | Key::Char(CTRL_F) => Action::MoveRight,
        Key::ArrowDown | Key::Char('j') | Key::Char(CTRL_N) => Action::SoftDrop,
        Key::ArrowUp | Key::Char('a') | Key::Char(' ') => Action::RotateClockwise,
        Key::Char('s') => Action::RotateCounterClockwise,
        Key::Char('q') | Key::Char('Q') | Key::Char(CTRL_C) | Key::CtrlC => {
            return Some(KeyCommand::Interrupt);
        }
        _ => return None,
    };
    Some(KeyCommand::Action(action))
}

/// Help lines for the controls
pub fn controls_help() -> Vec<String> {
    vec![
        "Controls:".to_string(),
        "  h / <- / ^B   move left".to_string(),
        "  l / -> / ^F   move right".to_string(),
        "  j / down / ^N soft drop".to_string(),
        "  a / space / up rotate".to_string(),
        "  s             rotate back".to_string(),
        "  q / ^C        quit".to_string(),
    ]
}
