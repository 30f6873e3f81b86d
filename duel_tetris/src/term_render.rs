use std::time::Duration;

use duel_arena::{DuelView, EndReason, MatchState};

use crate::grid::{CellKind, Field, STAGE_HEIGHT, STAGE_WIDTH, Stage};

#[derive(Debug, Clone, PartialEq)]
pub enum TermCell {
    FieldCell(CellKind),
    Space,
    Message(String),
}

pub trait TermStyle {
    fn display<'a>(&self, cell: &'a TermCell) -> &'a str;
    fn width(&self, cell: &TermCell) -> usize;
}

pub trait TermRender {
    fn output(&self, style: &impl TermStyle) -> Vec<Vec<TermCell>>;
    fn render(&self, style: &impl TermStyle) -> Vec<String> {
        self.output(style)
            .iter()
            .map(|row| row.iter().map(|cell| style.display(cell)).collect())
            .collect()
    }
}

fn line_width(line: &[TermCell], style: &impl TermStyle) -> usize {
    line.iter().map(|c| style.width(c)).sum()
}

// Make all lines in block the same width by padding with TermCell::Space
pub fn pad_block_right(block: &mut [Vec<TermCell>], style: &impl TermStyle) {
    let width = block.iter().map(|l| line_width(l, style)).max().unwrap_or(0);
    for line in block.iter_mut() {
        let padding = width - line_width(line, style);
        line.extend(std::iter::repeat_n(TermCell::Space, padding));
    }
}

/// No colours; cells as ASCII pairs
pub struct PlainTermStyle;

impl TermStyle for PlainTermStyle {
    fn display<'a>(&self, cell: &'a TermCell) -> &'a str {
        match cell {
            TermCell::FieldCell(CellKind::Empty) => "  ",
            TermCell::FieldCell(CellKind::Wall) => "##",
            TermCell::FieldCell(CellKind::Block) => "[]",
            TermCell::FieldCell(CellKind::Overlap) => "XX",
            TermCell::Space => " ",
            TermCell::Message(s) => s.as_str(),
        }
    }
    fn width(&self, cell: &TermCell) -> usize {
        match cell {
            TermCell::FieldCell(_) => 2,
            TermCell::Space => 1,
            TermCell::Message(s) => s.chars().count(),
        }
    }
}

/// ANSI colours; every cell resets after itself
pub struct AnsiTermStyle;

impl TermStyle for AnsiTermStyle {
    fn display<'a>(&self, cell: &'a TermCell) -> &'a str {
        match cell {
            TermCell::FieldCell(CellKind::Empty) => "  ",
            TermCell::FieldCell(CellKind::Wall) => "\x1b[0;37m▒▒\x1b[0m",
            TermCell::FieldCell(CellKind::Block) => "\x1b[0;36m[]\x1b[0m",
            TermCell::FieldCell(CellKind::Overlap) => "\x1b[1;31mXX\x1b[0m",
            TermCell::Space => " ",
            TermCell::Message(s) => s.as_str(),
        }
    }
    fn width(&self, cell: &TermCell) -> usize {
        match cell {
            TermCell::FieldCell(_) => 2,
            TermCell::Space => 1,
            TermCell::Message(s) => s.chars().count(),
        }
    }
}

impl TermRender for Field {
    fn output(&self, _style: &impl TermStyle) -> Vec<Vec<TermCell>> {
        (0..STAGE_HEIGHT)
            .map(|y| {
                (0..STAGE_WIDTH)
                    .map(|x| TermCell::FieldCell(CellKind::classify(self.get(x, y))))
                    .collect()
            })
            .collect()
    }
}

/// One player's well, optionally with a message across the middle
pub struct WellField {
    field: Field,
    message: Option<String>,
}

impl WellField {
    pub fn new(field: Field, message: Option<String>) -> Self {
        Self { field, message }
    }

    /// Empty well saying "Waiting..."
    pub fn waiting() -> Self {
        Self::new(Stage::new().to_field(), Some("Waiting...".to_string()))
    }
}

impl TermRender for WellField {
    fn output(&self, style: &impl TermStyle) -> Vec<Vec<TermCell>> {
        let mut lines = self.field.output(style);
        if let Some(message) = &self.message {
            let middle = lines.len() / 2;
            let line = &mut lines[middle];
            let inner = line_width(&line[1..line.len() - 1], style);
            let wall = line[0].clone();
            let text: String = format!("{:^width$}", message, width = inner)
                .chars()
                .take(inner)
                .collect();
            *line = vec![wall.clone(), TermCell::Message(text), wall];
        }
        lines
    }
}

/// Both wells with names, scores and the clock between them
pub struct DuelScreen {
    player_well: WellField,
    opponent_well: WellField,
    panel: Vec<String>,
}

impl DuelScreen {
    pub fn new(view: &DuelView) -> Self {
        let player_field = Field::from_bytes(&view.own_field);
        let player_well = match player_field {
            Some(field) => {
                let message = matches!(view.state, MatchState::Lost(EndReason::ToppedOut))
                    .then(|| "GAME OVER".to_string());
                WellField::new(field, message)
            }
            None => WellField::waiting(),
        };

        let opponent_field = view.peer_field.as_deref().and_then(Field::from_bytes);
        let opponent_well = match opponent_field {
            Some(field) => {
                let message = matches!(view.state, MatchState::Won(EndReason::OpponentToppedOut))
                    .then(|| "GAME OVER".to_string());
                WellField::new(field, message)
            }
            None => WellField::waiting(),
        };

        let mut panel = vec![
            view.own_name.clone(),
            format!("Score: {:>6}", view.own_score),
            String::new(),
            view.peer_name.clone().unwrap_or_else(|| "Opponent".to_string()),
            format!("Score: {:>6}", view.peer_score),
            String::new(),
            format!("Time:  {:>6}", format_remaining(view.remaining)),
        ];
        if !view.state.is_running() {
            panel.push(String::new());
            panel.push(view.state.headline().to_string());
            panel.push(state_detail(&view.state));
        }

        Self {
            player_well,
            opponent_well,
            panel,
        }
    }
}

impl TermRender for DuelScreen {
    fn output(&self, style: &impl TermStyle) -> Vec<Vec<TermCell>> {
        let mut player_lines = self.player_well.output(style);
        let mut opponent_lines = self.opponent_well.output(style);
        pad_block_right(&mut player_lines, style);
        pad_block_right(&mut opponent_lines, style);

        let panel_width = self
            .panel
            .iter()
            .map(|m| m.chars().count())
            .max()
            .unwrap_or(0);

        // Panel starts a couple of rows down
        let panel_top = 2;
        player_lines
            .into_iter()
            .zip(opponent_lines)
            .enumerate()
            .map(|(i, (mut line, mut opponent))| {
                line.push(TermCell::Space);
                line.push(TermCell::Space);
                let text = i
                    .checked_sub(panel_top)
                    .and_then(|row| self.panel.get(row))
                    .map(String::as_str)
                    .unwrap_or("");
                line.push(TermCell::Message(format!("{:<width$}", text, width = panel_width)));
                line.push(TermCell::Space);
                line.push(TermCell::Space);
                line.append(&mut opponent);
                line
            })
            .collect()
    }
}

/// Seconds left, rounded up, as m:ss
pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.as_millis().div_ceil(1000);
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn state_detail(state: &MatchState) -> String {
    match state {
        MatchState::Running => String::new(),
        MatchState::Draw => "(time up)".to_string(),
        MatchState::Won(reason) | MatchState::Lost(reason) | MatchState::Interrupted(reason) => {
            format!("({})", reason)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{FILLED, overlay};
    use crate::piece::PieceKind;

    fn view(peer_field: Option<Vec<u8>>, state: MatchState) -> DuelView {
        DuelView {
            own_name: "Astrid".to_string(),
            own_field: overlay(&Stage::new(), &PieceKind::O.mask(), 4, 0).to_bytes(),
            own_score: 300,
            peer_name: Some("Bjorn".to_string()),
            peer_field,
            peer_score: 100,
            remaining: Duration::from_millis(59_020),
            state,
        }
    }

    #[test]
    fn test_field_rows_in_plain_style() {
        let field = overlay(&Stage::new(), &PieceKind::O.mask(), 4, 0);
        let lines = field.render(&PlainTermStyle);
        assert_eq!(lines.len(), STAGE_HEIGHT);
        assert_eq!(lines[0], format!("##{}##", " ".repeat(20)));
        assert_eq!(lines[1], "##        [][]        ##");
        assert_eq!(lines[STAGE_HEIGHT - 1], "##".repeat(STAGE_WIDTH));
    }

    #[test]
    fn test_overlap_is_not_drawn_as_block() {
        let mut stage = Stage::new();
        stage.set(5, 1, FILLED);
        let field = overlay(&stage, &PieceKind::O.mask(), 4, 0);
        let lines = field.render(&PlainTermStyle);
        assert_eq!(lines[1], "##        XX[]        ##");
    }

    #[test]
    fn test_screen_lines_have_equal_width() {
        let screen = DuelScreen::new(&view(None, MatchState::Running));
        let rows = screen.output(&PlainTermStyle);
        assert_eq!(rows.len(), STAGE_HEIGHT);
        let width = line_width(&rows[0], &PlainTermStyle);
        assert!(rows.iter().all(|r| line_width(r, &PlainTermStyle) == width));

        let lines = screen.render(&PlainTermStyle);
        assert!(lines.iter().any(|l| l.contains("Waiting...")));
        assert!(lines.iter().any(|l| l.contains("Score:    300")));
        assert!(lines.iter().any(|l| l.contains("Bjorn")));
        assert!(lines.iter().any(|l| l.contains("1:00")));
    }

    #[test]
    fn test_result_is_shown() {
        let peer = overlay(&Stage::new(), &PieceKind::I.mask(), 4, 0).to_bytes();
        let screen = DuelScreen::new(&view(Some(peer), MatchState::Lost(EndReason::ToppedOut)));
        let lines = screen.render(&AnsiTermStyle);
        assert!(lines.iter().any(|l| l.contains("You lose!")));
        assert!(lines.iter().any(|l| l.contains("GAME OVER")));
        assert!(!lines.iter().any(|l| l.contains("Waiting...")));
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(Duration::from_secs(60)), "1:00");
        assert_eq!(format_remaining(Duration::from_millis(59_020)), "1:00");
        assert_eq!(format_remaining(Duration::from_millis(4_500)), "0:05");
        assert_eq!(format_remaining(Duration::ZERO), "0:00");
    }
}
