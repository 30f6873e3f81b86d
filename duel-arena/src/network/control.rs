//! Match control values carried by Control frames

use crate::error::{ArenaError, Result};

/// Reasons a peer ends the match early
///
/// The byte values are the sentinels of the legacy in-band scheme, where they
/// replaced the first byte of a field. They are kept as the Control frame
/// payload; framing is what tells a control message apart from a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    /// Sender's stack overflowed; sender has lost
    GameOver,
    /// Sender aborted abnormally (signal or operator)
    Interrupt,
    /// Sender's match clock reached zero
    TimeUp,
}

impl Control {
    pub const GAMEOVER_BYTE: u8 = 0xff;
    pub const INTERRUPT_BYTE: u8 = 0xfe;
    pub const TIMEUP_BYTE: u8 = 0xfd;

    /// Wire value of this control
    pub fn as_byte(self) -> u8 {
        match self {
            Control::GameOver => Self::GAMEOVER_BYTE,
            Control::Interrupt => Self::INTERRUPT_BYTE,
            Control::TimeUp => Self::TIMEUP_BYTE,
        }
    }

    /// Recognize a legacy sentinel byte
    ///
    /// Returns None for every value a legitimate field cell can take.
    pub fn from_legacy_byte(byte: u8) -> Option<Control> {
        match byte {
            Self::GAMEOVER_BYTE => Some(Control::GameOver),
            Self::INTERRUPT_BYTE => Some(Control::Interrupt),
            Self::TIMEUP_BYTE => Some(Control::TimeUp),
            _ => None,
        }
    }

    /// Decode a Control frame payload
    pub(crate) fn decode(payload: &[u8]) -> Result<Control> {
        match payload {
            [byte] => Control::from_legacy_byte(*byte).ok_or_else(|| {
                ArenaError::Protocol(format!("unknown control value 0x{:02x}", byte))
            }),
            _ => Err(ArenaError::Protocol(format!(
                "control payload must be 1 byte, got {}",
                payload.len()
            ))),
        }
    }
}

impl std::fmt::Display for Control {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Control::GameOver => write!(f, "GAMEOVER"),
            Control::Interrupt => write!(f, "INTERRUPT"),
            Control::TimeUp => write!(f, "TIMEUP"),
        }
    }
}
