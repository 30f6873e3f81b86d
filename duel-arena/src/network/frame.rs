//! Length-prefixed wire frames
//!
//! Every message is `[tag: u8][len: u32 big-endian][payload: len bytes]`.
//! Field, Score and Control messages are therefore unambiguous whatever their
//! payload contains.

use serde::{Deserialize, Serialize};

use crate::error::{ArenaError, Result};
use crate::network::control::Control;

/// Bytes before the payload
pub const HEADER_LEN: usize = 5;

/// Version carried in Hello; peers must match
pub const PROTOCOL_VERSION: u8 = 1;

const TAG_HELLO: u8 = 0x01;
const TAG_FIELD: u8 = 0x02;
const TAG_SCORE: u8 = 0x03;
const TAG_CONTROL: u8 = 0x04;

/// First message each peer sends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hello {
    pub protocol_version: u8,
    pub name: String,
    pub width: u16,
    pub height: u16,
}

/// One decoded message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Hello(Hello),
    /// Row-major field cells
    Field(Vec<u8>),
    Score(u32),
    Control(Control),
}

impl Frame {
    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Frame::Hello(_) => "hello",
            Frame::Field(_) => "field",
            Frame::Score(_) => "score",
            Frame::Control(_) => "control",
        }
    }

    /// Append the encoded frame to `out`
    pub fn encode_into(&self, out: &mut Vec<u8>) -> Result<()> {
        let (tag, payload): (u8, std::borrow::Cow<'_, [u8]>) = match self {
            Frame::Hello(hello) => (TAG_HELLO, serde_json::to_vec(hello)?.into()),
            Frame::Field(cells) => (TAG_FIELD, cells.as_slice().into()),
            Frame::Score(score) => (TAG_SCORE, score.to_be_bytes().to_vec().into()),
            Frame::Control(control) => (TAG_CONTROL, vec![control.as_byte()].into()),
        };
        let len = u32::try_from(payload.len()).map_err(|_| ArenaError::FrameTooLarge {
            len: payload.len(),
            max: u32::MAX as usize,
        })?;
        out.reserve(HEADER_LEN + payload.len());
        out.push(tag);
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(&payload);
        Ok(())
    }

    /// Encode into a fresh buffer
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.encode_into(&mut out)?;
        Ok(out)
    }

    fn decode(tag: u8, payload: &[u8]) -> Result<Frame> {
        match tag {
            TAG_HELLO => Ok(Frame::Hello(serde_json::from_slice(payload)?)),
            TAG_FIELD => Ok(Frame::Field(payload.to_vec())),
            TAG_SCORE => {
                let bytes: [u8; 4] = payload.try_into().map_err(|_| {
                    ArenaError::Protocol(format!(
                        "score payload must be 4 bytes, got {}",
                        payload.len()
                    ))
                })?;
                Ok(Frame::Score(u32::from_be_bytes(bytes)))
            }
            TAG_CONTROL => Ok(Frame::Control(Control::decode(payload)?)),
            other => Err(ArenaError::Protocol(format!(
                "unknown frame tag 0x{:02x}",
                other
            ))),
        }
    }
}

/// Incremental decoder: feed it bytes as they arrive, pull complete frames
#[derive(Debug)]
pub struct FrameDecoder {
    buf: Vec<u8>,
    max_frame_len: usize,
}

impl FrameDecoder {
    pub fn new(max_frame_len: usize) -> Self {
        Self {
            buf: Vec::new(),
            max_frame_len,
        }
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Bytes of an incomplete frame still waiting for the rest
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Next complete frame, or None if more bytes are needed
    ///
    /// Errors are not recoverable: the stream position is lost.
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.buf.len() < HEADER_LEN {
            return Ok(None);
        }
        let tag = self.buf[0];
        let len = u32::from_be_bytes([self.buf[1], self.buf[2], self.buf[3], self.buf[4]]) as usize;
        if len > self.max_frame_len {
            return Err(ArenaError::FrameTooLarge {
                len,
                max: self.max_frame_len,
            });
        }
        if self.buf.len() < HEADER_LEN + len {
            return Ok(None);
        }
        let frame = Frame::decode(tag, &self.buf[HEADER_LEN..HEADER_LEN + len]);
        self.buf.drain(..HEADER_LEN + len);
        frame.map(Some)
    }
}
