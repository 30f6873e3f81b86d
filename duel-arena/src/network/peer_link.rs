//! Framed, non-blocking access to the peer stream

use futures::FutureExt;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{ArenaError, Result};
use crate::network::frame::{Frame, FrameDecoder};
use crate::session::stats::LinkStats;

const READ_CHUNK: usize = 4096;

/// Frames that were available on one non-blocking poll
#[derive(Debug, Default)]
pub struct Inbound {
    /// Complete frames in arrival order
    pub frames: Vec<Frame>,
    /// The peer closed its side
    pub closed: bool,
    /// Bytes of a frame cut short by the close
    pub truncated: usize,
}

/// Peer connection carrying frames over any byte stream
///
/// Writes complete before returning; reads never wait for data.
pub struct PeerLink<S> {
    stream: S,
    decoder: FrameDecoder,
    scratch: Box<[u8]>,
    out: Vec<u8>,
    closed: bool,
    stats: LinkStats,
}

impl<S> PeerLink<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, max_frame_len: usize) -> Self {
        Self {
            stream,
            decoder: FrameDecoder::new(max_frame_len),
            scratch: vec![0u8; READ_CHUNK].into_boxed_slice(),
            out: Vec::new(),
            closed: false,
            stats: LinkStats::new(),
        }
    }

    /// Write one frame and flush
    pub async fn send(&mut self, frame: &Frame) -> Result<()> {
        self.queue(frame)?;
        self.flush().await
    }

    /// Encode a frame into the outgoing buffer without writing
    pub fn queue(&mut self, frame: &Frame) -> Result<()> {
        let before = self.out.len();
        frame.encode_into(&mut self.out)?;
        self.stats.record_output(self.out.len() - before);
        Ok(())
    }

    /// Write all queued frames
    pub async fn flush(&mut self) -> Result<()> {
        if !self.out.is_empty() {
            self.stream.write_all(&self.out).await?;
            self.out.clear();
        }
        self.stream.flush().await?;
        Ok(())
    }

    /// Drain every complete frame available right now
    ///
    /// Returns immediately when the stream has no data.
    pub fn poll_frames(&mut self) -> Result<Inbound> {
        while !self.closed {
            match self.stream.read(&mut self.scratch).now_or_never() {
                None => break,
                Some(Ok(0)) => self.closed = true,
                Some(Ok(n)) => {
                    self.stats.record_input(n);
                    self.decoder.push(&self.scratch[..n]);
                }
                Some(Err(e)) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                Some(Err(e)) => return Err(e.into()),
            }
        }

        let mut inbound = Inbound::default();
        while let Some(frame) = self.decoder.next_frame()? {
            self.stats.record_input_frame();
            inbound.frames.push(frame);
        }
        inbound.closed = self.closed;
        if self.closed {
            inbound.truncated = self.decoder.pending();
        }
        Ok(inbound)
    }

    /// Wait for the next frame
    pub async fn recv(&mut self) -> Result<Frame> {
        loop {
            if let Some(frame) = self.decoder.next_frame()? {
                self.stats.record_input_frame();
                return Ok(frame);
            }
            if self.closed {
                return Err(ArenaError::Disconnected);
            }
            let n = self.stream.read(&mut self.scratch).await?;
            if n == 0 {
                self.closed = true;
            } else {
                self.stats.record_input(n);
                self.decoder.push(&self.scratch[..n]);
            }
        }
    }

    /// Close our write side
    pub async fn shutdown(&mut self) -> Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }

    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }
}
