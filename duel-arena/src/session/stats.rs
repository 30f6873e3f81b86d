//! Statistics tracking for the peer link

use std::time::Instant;

/// Traffic counters for one peer link
#[derive(Debug, Clone)]
pub struct LinkStats {
    /// Total bytes received from the peer
    pub input_bytes: u64,
    /// Total bytes sent to the peer
    pub output_bytes: u64,
    /// Complete frames decoded
    pub input_frames: u64,
    /// Frames written
    pub output_frames: u64,
    /// Timestamp when stats collection started
    pub start_time: Instant,
}

impl LinkStats {
    /// Create a new LinkStats instance with zero counters
    pub fn new() -> Self {
        Self {
            input_bytes: 0,
            output_bytes: 0,
            input_frames: 0,
            output_frames: 0,
            start_time: Instant::now(),
        }
    }

    pub(crate) fn record_input(&mut self, bytes: usize) {
        self.input_bytes += bytes as u64;
    }

    pub(crate) fn record_input_frame(&mut self) {
        self.input_frames += 1;
    }

    pub(crate) fn record_output(&mut self, bytes: usize) {
        self.output_bytes += bytes as u64;
        self.output_frames += 1;
    }

    /// Input throughput in KB/s since the counters started
    pub fn input_kbps(&self) -> f64 {
        Self::kbps(self.input_bytes, self.start_time)
    }

    /// Output throughput in KB/s since the counters started
    pub fn output_kbps(&self) -> f64 {
        Self::kbps(self.output_bytes, self.start_time)
    }

    fn kbps(bytes: u64, since: Instant) -> f64 {
        let elapsed_secs = since.elapsed().as_secs_f64();
        if elapsed_secs > 0.0 {
            (bytes as f64) / 1024.0 / elapsed_secs
        } else {
            0.0
        }
    }
}

impl Default for LinkStats {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LinkStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Input: {:.2} KB/s ({} bytes, {} frames), Output: {:.2} KB/s ({} bytes, {} frames)",
            self.input_kbps(),
            self.input_bytes,
            self.input_frames,
            self.output_kbps(),
            self.output_bytes,
            self.output_frames
        )
    }
}
