//! Fixed-size block accumulation of validated samples.

use std::time::{Duration, Instant};

use tracing::warn;

/// Assembles validated samples into fixed-size blocks.
///
/// Invariant: the write index is always in `[0, N)`. When the N-th sample
/// arrives the full block is handed out and the index returns to zero, so
/// the returned slice is valid until the next [`push`](Self::push).
#[derive(Debug, Clone)]
pub struct BlockAccumulator {
    buffer: Vec<f32>,
    index: usize,
    last_sample_at: Option<Instant>,
    blocks_completed: u64,
    stalls: u64,
}

impl BlockAccumulator {
    /// Create an accumulator for blocks of `block_size` samples.
    ///
    /// A size of zero is raised to one.
    #[must_use]
    pub fn new(block_size: usize) -> Self {
        Self {
            buffer: vec![0.0; block_size.max(1)],
            index: 0,
            last_sample_at: None,
            blocks_completed: 0,
            stalls: 0,
        }
    }

    /// Append one validated sample received at `now`.
    ///
    /// Returns the completed block when this sample fills it.
    pub fn push(&mut self, sample: f32, now: Instant) -> Option<&mut [f32]> {
        self.buffer[self.index] = sample;
        self.index += 1;
        self.last_sample_at = Some(now);

        if self.index < self.buffer.len() {
            return None;
        }

        self.index = 0;
        self.blocks_completed += 1;
        Some(&mut self.buffer)
    }

    /// Discard a partial block that has been idle for longer than `timeout`.
    ///
    /// Returns `true` when samples were discarded.
    pub fn expire_stale(&mut self, now: Instant, timeout: Duration) -> bool {
        if self.index == 0 {
            return false;
        }
        let Some(last) = self.last_sample_at else {
            return false;
        };
        if now.saturating_duration_since(last) <= timeout {
            return false;
        }

        warn!(
            discarded = self.index,
            idle_ms = now.saturating_duration_since(last).as_millis() as u64,
            "acquisition stalled mid-block, discarding partial block"
        );
        self.index = 0;
        self.stalls += 1;
        true
    }

    /// Samples collected toward the current block.
    #[must_use]
    pub fn fill_level(&self) -> usize {
        self.index
    }

    /// Block size N.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.buffer.len()
    }

    /// Number of blocks completed so far.
    #[must_use]
    pub fn blocks_completed(&self) -> u64 {
        self.blocks_completed
    }

    /// Number of partial blocks discarded by the stall reset.
    #[must_use]
    pub fn stalls(&self) -> u64 {
        self.stalls
    }
}
