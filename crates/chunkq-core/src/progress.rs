//! Progress reporting for a chunk run (settled chunks, rate, ETA).
//!
//! The drive loop sends a snapshot after every batch of finished attempts;
//! consumers render it however they like.

/// Snapshot of run progress (CLI-friendly).
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressStats {
    /// Chunks in the queue at startup.
    pub total_chunks: usize,
    pub succeeded: usize,
    pub given_up: usize,
    /// Chunks waiting in the queue (retries included).
    pub queued: usize,
    pub in_flight: usize,
    /// Requests issued so far, retries included.
    pub attempts: u32,
    /// Elapsed time since the run started (seconds).
    pub elapsed_secs: f64,
}

impl ProgressStats {
    /// Chunks that will not be requested again (succeeded or given up).
    pub fn settled(&self) -> usize {
        self.succeeded + self.given_up
    }

    /// Settled chunks per second (0 if elapsed is 0).
    pub fn chunks_per_sec(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.settled() as f64 / self.elapsed_secs
    }

    /// Estimated seconds remaining (None if rate is 0 and work remains).
    pub fn eta_secs(&self) -> Option<f64> {
        let remaining = self.total_chunks.saturating_sub(self.settled());
        if remaining == 0 {
            return Some(0.0);
        }
        let rate = self.chunks_per_sec();
        if rate <= 0.0 {
            return None;
        }
        Some(remaining as f64 / rate)
    }

    /// Fraction settled in [0.0, 1.0].
    pub fn fraction(&self) -> f64 {
        if self.total_chunks == 0 {
            return 1.0;
        }
        (self.settled() as f64 / self.total_chunks as f64).min(1.0)
    }
}
