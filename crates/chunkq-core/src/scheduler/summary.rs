//! Counters collected over one run.

use crate::chunk::Chunk;

/// Summary of a run: attempts, outcomes and abandoned chunks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Chunks in the queue when the run started.
    pub total_chunks: usize,
    /// Requests issued, retries included.
    pub attempts: u32,
    pub succeeded: u32,
    pub failed_attempts: u32,
    /// Failed attempts answered with 429/503.
    pub throttle_events: u32,
    /// Failed attempts from timeouts, connection failures and 5xx (503 excluded).
    pub error_events: u32,
    /// Chunks abandoned after exceeding the retry ceiling, in give-up order.
    pub given_up: Vec<Chunk>,
}

impl RunSummary {
    /// True when every chunk eventually succeeded.
    pub fn is_clean(&self) -> bool {
        self.given_up.is_empty()
    }
}
