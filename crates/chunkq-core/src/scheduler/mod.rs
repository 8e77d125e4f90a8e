//! Chunk scheduler: FIFO queue, per-key failure counters, in-flight cap.
//!
//! The scheduler never waits on the network. It submits chunks through a
//! [`ChunkTransport`] and expects the drive loop to report each finished
//! attempt via [`ChunkScheduler::handle_outcome`]. Every completion frees a
//! slot and immediately schedules the next chunk, which keeps the cap
//! saturated while work remains.

mod summary;


use anyhow::Result;
use std::collections::{HashMap, VecDeque};

use crate::chunk::{Chunk, ChunkId};
use crate::hooks::{AttemptStatus, ChunkHooks};
use crate::settings::SchedulerLimits;
use crate::transport::{classify, AttemptOutcome, ChunkTransport, ErrorKind};

pub use summary::RunSummary;

pub struct ChunkScheduler {
    limits: SchedulerLimits,
    hooks: ChunkHooks,
    queue: VecDeque<Chunk>,
    failures: HashMap<ChunkId, u32>,
    in_flight: usize,
    summary: RunSummary,
}

impl ChunkScheduler {
    pub fn new(limits: SchedulerLimits, hooks: ChunkHooks, chunks: Vec<Chunk>) -> Self {
        let summary = RunSummary {
            total_chunks: chunks.len(),
            ..RunSummary::default()
        };
        Self {
            limits,
            hooks,
            queue: chunks.into_iter().collect(),
            failures: HashMap::new(),
            in_flight: 0,
            summary,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Failures recorded for a retry key (0 if it never failed).
    pub fn failure_count(&self, key: &ChunkId) -> u32 {
        self.failures.get(key).copied().unwrap_or(0)
    }

    /// Queue empty and nothing in flight.
    pub fn is_drained(&self) -> bool {
        self.queue.is_empty() && self.in_flight == 0
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn into_summary(self) -> RunSummary {
        self.summary
    }

    /// Start `min(cap, queued)` download cycles; at least one so an empty
    /// queue still reaches `on_finished`.
    pub fn start(&mut self, transport: &mut impl ChunkTransport) -> Result<()> {
        let workers = self
            .limits
            .concurrent_downloads_max
            .min(self.queue.len())
            .max(1);
        tracing::debug!(
            workers,
            queued = self.queue.len(),
            cap = self.limits.concurrent_downloads_max,
            "starting chunk workers"
        );
        for _ in 0..workers {
            self.download_chunk(transport)?;
        }
        Ok(())
    }

    /// Scheduling primitive: fill one free slot with the next eligible chunk.
    ///
    /// Does nothing when the cap is reached. An empty queue fires
    /// `on_finished`. Chunks past the retry ceiling are handed to
    /// `on_chunk_give_up` and dropped, and the next chunk is tried in their place.
    pub fn download_chunk(&mut self, transport: &mut impl ChunkTransport) -> Result<()> {
        loop {
            if self.in_flight >= self.limits.concurrent_downloads_max {
                return Ok(());
            }

            let Some(chunk) = self.queue.pop_front() else {
                tracing::debug!(in_flight = self.in_flight, "queue empty; worker finished");
                if let Some(on_finished) = self.hooks.on_finished.as_mut() {
                    on_finished();
                }
                return Ok(());
            };

            let failures = self.failure_count(chunk.key());
            if failures > self.limits.max_download_retries {
                tracing::warn!(
                    chunk = %chunk,
                    failures,
                    max_retries = self.limits.max_download_retries,
                    "giving up on chunk"
                );
                if let Some(on_give_up) = self.hooks.on_chunk_give_up.as_mut() {
                    on_give_up(&chunk);
                }
                self.summary.given_up.push(chunk);
                continue;
            }

            self.log_chunk(&chunk, failures, "requesting chunk");
            transport.submit(chunk)?;
            self.in_flight += 1;
            self.summary.attempts += 1;
            return Ok(());
        }
    }

    /// Record a finished attempt, fire hooks, and schedule the next chunk.
    pub fn handle_outcome(
        &mut self,
        chunk: Chunk,
        outcome: AttemptOutcome,
        transport: &mut impl ChunkTransport,
    ) -> Result<()> {
        let status = match outcome {
            Ok(payload) => {
                self.summary.succeeded += 1;
                self.log_chunk(&chunk, self.failure_count(chunk.key()), "chunk succeeded");
                if let Some(on_success) = self.hooks.on_chunk_success.as_mut() {
                    on_success(&chunk, &payload);
                }
                AttemptStatus::Success
            }
            Err(e) => {
                let failures = self.failures.entry(chunk.key().clone()).or_insert(0);
                *failures += 1;
                let failures = *failures;
                self.summary.failed_attempts += 1;
                let kind = classify(&e);
                if kind == ErrorKind::Throttled {
                    self.summary.throttle_events += 1;
                } else if kind.is_error_event() {
                    self.summary.error_events += 1;
                }
                tracing::warn!(chunk = %chunk, failures, error = %e, "chunk attempt failed; re-queued");
                self.queue.push_back(chunk.clone());
                if let Some(on_error) = self.hooks.on_chunk_error.as_mut() {
                    on_error(&chunk, &e);
                }
                AttemptStatus::Error
            }
        };

        self.in_flight = self.in_flight.saturating_sub(1);
        (self.hooks.on_chunk_complete)(&chunk, status);
        self.download_chunk(transport)
    }

    fn log_chunk(&self, chunk: &Chunk, failures: u32, msg: &str) {
        if self.limits.verbose {
            tracing::info!(chunk = %chunk, failures, in_flight = self.in_flight, "{}", msg);
        } else {
            tracing::debug!(chunk = %chunk, failures, in_flight = self.in_flight, "{}", msg);
        }
    }
}
