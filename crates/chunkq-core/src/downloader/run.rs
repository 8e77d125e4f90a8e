//! Drive loop: poll the multi transport, feed outcomes to the scheduler.

use anyhow::Result;
use std::time::{Duration, Instant};

use crate::progress::ProgressStats;
use crate::scheduler::ChunkScheduler;
use crate::transport::MultiTransport;

const POLL_WAIT: Duration = Duration::from_millis(100);

fn snapshot(scheduler: &ChunkScheduler, started: Instant) -> ProgressStats {
    let summary = scheduler.summary();
    ProgressStats {
        total_chunks: summary.total_chunks,
        succeeded: summary.succeeded as usize,
        given_up: summary.given_up.len(),
        queued: scheduler.queued(),
        in_flight: scheduler.in_flight(),
        attempts: summary.attempts,
        elapsed_secs: started.elapsed().as_secs_f64(),
    }
}

/// Start the workers and loop until the scheduler is drained.
pub(super) fn drive(
    scheduler: &mut ChunkScheduler,
    transport: &mut MultiTransport,
    progress_tx: Option<&tokio::sync::mpsc::Sender<ProgressStats>>,
) -> Result<()> {
    let started = Instant::now();
    scheduler.start(transport)?;

    while !scheduler.is_drained() {
        if transport.in_flight() == 0 {
            anyhow::bail!(
                "scheduler stalled: {} queued, {} in flight but no active transfers",
                scheduler.queued(),
                scheduler.in_flight()
            );
        }
        let finished = transport.poll(POLL_WAIT)?;
        if finished.is_empty() {
            continue;
        }
        for (chunk, outcome) in finished {
            scheduler.handle_outcome(chunk, outcome, transport)?;
        }
        if let Some(tx) = progress_tx {
            let _ = tx.try_send(snapshot(scheduler, started));
        }
    }
    Ok(())
}
