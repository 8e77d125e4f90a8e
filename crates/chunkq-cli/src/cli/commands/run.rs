//! `chunkq run` – send every chunk to the endpoint and stream the results.

use anyhow::{Context, Result};
use chunkq_core::config::ChunkqConfig;
use chunkq_core::progress::ProgressStats;
use chunkq_core::transport::ResponsePayload;
use chunkq_core::{AttemptStatus, Chunk, ChunkId, DownloaderBuilder, RunSummary};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::cli::{ChunkSourceArgs, RunArgs};

const PROGRESS_INTERVAL_MS: u64 = 500;

/// Result lines go here; the first write error is kept and reported after the run.
/// The writer is attached only after the downloader validated its settings.
#[derive(Default)]
struct LineSink {
    writer: Option<Box<dyn Write + Send>>,
    error: Option<io::Error>,
}

impl LineSink {
    fn write_line(&mut self, line: &str) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        if self.error.is_some() {
            return;
        }
        if let Err(e) = writeln!(writer, "{}", line) {
            self.error = Some(e);
        }
    }

    fn finish(&mut self) -> io::Result<()> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

fn open_output(output: Option<&Path>) -> Result<Box<dyn Write + Send>> {
    Ok(match output {
        Some(path) => Box::new(io::BufWriter::new(
            fs::File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(io::stdout()),
    })
}

/// One JSON line per successful chunk: `{"chunk":[...],"response":...}`.
pub(crate) fn result_line(chunk: &Chunk, payload: &ResponsePayload) -> String {
    serde_json::json!({ "chunk": chunk, "response": payload }).to_string()
}

/// Chunks given inline or in a file; None when the list comes from `--chunks-url`.
pub(crate) fn inline_chunks(source: &ChunkSourceArgs) -> Result<Option<Vec<Vec<ChunkId>>>> {
    let (json, origin) = match (&source.chunks, &source.chunks_file) {
        (Some(json), _) => (json.clone(), "--chunks".to_string()),
        (None, Some(path)) => (
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?,
            path.display().to_string(),
        ),
        (None, None) => return Ok(None),
    };
    let chunks: Vec<Vec<ChunkId>> =
        serde_json::from_str(&json).with_context(|| format!("parsing chunk list from {}", origin))?;
    Ok(Some(chunks))
}

fn print_summary(summary: &RunSummary) {
    eprintln!(
        "{} of {} chunk(s) succeeded, {} attempt(s), {} failed, {} given up",
        summary.succeeded,
        summary.total_chunks,
        summary.attempts,
        summary.failed_attempts,
        summary.given_up.len()
    );
    if summary.throttle_events > 0 {
        eprintln!("  server throttled {} attempt(s)", summary.throttle_events);
    }
    if summary.error_events > 0 {
        eprintln!(
            "  {} attempt(s) hit timeouts, connection failures or 5xx",
            summary.error_events
        );
    }
    for chunk in &summary.given_up {
        eprintln!("  gave up: {}", chunk);
    }
}

pub async fn run_chunks(cfg: &ChunkqConfig, args: RunArgs) -> Result<()> {
    let sink = Arc::new(Mutex::new(LineSink::default()));

    let mut builder = DownloaderBuilder::from_config(cfg).url(args.url.as_str());
    builder = match inline_chunks(&args.source)? {
        Some(chunks) => builder.chunks(chunks),
        None => match &args.source.chunks_url {
            Some(list_url) => builder.chunks_url(list_url.as_str()),
            None => builder,
        },
    };
    if let Some(n) = args.concurrency {
        builder = builder.concurrent_downloads_max(n);
    }
    if let Some(n) = args.retries {
        builder = builder.max_download_retries(n);
    }
    if let Some(data_type) = args.data_type {
        builder = builder.data_type(data_type);
    }
    if let Some(body_format) = args.body_format {
        builder = builder.body_format(body_format);
    }
    if args.verbose {
        builder = builder.verbose(true);
    }

    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<ProgressStats>(16);
    let line_sink = Arc::clone(&sink);
    let downloader = builder
        .on_chunk_complete(|chunk, status| {
            if status == AttemptStatus::Error {
                tracing::debug!(chunk = %chunk, "attempt failed");
            }
        })
        .on_chunk_success(move |chunk, payload| {
            if let Ok(mut sink) = line_sink.lock() {
                sink.write_line(&result_line(chunk, payload));
            }
        })
        .on_chunk_give_up(|chunk| eprintln!("giving up on chunk {}", chunk))
        .progress(progress_tx)
        .build()?;

    // Only touch --output once the invocation is known to be valid.
    let writer = open_output(args.output.as_deref())?;
    sink.lock()
        .map_err(|_| anyhow::anyhow!("result writer poisoned"))?
        .writer = Some(writer);

    let progress_handle = tokio::spawn(async move {
        let mut last_print = Instant::now();
        while let Some(stats) = progress_rx.recv().await {
            let now = Instant::now();
            if now.duration_since(last_print).as_millis() as u64 >= PROGRESS_INTERVAL_MS
                || stats.settled() >= stats.total_chunks
            {
                let eta = stats
                    .eta_secs()
                    .map(|s| format!("{:.0}s", s))
                    .unwrap_or_else(|| "?".to_string());
                eprint!(
                    "\r  {} / {} chunks ({:.1}%)  {} in flight  {:.2} chunks/s  ETA {}  ",
                    stats.settled(),
                    stats.total_chunks,
                    stats.fraction() * 100.0,
                    stats.in_flight,
                    stats.chunks_per_sec(),
                    eta
                );
                last_print = now;
            }
        }
        eprintln!();
    });

    // The downloader owns the progress sender; it is dropped when the run ends.
    let outcome = tokio::task::spawn_blocking(move || downloader.run())
        .await
        .context("chunk run task failed")?;
    let _ = progress_handle.await;
    let summary = outcome?;

    {
        let mut sink = sink
            .lock()
            .map_err(|_| anyhow::anyhow!("result writer poisoned"))?;
        sink.finish().context("writing results")?;
    }

    print_summary(&summary);
    tracing::info!(
        succeeded = summary.succeeded,
        given_up = summary.given_up.len(),
        "run finished"
    );
    Ok(())
}
