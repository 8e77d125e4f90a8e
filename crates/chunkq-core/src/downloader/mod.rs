//! Chunk downloader: construction contract, startup protocol, drive loop.
//!
//! A [`ChunkDownloader`] is built once through [`DownloaderBuilder`], then
//! [`ChunkDownloader::run`] resolves the chunk list (inline or fetched),
//! fans out up to the concurrency cap and drives the curl multi loop until
//! the queue is empty and nothing is in flight.

mod builder;
mod run;

use anyhow::{Context, Result};

use crate::fetch_list;
use crate::hooks::ChunkHooks;
use crate::progress::ProgressStats;
use crate::scheduler::{ChunkScheduler, RunSummary};
use crate::settings::{ChunkSource, Settings};
use crate::transport::MultiTransport;

pub use builder::DownloaderBuilder;

#[derive(Debug)]
pub struct ChunkDownloader {
    settings: Settings,
    source: ChunkSource,
    hooks: ChunkHooks,
    progress_tx: Option<tokio::sync::mpsc::Sender<ProgressStats>>,
}

impl ChunkDownloader {
    pub fn builder() -> DownloaderBuilder {
        DownloaderBuilder::new()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn source(&self) -> &ChunkSource {
        &self.source
    }

    /// Runs every chunk to success or give-up and returns the run summary.
    ///
    /// Blocks the current thread; call from `spawn_blocking` if used from
    /// async code. A failed chunk-list fetch aborts before any POST is sent.
    pub fn run(self) -> Result<RunSummary> {
        let ChunkDownloader {
            settings,
            source,
            mut hooks,
            progress_tx,
        } = self;

        let chunks = match source {
            ChunkSource::Inline(chunks) => chunks,
            ChunkSource::Url(list_url) => fetch_list::fetch_chunk_list(&list_url, settings.request)
                .with_context(|| format!("fetching chunk list from {}", list_url))?,
        };

        tracing::info!(
            url = %settings.url,
            chunks = chunks.len(),
            cap = settings.limits.concurrent_downloads_max,
            max_retries = settings.limits.max_download_retries,
            "starting chunk run"
        );

        let on_complete = hooks.on_complete.take();
        let mut scheduler = ChunkScheduler::new(settings.limits, hooks, chunks);
        let mut transport = MultiTransport::new(
            settings.url.as_str(),
            settings.body_format,
            settings.data_type,
            settings.request,
        );
        run::drive(&mut scheduler, &mut transport, progress_tx.as_ref())?;

        let summary = scheduler.into_summary();
        tracing::info!(
            succeeded = summary.succeeded,
            failed_attempts = summary.failed_attempts,
            given_up = summary.given_up.len(),
            "chunk run complete"
        );
        if let Some(on_complete) = on_complete {
            on_complete(&summary);
        }
        Ok(summary)
    }
}
