//! Builder enforcing the construction contract.

use crate::chunk::{chunks_from_ids, Chunk, ChunkId};
use crate::config::{BodyFormat, ChunkqConfig, DataType};
use crate::hooks::{
    AttemptStatus, ChunkCompleteHook, ChunkErrorHook, ChunkGiveUpHook, ChunkHooks,
    ChunkSuccessHook, CompleteHook, FinishedHook,
};
use crate::progress::ProgressStats;
use crate::scheduler::RunSummary;
use crate::settings::{parse_http_url, ChunkSource, ConfigError, SchedulerLimits, Settings};
use crate::transport::{RequestOptions, ResponsePayload, TransportError};

use super::ChunkDownloader;

/// Collects settings and hooks; [`DownloaderBuilder::build`] validates them.
#[derive(Default)]
pub struct DownloaderBuilder {
    url: Option<String>,
    chunks: Option<Vec<Vec<ChunkId>>>,
    chunks_url: Option<String>,
    on_chunk_complete: Option<ChunkCompleteHook>,
    on_chunk_success: Option<ChunkSuccessHook>,
    on_chunk_error: Option<ChunkErrorHook>,
    on_chunk_give_up: Option<ChunkGiveUpHook>,
    on_finished: Option<FinishedHook>,
    on_complete: Option<CompleteHook>,
    limits: SchedulerLimits,
    data_type: DataType,
    body_format: BodyFormat,
    request: RequestOptions,
    progress_tx: Option<tokio::sync::mpsc::Sender<ProgressStats>>,
}

impl DownloaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed tunables from the config file; explicit setters still override.
    pub fn from_config(cfg: &ChunkqConfig) -> Self {
        Self {
            limits: SchedulerLimits {
                concurrent_downloads_max: cfg.concurrent_downloads_max,
                max_download_retries: cfg.max_download_retries,
                verbose: cfg.verbose,
            },
            data_type: cfg.data_type,
            body_format: cfg.body_format,
            request: cfg.request.map(RequestOptions::from).unwrap_or_default(),
            ..Self::default()
        }
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Inline chunk source, e.g. `[[1, 2], [3]]`.
    pub fn chunks<I, C, T>(mut self, chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = T>,
        T: Into<ChunkId>,
    {
        self.chunks = Some(
            chunks
                .into_iter()
                .map(|c| c.into_iter().map(Into::into).collect())
                .collect(),
        );
        self
    }

    /// Remote chunk source, fetched with GET before the run starts.
    pub fn chunks_url(mut self, url: impl Into<String>) -> Self {
        self.chunks_url = Some(url.into());
        self
    }

    pub fn on_chunk_complete(
        mut self,
        f: impl FnMut(&Chunk, AttemptStatus) + Send + 'static,
    ) -> Self {
        self.on_chunk_complete = Some(Box::new(f));
        self
    }

    pub fn on_chunk_success(
        mut self,
        f: impl FnMut(&Chunk, &ResponsePayload) + Send + 'static,
    ) -> Self {
        self.on_chunk_success = Some(Box::new(f));
        self
    }

    pub fn on_chunk_error(
        mut self,
        f: impl FnMut(&Chunk, &TransportError) + Send + 'static,
    ) -> Self {
        self.on_chunk_error = Some(Box::new(f));
        self
    }

    pub fn on_chunk_give_up(mut self, f: impl FnMut(&Chunk) + Send + 'static) -> Self {
        self.on_chunk_give_up = Some(Box::new(f));
        self
    }

    pub fn on_finished(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_finished = Some(Box::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl FnOnce(&RunSummary) + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn max_download_retries(mut self, n: u32) -> Self {
        self.limits.max_download_retries = n;
        self
    }

    pub fn concurrent_downloads_max(mut self, n: usize) -> Self {
        self.limits.concurrent_downloads_max = n;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.limits.verbose = verbose;
        self
    }

    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    pub fn body_format(mut self, body_format: BodyFormat) -> Self {
        self.body_format = body_format;
        self
    }

    pub fn request_options(mut self, request: RequestOptions) -> Self {
        self.request = request;
        self
    }

    /// Receive a [`ProgressStats`] snapshot after each batch of finished attempts.
    pub fn progress(mut self, tx: tokio::sync::mpsc::Sender<ProgressStats>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn build(self) -> Result<ChunkDownloader, ConfigError> {
        let url = self.url.ok_or(ConfigError::MissingUrl)?;
        let on_chunk_complete = self
            .on_chunk_complete
            .ok_or(ConfigError::MissingOnChunkComplete)?;

        let source = match (self.chunks, self.chunks_url) {
            (None, None) => return Err(ConfigError::MissingChunkSource),
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingChunkSources),
            (Some(raw), None) => ChunkSource::Inline(chunks_from_ids(raw)?),
            (None, Some(list_url)) => ChunkSource::Url(parse_http_url("chunks_url", &list_url)?),
        };

        let url = parse_http_url("url", &url)?;
        if self.limits.concurrent_downloads_max == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }

        let hooks = ChunkHooks {
            on_chunk_complete,
            on_chunk_success: self.on_chunk_success,
            on_chunk_error: self.on_chunk_error,
            on_chunk_give_up: self.on_chunk_give_up,
            on_finished: self.on_finished,
            on_complete: self.on_complete,
        };

        Ok(ChunkDownloader {
            settings: Settings {
                url,
                limits: self.limits,
                data_type: self.data_type,
                body_format: self.body_format,
                request: self.request,
            },
            source,
            hooks,
            progress_tx: self.progress_tx,
        })
    }
}
