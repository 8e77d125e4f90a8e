//! Immutable run settings and construction-time errors.

use url::Url;

use crate::chunk::{Chunk, ChunkListError};
use crate::config::{BodyFormat, DataType};
use crate::transport::RequestOptions;

pub const DEFAULT_MAX_DOWNLOAD_RETRIES: u32 = 3;
pub const DEFAULT_CONCURRENT_DOWNLOADS_MAX: usize = 10;

/// Errors raised synchronously while building a downloader.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required setting `url`")]
    MissingUrl,
    #[error("missing required hook `on_chunk_complete`")]
    MissingOnChunkComplete,
    #[error("no chunk source: set either `chunks` or `chunks_url`")]
    MissingChunkSource,
    #[error("both `chunks` and `chunks_url` are set; use exactly one")]
    ConflictingChunkSources,
    #[error("invalid {field} `{value}`: {reason}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        reason: String,
    },
    #[error("`concurrent_downloads_max` must be at least 1")]
    ZeroConcurrency,
    #[error("inline chunks: {0}")]
    InvalidChunks(#[from] ChunkListError),
}

/// Parse and check an absolute http(s) URL.
pub(crate) fn parse_http_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
        reason,
    };
    let url = Url::parse(value).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme {}", other))),
    }
}

/// Where the chunk list comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkSource {
    Inline(Vec<Chunk>),
    Url(Url),
}

/// The three numbers the scheduler loop needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerLimits {
    pub concurrent_downloads_max: usize,
    pub max_download_retries: u32,
    pub verbose: bool,
}

impl Default for SchedulerLimits {
    fn default() -> Self {
        Self {
            concurrent_downloads_max: DEFAULT_CONCURRENT_DOWNLOADS_MAX,
            max_download_retries: DEFAULT_MAX_DOWNLOAD_RETRIES,
            verbose: false,
        }
    }
}

/// Settings resolved once at construction.
#[derive(Debug, Clone)]
pub struct Settings {
    /// POST target for every chunk.
    pub url: Url,
    pub limits: SchedulerLimits,
    pub data_type: DataType,
    pub body_format: BodyFormat,
    pub request: RequestOptions,
}
