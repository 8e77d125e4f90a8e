//! Network side of the scheduler.
//!
//! The scheduler only ever submits chunks through [`ChunkTransport`]; the
//! drive loop polls the transport for finished transfers and feeds each
//! outcome back to the scheduler. [`MultiTransport`] is the libcurl multi
//! implementation used in production.

mod body;
mod error;
mod handler;
mod multi;

use std::time::Duration;

use crate::chunk::Chunk;
use crate::config::RequestConfig;

pub use body::{decode_payload, encode_body, ResponsePayload};
pub use error::{classify, classify_curl_error, classify_http_status, ErrorKind, TransportError};
pub use multi::MultiTransport;

/// Result of one chunk POST attempt.
pub type AttemptOutcome = Result<ResponsePayload, TransportError>;

/// Starts asynchronous chunk requests. Completion is reported out of band.
pub trait ChunkTransport {
    /// Begins a request for `chunk`. An error here is an internal failure
    /// (e.g. curl could not register the handle), not a failed attempt.
    fn submit(&mut self, chunk: Chunk) -> anyhow::Result<()>;
}

/// Timeouts passed through to libcurl; `None` keeps libcurl's defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub connect_timeout: Option<Duration>,
    pub timeout: Option<Duration>,
}

impl From<RequestConfig> for RequestOptions {
    fn from(cfg: RequestConfig) -> Self {
        Self {
            connect_timeout: cfg.connect_timeout_secs.map(Duration::from_secs),
            timeout: cfg.timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Apply optional timeouts to an easy handle.
pub(crate) fn apply_timeouts<H>(
    easy: &mut curl::easy::Easy2<H>,
    opts: RequestOptions,
) -> Result<(), curl::Error> {
    if let Some(t) = opts.connect_timeout {
        easy.connect_timeout(t)?;
    }
    if let Some(t) = opts.timeout {
        easy.timeout(t)?;
    }
    Ok(())
}
