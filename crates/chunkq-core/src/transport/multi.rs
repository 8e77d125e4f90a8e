//! Curl multi backend: single-threaded event loop, one Easy2 POST per chunk.

use anyhow::Result;
use std::time::Duration;

use crate::chunk::Chunk;
use crate::config::{BodyFormat, DataType};

use super::body::{decode_payload, encode_body};
use super::handler::ResponseCollector;
use super::{apply_timeouts, AttemptOutcome, ChunkTransport, RequestOptions, TransportError};

/// Active entry: curl handle + the chunk it carries.
type ActiveItem = (curl::multi::Easy2Handle<ResponseCollector>, Chunk);

/// Drives chunk POSTs through one `curl::multi` handle on the calling thread.
pub struct MultiTransport {
    multi: curl::multi::Multi,
    url: String,
    body_format: BodyFormat,
    data_type: DataType,
    request: RequestOptions,
    active: Vec<ActiveItem>,
}

impl MultiTransport {
    pub fn new(
        url: &str,
        body_format: BodyFormat,
        data_type: DataType,
        request: RequestOptions,
    ) -> Self {
        Self {
            multi: curl::multi::Multi::new(),
            url: url.to_string(),
            body_format,
            data_type,
            request,
            active: Vec::new(),
        }
    }

    /// Number of transfers registered with the multi handle.
    pub fn in_flight(&self) -> usize {
        self.active.len()
    }

    fn add_easy(&self, chunk: &Chunk) -> Result<curl::multi::Easy2Handle<ResponseCollector>> {
        let (content_type, body) = encode_body(chunk, self.body_format);
        let accept = match self.data_type {
            DataType::Json => "application/json",
            DataType::Text => "text/plain, */*",
        };

        let mut easy = curl::easy::Easy2::new(ResponseCollector::default());
        easy.url(&self.url)
            .map_err(|e| anyhow::anyhow!("curl url: {}", e))?;
        easy.post(true).map_err(|e| anyhow::anyhow!("curl: {}", e))?;
        easy.post_fields_copy(&body)
            .map_err(|e| anyhow::anyhow!("curl: {}", e))?;
        easy.follow_location(true)
            .map_err(|e| anyhow::anyhow!("curl: {}", e))?;
        apply_timeouts(&mut easy, self.request).map_err(|e| anyhow::anyhow!("curl: {}", e))?;

        let mut list = curl::easy::List::new();
        list.append(&format!("Content-Type: {}", content_type))
            .map_err(|e| anyhow::anyhow!("curl: {}", e))?;
        list.append(&format!("Accept: {}", accept))
            .map_err(|e| anyhow::anyhow!("curl: {}", e))?;
        easy.http_headers(list)
            .map_err(|e| anyhow::anyhow!("curl: {}", e))?;

        self.multi
            .add2(easy)
            .map_err(|e| anyhow::anyhow!("curl multi add: {}", e))
    }

    /// Perform pending transfers and return every chunk whose request finished.
    /// When nothing finished yet, waits up to `max_wait` for socket activity.
    pub fn poll(&mut self, max_wait: Duration) -> Result<Vec<(Chunk, AttemptOutcome)>> {
        if self.active.is_empty() {
            return Ok(Vec::new());
        }

        let running = self
            .multi
            .perform()
            .map_err(|e| anyhow::anyhow!("curl multi perform: {}", e))?;

        let mut finished: Vec<(usize, Result<(), curl::Error>)> = Vec::new();
        let active = &self.active;
        self.multi.messages(|msg| {
            for (i, (handle, _)) in active.iter().enumerate() {
                if let Some(res) = msg.result_for2(handle) {
                    finished.push((i, res));
                    break;
                }
            }
        });

        // Remove from the back so earlier indices stay valid.
        finished.sort_by(|a, b| b.0.cmp(&a.0));
        let mut outcomes = Vec::with_capacity(finished.len());
        for (i, res) in finished {
            let (handle, chunk) = self.active.remove(i);
            let mut easy = self
                .multi
                .remove2(handle)
                .map_err(|e| anyhow::anyhow!("curl multi remove: {}", e))?;
            let outcome = match res {
                Err(e) => Err(TransportError::Curl(e)),
                Ok(()) => {
                    let code = easy.response_code().unwrap_or(0);
                    let body = std::mem::take(&mut easy.get_mut().body);
                    decode_payload(code, body, self.data_type)
                }
            };
            outcomes.push((chunk, outcome));
        }

        if outcomes.is_empty() && running > 0 {
            self.multi
                .wait(&mut [], max_wait)
                .map_err(|e| anyhow::anyhow!("curl multi wait: {}", e))?;
        }
        Ok(outcomes)
    }
}

impl ChunkTransport for MultiTransport {
    fn submit(&mut self, chunk: Chunk) -> Result<()> {
        let handle = self.add_easy(&chunk)?;
        self.active.push((handle, chunk));
        Ok(())
    }
}
