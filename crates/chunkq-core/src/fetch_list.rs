//! Chunk list fetch: one blocking GET returning a JSON array of chunks.
//!
//! Any failure here is fatal for the run; there is no retry.

use anyhow::{Context, Result};
use url::Url;

use crate::chunk::{parse_chunk_list, Chunk};
use crate::transport::RequestOptions;

/// Fetches and decodes the chunk list at `url`.
///
/// Runs in the current thread; call from `spawn_blocking` if used from async code.
pub fn fetch_chunk_list(url: &Url, request: RequestOptions) -> Result<Vec<Chunk>> {
    let mut body: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url.as_str()).context("invalid URL")?;
    easy.get(true)?;
    easy.follow_location(true)?;
    if let Some(t) = request.connect_timeout {
        easy.connect_timeout(t)?;
    }
    if let Some(t) = request.timeout {
        easy.timeout(t)?;
    }
    let mut list = curl::easy::List::new();
    list.append("Accept: application/json")?;
    easy.http_headers(list)?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform().context("chunk list request failed")?;
    }

    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        anyhow::bail!("GET {} returned HTTP {}", url, code);
    }

    let chunks = parse_chunk_list(&body).context("decoding chunk list")?;
    tracing::debug!(url = %url, chunks = chunks.len(), "fetched chunk list");
    Ok(chunks)
}
