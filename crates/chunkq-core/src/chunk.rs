//! Chunk model: an opaque, non-empty sequence of identifiers.
//!
//! The first identifier is the chunk's retry key. Chunks arrive either inline
//! from the caller or as a JSON array of arrays from the chunk-list endpoint.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One identifier inside a chunk (a JSON integer or string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChunkId {
    Int(i64),
    Str(String),
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkId::Int(n) => write!(f, "{}", n),
            ChunkId::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for ChunkId {
    fn from(n: i64) -> Self {
        ChunkId::Int(n)
    }
}

impl From<&str> for ChunkId {
    fn from(s: &str) -> Self {
        ChunkId::Str(s.to_string())
    }
}

impl From<String> for ChunkId {
    fn from(s: String) -> Self {
        ChunkId::Str(s)
    }
}

/// A chunk of work sent in one POST request.
///
/// Deserializing goes through `TryFrom<Vec<ChunkId>>`, so an empty array is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<ChunkId>", try_from = "Vec<ChunkId>")]
pub struct Chunk(Vec<ChunkId>);

/// A chunk needs at least one identifier to carry a retry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("chunk must contain at least one identifier")]
pub struct EmptyChunkError;

impl TryFrom<Vec<ChunkId>> for Chunk {
    type Error = EmptyChunkError;

    fn try_from(ids: Vec<ChunkId>) -> Result<Self, Self::Error> {
        Chunk::new(ids).ok_or(EmptyChunkError)
    }
}

impl From<Chunk> for Vec<ChunkId> {
    fn from(chunk: Chunk) -> Self {
        chunk.0
    }
}

impl Chunk {
    /// Builds a chunk; returns None for an empty identifier list.
    pub fn new(ids: Vec<ChunkId>) -> Option<Self> {
        if ids.is_empty() {
            None
        } else {
            Some(Self(ids))
        }
    }

    /// Retry-tracking key (first identifier).
    pub fn key(&self) -> &ChunkId {
        &self.0[0]
    }

    pub fn ids(&self) -> &[ChunkId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// False for every chunk: `new`, `TryFrom` and deserialization all reject empty lists.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", id)?;
        }
        write!(f, "]")
    }
}

/// Error decoding a chunk list.
#[derive(Debug, thiserror::Error)]
pub enum ChunkListError {
    #[error("chunk list is not a JSON array of arrays of integers/strings: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("chunk at position {0} is empty")]
    EmptyChunk(usize),
}

/// Converts raw identifier lists into chunks, rejecting empty entries.
pub fn chunks_from_ids(raw: Vec<Vec<ChunkId>>) -> Result<Vec<Chunk>, ChunkListError> {
    raw.into_iter()
        .enumerate()
        .map(|(i, ids)| Chunk::new(ids).ok_or(ChunkListError::EmptyChunk(i)))
        .collect()
}

/// Parses a JSON chunk list (e.g. `[[1,2],[3],["a"]]`).
pub fn parse_chunk_list(data: &[u8]) -> Result<Vec<Chunk>, ChunkListError> {
    let raw: Vec<Vec<ChunkId>> = serde_json::from_slice(data)?;
    chunks_from_ids(raw)
}
