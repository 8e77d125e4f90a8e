//! Caller-supplied hooks, one optional closure per event.
//!
//! `on_chunk_complete` is mandatory and fires after every attempt.
//! `on_finished` fires each time a worker finds the queue empty, so it can
//! fire more than once per run; `on_complete` fires exactly once when the run
//! has drained.

use crate::chunk::Chunk;
use crate::scheduler::RunSummary;
use crate::transport::{ResponsePayload, TransportError};

/// How a single attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptStatus {
    Success,
    Error,
}

pub type ChunkCompleteHook = Box<dyn FnMut(&Chunk, AttemptStatus) + Send>;
pub type ChunkSuccessHook = Box<dyn FnMut(&Chunk, &ResponsePayload) + Send>;
pub type ChunkErrorHook = Box<dyn FnMut(&Chunk, &TransportError) + Send>;
pub type ChunkGiveUpHook = Box<dyn FnMut(&Chunk) + Send>;
pub type FinishedHook = Box<dyn FnMut() + Send>;
pub type CompleteHook = Box<dyn FnOnce(&RunSummary) + Send>;

pub struct ChunkHooks {
    pub on_chunk_complete: ChunkCompleteHook,
    pub on_chunk_success: Option<ChunkSuccessHook>,
    pub on_chunk_error: Option<ChunkErrorHook>,
    pub on_chunk_give_up: Option<ChunkGiveUpHook>,
    pub on_finished: Option<FinishedHook>,
    pub on_complete: Option<CompleteHook>,
}

impl ChunkHooks {
    pub fn new(on_chunk_complete: impl FnMut(&Chunk, AttemptStatus) + Send + 'static) -> Self {
        Self {
            on_chunk_complete: Box::new(on_chunk_complete),
            on_chunk_success: None,
            on_chunk_error: None,
            on_chunk_give_up: None,
            on_finished: None,
            on_complete: None,
        }
    }
}

impl std::fmt::Debug for ChunkHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkHooks")
            .field("on_chunk_success", &self.on_chunk_success.is_some())
            .field("on_chunk_error", &self.on_chunk_error.is_some())
            .field("on_chunk_give_up", &self.on_chunk_give_up.is_some())
            .field("on_finished", &self.on_finished.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish_non_exhaustive()
    }
}
