pub mod config;
pub mod logging;

pub mod chunk;
pub mod downloader;
pub mod fetch_list;
pub mod hooks;
pub mod progress;
pub mod scheduler;
pub mod settings;
pub mod transport;

pub use chunk::{Chunk, ChunkId};
pub use downloader::{ChunkDownloader, DownloaderBuilder};
pub use hooks::{AttemptStatus, ChunkHooks};
pub use scheduler::{ChunkScheduler, RunSummary};
pub use settings::ConfigError;
