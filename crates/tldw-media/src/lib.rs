//! Media acquisition for remote references.
//!
//! This crate provides:
//! - Resolution of video-sharing links through an ordered list of resolver backends
//! - Byte download with a direct fast path and relay fallback
//! - An orchestrator that sequences both and reports progress
//! - Env-driven configuration, structured logging and metrics

pub mod acquire;
pub mod config;
pub mod download;
pub mod error;
pub mod metrics;
pub mod progress;
pub mod relay;
pub mod resolver;

pub use acquire::Acquirer;
pub use config::{AcquisitionConfig, DEFAULT_RELAY_TEMPLATES, DEFAULT_RESOLVER_ENDPOINTS};
pub use download::{DownloadChain, DIRECT_ATTEMPT};
pub use error::{MediaError, MediaResult};
pub use progress::{NoProgress, ProgressSink, RecordingProgress, DOWNLOADING, RESOLVING};
pub use relay::{Relay, RelayTemplate};
pub use resolver::{JsonApiResolver, ResolvedStream, ResolverChain, StreamResolver};
