//! Chunked memory cache for embedded device variables.
//!
//! Device memory is mirrored as a set of possibly overlapping [`Chunk`]s held
//! by a [`Cache`]. Incoming update chunks are merged into every resident chunk
//! they overlap, and each merged chunk's subscribers are notified with its
//! full buffer.

/// Unit-width and cache configuration.
pub mod config;
pub use config::{CacheConfig, UnitWidth, DEFAULT_BITS_PER_BYTE};

/// Error taxonomy for chunk and cache operations.
pub mod error;
pub use error::{CacheError, SubscriberError};

/// Address-anchored byte ranges with overlap merging.
pub mod chunk;
pub use chunk::{Chunk, ChunkKey};

/// Variable descriptors consumed by chunk factories.
pub mod variable;
pub use variable::{Variable, VariableDescriptor};

/// Resident chunk set and subscriber dispatch.
pub mod cache;
pub use cache::{subscriber_fn, Cache, SharedSubscriber, Subscriber};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use tracing_subscriber as _;
