use thiserror::Error;

use crate::ChunkKey;

/// Boxed error returned by a failing [`crate::Subscriber`].
pub type SubscriberError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Caller-visible failures raised by chunk and cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// A chunk with the same address and length is already registered, or its
    /// identity already carries a subscriber set.
    #[error("chunk {key} already exists in the cache")]
    ChunkExists {
        /// Identity of the rejected chunk.
        key: ChunkKey,
    },
    /// Replacement buffer length differs from the chunk's fixed length.
    #[error("a chunk's byte array may not change length (expected {expected}, got {actual})")]
    LengthMismatch {
        /// Fixed length of the chunk.
        expected: usize,
        /// Length of the rejected replacement buffer.
        actual: usize,
    },
    /// Unit width narrower than one raw byte.
    #[error("{bits} bits per addressable unit is below the 8-bit minimum")]
    InvalidBitsPerByte {
        /// Rejected bit width.
        bits: u32,
    },
    /// A subscriber failed while being notified; remaining dispatch for the
    /// update was abandoned.
    #[error("subscriber for chunk {key} failed")]
    SubscriberFailed {
        /// Identity of the chunk whose subscriber failed.
        key: ChunkKey,
        /// Error reported by the subscriber.
        #[source]
        source: SubscriberError,
    },
}
