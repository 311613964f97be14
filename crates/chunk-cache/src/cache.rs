//! Resident chunk set and change-notification registry.
//!
//! The cache keeps two ordered containers keyed by [`ChunkKey`]: the resident
//! chunks, and the subscriber sets. They are populated independently; a
//! subscription may name an identity that was never added, in which case it
//! simply never fires. Dispatch is synchronous and runs on the caller's
//! thread.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::{
    CacheConfig, CacheError, Chunk, ChunkKey, SubscriberError, UnitWidth, VariableDescriptor,
};

/// Observer notified with the full content of a chunk after it is merged.
pub trait Subscriber {
    /// Receives the updated chunk's complete buffer.
    ///
    /// # Errors
    ///
    /// Any error aborts the remaining dispatch of the current
    /// [`Cache::update`] call and is returned to its caller.
    fn chunk_updated(&self, bytes: &[u8]) -> Result<(), SubscriberError>;
}

impl<F> Subscriber for F
where
    F: Fn(&[u8]) -> Result<(), SubscriberError>,
{
    fn chunk_updated(&self, bytes: &[u8]) -> Result<(), SubscriberError> {
        self(bytes)
    }
}

/// Shared observer handle. Identity is the handle's allocation, so the same
/// handle subscribed twice is stored once.
pub type SharedSubscriber = Rc<dyn Subscriber>;

/// Wraps a closure as a [`SharedSubscriber`].
#[must_use]
pub fn subscriber_fn<F>(f: F) -> SharedSubscriber
where
    F: Fn(&[u8]) -> Result<(), SubscriberError> + 'static,
{
    Rc::new(f)
}

#[derive(Default)]
struct SubscriberSet {
    members: Vec<SharedSubscriber>,
}

impl SubscriberSet {
    fn insert(&mut self, subscriber: &SharedSubscriber) -> bool {
        if self.contains(subscriber) {
            return false;
        }
        self.members.push(Rc::clone(subscriber));
        true
    }

    fn remove(&mut self, subscriber: &SharedSubscriber) -> bool {
        let before = self.members.len();
        self.members.retain(|member| !Rc::ptr_eq(member, subscriber));
        self.members.len() != before
    }

    fn contains(&self, subscriber: &SharedSubscriber) -> bool {
        self.members
            .iter()
            .any(|member| Rc::ptr_eq(member, subscriber))
    }
}

/// Chunked memory cache for one device session.
#[derive(Default)]
pub struct Cache {
    chunks: BTreeMap<ChunkKey, Chunk>,
    subscribers: BTreeMap<ChunkKey, SubscriberSet>,
    width: UnitWidth,
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subscribers: BTreeMap<_, _> = self
            .subscribers
            .iter()
            .map(|(key, set)| (key, set.members.len()))
            .collect();
        f.debug_struct("Cache")
            .field("chunks", &self.chunks.keys().collect::<Vec<_>>())
            .field("subscribers", &subscribers)
            .field("width", &self.width)
            .finish()
    }
}

impl Cache {
    /// Creates an empty cache whose chunks use `width` addressable units.
    #[must_use]
    pub const fn new(width: UnitWidth) -> Self {
        Self {
            chunks: BTreeMap::new(),
            subscribers: BTreeMap::new(),
            width,
        }
    }

    /// Creates an empty cache from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidBitsPerByte`] when the configured width is
    /// below 8 bits.
    pub fn from_config(config: &CacheConfig) -> Result<Self, CacheError> {
        Ok(Self::new(config.unit_width()?))
    }

    /// Unit width shared by every chunk this cache constructs.
    #[must_use]
    pub const fn unit_width(&self) -> UnitWidth {
        self.width
    }

    /// Number of resident chunks.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns `true` when no chunk has been added.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Returns `true` when a chunk with this identity is resident.
    #[must_use]
    pub fn contains(&self, key: impl Into<ChunkKey>) -> bool {
        self.chunks.contains_key(&key.into())
    }

    /// Returns the resident chunk with this identity.
    #[must_use]
    pub fn get(&self, key: impl Into<ChunkKey>) -> Option<&Chunk> {
        self.chunks.get(&key.into())
    }

    /// Resident chunks in canonical order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> + '_ {
        self.chunks.values()
    }

    /// Number of observers registered for this identity.
    #[must_use]
    pub fn subscriber_count(&self, key: impl Into<ChunkKey>) -> usize {
        self.subscribers
            .get(&key.into())
            .map_or(0, |set| set.members.len())
    }

    /// Registers `chunk` as resident and returns its identity.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ChunkExists`] when a chunk with the same address
    /// and length is already resident, or when its identity already has a
    /// subscriber set. The cache is unchanged in both cases.
    pub fn add(&mut self, chunk: Chunk) -> Result<ChunkKey, CacheError> {
        let key = chunk.key();
        if self.subscribers.contains_key(&key) || self.chunks.contains_key(&key) {
            return Err(CacheError::ChunkExists { key });
        }

        self.chunks.insert(key, chunk);
        self.subscribers.entry(key).or_default();
        tracing::trace!(chunk = %key, resident = self.chunks.len(), "chunk added");
        Ok(key)
    }

    /// Adds `subscriber` to the observers of `key`. Re-subscribing the same
    /// handle is a no-op. The identity does not have to be resident.
    pub fn subscribe(&mut self, subscriber: &SharedSubscriber, key: impl Into<ChunkKey>) {
        let key = key.into();
        let inserted = self.subscribers.entry(key).or_default().insert(subscriber);
        tracing::trace!(chunk = %key, inserted, "subscribe");
    }

    /// Removes `subscriber` from the observers of `key` if present.
    pub fn unsubscribe(&mut self, subscriber: &SharedSubscriber, key: impl Into<ChunkKey>) {
        let key = key.into();
        let removed = self
            .subscribers
            .get_mut(&key)
            .is_some_and(|set| set.remove(subscriber));
        tracing::trace!(chunk = %key, removed, "unsubscribe");
    }

    /// Merges `update` into every overlapping resident chunk, in canonical
    /// order, notifying each merged chunk's observers with its full buffer.
    ///
    /// Returns the number of chunks merged.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::SubscriberFailed`] as soon as an observer fails.
    /// Chunks after the failing one are neither merged nor notified for this
    /// call.
    pub fn update(&mut self, update: &Chunk) -> Result<usize, CacheError> {
        let mut merged = 0;
        for (key, chunk) in &mut self.chunks {
            if !chunk.update(update) {
                continue;
            }
            merged += 1;

            let Some(set) = self.subscribers.get(key) else {
                continue;
            };
            for subscriber in &set.members {
                subscriber
                    .chunk_updated(chunk.bytes())
                    .map_err(|source| CacheError::SubscriberFailed { key: *key, source })?;
            }
        }

        tracing::debug!(update = %update.key(), merged, "cache update dispatched");
        Ok(merged)
    }

    /// Builds a zero-filled chunk sized for `variable`. Does not register it.
    #[must_use]
    pub fn chunk_from_variable(&self, variable: &impl VariableDescriptor) -> Chunk {
        let len = variable.byte_width() * self.width.bytes_per_unit();
        Chunk::with_unit_width(variable.address(), vec![0; len], self.width)
    }

    /// Builds a chunk from an explicit address and buffer using this cache's
    /// unit width. Does not register it.
    #[must_use]
    pub fn new_chunk(&self, address: u64, bytes: impl Into<Box<[u8]>>) -> Chunk {
        Chunk::with_unit_width(address, bytes, self.width)
    }
}
