//! Chunked storage on a size-limited backend
//!
//! A logical key `K` is stored as:
//! - `K_l`: decimal chunk count, written first
//! - `K_0 .. K_{n-1}`: encoded payload chunks
//!
//! Trailing chunks left over from a longer previous value are not deleted;
//! the count record makes them unreachable. No locking happens here:
//! overlapping writers to one key race chunk by chunk.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::backend::{BackendError, KvBackend};
use super::codec::{self, DecodeError, EncodeError, join_chunks, split_into_chunks};

/// Chunk length leaving headroom under the 60 char service cap
pub const DEFAULT_CHUNK_LEN: usize = 50;
/// Concurrent chunk requests per operation
pub const DEFAULT_MAX_IN_FLIGHT: usize = 8;
/// Longest encoded value a store reads or writes
pub const MAX_ENCODED_LEN: usize = 64 * 1024;
pub const DEFAULT_MAX_CHUNKS: usize = MAX_ENCODED_LEN.div_ceil(DEFAULT_CHUNK_LEN);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    pub chunk_len: usize,
    pub max_in_flight: usize,
    /// Larger stored counts are treated as corrupt
    pub max_chunks: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            chunk_len: DEFAULT_CHUNK_LEN,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            max_chunks: DEFAULT_MAX_CHUNKS,
        }
    }
}

/// Advisory transfer progress, reported once per finished chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("nothing stored under `{0}`")]
    NotFound(String),
    #[error("stored value `{key}` is corrupt: {reason}")]
    Corrupt {
        key: String,
        #[source]
        reason: Corruption,
    },
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error("chunk length {chunk_len} does not fit the backend limit of {limit}")]
    InvalidChunkLen { chunk_len: usize, limit: usize },
    #[error("value for `{key}` needs {chunks} chunks, at most {max} allowed")]
    TooLarge { key: String, chunks: usize, max: usize },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

#[derive(Debug, Error)]
pub enum Corruption {
    #[error("chunk count `{0}` is not a number within the chunk limit")]
    BadCount(String),
    #[error("chunk {0} is missing")]
    MissingChunk(usize),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

fn count_key(key: &str) -> String {
    format!("{key}_l")
}

fn chunk_key(key: &str, index: usize) -> String {
    format!("{key}_{index}")
}

fn corrupt(key: &str, reason: Corruption) -> StoreError {
    StoreError::Corrupt {
        key: key.to_string(),
        reason,
    }
}

/// Stores arbitrary serializable values across many small backend values
#[derive(Debug)]
pub struct ChunkedStore<B> {
    backend: B,
    config: StoreConfig,
}

impl<B: KvBackend> ChunkedStore<B> {
    /// Default config, chunk length shrunk if the backend cap is smaller
    pub fn new(backend: B) -> Self {
        let chunk_len = DEFAULT_CHUNK_LEN.min(backend.value_limit()).max(1);
        Self {
            backend,
            config: StoreConfig {
                chunk_len,
                max_chunks: MAX_ENCODED_LEN.div_ceil(chunk_len),
                ..StoreConfig::default()
            },
        }
    }

    pub fn with_config(backend: B, config: StoreConfig) -> Result<Self, StoreError> {
        let limit = backend.value_limit();
        if config.chunk_len == 0 || config.chunk_len > limit {
            return Err(StoreError::InvalidChunkLen {
                chunk_len: config.chunk_len,
                limit,
            });
        }
        Ok(Self {
            backend,
            config: StoreConfig {
                max_in_flight: config.max_in_flight.max(1),
                max_chunks: config.max_chunks.max(1),
                ..config
            },
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> StoreConfig {
        self.config
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, StoreError> {
        self.get_with_progress(key, |_| {}).await
    }

    /// Read the count record, fetch every chunk, reassemble by index, decode
    pub async fn get_with_progress<T, F>(&self, key: &str, mut on_progress: F) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
        F: FnMut(Progress),
    {
        let raw_count = self
            .backend
            .raw_get(&count_key(key))
            .await?
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        let total = raw_count
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|&n| n <= self.config.max_chunks)
            .ok_or_else(|| corrupt(key, Corruption::BadCount(raw_count.clone())))?;

        let backend = &self.backend;
        let mut reads = stream::iter(0..total)
            .map(move |index| {
                let chunk_key = chunk_key(key, index);
                async move { (index, backend.raw_get(&chunk_key).await) }
            })
            .buffer_unordered(self.config.max_in_flight);

        // Completion order is arbitrary; slot each chunk by its index
        let mut chunks: Vec<Option<String>> = vec![None; total];
        let mut completed = 0;
        while let Some((index, result)) = reads.next().await {
            chunks[index] = result?;
            completed += 1;
            log::debug!("Loaded chunk {} of `{}` ({}/{})", index, key, completed, total);
            on_progress(Progress { completed, total });
        }

        let chunks = chunks
            .into_iter()
            .enumerate()
            .map(|(index, chunk)| chunk.ok_or_else(|| corrupt(key, Corruption::MissingChunk(index))))
            .collect::<Result<Vec<_>, _>>()?;

        codec::decode(&join_chunks(chunks)).map_err(|e| corrupt(key, e.into()))
    }

    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        self.set_with_progress(key, value, |_| {}).await
    }

    /// Write the count record, then every chunk; succeeds only once all
    /// chunk writes have succeeded
    pub async fn set_with_progress<T, F>(
        &self,
        key: &str,
        value: &T,
        mut on_progress: F,
    ) -> Result<(), StoreError>
    where
        T: Serialize + ?Sized,
        F: FnMut(Progress),
    {
        let encoded = codec::encode(value)?;
        let chunks = split_into_chunks(&encoded, self.config.chunk_len);
        let total = chunks.len();
        if total > self.config.max_chunks {
            return Err(StoreError::TooLarge {
                key: key.to_string(),
                chunks: total,
                max: self.config.max_chunks,
            });
        }
        log::debug!("Saving `{}` in {} chunks", key, total);

        self.backend
            .raw_set(&count_key(key), &total.to_string())
            .await?;

        let backend = &self.backend;
        let mut writes = stream::iter(chunks.into_iter().enumerate())
            .map(move |(index, chunk)| {
                let chunk_key = chunk_key(key, index);
                async move { backend.raw_set(&chunk_key, chunk).await }
            })
            .buffer_unordered(self.config.max_in_flight);

        let mut completed = 0;
        while let Some(result) = writes.next().await {
            if let Err(e) = result {
                log::warn!("Chunk write for `{}` failed: {}", key, e);
                return Err(e.into());
            }
            completed += 1;
            on_progress(Progress { completed, total });
        }

        log::info!("Saved `{}` ({} chunks)", key, total);
        Ok(())
    }
}
