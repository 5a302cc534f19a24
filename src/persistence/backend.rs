//! Key-value backend seam
//!
//! The remote service only offers single-key get and set with a small cap
//! on value length. Anything that can do that can back a [`ChunkedStore`].
//!
//! [`ChunkedStore`]: super::ChunkedStore

use std::cell::RefCell;
use std::collections::HashMap;

use thiserror::Error;

/// Value cap of the public key-value service
pub const DEFAULT_VALUE_LIMIT: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected status {status} for `{key}`")]
    Status { key: String, status: u16 },
    #[error("value for `{key}` is {len} chars, limit is {limit}")]
    ValueTooLong { key: String, len: usize, limit: usize },
}

/// Minimal async get/set store
///
/// Futures are not required to be `Send`; browser fetch futures are not.
#[allow(async_fn_in_trait)]
pub trait KvBackend {
    /// Longest value accepted for a single key
    fn value_limit(&self) -> usize;

    /// `Ok(None)` when the key has never been written
    async fn raw_get(&self, key: &str) -> Result<Option<String>, BackendError>;

    async fn raw_set(&self, key: &str, value: &str) -> Result<(), BackendError>;
}

/// In-process backend with the same length cap as the real service
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    values: RefCell<HashMap<String, String>>,
    limit: usize,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_VALUE_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            values: RefCell::new(HashMap::new()),
            limit,
        }
    }

    /// Current value of a key, bypassing the async interface
    pub fn peek(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    /// Sorted list of stored keys
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.values.borrow().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.values.borrow_mut().remove(key)
    }
}

impl KvBackend for MemoryBackend {
    fn value_limit(&self) -> usize {
        self.limit
    }

    async fn raw_get(&self, key: &str) -> Result<Option<String>, BackendError> {
        Ok(self.peek(key))
    }

    async fn raw_set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        let len = value.chars().count();
        if len > self.limit {
            return Err(BackendError::ValueTooLong {
                key: key.to_string(),
                len,
                limit: self.limit,
            });
        }
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
