//! Persistence on a size-limited key-value service
//!
//! Features:
//! - Reversible JSON → URI escape → base64 encoding
//! - Values split across indexed keys plus a chunk-count record
//! - Bounded concurrent chunk reads and writes, reassembled by index

pub mod backend;
pub mod chunked;
pub mod codec;

pub use backend::{BackendError, DEFAULT_VALUE_LIMIT, KvBackend, MemoryBackend};
pub use chunked::{ChunkedStore, Corruption, Progress, StoreConfig, StoreError};
pub use codec::{DecodeError, EncodeError, decode, encode, join_chunks, split_into_chunks};
