//! Leaderboard load/save flow
//!
//! Ties the [`LeaderboardTable`] to a [`ChunkedStore`]. The table is
//! fetched lazily on first use and written back whenever a run makes it in.
//! Read-modify-write is only serialized through `&mut self`; two clients
//! saving at once can still overwrite each other's entries.

use thiserror::Error;

use crate::highscores::{LeaderboardTable, ParseError, ValidationError, validate_player_name};
use crate::persistence::{ChunkedStore, KvBackend, Progress, StoreError};

/// Logical key the table is stored under
pub const DEFAULT_KEY: &str = "lb";

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("stored leaderboard is malformed: {0}")]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of submitting a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Entered the table at this rank (1-indexed) and was persisted
    Saved { rank: usize },
    /// Table is full and the score did not beat the lowest entry
    NotHighEnough,
}

/// Handle owning the table and its backing store
#[derive(Debug)]
pub struct Leaderboard<B> {
    store: ChunkedStore<B>,
    key: String,
    table: LeaderboardTable,
    fetched: bool,
}

impl<B: KvBackend> Leaderboard<B> {
    pub fn new(store: ChunkedStore<B>) -> Self {
        Self::with_key(store, DEFAULT_KEY)
    }

    pub fn with_key(store: ChunkedStore<B>, key: &str) -> Self {
        Self {
            store,
            key: key.to_string(),
            table: LeaderboardTable::new(),
            fetched: false,
        }
    }

    pub fn table(&self) -> &LeaderboardTable {
        &self.table
    }

    pub fn store(&self) -> &ChunkedStore<B> {
        &self.store
    }

    pub fn is_fetched(&self) -> bool {
        self.fetched
    }

    /// Reload the table. Nothing stored yet means an empty table; corrupt
    /// data is an error and leaves the current table in place.
    pub async fn fetch(&mut self) -> Result<&LeaderboardTable, LeaderboardError> {
        let key = self.key.clone();
        let loaded = self
            .store
            .get_with_progress::<String, _>(&key, |p: Progress| {
                log::debug!("Loading leaderboard {}/{}", p.completed, p.total);
            })
            .await;

        match loaded {
            Ok(data) => self.table.deserialize(&data)?,
            Err(StoreError::NotFound(_)) => {
                log::info!("No leaderboard stored under `{}`, starting fresh", key);
                self.table = LeaderboardTable::new();
            }
            Err(e) => return Err(e.into()),
        }

        self.fetched = true;
        log::info!("Loaded {} leaderboard entries", self.table.len());
        Ok(&self.table)
    }

    /// Submit a finished run; persists the table if the run made it in
    pub async fn save_score(
        &mut self,
        name: &str,
        score: u64,
        note: &str,
    ) -> Result<SaveOutcome, LeaderboardError> {
        validate_player_name(name)?;

        if !self.fetched {
            self.fetch().await?;
        }

        let rank = self.table.potential_rank(score);
        let previous = self.table.clone();
        if !self.table.add(name, score, note)? {
            log::info!("Score {} not high enough for the leaderboard", score);
            return Ok(SaveOutcome::NotHighEnough);
        }

        // A failed write leaves the table as it was so a retry adds once
        let data = self.table.serialize();
        let saved = self
            .store
            .set_with_progress(&self.key, &data, |p| {
                log::debug!("Saving leaderboard {}/{}", p.completed, p.total);
            })
            .await;
        if let Err(e) = saved {
            log::warn!("Saving leaderboard failed: {}", e);
            self.table = previous;
            return Err(e.into());
        }

        let rank = rank.unwrap_or(self.table.len());
        log::info!("Saved score {} for `{}` at rank {}", score, name, rank);
        Ok(SaveOutcome::Saved { rank })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{BackendError, KvBackend, MemoryBackend};
    use futures::executor::block_on;
    use std::cell::Cell;

    /// Rejects the first write to one key, then behaves
    struct FlakyBackend {
        inner: MemoryBackend,
        fail_key: &'static str,
        failed: Cell<bool>,
    }

    impl KvBackend for FlakyBackend {
        fn value_limit(&self) -> usize {
            self.inner.value_limit()
        }

        async fn raw_get(&self, key: &str) -> Result<Option<String>, BackendError> {
            self.inner.raw_get(key).await
        }

        async fn raw_set(&self, key: &str, value: &str) -> Result<(), BackendError> {
            if key == self.fail_key && !self.failed.replace(true) {
                return Err(BackendError::Status {
                    key: key.to_string(),
                    status: 503,
                });
            }
            self.inner.raw_set(key, value).await
        }
    }

    fn board() -> Leaderboard<MemoryBackend> {
        Leaderboard::new(ChunkedStore::new(MemoryBackend::new()))
    }

    #[test]
    fn test_fetch_empty_store() {
        let mut lb = board();
        let table = block_on(lb.fetch()).unwrap();
        assert!(table.is_empty());
        assert!(lb.is_fetched());
    }

    #[test]
    fn test_save_persists_and_ranks() {
        let mut lb = board();
        let outcome = block_on(lb.save_score("aa", 100, "5.00s")).unwrap();
        assert_eq!(outcome, SaveOutcome::Saved { rank: 1 });

        let outcome = block_on(lb.save_score("bb", 50, "3.00s")).unwrap();
        assert_eq!(outcome, SaveOutcome::Saved { rank: 2 });

        let stored: String = block_on(lb.store().get(DEFAULT_KEY)).unwrap();
        assert_eq!(stored, "aa|2s|5.00s,bb|1e|3.00s");
    }

    #[test]
    fn test_rejected_score_is_not_written() {
        let mut lb = board();
        for i in 1..=10u64 {
            block_on(lb.save_score(&format!("p{i}"), i * 10, "1.00s")).unwrap();
        }
        let before = lb.store().backend().peek("lb_0");

        let outcome = block_on(lb.save_score("low", 10, "1.00s")).unwrap();
        assert_eq!(outcome, SaveOutcome::NotHighEnough);
        assert_eq!(lb.store().backend().peek("lb_0"), before);
    }

    #[test]
    fn test_invalid_name_never_reaches_storage() {
        let mut lb = board();
        let err = block_on(lb.save_score("Bad Name", 10, "1.00s")).unwrap_err();
        assert!(matches!(err, LeaderboardError::Validation(_)));
        assert!(lb.store().backend().keys().is_empty());
        assert!(!lb.is_fetched());
    }

    #[test]
    fn test_retry_after_failed_write_adds_once() {
        let mut lb = Leaderboard::new(ChunkedStore::new(FlakyBackend {
            inner: MemoryBackend::new(),
            fail_key: "lb_0",
            failed: Cell::new(false),
        }));

        let err = block_on(lb.save_score("aa", 100, "5.00s")).unwrap_err();
        assert!(matches!(
            err,
            LeaderboardError::Store(StoreError::Backend(BackendError::Status { status: 503, .. }))
        ));
        assert!(lb.table().is_empty());

        let outcome = block_on(lb.save_score("aa", 100, "5.00s")).unwrap();
        assert_eq!(outcome, SaveOutcome::Saved { rank: 1 });
        assert_eq!(lb.table().len(), 1);

        let stored: String = block_on(lb.store().get(DEFAULT_KEY)).unwrap();
        assert_eq!(stored, "aa|2s|5.00s");
    }

    #[test]
    fn test_corrupt_store_fails_loudly() {
        let backend = MemoryBackend::new();
        block_on(backend.raw_set("lb_l", "2")).unwrap();
        block_on(backend.raw_set("lb_0", "JTIy")).unwrap();
        let mut lb = Leaderboard::new(ChunkedStore::new(backend));

        let err = block_on(lb.save_score("aa", 10, "1.00s")).unwrap_err();
        assert!(matches!(err, LeaderboardError::Store(StoreError::Corrupt { .. })));
        assert!(lb.table().is_empty());
        // Nothing was overwritten
        assert_eq!(lb.store().backend().peek("lb_l").as_deref(), Some("2"));
    }

    #[test]
    fn test_malformed_table_is_parse_error() {
        let store = ChunkedStore::new(MemoryBackend::new());
        block_on(store.set(DEFAULT_KEY, "no-fields-here")).unwrap();
        let mut lb = Leaderboard::new(store);
        let err = block_on(lb.fetch()).unwrap_err();
        assert!(matches!(err, LeaderboardError::Parse(_)));
        assert!(!lb.is_fetched());
    }
}
