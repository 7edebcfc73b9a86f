//! Retired player leaderboard
//!
//! Records are ordered by score (descending), then play time (ascending),
//! then name. The in-memory store keeps entries sorted on insert; durable
//! backends implement `RecordStore` and apply the same ordering.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::consts::MAX_LEADERBOARD_WINDOW;
use crate::error::LeaderboardError;
use crate::sim::RetiredPlayer;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetiredRecord {
    pub name: String,
    pub score: u64,
    /// Total time in game, in milliseconds
    pub play_time_ms: f64,
}

impl From<RetiredPlayer> for RetiredRecord {
    fn from(player: RetiredPlayer) -> Self {
        Self {
            name: player.name,
            score: player.score,
            play_time_ms: player.play_time_ms,
        }
    }
}

impl RetiredRecord {
    /// Leaderboard order: higher score first, then shorter play time, then name
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| self.play_time_ms.total_cmp(&other.play_time_ms))
            .then_with(|| self.name.cmp(&other.name))
    }
}

/// Storage for retired player records
pub trait RecordStore {
    fn save(&mut self, record: RetiredRecord) -> Result<(), LeaderboardError>;

    /// Up to `count` records starting at `offset`, in leaderboard order
    fn query(&self, offset: usize, count: usize) -> Result<Vec<RetiredRecord>, LeaderboardError>;
}

/// Clamp a requested window size to the allowed maximum
pub fn clamp_window(count: usize) -> usize {
    count.min(MAX_LEADERBOARD_WINDOW)
}

/// Sorted in-memory record store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryRecords {
    entries: Vec<RetiredRecord>,
}

impl InMemoryRecords {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn insertion_point(&self, record: &RetiredRecord) -> usize {
        // Equal records keep insertion order
        self.entries
            .iter()
            .position(|e| record.rank_cmp(e) == Ordering::Less)
            .unwrap_or(self.entries.len())
    }
}

impl RecordStore for InMemoryRecords {
    fn save(&mut self, record: RetiredRecord) -> Result<(), LeaderboardError> {
        let pos = self.insertion_point(&record);
        log::debug!(
            "Leaderboard: {} with score {} at rank {}",
            record.name,
            record.score,
            pos + 1
        );
        self.entries.insert(pos, record);
        Ok(())
    }

    fn query(&self, offset: usize, count: usize) -> Result<Vec<RetiredRecord>, LeaderboardError> {
        Ok(self
            .entries
            .iter()
            .skip(offset)
            .take(clamp_window(count))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(name: &str, score: u64, play_time_ms: f64) -> RetiredRecord {
        RetiredRecord {
            name: name.to_string(),
            score,
            play_time_ms,
        }
    }

    #[test]
    fn test_ordering() {
        let mut store = InMemoryRecords::new();
        store.save(record("slow", 10, 5000.0)).unwrap();
        store.save(record("low", 5, 100.0)).unwrap();
        store.save(record("fast", 10, 1000.0)).unwrap();
        store.save(record("best", 20, 9000.0)).unwrap();
        store.save(record("alpha", 10, 1000.0)).unwrap();

        let names: Vec<_> = store
            .query(0, 10)
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["best", "alpha", "fast", "slow", "low"]);
    }

    #[test]
    fn test_window() {
        let mut store = InMemoryRecords::new();
        for i in 0..5 {
            store.save(record(&format!("p{i}"), i, 0.0)).unwrap();
        }
        let page = store.query(1, 2).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].name, "p3");
        assert_eq!(page[1].name, "p2");
        assert!(store.query(10, 5).unwrap().is_empty());
    }

    #[test]
    fn test_window_capped() {
        let mut store = InMemoryRecords::new();
        for i in 0..150 {
            store.save(record("p", i, 0.0)).unwrap();
        }
        assert_eq!(store.query(0, 1000).unwrap().len(), MAX_LEADERBOARD_WINDOW);
    }

    proptest! {
        #[test]
        fn prop_store_is_sorted(entries in proptest::collection::vec((0u64..50, 0u32..10_000, "[a-c]{1,3}"), 0..40)) {
            let mut store = InMemoryRecords::new();
            for (score, time, name) in entries {
                store.save(record(&name, score, time as f64)).unwrap();
            }
            let all = store.query(0, MAX_LEADERBOARD_WINDOW).unwrap();
            for pair in all.windows(2) {
                prop_assert_ne!(pair[0].rank_cmp(&pair[1]), Ordering::Greater);
            }
        }
    }
}
