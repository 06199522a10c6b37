//! Recently searched cities.
//!
//! A bounded, most-recent-first list with case- and accent-insensitive
//! de-duplication, persisted through an injected `KeyValueStore`.

use std::sync::Arc;

use crate::error::DatabaseError;
use crate::names;
use crate::storage::{KeyValueStore, StorageResult};

pub const LAST_CITY_KEY: &str = "citypulse.last_city";
pub const RECENT_CITIES_KEY: &str = "citypulse.recent_cities";

/// Number of cities kept in the recency list.
pub const DEFAULT_CAPACITY: usize = 5;

pub struct RecencyList {
    store: Arc<dyn KeyValueStore>,
    capacity: usize,
}

impl RecencyList {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_capacity(store, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(store: Arc<dyn KeyValueStore>, capacity: usize) -> Self {
        Self {
            store,
            capacity: capacity.max(1),
        }
    }

    /// Record a selected city: it becomes the last city and moves to the
    /// front of the recent list, evicting the oldest entry past capacity.
    ///
    /// Blank names are ignored.
    pub fn record(&self, city: &str) -> StorageResult<Vec<String>> {
        let city = city.trim();
        if city.is_empty() {
            return self.recent();
        }

        let mut recent = self.recent()?;
        recent.retain(|existing| !names::same_city(existing, city));
        recent.insert(0, city.to_string());
        recent.truncate(self.capacity);

        let encoded = serde_json::to_string(&recent)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        self.store.set(RECENT_CITIES_KEY, &encoded)?;
        self.store.set(LAST_CITY_KEY, city)?;

        tracing::debug!("Recorded {} in recent cities ({} kept)", city, recent.len());
        Ok(recent)
    }

    /// Recent cities, most recent first.
    ///
    /// Unreadable stored data is treated as an empty list.
    pub fn recent(&self) -> StorageResult<Vec<String>> {
        let Some(raw) = self.store.get(RECENT_CITIES_KEY)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(mut cities) => {
                cities.truncate(self.capacity);
                Ok(cities)
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable recent cities: {}", e);
                Ok(Vec::new())
            }
        }
    }

    pub fn last_city(&self) -> StorageResult<Option<String>> {
        Ok(self
            .store
            .get(LAST_CITY_KEY)?
            .filter(|city| !city.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn list() -> (Arc<MemoryStore>, RecencyList) {
        let store = Arc::new(MemoryStore::new());
        let recency = RecencyList::new(store.clone());
        (store, recency)
    }

    #[test]
    fn test_most_recent_first() {
        let (_, recency) = list();
        recency.record("Madrid").unwrap();
        recency.record("Sevilla").unwrap();
        recency.record("Bilbao").unwrap();
        assert_eq!(recency.recent().unwrap(), vec!["Bilbao", "Sevilla", "Madrid"]);
        assert_eq!(recency.last_city().unwrap().as_deref(), Some("Bilbao"));
    }

    #[test]
    fn test_bounded_to_capacity() {
        let (_, recency) = list();
        for city in ["A", "B", "C", "D", "E", "F", "G"] {
            recency.record(city).unwrap();
        }
        assert_eq!(recency.recent().unwrap(), vec!["G", "F", "E", "D", "C"]);
    }

    #[test]
    fn test_reselecting_moves_to_front_without_duplicates() {
        let (_, recency) = list();
        recency.record("Madrid").unwrap();
        recency.record("Málaga").unwrap();
        recency.record("Valencia").unwrap();
        recency.record("malaga").unwrap();
        assert_eq!(recency.recent().unwrap(), vec!["malaga", "Valencia", "Madrid"]);
    }

    #[test]
    fn test_blank_city_is_ignored() {
        let (_, recency) = list();
        recency.record("Madrid").unwrap();
        recency.record("   ").unwrap();
        assert_eq!(recency.recent().unwrap(), vec!["Madrid"]);
        assert_eq!(recency.last_city().unwrap().as_deref(), Some("Madrid"));
    }

    #[test]
    fn test_corrupt_data_reads_as_empty() {
        let (store, recency) = list();
        store.set(RECENT_CITIES_KEY, "{not json").unwrap();
        assert!(recency.recent().unwrap().is_empty());

        // Recording repairs the stored value.
        recency.record("Toledo").unwrap();
        assert_eq!(recency.recent().unwrap(), vec!["Toledo"]);
    }

    #[test]
    fn test_persists_through_store() {
        let store = Arc::new(MemoryStore::new());
        RecencyList::new(store.clone()).record("Granada").unwrap();

        let reopened = RecencyList::new(store);
        assert_eq!(reopened.recent().unwrap(), vec!["Granada"]);
        assert_eq!(reopened.last_city().unwrap().as_deref(), Some("Granada"));
    }

    #[test]
    fn test_custom_capacity() {
        let recency = RecencyList::with_capacity(Arc::new(MemoryStore::new()), 2);
        recency.record("A").unwrap();
        recency.record("B").unwrap();
        recency.record("C").unwrap();
        assert_eq!(recency.recent().unwrap(), vec!["C", "B"]);
    }
}
