use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::VoteStore;
use crate::error::StoreError;
use crate::models::{Ballot, VoteRecord};

/// Process-local store. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<VoteRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with existing records, kept in the given order.
    pub fn with_records(records: Vec<VoteRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl VoteStore for MemoryStore {
    async fn insert(&self, ballot: &Ballot) -> Result<VoteRecord, StoreError> {
        let record = VoteRecord {
            username: ballot.username.clone(),
            option: ballot.language.as_str().to_string(),
            timestamp: Some(Utc::now()),
            location: ballot.location,
        };
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn all_records(&self) -> Result<Vec<VoteRecord>, StoreError> {
        Ok(self.records.read().await.clone())
    }

    async fn located_records(&self) -> Result<Vec<VoteRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|record| record.location.is_some())
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeoPoint, Language};

    #[tokio::test]
    async fn insert_then_read_back() {
        let store = MemoryStore::new();
        let ballot = Ballot {
            username: "ana".to_string(),
            language: Language::Java,
            location: Some(GeoPoint::new(23.3, 42.7)),
        };

        let stored = store.insert(&ballot).await.unwrap();
        assert_eq!(stored.option, "Java");
        assert!(stored.timestamp.is_some());

        assert_eq!(store.all_records().await.unwrap(), vec![stored.clone()]);
        assert_eq!(store.located_records().await.unwrap(), vec![stored]);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn seeded_records_keep_their_order() {
        let now = Utc::now();
        let seeded = vec![
            VoteRecord::new("b", "C", now),
            VoteRecord::new("a", "C", now),
        ];
        let store = MemoryStore::with_records(seeded.clone());
        assert_eq!(store.all_records().await.unwrap(), seeded);
        assert!(store.located_records().await.unwrap().is_empty());
    }
}
