mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{info, warn};
use sqlx::{
    Row, Sqlite,
    migrate::MigrateDatabase,
    sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow},
};

use crate::error::StoreError;
use crate::models::{Ballot, GeoPoint, VoteRecord};

/// Append-only persistence for votes. Reads return records in insertion order.
#[async_trait]
pub trait VoteStore: Send + Sync {
    /// Persists a validated ballot, stamping it with the current UTC time.
    async fn insert(&self, ballot: &Ballot) -> Result<VoteRecord, StoreError>;

    async fn all_records(&self) -> Result<Vec<VoteRecord>, StoreError>;

    /// Records carrying a location.
    async fn located_records(&self) -> Result<Vec<VoteRecord>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;
}

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(db_url: &str) -> Result<Self, StoreError> {
        let in_memory = db_url.contains(":memory:");

        // Create database if it doesn't exist
        if !in_memory && !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            info!("Creating database at {}", db_url);
            Sqlite::create_database(db_url).await?;
        }

        // An in-memory database lives and dies with its one connection
        let mut options = SqlitePoolOptions::new();
        options = if in_memory {
            options.max_connections(1).idle_timeout(None).max_lifetime(None)
        } else {
            options.max_connections(5)
        };
        let pool = options.connect(db_url).await?;

        Self::init_schema(&pool).await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn init_schema(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS votes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL,
                language TEXT NOT NULL,
                timestamp TEXT,
                lng REAL,
                lat REAL
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Backs the located_records lookup
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_votes_location ON votes (lng, lat);")
            .execute(pool)
            .await?;

        Ok(())
    }

    fn record_from_row(row: &SqliteRow) -> Result<VoteRecord, StoreError> {
        let id = row.try_get::<i64, _>("id").map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let username = row.try_get::<String, _>("username").map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let option = row.try_get::<String, _>("language").map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let timestamp_str: Option<String> = row.try_get("timestamp").unwrap_or(None);
        let lng: Option<f64> = row.try_get("lng").unwrap_or(None);
        let lat: Option<f64> = row.try_get("lat").unwrap_or(None);

        // A bad timestamp only costs this row its place in the timeline
        let timestamp = match timestamp_str.as_deref().map(DateTime::parse_from_rfc3339) {
            Some(Ok(dt)) => Some(dt.with_timezone(&Utc)),
            Some(Err(e)) => {
                warn!("Vote {} has an unparseable timestamp: {}", id, e);
                None
            }
            None => {
                warn!("Vote {} has no timestamp", id);
                None
            }
        };

        let location = match (lng, lat) {
            (Some(lng), Some(lat)) => Some(GeoPoint::new(lng, lat)),
            (None, None) => None,
            _ => {
                warn!("Vote {} has a half-stored location, ignoring it", id);
                None
            }
        };

        Ok(VoteRecord {
            username,
            option,
            timestamp,
            location,
        })
    }
}

#[async_trait]
impl VoteStore for Database {
    async fn insert(&self, ballot: &Ballot) -> Result<VoteRecord, StoreError> {
        let timestamp = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO votes (username, language, timestamp, lng, lat)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&ballot.username)
        .bind(ballot.language.as_str())
        .bind(timestamp.to_rfc3339())
        .bind(ballot.location.map(|p| p.longitude()))
        .bind(ballot.location.map(|p| p.latitude()))
        .execute(&self.pool)
        .await?;

        Ok(VoteRecord {
            username: ballot.username.clone(),
            option: ballot.language.as_str().to_string(),
            timestamp: Some(timestamp),
            location: ballot.location,
        })
    }

    async fn all_records(&self) -> Result<Vec<VoteRecord>, StoreError> {
        sqlx::query(
            r#"
            SELECT id, username, language, timestamp, lng, lat
            FROM votes
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(Self::record_from_row)
        .collect()
    }

    async fn located_records(&self) -> Result<Vec<VoteRecord>, StoreError> {
        sqlx::query(
            r#"
            SELECT id, username, language, timestamp, lng, lat
            FROM votes
            WHERE lng IS NOT NULL AND lat IS NOT NULL
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(Self::record_from_row)
        .collect()
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM votes")
            .fetch_one(&self.pool)
            .await?;
        let total = row.try_get::<i64, _>("total")?;
        Ok(total as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Language;

    async fn memory_db() -> Database {
        Database::new("sqlite::memory:").await.unwrap()
    }

    fn ballot(username: &str, language: Language) -> Ballot {
        Ballot {
            username: username.to_string(),
            language,
            location: None,
        }
    }

    #[tokio::test]
    async fn empty_database_reads_empty() {
        let db = memory_db().await;
        assert!(db.all_records().await.unwrap().is_empty());
        assert!(db.located_records().await.unwrap().is_empty());
        assert_eq!(db.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn records_come_back_in_insertion_order() {
        let db = memory_db().await;
        let before = Utc::now();
        for (name, language) in [("A", Language::C), ("B", Language::Java), ("A", Language::C)] {
            db.insert(&ballot(name, language)).await.unwrap();
        }

        let records = db.all_records().await.unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.username.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "A"]);
        assert_eq!(records[1].option, "Java");
        assert!(records.iter().all(|r| r.timestamp.is_some_and(|ts| ts >= before - chrono::Duration::seconds(1))));
        assert_eq!(db.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn located_records_only_returns_points() {
        let db = memory_db().await;
        db.insert(&ballot("plain", Language::Python)).await.unwrap();
        let mut located = ballot("placed", Language::Python);
        located.location = Some(GeoPoint::new(23.3, 42.7));
        db.insert(&located).await.unwrap();

        let records = db.located_records().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].username, "placed");
        assert_eq!(records[0].location, Some(GeoPoint::new(23.3, 42.7)));
    }

    #[tokio::test]
    async fn bad_timestamps_load_as_missing() {
        let db = memory_db().await;
        sqlx::query("INSERT INTO votes (username, language, timestamp) VALUES ('x', 'C', 'yesterday')")
            .execute(db.pool())
            .await
            .unwrap();
        sqlx::query("INSERT INTO votes (username, language, timestamp) VALUES ('y', 'C', NULL)")
            .execute(db.pool())
            .await
            .unwrap();

        let records = db.all_records().await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.timestamp.is_none()));
    }
}
