//! SQLite-backed outcome store

use crate::StoreError;
use glimpse_domain::traits::OutcomeStore;
use glimpse_domain::{ContentType, ExtractedMetadata, ItemId, Outcome, OutcomeStatus};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashSet;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

const OUTCOME_COLUMNS: &str =
    "item_id, status, content_type, metadata, message, external_link, retryable, recorded_at";

/// SQLite-based implementation of OutcomeStore
///
/// Use `:memory:` for an in-memory database (useful for testing).
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. The orchestrator keeps the store
/// behind a mutex.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the store at `path`
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use glimpse_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("glimpse.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open a private in-memory store
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::new(":memory:")
    }

    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    fn row_to_outcome(row: &Row<'_>) -> rusqlite::Result<Outcome> {
        let status: String = row.get(1)?;
        let status = OutcomeStatus::parse(&status).ok_or_else(|| {
            conversion_error(1, StoreError::InvalidData(format!("unknown status '{}'", status)))
        })?;

        let content_type: String = row.get(2)?;
        let content_type = ContentType::parse(&content_type).ok_or_else(|| {
            conversion_error(
                2,
                StoreError::InvalidData(format!("unknown content type '{}'", content_type)),
            )
        })?;

        let metadata: Option<String> = row.get(3)?;
        let metadata = metadata
            .map(|json| serde_json::from_str::<ExtractedMetadata>(&json))
            .transpose()
            .map_err(|e| conversion_error(3, StoreError::from(e)))?;

        Ok(Outcome {
            item_id: ItemId::new(row.get::<_, String>(0)?),
            status,
            content_type,
            metadata,
            message: row.get(4)?,
            external_link: row.get(5)?,
            retryable: row.get(6)?,
            recorded_at: row.get::<_, i64>(7)? as u64,
        })
    }
}

fn conversion_error(column: usize, e: StoreError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn insert_processed(conn: &Connection, id: &ItemId) -> Result<(), StoreError> {
    conn.execute(
        "INSERT OR IGNORE INTO processed_items (item_id, processed_at) VALUES (?1, ?2)",
        params![id.as_str(), now_secs()],
    )?;
    Ok(())
}

fn write_outcome(conn: &Connection, outcome: &Outcome) -> Result<(), StoreError> {
    let metadata = outcome
        .metadata
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    // ON CONFLICT keeps the row, and with it the original seq
    conn.execute(
        "INSERT INTO outcomes (item_id, status, content_type, metadata, message, external_link, retryable, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(item_id) DO UPDATE SET
            status = excluded.status,
            content_type = excluded.content_type,
            metadata = excluded.metadata,
            message = excluded.message,
            external_link = excluded.external_link,
            retryable = excluded.retryable,
            recorded_at = excluded.recorded_at",
        params![
            outcome.item_id.as_str(),
            outcome.status.as_str(),
            outcome.content_type.as_str(),
            metadata,
            &outcome.message,
            &outcome.external_link,
            outcome.retryable,
            outcome.recorded_at as i64,
        ],
    )?;
    Ok(())
}

impl OutcomeStore for SqliteStore {
    type Error = StoreError;

    fn processed_ids(&self) -> Result<HashSet<ItemId>, Self::Error> {
        let mut stmt = self.conn.prepare("SELECT item_id FROM processed_items")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .map(|id| id.map(ItemId::new))
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(ids)
    }

    fn outcomes(&self) -> Result<Vec<Outcome>, Self::Error> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM outcomes ORDER BY seq", OUTCOME_COLUMNS))?;
        let outcomes = stmt
            .query_map([], Self::row_to_outcome)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(outcomes)
    }

    fn outcome_count(&self) -> Result<usize, Self::Error> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM outcomes", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn get_outcome(&self, id: &ItemId) -> Result<Option<Outcome>, Self::Error> {
        let outcome = self
            .conn
            .query_row(
                &format!("SELECT {} FROM outcomes WHERE item_id = ?1", OUTCOME_COLUMNS),
                params![id.as_str()],
                Self::row_to_outcome,
            )
            .optional()?;
        Ok(outcome)
    }

    fn mark_processed(&mut self, id: &ItemId) -> Result<(), Self::Error> {
        insert_processed(&self.conn, id)
    }

    fn upsert_outcome(&mut self, outcome: &Outcome) -> Result<(), Self::Error> {
        write_outcome(&self.conn, outcome)
    }

    fn record(&mut self, outcome: &Outcome) -> Result<(), Self::Error> {
        let tx = self.conn.transaction()?;
        write_outcome(&tx, outcome)?;
        insert_processed(&tx, &outcome.item_id)?;
        tx.commit()?;
        Ok(())
    }

    fn remove_items(&mut self, ids: &[ItemId]) -> Result<usize, Self::Error> {
        let tx = self.conn.transaction()?;
        let mut removed = 0;
        {
            let mut remove_index = tx.prepare("DELETE FROM processed_items WHERE item_id = ?1")?;
            let mut remove_outcome = tx.prepare("DELETE FROM outcomes WHERE item_id = ?1")?;
            for id in ids {
                removed += remove_index.execute(params![id.as_str()])?;
                remove_outcome.execute(params![id.as_str()])?;
            }
        }
        tx.commit()?;
        debug!("Removed {} of {} ids from the processed index", removed, ids.len());
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(id: &str, status: OutcomeStatus) -> Outcome {
        match status {
            OutcomeStatus::Success => Outcome::success(id.into(), ContentType::Meme, None, None),
            OutcomeStatus::Flagged => Outcome::flagged(id.into(), ContentType::Unknown, "unsure", true),
            OutcomeStatus::Failed => Outcome::failed(id.into(), ContentType::Unknown, "broken", false),
        }
    }

    #[test]
    fn test_store_initialization() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.processed_ids().unwrap().is_empty());
        assert_eq!(store.outcome_count().unwrap(), 0);
    }

    #[test]
    fn test_mark_processed_is_idempotent() {
        let mut store = SqliteStore::in_memory().unwrap();
        let id = ItemId::new("a");
        store.mark_processed(&id).unwrap();
        store.mark_processed(&id).unwrap();
        assert_eq!(store.processed_ids().unwrap().len(), 1);
    }

    #[test]
    fn test_outcome_with_metadata() {
        let mut store = SqliteStore::in_memory().unwrap();
        let metadata = ExtractedMetadata::new("Heat", "Michael Mann", 0.9, vec!["Heat".into()])
            .with_field("year", "1995");
        let original = Outcome::success(
            "m1".into(),
            ContentType::Movie,
            Some(metadata),
            Some("https://example.org/heat".into()),
        );

        store.upsert_outcome(&original).unwrap();
        let loaded = store.get_outcome(&ItemId::new("m1")).unwrap().unwrap();
        assert_eq!(loaded, original);
        assert!(store.get_outcome(&ItemId::new("missing")).unwrap().is_none());
    }

    #[test]
    fn test_upsert_keeps_position() {
        let mut store = SqliteStore::in_memory().unwrap();
        store.upsert_outcome(&outcome("a", OutcomeStatus::Flagged)).unwrap();
        store.upsert_outcome(&outcome("b", OutcomeStatus::Failed)).unwrap();
        store.upsert_outcome(&outcome("a", OutcomeStatus::Success)).unwrap();

        let outcomes = store.outcomes().unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].item_id.as_str(), "a");
        assert_eq!(outcomes[0].status, OutcomeStatus::Success);
        assert_eq!(outcomes[1].item_id.as_str(), "b");
    }

    #[test]
    fn test_remove_items() {
        let mut store = SqliteStore::in_memory().unwrap();
        for id in ["a", "b", "c"] {
            store.mark_processed(&ItemId::new(id)).unwrap();
            store.upsert_outcome(&outcome(id, OutcomeStatus::Failed)).unwrap();
        }

        let removed = store
            .remove_items(&[ItemId::new("a"), ItemId::new("c"), ItemId::new("zzz")])
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.processed_ids().unwrap(), HashSet::from([ItemId::new("b")]));
        assert_eq!(store.outcome_count().unwrap(), 1);
    }

    #[test]
    fn test_record_writes_outcome_and_index() {
        let mut store = SqliteStore::in_memory().unwrap();
        store.record(&outcome("a", OutcomeStatus::Flagged)).unwrap();
        store.record(&outcome("b", OutcomeStatus::Failed)).unwrap();
        store.record(&outcome("a", OutcomeStatus::Success)).unwrap();

        assert_eq!(
            store.processed_ids().unwrap(),
            HashSet::from([ItemId::new("a"), ItemId::new("b")])
        );
        let outcomes = store.outcomes().unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].item_id.as_str(), "a");
        assert_eq!(outcomes[0].status, OutcomeStatus::Success);
    }

    #[test]
    fn test_record_rolls_back_when_index_write_fails() {
        let mut store = SqliteStore::in_memory().unwrap();
        store
            .conn
            .execute_batch(
                "CREATE TRIGGER reject_index BEFORE INSERT ON processed_items
                 WHEN NEW.item_id = 'bad'
                 BEGIN SELECT RAISE(ABORT, 'index rejected'); END;",
            )
            .unwrap();

        assert!(store.record(&outcome("bad", OutcomeStatus::Failed)).is_err());
        assert!(store.get_outcome(&ItemId::new("bad")).unwrap().is_none());
        assert!(store.processed_ids().unwrap().is_empty());

        store.record(&outcome("good", OutcomeStatus::Failed)).unwrap();
        assert_eq!(store.outcome_count().unwrap(), 1);
    }
}
