//! Append-only store for consulting requests. The diagnostic pipeline never
//! reads from it.

pub mod types;

use std::path::Path;
use std::sync::Arc;

use chrono::Local;
use rusqlite::{Connection, params};
use tokio::sync::Mutex;
use tracing::info;

use crate::core::error::{GeoError, GeoResult};
pub use types::{InquiryRecord, NewInquiry};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone)]
pub struct InquiryStore {
    db: Arc<Mutex<Connection>>,
}

impl InquiryStore {
    pub fn open<P: AsRef<Path>>(path: P) -> GeoResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                GeoError::PersistenceFailure(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }
        let db = Connection::open(path)?;
        info!("Inquiry store at {}", path.display());
        Self::init(db)
    }

    pub fn open_in_memory() -> GeoResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(db: Connection) -> GeoResult<Self> {
        db.execute(
            "CREATE TABLE IF NOT EXISTS inquiries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT,
                brand TEXT,
                keyword TEXT,
                name TEXT,
                contact TEXT,
                message TEXT
            )",
            [],
        )?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }

    /// Append a request and return its row id. Name and contact are required.
    pub async fn save(&self, inquiry: &NewInquiry) -> GeoResult<i64> {
        let name = inquiry.name.trim();
        let contact = inquiry.contact.trim();
        if name.is_empty() || contact.is_empty() {
            return Err(GeoError::InvalidInput(
                "name and contact are required".into(),
            ));
        }

        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO inquiries (timestamp, brand, keyword, name, contact, message)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                timestamp,
                inquiry.brand.trim(),
                inquiry.keyword.trim(),
                name,
                contact,
                inquiry.message.trim()
            ],
        )?;
        let id = db.last_insert_rowid();
        info!("Stored inquiry #{} for [{}]", id, inquiry.brand.trim());
        Ok(id)
    }

    /// Newest first.
    pub async fn recent(&self, limit: usize) -> GeoResult<Vec<InquiryRecord>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT id, timestamp, brand, keyword, name, contact, message
             FROM inquiries ORDER BY id DESC LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(InquiryRecord {
                id: row.get(0)?,
                timestamp: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                brand: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                keyword: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                name: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                contact: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                message: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inquiry(name: &str, contact: &str) -> NewInquiry {
        NewInquiry {
            brand: "Toss".into(),
            keyword: "간편 송금".into(),
            name: name.into(),
            contact: contact.into(),
            message: "상담 요청합니다".into(),
        }
    }

    #[tokio::test]
    async fn save_returns_increasing_ids_and_recent_is_newest_first() {
        let store = InquiryStore::open_in_memory().unwrap();
        let first = store.save(&inquiry("김철수", "010-1234-5678")).await.unwrap();
        let second = store.save(&inquiry("이영희", "lee@example.com")).await.unwrap();
        assert!(second > first);

        let records = store.recent(10).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "이영희");
        assert_eq!(records[1].contact, "010-1234-5678");
        assert_eq!(records[1].brand, "Toss");
    }

    #[tokio::test]
    async fn name_and_contact_are_required() {
        let store = InquiryStore::open_in_memory().unwrap();
        for bad in [inquiry("", "010"), inquiry("김철수", "   ")] {
            assert!(matches!(
                store.save(&bad).await,
                Err(GeoError::InvalidInput(_))
            ));
        }
        assert!(store.recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn timestamp_uses_fixed_format() {
        let store = InquiryStore::open_in_memory().unwrap();
        store.save(&inquiry("김철수", "010")).await.unwrap();
        let record = &store.recent(1).await.unwrap()[0];
        assert!(
            chrono::NaiveDateTime::parse_from_str(&record.timestamp, TIMESTAMP_FORMAT).is_ok(),
            "{}",
            record.timestamp
        );
    }

    #[tokio::test]
    async fn recent_respects_limit() {
        let store = InquiryStore::open_in_memory().unwrap();
        for i in 0..5 {
            store
                .save(&inquiry(&format!("user{i}"), "010"))
                .await
                .unwrap();
        }
        let records = store.recent(2).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "user4");
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("inquiries.db");
        {
            let store = InquiryStore::open(&path).unwrap();
            store.save(&inquiry("김철수", "010")).await.unwrap();
        }
        let reopened = InquiryStore::open(&path).unwrap();
        let records = reopened.recent(10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "상담 요청합니다");
    }
}
