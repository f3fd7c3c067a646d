//! libSQL backend — async `ProfileStore` implementation.
//!
//! Supports local file and in-memory databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};

use crate::error::DatabaseError;
use crate::onboarding::model::{Category, ProfileCompletion, ProfileRecord};
use crate::store::migrations;
use crate::store::traits::ProfileStore;

const PROFILE_COLUMNS: &str = "id, category, stage, tags, bio, wants_type_a, wants_type_b, \
     picture_url, has_onboarded, verified, updated_at";

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_database(db).await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;
        Self::from_database(db).await
    }

    async fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;
        migrations::run_migrations(&conn).await?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

/// Map a libsql Row (in `PROFILE_COLUMNS` order) to a ProfileRecord.
fn row_to_profile(row: &libsql::Row) -> Result<ProfileRecord, DatabaseError> {
    let read = |e: libsql::Error| DatabaseError::Query(format!("row_to_profile: {e}"));

    let category_str: String = row.get(1).map_err(read)?;
    let category: Category = category_str
        .parse()
        .map_err(DatabaseError::Serialization)?;
    let stage: i64 = row.get(2).map_err(read)?;
    let tags_str: String = row.get(3).map_err(read)?;
    let tags: Vec<String> = serde_json::from_str(&tags_str)
        .map_err(|e| DatabaseError::Serialization(e.to_string()))?;
    let updated_str: String = row.get(10).map_err(read)?;

    Ok(ProfileRecord {
        id: row.get(0).map_err(read)?,
        category,
        stage: u8::try_from(stage)
            .map_err(|_| DatabaseError::Serialization(format!("stage out of range: {stage}")))?,
        tags,
        bio: row.get(4).map_err(read)?,
        wants_type_a: row.get::<i64>(5).map_err(read)? != 0,
        wants_type_b: row.get::<i64>(6).map_err(read)? != 0,
        picture_url: row.get(7).map_err(read)?,
        has_onboarded: row.get::<i64>(8).map_err(read)? != 0,
        verified: row.get::<i64>(9).map_err(read)? != 0,
        updated_at: parse_datetime(&updated_str),
    })
}

#[async_trait]
impl ProfileStore for LibSqlBackend {
    async fn get_completion(
        &self,
        user_id: &str,
    ) -> Result<Option<ProfileCompletion>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT has_onboarded FROM profiles WHERE id = ?1",
                params![user_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_completion: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let flag: i64 = row
                    .get(0)
                    .map_err(|e| DatabaseError::Query(format!("get_completion: {e}")))?;
                Ok(Some(ProfileCompletion {
                    has_onboarded: flag != 0,
                }))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_completion: {e}"))),
        }
    }

    async fn upsert_profile(&self, record: &ProfileRecord) -> Result<(), DatabaseError> {
        let tags_json = serde_json::to_string(&record.tags)
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?;

        self.conn()
            .execute(
                "INSERT INTO profiles (id, category, stage, tags, bio, wants_type_a, wants_type_b,
                     picture_url, has_onboarded, verified, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                 ON CONFLICT (id) DO UPDATE SET
                     category = ?2, stage = ?3, tags = ?4, bio = ?5, wants_type_a = ?6,
                     wants_type_b = ?7, picture_url = ?8, has_onboarded = ?9, verified = ?10,
                     updated_at = ?11",
                params![
                    record.id.as_str(),
                    record.category.as_str(),
                    i64::from(record.stage),
                    tags_json,
                    record.bio.as_str(),
                    i64::from(record.wants_type_a),
                    i64::from(record.wants_type_b),
                    record.picture_url.as_str(),
                    i64::from(record.has_onboarded),
                    i64::from(record.verified),
                    record.updated_at.to_rfc3339()
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("upsert_profile: {e}")))?;

        debug!(user_id = %record.id, "Profile upserted");
        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<ProfileRecord>, DatabaseError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?1");
        let mut rows = self
            .conn()
            .query(&sql, params![user_id])
            .await
            .map_err(|e| DatabaseError::Query(format!("get_profile: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_profile(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_profile: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> ProfileRecord {
        ProfileRecord {
            id: id.to_string(),
            category: Category::Ece,
            stage: 3,
            tags: vec!["ai".into(), "music".into()],
            bio: "hi there".into(),
            wants_type_a: false,
            wants_type_b: true,
            picture_url: "https://github.com/hubot.png?size=40".into(),
            has_onboarded: true,
            verified: true,
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn completion_is_none_without_profile() {
        let db = LibSqlBackend::new_memory().await.unwrap();
        assert!(db.get_completion("nobody").await.unwrap().is_none());
        assert!(db.get_profile("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_then_read_back() {
        let db = LibSqlBackend::new_memory().await.unwrap();
        let rec = record("u1");
        db.upsert_profile(&rec).await.unwrap();

        let completion = db.get_completion("u1").await.unwrap().unwrap();
        assert!(completion.has_onboarded);

        let stored = db.get_profile("u1").await.unwrap().unwrap();
        assert_eq!(stored.category, Category::Ece);
        assert_eq!(stored.stage, 3);
        assert_eq!(stored.tags, rec.tags);
        assert_eq!(stored.bio, "hi there");
        assert!(!stored.wants_type_a);
        assert!(stored.wants_type_b);
        assert!(stored.verified);
        assert_eq!(stored.updated_at.timestamp(), rec.updated_at.timestamp());
    }

    #[tokio::test]
    async fn upsert_overwrites_existing_row() {
        let db = LibSqlBackend::new_memory().await.unwrap();
        db.upsert_profile(&record("u1")).await.unwrap();

        let mut second = record("u1");
        second.category = Category::Civil;
        second.tags = vec!["chess".into()];
        second.verified = false;
        db.upsert_profile(&second).await.unwrap();

        let stored = db.get_profile("u1").await.unwrap().unwrap();
        assert_eq!(stored.category, Category::Civil);
        assert_eq!(stored.tags, vec!["chess".to_string()]);
        assert!(!stored.verified);
    }

    #[tokio::test]
    async fn profiles_are_isolated_by_id() {
        let db = LibSqlBackend::new_memory().await.unwrap();
        db.upsert_profile(&record("u1")).await.unwrap();
        let mut other = record("u2");
        other.has_onboarded = false;
        db.upsert_profile(&other).await.unwrap();

        assert!(db.get_completion("u1").await.unwrap().unwrap().has_onboarded);
        assert!(!db.get_completion("u2").await.unwrap().unwrap().has_onboarded);
    }
}
