// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relational store for memory record metadata.
//!
//! One row per durable record; the paired vector entry lives in the
//! vector index under `record.vector_ref`. All SQL goes through the
//! shared [`Database`] background thread.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use muninn_core::MuninnError;
use muninn_storage::{map_tr_err, Database};
use rusqlite::params;

use crate::types::{MemoryCategory, MemoryKind, MemoryRecord, VectorRef};

const RECORD_COLUMNS: &str = "id, owner_id, session_id, agent_id, kind, category, content, \
     metadata, vector_namespace, vector_id, importance, access_count, \
     last_accessed_at, created_at, expires_at";

/// Typed queries over the `memory_records` table.
#[derive(Clone)]
pub struct RecordStore {
    db: Database,
}

impl RecordStore {
    /// Creates a new RecordStore over an opened database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Access the underlying database handle (for advanced queries).
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Insert a new record row.
    pub async fn insert(&self, record: &MemoryRecord) -> Result<(), MuninnError> {
        let record = record.clone();
        self.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO memory_records (id, owner_id, session_id, agent_id, kind, \
                     category, content, metadata, vector_namespace, vector_id, importance, \
                     access_count, last_accessed_at, created_at, expires_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                    params![
                        record.id,
                        record.owner_id,
                        record.session_id,
                        record.agent_id,
                        record.kind.as_str(),
                        record.category.as_str(),
                        record.content,
                        serde_json::to_string(&record.metadata).unwrap_or_default(),
                        record.vector_ref.namespace,
                        record.vector_ref.id,
                        record.importance,
                        record.access_count,
                        record.last_accessed_at.map(fmt_ts),
                        fmt_ts(record.created_at),
                        record.expires_at.map(fmt_ts),
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Fetch an owner's records by id set (batch lookup after a vector query).
    ///
    /// Rows belonging to other owners are excluded even if their ids match.
    pub async fn get_by_owner_and_ids(
        &self,
        owner_id: &str,
        ids: &[String],
    ) -> Result<Vec<MemoryRecord>, MuninnError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let owner_id = owner_id.to_string();
        let ids = ids.to_vec();
        self.db
            .connection()
            .call(move |conn| {
                let placeholders: Vec<String> =
                    (2..=ids.len() + 1).map(|i| format!("?{i}")).collect();
                let sql = format!(
                    "SELECT {RECORD_COLUMNS} FROM memory_records \
                     WHERE owner_id = ?1 AND id IN ({})",
                    placeholders.join(", ")
                );
                let mut stmt = conn.prepare(&sql)?;

                let mut sql_params: Vec<&dyn rusqlite::types::ToSql> = vec![&owner_id];
                sql_params.extend(ids.iter().map(|id| id as &dyn rusqlite::types::ToSql));

                let records = stmt
                    .query_map(sql_params.as_slice(), |row| Ok(row_to_record(row)))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(records)
            })
            .await
            .map_err(map_tr_err)
    }

    /// Record a retrieval: bump access count, stamp last access, and nudge
    /// importance up by `bump`, capped at 1.0. One statement, so the cap
    /// holds even under concurrent reinforcement.
    pub async fn apply_reinforcement(
        &self,
        id: &str,
        bump: f64,
        now: DateTime<Utc>,
    ) -> Result<(), MuninnError> {
        let id = id.to_string();
        self.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "UPDATE memory_records SET \
                     access_count = access_count + 1, \
                     last_accessed_at = ?1, \
                     importance = min(importance + ?2, 1.0) \
                     WHERE id = ?3",
                    params![fmt_ts(now), bump, id],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Overwrite a record's importance. Clamped to [0, 1].
    pub async fn set_importance(&self, id: &str, importance: f64) -> Result<(), MuninnError> {
        let id = id.to_string();
        let importance = importance.clamp(0.0, 1.0);
        self.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "UPDATE memory_records SET importance = ?1 WHERE id = ?2",
                    params![importance, id],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Load one page of decay bookkeeping rows for the given kind, ordered
    /// by id for a stable scan under concurrent importance updates.
    pub async fn page_decay_rows(
        &self,
        kind: MemoryKind,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<DecayRow>, MuninnError> {
        self.db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, importance, created_at, decayed_at FROM memory_records \
                     WHERE kind = ?1 ORDER BY id LIMIT ?2 OFFSET ?3",
                )?;
                let rows = stmt
                    .query_map(
                        params![kind.as_str(), limit as i64, offset as i64],
                        |row| {
                            Ok(DecayRow {
                                id: row.get(0)?,
                                importance: row.get(1)?,
                                created_at: parse_ts(&row.get::<_, String>(2)?),
                                decayed_at: row
                                    .get::<_, Option<String>>(3)?
                                    .map(|s| parse_ts(&s)),
                            })
                        },
                    )?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(map_tr_err)
    }

    /// Persist a decay pass over one record: the new importance plus the
    /// watermark the decay was computed through.
    pub async fn apply_decay(
        &self,
        id: &str,
        importance: f64,
        decayed_at: DateTime<Utc>,
    ) -> Result<(), MuninnError> {
        let id = id.to_string();
        let importance = importance.clamp(0.0, 1.0);
        self.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "UPDATE memory_records SET importance = ?1, decayed_at = ?2 WHERE id = ?3",
                    params![importance, fmt_ts(decayed_at), id],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// All records whose expiry lease has run out as of `now`.
    pub async fn expired_as_of(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<MemoryRecord>, MuninnError> {
        self.db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {RECORD_COLUMNS} FROM memory_records \
                     WHERE expires_at IS NOT NULL AND expires_at < ?1"
                ))?;
                let records = stmt
                    .query_map(params![fmt_ts(now)], |row| Ok(row_to_record(row)))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(records)
            })
            .await
            .map_err(map_tr_err)
    }

    /// Delete a record row. Returns whether a row was removed.
    pub async fn delete(&self, id: &str) -> Result<bool, MuninnError> {
        let id = id.to_string();
        self.db
            .connection()
            .call(move |conn| {
                let rows = conn.execute("DELETE FROM memory_records WHERE id = ?1", params![id])?;
                Ok(rows > 0)
            })
            .await
            .map_err(map_tr_err)
    }

    /// Count and mean importance of an owner's records of the given kind.
    pub async fn count_and_avg_importance(
        &self,
        owner_id: &str,
        kind: MemoryKind,
    ) -> Result<(u64, Option<f64>), MuninnError> {
        let owner_id = owner_id.to_string();
        self.db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT COUNT(*), AVG(importance) FROM memory_records \
                     WHERE owner_id = ?1 AND kind = ?2",
                )?;
                let result = stmt.query_row(params![owner_id, kind.as_str()], |row| {
                    Ok((row.get::<_, i64>(0)? as u64, row.get::<_, Option<f64>>(1)?))
                })?;
                Ok(result)
            })
            .await
            .map_err(map_tr_err)
    }
}

/// Slim row for decay scans: no content or metadata payload.
#[derive(Debug, Clone)]
pub struct DecayRow {
    pub id: String,
    pub importance: f64,
    pub created_at: DateTime<Utc>,
    /// When the record was last decayed, or `None` if never.
    pub decayed_at: Option<DateTime<Utc>>,
}

/// Format a timestamp as ISO 8601 with millisecond precision (UTC).
pub fn fmt_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp; malformed values fall back to the epoch.
pub fn parse_ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Convert a rusqlite Row to a MemoryRecord.
fn row_to_record(row: &rusqlite::Row) -> MemoryRecord {
    let kind_str: String = row.get(4).unwrap_or_default();
    let category_str: String = row.get(5).unwrap_or_default();
    let metadata_json: Option<String> = row.get(7).unwrap_or(None);
    let metadata: BTreeMap<String, serde_json::Value> = metadata_json
        .as_deref()
        .and_then(|json| serde_json::from_str(json).ok())
        .unwrap_or_default();

    MemoryRecord {
        id: row.get(0).unwrap_or_default(),
        owner_id: row.get(1).unwrap_or_default(),
        session_id: row.get(2).unwrap_or(None),
        agent_id: row.get(3).unwrap_or(None),
        kind: MemoryKind::from_str_value(&kind_str),
        category: MemoryCategory::from_str_value(&category_str),
        content: row.get(6).unwrap_or_default(),
        metadata,
        vector_ref: VectorRef {
            namespace: row.get(8).unwrap_or_default(),
            id: row.get(9).unwrap_or_default(),
        },
        importance: row.get(10).unwrap_or(0.5),
        access_count: row.get(11).unwrap_or(0),
        last_accessed_at: row
            .get::<_, Option<String>>(12)
            .unwrap_or(None)
            .map(|s| parse_ts(&s)),
        created_at: parse_ts(&row.get::<_, String>(13).unwrap_or_default()),
        expires_at: row
            .get::<_, Option<String>>(14)
            .unwrap_or(None)
            .map(|s| parse_ts(&s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn setup() -> RecordStore {
        let db = Database::open_in_memory().await.unwrap();
        RecordStore::new(db)
    }

    fn make_record(id: &str, owner_id: &str) -> MemoryRecord {
        MemoryRecord {
            id: id.to_string(),
            owner_id: owner_id.to_string(),
            session_id: Some("session-1".to_string()),
            agent_id: None,
            kind: MemoryKind::Episodic,
            category: MemoryCategory::Conversation,
            content: "We talked about dinosaurs".to_string(),
            metadata: BTreeMap::new(),
            vector_ref: VectorRef {
                namespace: format!("episodic:{owner_id}"),
                id: id.to_string(),
            },
            importance: 0.5,
            access_count: 0,
            last_accessed_at: None,
            created_at: Utc::now(),
            expires_at: Some(Utc::now() + Duration::days(30)),
        }
    }

    #[tokio::test]
    async fn insert_and_get_roundtrips() {
        let store = setup().await;
        let mut record = make_record("rec-1", "owner-1");
        record
            .metadata
            .insert("topics".into(), serde_json::json!(["dinosaurs"]));
        store.insert(&record).await.unwrap();

        let rows = store
            .get_by_owner_and_ids("owner-1", &["rec-1".to_string()])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "rec-1");
        assert_eq!(rows[0].content, "We talked about dinosaurs");
        assert_eq!(rows[0].kind, MemoryKind::Episodic);
        assert_eq!(rows[0].metadata["topics"], serde_json::json!(["dinosaurs"]));
        assert_eq!(rows[0].vector_ref.namespace, "episodic:owner-1");
    }

    #[tokio::test]
    async fn get_by_owner_excludes_other_owners() {
        let store = setup().await;
        store.insert(&make_record("rec-1", "owner-1")).await.unwrap();
        store.insert(&make_record("rec-2", "owner-2")).await.unwrap();

        let rows = store
            .get_by_owner_and_ids("owner-1", &["rec-1".to_string(), "rec-2".to_string()])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "rec-1");
    }

    #[tokio::test]
    async fn reinforcement_bumps_and_caps() {
        let store = setup().await;
        let mut record = make_record("rec-1", "owner-1");
        record.importance = 0.98;
        store.insert(&record).await.unwrap();

        let now = Utc::now();
        store.apply_reinforcement("rec-1", 0.05, now).await.unwrap();

        let rows = store
            .get_by_owner_and_ids("owner-1", &["rec-1".to_string()])
            .await
            .unwrap();
        assert_eq!(rows[0].access_count, 1);
        assert!(rows[0].last_accessed_at.is_some());
        assert_eq!(rows[0].importance, 1.0, "importance must cap at 1.0");
    }

    #[tokio::test]
    async fn set_importance_clamps() {
        let store = setup().await;
        store.insert(&make_record("rec-1", "owner-1")).await.unwrap();

        store.set_importance("rec-1", -0.3).await.unwrap();
        let rows = store
            .get_by_owner_and_ids("owner-1", &["rec-1".to_string()])
            .await
            .unwrap();
        assert_eq!(rows[0].importance, 0.0);
    }

    #[tokio::test]
    async fn decay_paging_covers_all_records_in_order() {
        let store = setup().await;
        for i in 0..5 {
            store
                .insert(&make_record(&format!("rec-{i}"), "owner-1"))
                .await
                .unwrap();
        }

        let first = store
            .page_decay_rows(MemoryKind::Episodic, 3, 0)
            .await
            .unwrap();
        let second = store
            .page_decay_rows(MemoryKind::Episodic, 3, 3)
            .await
            .unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(second.len(), 2);
        assert!(first.iter().all(|r| r.decayed_at.is_none()));

        let mut ids: Vec<String> = first.into_iter().chain(second).map(|r| r.id).collect();
        ids.sort();
        assert_eq!(ids, vec!["rec-0", "rec-1", "rec-2", "rec-3", "rec-4"]);
    }

    #[tokio::test]
    async fn apply_decay_sets_importance_and_watermark() {
        let store = setup().await;
        store.insert(&make_record("rec-1", "owner-1")).await.unwrap();

        let now = Utc::now();
        store.apply_decay("rec-1", 0.3, now).await.unwrap();

        let rows = store
            .page_decay_rows(MemoryKind::Episodic, 10, 0)
            .await
            .unwrap();
        assert_eq!(rows[0].importance, 0.3);
        let watermark = rows[0].decayed_at.expect("watermark stamped");
        assert!((now - watermark).num_milliseconds().abs() < 1);
    }

    #[tokio::test]
    async fn expired_as_of_straddles_the_boundary() {
        let store = setup().await;
        let now = Utc::now();

        let mut past = make_record("rec-past", "owner-1");
        past.expires_at = Some(now - Duration::seconds(1));
        store.insert(&past).await.unwrap();

        let mut future = make_record("rec-future", "owner-1");
        future.expires_at = Some(now + Duration::seconds(1));
        store.insert(&future).await.unwrap();

        let mut no_expiry = make_record("rec-none", "owner-1");
        no_expiry.expires_at = None;
        store.insert(&no_expiry).await.unwrap();

        let expired = store.expired_as_of(now).await.unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, "rec-past");
    }

    #[tokio::test]
    async fn delete_reports_whether_row_existed() {
        let store = setup().await;
        store.insert(&make_record("rec-1", "owner-1")).await.unwrap();

        assert!(store.delete("rec-1").await.unwrap());
        assert!(!store.delete("rec-1").await.unwrap());
    }

    #[tokio::test]
    async fn count_and_avg_importance() {
        let store = setup().await;
        for (i, importance) in [0.2, 0.5, 0.9].iter().enumerate() {
            let mut record = make_record(&format!("rec-{i}"), "owner-1");
            record.importance = *importance;
            store.insert(&record).await.unwrap();
        }

        let (count, avg) = store
            .count_and_avg_importance("owner-1", MemoryKind::Episodic)
            .await
            .unwrap();
        assert_eq!(count, 3);
        let avg = avg.unwrap();
        assert!((avg - 0.5333).abs() < 0.001);

        let (count, avg) = store
            .count_and_avg_importance("owner-2", MemoryKind::Episodic)
            .await
            .unwrap();
        assert_eq!(count, 0);
        assert!(avg.is_none());
    }

    #[test]
    fn timestamp_roundtrip_and_fallback() {
        let now = Utc::now();
        let parsed = parse_ts(&fmt_ts(now));
        assert!((now - parsed).num_milliseconds().abs() < 1);

        assert_eq!(parse_ts("garbage"), DateTime::<Utc>::UNIX_EPOCH);
    }
}
