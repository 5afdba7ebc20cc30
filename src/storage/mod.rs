// SPDX-License-Identifier: MIT
//! Asynchronous key→string store backed by SQLite.
//!
//! Everything the engine persists goes through this one `kv` table:
//! get / set / multi-get / prefix-scan / remove-by-prefix. Values are JSON
//! blobs. The table is created via `CREATE TABLE IF NOT EXISTS` on open, so
//! no migration step is needed.
//!
//! Every read-modify-write cycle in the engines must hold the key's lock
//! from [`Storage::lock_key`] across the read and the write. Without it two
//! interleaved submissions touching the same row lose an update (A reads,
//! B reads, A writes, B writes).

pub mod keys;

use anyhow::{Context as _, Result};
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::{sqlite::SqliteConnectOptions, Row, SqlitePool};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Default timeout for individual SQLite queries.
/// Prevents a hung query from stalling a submission indefinitely.
const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Escape `%`, `_`, and `\` so a key prefix can be used in a LIKE pattern.
fn like_prefix(prefix: &str) -> String {
    let escaped = prefix
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("{escaped}%")
}

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
    query_timeout: Duration,
    /// One async mutex per storage key, created on first use.
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl Storage {
    pub async fn open(data_dir: &Path) -> Result<Self> {
        Self::open_with(data_dir, DEFAULT_QUERY_TIMEOUT.as_secs(), 0).await
    }

    /// Open the store with an explicit query timeout and slow-query logging
    /// threshold. `slow_query_ms` of 0 disables slow-query logging.
    pub async fn open_with(
        data_dir: &Path,
        query_timeout_secs: u64,
        slow_query_ms: u64,
    ) -> Result<Self> {
        tokio::fs::create_dir_all(data_dir)
            .await
            .with_context(|| format!("create data dir {}", data_dir.display()))?;
        let db_path = data_dir.join("quizcore.db");
        let mut opts =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display()))?
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
                .create_if_missing(true);

        if slow_query_ms > 0 {
            use sqlx::ConnectOptions;
            opts = opts.log_slow_statements(
                log::LevelFilter::Warn,
                Duration::from_millis(slow_query_ms),
            );
        }

        let pool = SqlitePool::connect_with(opts).await?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .context("create kv table")?;

        Ok(Self {
            pool,
            query_timeout: Duration::from_secs(query_timeout_secs.max(1)),
            locks: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Execute a future with the standard query timeout.
    async fn with_timeout<T>(
        &self,
        fut: impl std::future::Future<Output = Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(anyhow::anyhow!(
                "storage query timed out after {}s",
                self.query_timeout.as_secs()
            )),
        }
    }

    // ─── Key locking ──────────────────────────────────────────────────────────

    /// Acquire the per-key mutex. Hold the returned guard across the whole
    /// read-modify-write cycle for `key`. Locks for different keys are
    /// independent, so cross-key ordering stays unconstrained.
    pub async fn lock_key(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.locks.lock().await;
            map.entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    // ─── Raw string operations ────────────────────────────────────────────────

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_timeout(async {
            sqlx::query_scalar("SELECT value FROM kv WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("get {key}"))
        })
        .await
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.with_timeout(async {
            sqlx::query(
                "INSERT INTO kv (key, value, updated_at) VALUES (?, ?, ?)
                 ON CONFLICT(key) DO UPDATE SET
                     value = excluded.value,
                     updated_at = excluded.updated_at",
            )
            .bind(key)
            .bind(value)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .with_context(|| format!("set {key}"))?;
            Ok(())
        })
        .await
    }

    /// Fetch several keys in one query. Missing keys are absent from the map.
    pub async fn get_many(&self, keys: &[String]) -> Result<HashMap<String, String>> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }
        let placeholders = vec!["?"; keys.len()].join(", ");
        let sql = format!("SELECT key, value FROM kv WHERE key IN ({placeholders})");
        self.with_timeout(async {
            let mut query = sqlx::query(&sql);
            for key in keys {
                query = query.bind(key);
            }
            let rows = query.fetch_all(&self.pool).await.context("multi-get")?;
            Ok(rows
                .into_iter()
                .map(|r| (r.get::<String, _>("key"), r.get::<String, _>("value")))
                .collect())
        })
        .await
    }

    /// All `(key, value)` pairs whose key starts with `prefix`, key-ordered.
    pub async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>> {
        let pattern = like_prefix(prefix);
        self.with_timeout(async {
            let rows =
                sqlx::query("SELECT key, value FROM kv WHERE key LIKE ? ESCAPE '\\' ORDER BY key")
                    .bind(&pattern)
                    .fetch_all(&self.pool)
                    .await
                    .with_context(|| format!("scan prefix {prefix}"))?;
            Ok(rows
                .into_iter()
                .map(|r| (r.get::<String, _>("key"), r.get::<String, _>("value")))
                .collect())
        })
        .await
    }

    /// Number of keys starting with `prefix`.
    pub async fn count_prefix(&self, prefix: &str) -> Result<u64> {
        let pattern = like_prefix(prefix);
        self.with_timeout(async {
            let count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM kv WHERE key LIKE ? ESCAPE '\\'")
                    .bind(&pattern)
                    .fetch_one(&self.pool)
                    .await
                    .with_context(|| format!("count prefix {prefix}"))?;
            Ok(count as u64)
        })
        .await
    }

    /// Delete every key starting with `prefix`. Returns the number removed.
    pub async fn remove_prefix(&self, prefix: &str) -> Result<u64> {
        let pattern = like_prefix(prefix);
        self.with_timeout(async {
            let result = sqlx::query("DELETE FROM kv WHERE key LIKE ? ESCAPE '\\'")
                .bind(&pattern)
                .execute(&self.pool)
                .await
                .with_context(|| format!("remove prefix {prefix}"))?;
            Ok(result.rows_affected())
        })
        .await
    }

    // ─── JSON helpers ─────────────────────────────────────────────────────────

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key).await? {
            Some(raw) => {
                let value = serde_json::from_str(&raw)
                    .with_context(|| format!("decode stored value at {key}"))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw =
            serde_json::to_string(value).with_context(|| format!("encode value for {key}"))?;
        self.set(key, &raw).await
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_storage() -> (Storage, TempDir) {
        let dir = TempDir::new().expect("tempdir");
        let s = Storage::open(dir.path()).await.expect("storage");
        (s, dir)
    }

    #[tokio::test]
    async fn set_then_get_roundtrip() {
        let (s, _dir) = test_storage().await;
        s.set("history", "[]").await.unwrap();
        assert_eq!(s.get("history").await.unwrap().as_deref(), Some("[]"));
        assert_eq!(s.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_overwrites_existing_value() {
        let (s, _dir) = test_storage().await;
        s.set("streakCount", "1").await.unwrap();
        s.set("streakCount", "2").await.unwrap();
        assert_eq!(s.get("streakCount").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn get_many_skips_missing_keys() {
        let (s, _dir) = test_storage().await;
        s.set("a", "1").await.unwrap();
        s.set("b", "2").await.unwrap();
        let got = s
            .get_many(&["a".to_string(), "b".to_string(), "c".to_string()])
            .await
            .unwrap();
        assert_eq!(got.len(), 2);
        assert_eq!(got["a"], "1");
        assert_eq!(got["b"], "2");
    }

    #[tokio::test]
    async fn scan_prefix_handles_underscores_literally() {
        let (s, _dir) = test_storage().await;
        s.set("questionAnalytics:q_1", "{}").await.unwrap();
        s.set("questionAnalytics:qX1", "{}").await.unwrap();
        s.set("subjectAnalytics:math", "{}").await.unwrap();

        // `_` must not act as a single-char wildcard.
        let hits = s.scan_prefix("questionAnalytics:q_").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, "questionAnalytics:q_1");

        let all = s.scan_prefix("questionAnalytics:").await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn remove_prefix_deletes_only_matching_keys() {
        let (s, _dir) = test_storage().await;
        s.set("dailyStats:2026-01-01", "{}").await.unwrap();
        s.set("dailyStats:2026-01-02", "{}").await.unwrap();
        s.set("userProfile", "{}").await.unwrap();

        let removed = s.remove_prefix("dailyStats:").await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(s.count_prefix("dailyStats:").await.unwrap(), 0);
        assert!(s.get("userProfile").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn json_helpers_roundtrip() {
        let (s, _dir) = test_storage().await;
        let value = vec!["a".to_string(), "b".to_string()];
        s.set_json("list", &value).await.unwrap();
        let back: Vec<String> = s.get_json("list").await.unwrap().unwrap();
        assert_eq!(back, value);
    }

    #[tokio::test]
    async fn malformed_stored_json_is_an_error_not_a_panic() {
        let (s, _dir) = test_storage().await;
        s.set("userProfile", "not json").await.unwrap();
        let got: Result<Option<Vec<String>>> = s.get_json("userProfile").await;
        assert!(got.is_err());
    }

    #[tokio::test]
    async fn key_locks_serialise_read_modify_write() {
        let (s, _dir) = test_storage().await;
        s.set("counter", "0").await.unwrap();

        let bump = |s: Storage| async move {
            let _guard = s.lock_key("counter").await;
            let n: i64 = s.get("counter").await.unwrap().unwrap().parse().unwrap();
            // Yield so an unserialised competitor would interleave here.
            tokio::task::yield_now().await;
            s.set("counter", &(n + 1).to_string()).await.unwrap();
        };

        tokio::join!(bump(s.clone()), bump(s.clone()));
        assert_eq!(s.get("counter").await.unwrap().as_deref(), Some("2"));
    }
}
