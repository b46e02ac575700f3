use std::sync::Arc;

use anyhow::Result;
use duckdb::Connection;
use tokio::sync::Mutex;
use tracing::info;

use heatlens_core::event::CapturedEvent;
use heatlens_core::session::{ProjectId, SessionId, SessionRecord, UserId};

use crate::schema::init_sql;

/// A DuckDB-backed clickstream store.
///
/// DuckDB is single-writer: concurrent reads are fine, but concurrent
/// writes cause contention. The connection sits behind `Arc<Mutex<_>>` so
/// the async runtime serialises access while the struct stays cheaply
/// cloneable and shareable across tasks.
pub struct DuckDbStore {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl DuckDbStore {
    /// Open (or create) a DuckDB database file at `path`.
    ///
    /// Runs the schema init batch so all tables and indexes exist.
    /// `memory_limit` is a DuckDB size string such as "1GB" or "512MB",
    /// read from `Config.duckdb_memory_limit` at the call site.
    pub fn open(path: &str, memory_limit: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(&init_sql(memory_limit))?;
        info!(
            "DuckDB clickstream store opened at {} with memory_limit={}, threads=2",
            path, memory_limit
        );
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an **in-memory** DuckDB database.
    ///
    /// Intended for unit tests only: data is discarded when the struct is
    /// dropped.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(&init_sql("1GB"))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Execute `SELECT 1` as a lightweight liveness check.
    pub async fn ping(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute_batch("SELECT 1")?;
        Ok(())
    }

    /// Insert or replace session rows in a single transaction.
    ///
    /// Called by the recorder pipeline's flush task and by test fixtures.
    /// `ON CONFLICT` keeps re-delivery of the same session id safe.
    pub async fn insert_sessions(&self, sessions: &[SessionRecord]) -> Result<()> {
        if sessions.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        for s in sessions {
            tx.execute(
                r#"INSERT INTO sessions (project_id, session_id, platform, start_ts, duration, events_count)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                   ON CONFLICT (session_id) DO UPDATE SET
                       duration = EXCLUDED.duration,
                       events_count = EXCLUDED.events_count"#,
                duckdb::params![
                    s.project_id as i64,
                    s.session_id as i64,
                    s.platform,
                    s.start_ts,
                    s.duration,
                    s.events_count,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Insert a batch of captured events in a single transaction.
    ///
    /// Returns immediately (no-op) if `events` is empty.
    pub async fn insert_events(&self, events: &[CapturedEvent]) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        for ev in events {
            tx.execute(
                r#"INSERT INTO events (
                    project_id, session_id, message_id, timestamp, event_type,
                    url_hostpath, url_path, host, path, query,
                    selector, normalized_x, normalized_y, issue_id
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"#,
                duckdb::params![
                    ev.project_id as i64,
                    ev.session_id as i64,
                    ev.message_id as i64,
                    ev.timestamp,
                    ev.kind.as_str(),
                    ev.url_hostpath,
                    ev.url_path,
                    ev.host,
                    ev.path,
                    ev.query,
                    ev.selector,
                    ev.normalized_x,
                    ev.normalized_y,
                    ev.issue_id,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Register an issue record (e.g. a click-rage detection) so issue
    /// events can resolve their type.
    pub async fn insert_issue(
        &self,
        project_id: ProjectId,
        issue_id: &str,
        issue_type: &str,
    ) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            r#"INSERT INTO issues (project_id, issue_id, issue_type)
               VALUES (?1, ?2, ?3)
               ON CONFLICT (issue_id) DO NOTHING"#,
            duckdb::params![project_id as i64, issue_id, issue_type],
        )?;
        Ok(())
    }

    /// Bookmark a session for a user. Safe to call repeatedly.
    pub async fn add_bookmark(
        &self,
        user_id: UserId,
        project_id: ProjectId,
        session_id: SessionId,
    ) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            r#"INSERT INTO bookmarks (user_id, project_id, session_id)
               VALUES (?1, ?2, ?3)
               ON CONFLICT (user_id, session_id) DO NOTHING"#,
            duckdb::params![user_id as i64, project_id as i64, session_id as i64],
        )?;
        Ok(())
    }

    /// Acquire the connection lock for direct queries.
    ///
    /// Intended for integration tests that need to verify stored data.
    pub async fn conn_for_test(&self) -> tokio::sync::MutexGuard<'_, Connection> {
        self.conn.lock().await
    }
}
