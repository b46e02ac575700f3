use std::time::Duration;

use anyhow::Result;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use heatlens_core::event::CapturedEvent;
use heatlens_core::session::{ProjectId, SessionId, SessionRecord, UserId};

use crate::schema::SCHEMA_SQL;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// A PostgreSQL-backed clickstream store.
///
/// Row-store counterpart of the DuckDB backend; both satisfy the same
/// capability contract, so deployments pick one at process start.
#[derive(Clone)]
pub struct PgStore {
    pub(crate) pool: PgPool,
}

impl PgStore {
    /// Connect a new pool to `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(DEFAULT_MAX_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .connect(database_url)
            .await?;
        info!("PostgreSQL clickstream store connected");
        Ok(Self { pool })
    }

    /// Wrap an existing pool (tests, shared pools).
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create tables and indexes if they do not already exist.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    /// Execute `SELECT 1` as a lightweight liveness check.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Insert or replace session rows in a single transaction.
    pub async fn insert_sessions(&self, sessions: &[SessionRecord]) -> Result<()> {
        if sessions.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for s in sessions {
            sqlx::query(
                r#"INSERT INTO sessions (project_id, session_id, platform, start_ts, duration, events_count)
                   VALUES ($1, $2, $3, $4, $5, $6)
                   ON CONFLICT (session_id) DO UPDATE SET
                       duration = EXCLUDED.duration,
                       events_count = EXCLUDED.events_count"#,
            )
            .bind(s.project_id as i64)
            .bind(s.session_id as i64)
            .bind(&s.platform)
            .bind(s.start_ts)
            .bind(s.duration)
            .bind(s.events_count)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Insert a batch of captured events in a single transaction.
    pub async fn insert_events(&self, events: &[CapturedEvent]) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for ev in events {
            sqlx::query(
                r#"INSERT INTO events (
                    project_id, session_id, message_id, timestamp, event_type,
                    url_hostpath, url_path, host, path, query,
                    selector, normalized_x, normalized_y, issue_id
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"#,
            )
            .bind(ev.project_id as i64)
            .bind(ev.session_id as i64)
            .bind(ev.message_id as i64)
            .bind(ev.timestamp)
            .bind(ev.kind.as_str())
            .bind(&ev.url_hostpath)
            .bind(&ev.url_path)
            .bind(&ev.host)
            .bind(&ev.path)
            .bind(&ev.query)
            .bind(&ev.selector)
            .bind(ev.normalized_x)
            .bind(ev.normalized_y)
            .bind(&ev.issue_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Register an issue record so issue events can resolve their type.
    pub async fn insert_issue(
        &self,
        project_id: ProjectId,
        issue_id: &str,
        issue_type: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO issues (project_id, issue_id, issue_type)
               VALUES ($1, $2, $3)
               ON CONFLICT (issue_id) DO NOTHING"#,
        )
        .bind(project_id as i64)
        .bind(issue_id)
        .bind(issue_type)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Bookmark a session for a user. Safe to call repeatedly.
    pub async fn add_bookmark(
        &self,
        user_id: UserId,
        project_id: ProjectId,
        session_id: SessionId,
    ) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO bookmarks (user_id, project_id, session_id)
               VALUES ($1, $2, $3)
               ON CONFLICT (user_id, session_id) DO NOTHING"#,
        )
        .bind(user_id as i64)
        .bind(project_id as i64)
        .bind(session_id as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
