use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::Row;

use heatlens_core::session::{ProjectId, SessionId, SessionSummary};

use crate::PgStore;

/// Direct session lookup by id. `None` when absent.
pub async fn session_by_id_inner(
    db: &PgStore,
    project_id: ProjectId,
    session_id: SessionId,
) -> Result<Option<SessionSummary>> {
    let sql = "SELECT s.project_id, s.session_id, s.start_ts, s.duration \
               FROM sessions s \
               WHERE s.project_id = $1 AND s.session_id = $2";

    let row = sqlx::query(sql)
        .bind(project_id as i64)
        .bind(session_id as i64)
        .fetch_optional(&db.pool)
        .await?;

    row.map(|r| map_summary(&r)).transpose()
}

pub(crate) fn map_summary(row: &PgRow) -> Result<SessionSummary> {
    let project_id: i64 = row.try_get(0)?;
    let session_id: i64 = row.try_get(1)?;
    Ok(SessionSummary {
        project_id: project_id as u32,
        session_id: session_id as u64,
        start_ts: row.try_get(2)?,
        duration: row.try_get(3)?,
    })
}
