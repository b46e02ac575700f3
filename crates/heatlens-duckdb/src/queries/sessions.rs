use anyhow::Result;

use heatlens_core::session::{ProjectId, SessionId, SessionSummary};

use crate::DuckDbStore;

/// Direct session lookup by id. `None` when absent.
pub async fn session_by_id_inner(
    db: &DuckDbStore,
    project_id: ProjectId,
    session_id: SessionId,
) -> Result<Option<SessionSummary>> {
    let sql = "SELECT s.project_id, s.session_id, s.start_ts, s.duration \
               FROM sessions s \
               WHERE s.project_id = ?1 AND s.session_id = ?2";

    let conn = db.conn.lock().await;
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query_map(
        duckdb::params![project_id as i64, session_id as i64],
        map_summary,
    )?;

    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

pub(crate) fn map_summary(row: &duckdb::Row<'_>) -> duckdb::Result<SessionSummary> {
    let project_id: i64 = row.get(0)?;
    let session_id: i64 = row.get(1)?;
    Ok(SessionSummary {
        project_id: project_id as u32,
        session_id: session_id as u64,
        start_ts: row.get(2)?,
        duration: row.get(3)?,
    })
}
