use anyhow::Result;
use tracing::debug;

use heatlens_core::heatmap::SelectorFrequency;
use heatlens_core::session::{ProjectId, SessionId};

use crate::DuckDbStore;

/// Clicked-selector histogram for one session and URL, descending by
/// count. Coordinates are irrelevant here; selector-less click rows are
/// the only exclusion.
pub async fn selector_frequencies_inner(
    db: &DuckDbStore,
    project_id: ProjectId,
    session_id: SessionId,
    url: &str,
) -> Result<Vec<SelectorFrequency>> {
    let sql = "SELECT ev.selector, COUNT(*) AS count \
               FROM events ev \
               WHERE ev.project_id = ?1 \
                 AND ev.session_id = ?2 \
                 AND (ev.url_hostpath = ?3 OR ev.url_path = ?3) \
                 AND ev.event_type = 'CLICK' \
                 AND ev.selector IS NOT NULL \
               GROUP BY ev.selector \
               ORDER BY count DESC";
    debug!(sql, session_id, "selector frequency query");

    let conn = db.conn.lock().await;
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(
        duckdb::params![project_id as i64, session_id as i64, url],
        |row| {
            Ok(SelectorFrequency {
                selector: row.get(0)?,
                count: row.get(1)?,
            })
        },
    )?;

    let mut frequencies = Vec::new();
    for row in rows {
        frequencies.push(row?);
    }
    Ok(frequencies)
}
