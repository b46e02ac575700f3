use anyhow::Result;
use sqlx::Row;

use heatlens_core::heatmap::SelectorFrequency;
use heatlens_core::session::{ProjectId, SessionId};

use crate::PgStore;

/// Clicked-selector histogram for one session and URL, descending by
/// count.
pub async fn selector_frequencies_inner(
    db: &PgStore,
    project_id: ProjectId,
    session_id: SessionId,
    url: &str,
) -> Result<Vec<SelectorFrequency>> {
    let sql = "SELECT ev.selector, COUNT(*) AS count \
               FROM events ev \
               WHERE ev.project_id = $1 \
                 AND ev.session_id = $2 \
                 AND (ev.url_hostpath = $3 OR ev.url_path = $3) \
                 AND ev.event_type = 'CLICK' \
                 AND ev.selector IS NOT NULL \
               GROUP BY ev.selector \
               ORDER BY count DESC";

    let rows = sqlx::query(sql)
        .bind(project_id as i64)
        .bind(session_id as i64)
        .bind(url)
        .fetch_all(&db.pool)
        .await?;

    rows.iter()
        .map(|row| {
            Ok(SelectorFrequency {
                selector: row.try_get(0)?,
                count: row.try_get(1)?,
            })
        })
        .collect()
}
