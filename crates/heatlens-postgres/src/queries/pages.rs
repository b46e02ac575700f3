use anyhow::Result;
use sqlx::Row;

use heatlens_core::session::{NavigationEvent, SessionId};

use crate::PgStore;

/// Page-navigation events for one session, `(timestamp, message_id)`
/// ascending.
pub async fn navigation_events_inner(
    db: &PgStore,
    session_id: SessionId,
) -> Result<Vec<NavigationEvent>> {
    let sql = "SELECT ev.message_id, ev.timestamp, ev.host, ev.path, ev.query \
               FROM events ev \
               WHERE ev.session_id = $1 \
                 AND ev.event_type = 'LOCATION' \
               ORDER BY ev.timestamp, ev.message_id";

    let rows = sqlx::query(sql)
        .bind(session_id as i64)
        .fetch_all(&db.pool)
        .await?;

    rows.iter()
        .map(|row| {
            let message_id: i64 = row.try_get(0)?;
            let timestamp: i64 = row.try_get(1)?;
            let host: Option<String> = row.try_get(2)?;
            let path: Option<String> = row.try_get(3)?;
            let query: Option<String> = row.try_get(4)?;
            Ok(NavigationEvent::from_page(
                message_id as u64,
                timestamp,
                host.unwrap_or_default(),
                path.unwrap_or_default(),
                query,
            ))
        })
        .collect()
}
