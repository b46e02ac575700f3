use anyhow::Result;

use heatlens_core::session::{NavigationEvent, SessionId};

use crate::DuckDbStore;

/// Page-navigation events for one session, `(timestamp, message_id)`
/// ascending.
pub async fn navigation_events_inner(
    db: &DuckDbStore,
    session_id: SessionId,
) -> Result<Vec<NavigationEvent>> {
    let sql = "SELECT ev.message_id, ev.timestamp, ev.host, ev.path, ev.query \
               FROM events ev \
               WHERE ev.session_id = ?1 \
                 AND ev.event_type = 'LOCATION' \
               ORDER BY ev.timestamp, ev.message_id";

    let conn = db.conn.lock().await;
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(duckdb::params![session_id as i64], |row| {
        let message_id: i64 = row.get(0)?;
        let timestamp: i64 = row.get(1)?;
        let host: Option<String> = row.get(2)?;
        let path: Option<String> = row.get(3)?;
        let query: Option<String> = row.get(4)?;
        Ok(NavigationEvent::from_page(
            message_id as u64,
            timestamp,
            host.unwrap_or_default(),
            path.unwrap_or_default(),
            query,
        ))
    })?;

    let mut events = Vec::new();
    for row in rows {
        events.push(row?);
    }
    Ok(events)
}
