use anyhow::Result;
use tracing::debug;

use heatlens_core::heatmap::{
    HeatmapPoint, HeatmapQuery, CLICK_RAGE_ISSUE_TYPE, HEATMAP_POINT_LIMIT,
};
use heatlens_core::session::{ProjectId, SessionId};

use crate::DuckDbStore;

/// Windowed click points for a project/URL, both coordinates present,
/// capped at [`HEATMAP_POINT_LIMIT`].
///
/// The URL matches when either stored representation equals the requested
/// string (host+path OR path). With `click_rage` set, the session's issue
/// events are joined in and a click survives when its session has no issue
/// data at all, or raised a click-rage issue inside the same window and
/// project. Absence of issue rows never excludes a click.
pub async fn click_points_inner(
    db: &DuckDbStore,
    project_id: ProjectId,
    query: &HeatmapQuery,
) -> Result<Vec<HeatmapPoint>> {
    let mut constraints = vec![
        "ev.project_id = ?1",
        "(ev.url_hostpath = ?2 OR ev.url_path = ?2)",
        "ev.timestamp >= ?3",
        "ev.timestamp <= ?4",
        "ev.event_type = 'CLICK'",
        "ev.normalized_x IS NOT NULL",
        "ev.normalized_y IS NOT NULL",
    ];

    let mut query_from = String::from("events ev");
    let rage_constraint = format!(
        "(iss.session_id IS NULL \
           OR (iss.timestamp >= ?3 AND iss.timestamp <= ?4 \
               AND iss.project_id = ?1 \
               AND mis.project_id = ?1 \
               AND mis.issue_type = '{CLICK_RAGE_ISSUE_TYPE}'))"
    );
    if query.click_rage {
        query_from.push_str(
            " LEFT JOIN events iss \
                ON (iss.session_id = ev.session_id AND iss.event_type = 'ISSUE') \
              LEFT JOIN issues mis ON (mis.issue_id = iss.issue_id)",
        );
        constraints.push(rage_constraint.as_str());
    }

    let sql = format!(
        "SELECT ev.normalized_x, ev.normalized_y \
         FROM {query_from} \
         WHERE {} \
         LIMIT {HEATMAP_POINT_LIMIT}",
        constraints.join(" AND ")
    );
    debug!(sql = %sql, "heatmap points query");

    let conn = db.conn.lock().await;
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        duckdb::params![
            project_id as i64,
            query.url,
            query.start_ts,
            query.end_ts
        ],
        |row| {
            Ok(HeatmapPoint {
                normalized_x: row.get(0)?,
                normalized_y: row.get(1)?,
            })
        },
    )?;

    let mut points = Vec::new();
    for row in rows {
        points.push(row?);
    }
    Ok(points)
}

/// Click points for one session and URL. No time bound, no cap.
pub async fn click_points_for_session_inner(
    db: &DuckDbStore,
    project_id: ProjectId,
    session_id: SessionId,
    url: &str,
) -> Result<Vec<HeatmapPoint>> {
    let sql = "SELECT ev.normalized_x, ev.normalized_y \
               FROM events ev \
               WHERE ev.project_id = ?1 \
                 AND ev.session_id = ?2 \
                 AND (ev.url_hostpath = ?3 OR ev.url_path = ?3) \
                 AND ev.event_type = 'CLICK' \
                 AND ev.normalized_x IS NOT NULL \
                 AND ev.normalized_y IS NOT NULL";
    debug!(sql, session_id, "session heatmap points query");

    let conn = db.conn.lock().await;
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(
        duckdb::params![project_id as i64, session_id as i64, url],
        |row| {
            Ok(HeatmapPoint {
                normalized_x: row.get(0)?,
                normalized_y: row.get(1)?,
            })
        },
    )?;

    let mut points = Vec::new();
    for row in rows {
        points.push(row?);
    }
    Ok(points)
}
