use anyhow::Result;
use sqlx::Row;
use tracing::debug;

use heatlens_core::heatmap::{
    HeatmapPoint, HeatmapQuery, CLICK_RAGE_ISSUE_TYPE, HEATMAP_POINT_LIMIT,
};
use heatlens_core::session::{ProjectId, SessionId};

use crate::PgStore;

/// Windowed click points. Same contract as the columnar backend: URL
/// matches either stored representation, both coordinates present, capped
/// at [`HEATMAP_POINT_LIMIT`], click-rage join kept as an open
/// disjunction.
pub async fn click_points_inner(
    db: &PgStore,
    project_id: ProjectId,
    query: &HeatmapQuery,
) -> Result<Vec<HeatmapPoint>> {
    let mut constraints = vec![
        "ev.project_id = $1",
        "(ev.url_hostpath = $2 OR ev.url_path = $2)",
        "ev.timestamp >= $3",
        "ev.timestamp <= $4",
        "ev.event_type = 'CLICK'",
        "ev.normalized_x IS NOT NULL",
        "ev.normalized_y IS NOT NULL",
    ];

    let mut query_from = String::from("events ev");
    let rage_constraint = format!(
        "(iss.session_id IS NULL \
           OR (iss.timestamp >= $3 AND iss.timestamp <= $4 \
               AND iss.project_id = $1 \
               AND mis.project_id = $1 \
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

    let rows = sqlx::query(&sql)
        .bind(project_id as i64)
        .bind(&query.url)
        .bind(query.start_ts)
        .bind(query.end_ts)
        .fetch_all(&db.pool)
        .await?;

    rows.iter()
        .map(|row| {
            Ok(HeatmapPoint {
                normalized_x: row.try_get(0)?,
                normalized_y: row.try_get(1)?,
            })
        })
        .collect()
}

/// Click points for one session and URL. No time bound, no cap.
pub async fn click_points_for_session_inner(
    db: &PgStore,
    project_id: ProjectId,
    session_id: SessionId,
    url: &str,
) -> Result<Vec<HeatmapPoint>> {
    let sql = "SELECT ev.normalized_x, ev.normalized_y \
               FROM events ev \
               WHERE ev.project_id = $1 \
                 AND ev.session_id = $2 \
                 AND (ev.url_hostpath = $3 OR ev.url_path = $3) \
                 AND ev.event_type = 'CLICK' \
                 AND ev.normalized_x IS NOT NULL \
                 AND ev.normalized_y IS NOT NULL";

    let rows = sqlx::query(sql)
        .bind(project_id as i64)
        .bind(session_id as i64)
        .bind(url)
        .fetch_all(&db.pool)
        .await?;

    rows.iter()
        .map(|row| {
            Ok(HeatmapPoint {
                normalized_x: row.try_get(0)?,
                normalized_y: row.try_get(1)?,
            })
        })
        .collect()
}
