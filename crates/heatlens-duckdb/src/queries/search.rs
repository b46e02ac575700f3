use std::collections::HashSet;

use anyhow::Result;
use tracing::debug;

use heatlens_core::search::{
    CriterionOperator, CriterionType, FilterOperator, FilterType, SearchSpec,
};
use heatlens_core::session::{ProjectId, SessionId, SessionSummary, UserId};

use crate::queries::sessions::map_summary;
use crate::DuckDbStore;

/// Session search over an already-normalized spec.
///
/// Assembles the WHERE clause from the spec's filters and event criteria,
/// applies the exclusion set, and returns the top `limit` rows in the
/// spec's sort order. The random representative pick happens in the core
/// service, not here.
pub async fn search_sessions_inner(
    db: &DuckDbStore,
    spec: &SearchSpec,
    project_id: ProjectId,
    user_id: UserId,
    limit: usize,
    excluded: &HashSet<SessionId>,
) -> Result<Vec<SessionSummary>> {
    let mut filter_sql = String::new();
    let mut params: Vec<Box<dyn duckdb::types::ToSql + Send>> = vec![
        Box::new(project_id as i64),
        Box::new(spec.start_ts),
        Box::new(spec.end_ts),
    ];
    let mut param_idx = 4;

    for filter in &spec.filters {
        match (filter.kind, filter.operator) {
            (FilterType::Platform, FilterOperator::Is) if !filter.values.is_empty() => {
                let placeholders: Vec<String> = filter
                    .values
                    .iter()
                    .map(|v| {
                        let p = format!("?{param_idx}");
                        params.push(Box::new(v.clone()));
                        param_idx += 1;
                        p
                    })
                    .collect();
                filter_sql.push_str(&format!(
                    " AND s.platform IN ({})",
                    placeholders.join(", ")
                ));
            }
            (FilterType::Platform, _) => {}
            (FilterType::EventsCount, FilterOperator::Greater) => {
                let threshold: i64 = filter
                    .values
                    .first()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0);
                filter_sql.push_str(&format!(" AND s.events_count > ?{param_idx}"));
                params.push(Box::new(threshold));
                param_idx += 1;
            }
            (FilterType::EventsCount, _) => {}
        }
    }

    for criterion in &spec.events {
        match criterion.kind {
            CriterionType::Location => {
                let mut exists = String::from(
                    "EXISTS (SELECT 1 FROM events le \
                     WHERE le.session_id = s.session_id \
                       AND le.event_type = 'LOCATION'",
                );
                match criterion.operator {
                    CriterionOperator::IsAny => {}
                    CriterionOperator::Is => {
                        if !criterion.values.is_empty() {
                            let branches: Vec<String> = criterion
                                .values
                                .iter()
                                .map(|v| {
                                    let p = format!(
                                        "(le.path = ?{param_idx} OR le.url_hostpath = ?{param_idx})"
                                    );
                                    params.push(Box::new(v.clone()));
                                    param_idx += 1;
                                    p
                                })
                                .collect();
                            exists.push_str(&format!(" AND ({})", branches.join(" OR ")));
                        }
                    }
                    CriterionOperator::Contains
                    | CriterionOperator::StartsWith
                    | CriterionOperator::EndsWith => {
                        if !criterion.values.is_empty() {
                            let branches: Vec<String> = criterion
                                .values
                                .iter()
                                .map(|v| {
                                    let pattern = match criterion.operator {
                                        CriterionOperator::Contains => format!("%{v}%"),
                                        CriterionOperator::StartsWith => format!("{v}%"),
                                        _ => format!("%{v}"),
                                    };
                                    let p = format!("le.path LIKE ?{param_idx}");
                                    params.push(Box::new(pattern));
                                    param_idx += 1;
                                    p
                                })
                                .collect();
                            exists.push_str(&format!(" AND ({})", branches.join(" OR ")));
                        }
                    }
                }
                exists.push(')');
                filter_sql.push_str(&format!(" AND {exists}"));
            }
        }
    }

    if spec.bookmarked {
        filter_sql.push_str(&format!(
            " AND EXISTS (SELECT 1 FROM bookmarks b \
               WHERE b.user_id = ?{param_idx} AND b.session_id = s.session_id)"
        ));
        params.push(Box::new(user_id as i64));
        param_idx += 1;
    }

    if !excluded.is_empty() {
        let placeholders: Vec<String> = excluded
            .iter()
            .map(|id| {
                let p = format!("?{param_idx}");
                params.push(Box::new(*id as i64));
                param_idx += 1;
                p
            })
            .collect();
        filter_sql.push_str(&format!(
            " AND s.session_id NOT IN ({})",
            placeholders.join(", ")
        ));
    }

    let sql = format!(
        "SELECT s.project_id, s.session_id, s.start_ts, s.duration \
         FROM sessions s \
         WHERE s.project_id = ?1 \
           AND s.start_ts >= ?2 \
           AND s.start_ts <= ?3\
         {filter_sql} \
         ORDER BY s.{} {} \
         LIMIT {limit}",
        spec.sort.column(),
        spec.order.sql()
    );
    debug!(sql = %sql, "session search query");

    let conn = db.conn.lock().await;
    let param_refs: Vec<&dyn duckdb::types::ToSql> = params
        .iter()
        .map(|p| p.as_ref() as &dyn duckdb::types::ToSql)
        .collect();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs.as_slice(), map_summary)?;

    let mut sessions = Vec::new();
    for row in rows {
        sessions.push(row?);
    }
    Ok(sessions)
}
