//! Typed failures for heatmap storage and artifact access.
//!
//! Every variant carries the failed query's parameters so callers can log
//! actionable diagnostics without re-deriving request state. Storage
//! failures are never retried automatically; the only deliberate retry is
//! the artifact-driven one inside the selector.

use thiserror::Error;

use crate::session::{ProjectId, SessionId, UserId};

pub type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type Result<T> = std::result::Result<T, HeatmapError>;

#[derive(Debug, Error)]
pub enum HeatmapError {
    #[error("click aggregation failed (project {project_id}, url {url:?}, window [{start_ts}, {end_ts}])")]
    Aggregation {
        project_id: ProjectId,
        url: String,
        start_ts: i64,
        end_ts: i64,
        #[source]
        source: BoxedSource,
    },

    #[error("session-scoped aggregation failed (project {project_id}, session {session_id}, url {url:?})")]
    SessionAggregation {
        project_id: ProjectId,
        session_id: SessionId,
        url: String,
        #[source]
        source: BoxedSource,
    },

    #[error("session search failed (project {project_id}, user {user_id})")]
    SessionSearch {
        project_id: ProjectId,
        user_id: UserId,
        #[source]
        source: BoxedSource,
    },

    #[error("session lookup failed (project {project_id}, session {session_id})")]
    SessionLookup {
        project_id: ProjectId,
        session_id: SessionId,
        #[source]
        source: BoxedSource,
    },

    #[error("navigation-event fetch failed (session {session_id})")]
    NavigationEvents {
        session_id: SessionId,
        #[source]
        source: BoxedSource,
    },

    #[error("replay artifact lookup failed (session {session_id}, project {project_id})")]
    Artifacts {
        session_id: SessionId,
        project_id: ProjectId,
        #[source]
        source: BoxedSource,
    },
}

impl HeatmapError {
    pub fn aggregation(
        project_id: ProjectId,
        url: &str,
        start_ts: i64,
        end_ts: i64,
        source: impl Into<BoxedSource>,
    ) -> Self {
        Self::Aggregation {
            project_id,
            url: url.to_string(),
            start_ts,
            end_ts,
            source: source.into(),
        }
    }

    pub fn session_aggregation(
        project_id: ProjectId,
        session_id: SessionId,
        url: &str,
        source: impl Into<BoxedSource>,
    ) -> Self {
        Self::SessionAggregation {
            project_id,
            session_id,
            url: url.to_string(),
            source: source.into(),
        }
    }

    pub fn session_search(
        project_id: ProjectId,
        user_id: UserId,
        source: impl Into<BoxedSource>,
    ) -> Self {
        Self::SessionSearch {
            project_id,
            user_id,
            source: source.into(),
        }
    }

    pub fn session_lookup(
        project_id: ProjectId,
        session_id: SessionId,
        source: impl Into<BoxedSource>,
    ) -> Self {
        Self::SessionLookup {
            project_id,
            session_id,
            source: source.into(),
        }
    }

    pub fn navigation_events(session_id: SessionId, source: impl Into<BoxedSource>) -> Self {
        Self::NavigationEvents {
            session_id,
            source: source.into(),
        }
    }

    pub fn artifacts(
        session_id: SessionId,
        project_id: ProjectId,
        source: impl Into<BoxedSource>,
    ) -> Self {
        Self::Artifacts {
            session_id,
            project_id,
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregation_error_carries_query_context() {
        let err = HeatmapError::aggregation(42, "/pricing", 100, 200, anyhow::anyhow!("boom"));
        let msg = err.to_string();
        assert!(msg.contains("project 42"));
        assert!(msg.contains("/pricing"));
        assert!(msg.contains("[100, 200]"));
    }
}
