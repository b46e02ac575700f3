//! Storage capability interface.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::Result;
use crate::heatmap::{HeatmapPoint, HeatmapQuery, SelectorFrequency};
use crate::search::SearchSpec;
use crate::session::{NavigationEvent, ProjectId, SessionId, SessionSummary, UserId};

/// Read-path capability interface over the clickstream store.
///
/// Implemented by both the columnar (DuckDB) and the row-store (Postgres)
/// backends. [`crate::service::HeatmapService`] never branches on the
/// concrete engine; backend selection happens once at process start.
#[async_trait]
pub trait HeatmapStore: Send + Sync + 'static {
    /// Click points for a project/URL/time-window, both coordinates
    /// present, capped at [`crate::heatmap::HEATMAP_POINT_LIMIT`].
    async fn click_points(
        &self,
        project_id: ProjectId,
        query: &HeatmapQuery,
    ) -> Result<Vec<HeatmapPoint>>;

    /// Same click/URL/coordinate predicate scoped to one session; no time
    /// bound, no cap beyond backend defaults.
    async fn click_points_for_session(
        &self,
        project_id: ProjectId,
        session_id: SessionId,
        url: &str,
    ) -> Result<Vec<HeatmapPoint>>;

    /// Clicked-selector histogram for one session and URL, descending by
    /// count.
    async fn selector_frequencies(
        &self,
        project_id: ProjectId,
        session_id: SessionId,
        url: &str,
    ) -> Result<Vec<SelectorFrequency>>;

    /// Sessions matching `spec`, scoped to the project and (for bookmark
    /// visibility) the user, minus `excluded`, ordered by the spec's sort,
    /// at most `limit` rows.
    async fn search_sessions(
        &self,
        spec: &SearchSpec,
        project_id: ProjectId,
        user_id: UserId,
        limit: usize,
        excluded: &HashSet<SessionId>,
    ) -> Result<Vec<SessionSummary>>;

    /// Direct lookup by id. `None` when the session does not exist.
    async fn session_by_id(
        &self,
        project_id: ProjectId,
        session_id: SessionId,
    ) -> Result<Option<SessionSummary>>;

    /// Page-navigation events for one session, ordered
    /// `(timestamp, message_id)` ascending; empty if none.
    async fn navigation_events(&self, session_id: SessionId) -> Result<Vec<NavigationEvent>>;
}
