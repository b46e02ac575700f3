//! [`HeatmapStore`] implementation for [`DuckDbStore`].
//!
//! Query modules return `anyhow::Result`; this layer logs the failed
//! query's context at `warn` and converts into the typed [`HeatmapError`]
//! variants. Failures are never retried here.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::warn;

use heatlens_core::error::{HeatmapError, Result};
use heatlens_core::heatmap::{HeatmapPoint, HeatmapQuery, SelectorFrequency};
use heatlens_core::search::SearchSpec;
use heatlens_core::session::{
    NavigationEvent, ProjectId, SessionId, SessionSummary, UserId,
};
use heatlens_core::store::HeatmapStore;

use crate::DuckDbStore;

#[async_trait]
impl HeatmapStore for DuckDbStore {
    async fn click_points(
        &self,
        project_id: ProjectId,
        query: &HeatmapQuery,
    ) -> Result<Vec<HeatmapPoint>> {
        crate::queries::clicks::click_points_inner(self, project_id, query)
            .await
            .map_err(|e| {
                warn!(
                    project_id,
                    url = %query.url,
                    start_ts = query.start_ts,
                    end_ts = query.end_ts,
                    error = %e,
                    "heatmap points query failed"
                );
                HeatmapError::aggregation(project_id, &query.url, query.start_ts, query.end_ts, e)
            })
    }

    async fn click_points_for_session(
        &self,
        project_id: ProjectId,
        session_id: SessionId,
        url: &str,
    ) -> Result<Vec<HeatmapPoint>> {
        crate::queries::clicks::click_points_for_session_inner(self, project_id, session_id, url)
            .await
            .map_err(|e| {
                warn!(project_id, session_id, url, error = %e, "session heatmap points query failed");
                HeatmapError::session_aggregation(project_id, session_id, url, e)
            })
    }

    async fn selector_frequencies(
        &self,
        project_id: ProjectId,
        session_id: SessionId,
        url: &str,
    ) -> Result<Vec<SelectorFrequency>> {
        crate::queries::selectors::selector_frequencies_inner(self, project_id, session_id, url)
            .await
            .map_err(|e| {
                warn!(project_id, session_id, url, error = %e, "selector frequency query failed");
                HeatmapError::session_aggregation(project_id, session_id, url, e)
            })
    }

    async fn search_sessions(
        &self,
        spec: &SearchSpec,
        project_id: ProjectId,
        user_id: UserId,
        limit: usize,
        excluded: &HashSet<SessionId>,
    ) -> Result<Vec<SessionSummary>> {
        crate::queries::search::search_sessions_inner(self, spec, project_id, user_id, limit, excluded)
            .await
            .map_err(|e| {
                warn!(project_id, user_id, error = %e, "session search query failed");
                HeatmapError::session_search(project_id, user_id, e)
            })
    }

    async fn session_by_id(
        &self,
        project_id: ProjectId,
        session_id: SessionId,
    ) -> Result<Option<SessionSummary>> {
        crate::queries::sessions::session_by_id_inner(self, project_id, session_id)
            .await
            .map_err(|e| {
                warn!(project_id, session_id, error = %e, "session lookup query failed");
                HeatmapError::session_lookup(project_id, session_id, e)
            })
    }

    async fn navigation_events(&self, session_id: SessionId) -> Result<Vec<NavigationEvent>> {
        crate::queries::pages::navigation_events_inner(self, session_id)
            .await
            .map_err(|e| {
                warn!(session_id, error = %e, "navigation events query failed");
                HeatmapError::navigation_events(session_id, e)
            })
    }
}
