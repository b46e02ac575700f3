//! Heatmap retrieval and representative-session selection.

use std::collections::HashSet;
use std::sync::Arc;

use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::artifacts::{ArtifactLocator, ReplayArtifacts};
use crate::error::Result;
use crate::heatmap::{HeatmapPoint, HeatmapQuery, SelectorFrequency};
use crate::search::SearchSpec;
use crate::session::{
    EnrichedSession, ProjectId, SessionId, UserId, ISSUE_MOB_FILE_NOT_FOUND,
};
use crate::store::HeatmapStore;

/// Number of top-duration sessions the random pick draws from.
///
/// Picking the single best match would surface the same session for every
/// call with the same filter; sampling within a small good-enough window
/// keeps results fresh while still biasing toward longer sessions.
pub const CANDIDATE_WINDOW: usize = 20;

/// Default retry budget when the picked session has no replay artifacts.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Front door for heatmap data: aggregation pass-throughs plus the
/// representative-session selector. Holds one store and one artifact
/// locator, both chosen at process start.
pub struct HeatmapService {
    store: Arc<dyn HeatmapStore>,
    artifacts: Arc<dyn ArtifactLocator>,
}

impl HeatmapService {
    pub fn new(store: Arc<dyn HeatmapStore>, artifacts: Arc<dyn ArtifactLocator>) -> Self {
        Self { store, artifacts }
    }

    /// Aggregate click points for a project/URL/time window.
    pub async fn click_points(
        &self,
        project_id: ProjectId,
        query: &HeatmapQuery,
    ) -> Result<Vec<HeatmapPoint>> {
        self.store.click_points(project_id, query).await
    }

    /// Aggregate click points for a single session and URL.
    pub async fn click_points_for_session(
        &self,
        project_id: ProjectId,
        session_id: SessionId,
        url: &str,
    ) -> Result<Vec<HeatmapPoint>> {
        self.store
            .click_points_for_session(project_id, session_id, url)
            .await
    }

    /// Clicked-selector histogram for a single session and URL.
    pub async fn selector_frequencies(
        &self,
        project_id: ProjectId,
        session_id: SessionId,
        url: &str,
    ) -> Result<Vec<SelectorFrequency>> {
        self.store
            .selector_frequencies(project_id, session_id, url)
            .await
    }

    /// Pick one session out of the filtered, time-bounded population that
    /// plausibly has replay data.
    ///
    /// The spec is normalized exactly once (copy-on-extend); retries reuse
    /// the normalized value so injected defaults are never duplicated. The
    /// exclusion set grows monotonically within this one call: a session
    /// rejected for missing artifacts is never reconsidered here. The
    /// random pick happens before artifact existence is known; an
    /// artifact-less pick costs one extra search round trip, bounded by
    /// `max_retries`.
    ///
    /// Empty population returns `Ok(None)`; the caller renders "no data".
    /// Exhausting retries is a degraded success: the last pick is returned
    /// without artifacts rather than failing the request.
    pub async fn select_representative_session(
        &self,
        spec: &SearchSpec,
        project_id: ProjectId,
        user_id: UserId,
        include_artifacts: bool,
        excluded: &HashSet<SessionId>,
        max_retries: u32,
    ) -> Result<Option<EnrichedSession>> {
        let spec = spec.normalized_for_selection();
        let mut excluded = excluded.clone();
        let mut retries_left = max_retries;

        loop {
            let candidates = self
                .store
                .search_sessions(&spec, project_id, user_id, CANDIDATE_WINDOW, &excluded)
                .await?;

            let Some(session) = candidates.choose(&mut rand::thread_rng()).cloned() else {
                debug!(project_id, "no session found for heatmap");
                return Ok(None);
            };

            let artifacts = if include_artifacts {
                self.artifacts.locate(session.session_id, project_id).await?
            } else {
                ReplayArtifacts::default()
            };

            if include_artifacts && artifacts.is_empty() {
                if retries_left > 0 {
                    excluded.insert(session.session_id);
                    retries_left -= 1;
                    continue;
                }
                info!(
                    session_id = session.session_id,
                    attempts = max_retries + 1,
                    "couldn't find an existing replay for heatmap, serving session without one"
                );
            }

            let events = self.store.navigation_events(session.session_id).await?;
            return Ok(Some(EnrichedSession {
                session,
                dom_urls: artifacts.dom_urls,
                legacy_mob_urls: artifacts.legacy_mob_urls,
                events,
                issue: None,
            }));
        }
    }

    /// Direct lookup by id. No filtering, no sampling, no retry. When the
    /// session has no replay artifacts the [`ISSUE_MOB_FILE_NOT_FOUND`]
    /// sentinel is set and the session is returned anyway.
    pub async fn selected_session(
        &self,
        project_id: ProjectId,
        session_id: SessionId,
    ) -> Result<Option<EnrichedSession>> {
        let Some(session) = self.store.session_by_id(project_id, session_id).await? else {
            return Ok(None);
        };

        let artifacts = self.artifacts.locate(session_id, project_id).await?;
        let issue = if artifacts.is_empty() {
            info!(session_id, "can't find selected mob file for heatmap");
            Some(ISSUE_MOB_FILE_NOT_FOUND.to_string())
        } else {
            None
        };

        let events = self.store.navigation_events(session_id).await?;
        Ok(Some(EnrichedSession {
            session,
            dom_urls: artifacts.dom_urls,
            legacy_mob_urls: artifacts.legacy_mob_urls,
            events,
            issue,
        }))
    }
}
