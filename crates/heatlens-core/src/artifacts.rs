//! Replay artifact location contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::session::{ProjectId, SessionId};

/// URLs of a session's stored replay recordings. Both lists may be empty;
/// emptiness of both is the "no artifacts" condition the selector retries
/// on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayArtifacts {
    /// DOM snapshot stream chunks, in playback order.
    pub dom_urls: Vec<String>,
    /// Legacy single-file recordings.
    pub legacy_mob_urls: Vec<String>,
}

impl ReplayArtifacts {
    pub fn is_empty(&self) -> bool {
        self.dom_urls.is_empty() && self.legacy_mob_urls.is_empty()
    }
}

/// Reports whether recorded replay artifacts exist for a session.
///
/// Artifacts may be pruned or expired independently of session metadata,
/// which is why the selector has to probe after picking.
#[async_trait]
pub trait ArtifactLocator: Send + Sync + 'static {
    async fn locate(&self, session_id: SessionId, project_id: ProjectId)
        -> Result<ReplayArtifacts>;
}
