//! Replay artifact locators.
//!
//! Recordings live outside the analytics store and are pruned on their own
//! retention schedule, so locating them is a filesystem/object-storage
//! concern, not a database query.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use heatlens_core::artifacts::{ArtifactLocator, ReplayArtifacts};
use heatlens_core::error::{HeatmapError, Result};
use heatlens_core::session::{ProjectId, SessionId};

/// First DOM snapshot stream file of a recording.
const DOM_FILE: &str = "dom.mob";
/// Subdirectory holding legacy single-file recordings.
const LEGACY_DIR: &str = "legacy";

/// Locates recordings on a local (or mounted) filesystem.
///
/// Layout: DOM snapshot streams at
/// `{root}/{project_id}/{session_id}/dom.mob` with overflow chunks
/// `dom.mobe1`, `dom.mobe2`, … and legacy recordings at
/// `{root}/legacy/{session_id}.mob`. Returned URLs are the configured
/// public base joined with the relative artifact path.
pub struct FsArtifactStore {
    root: PathBuf,
    base_url: String,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            root: root.into(),
            base_url,
        }
    }

    fn url(&self, relative: &str) -> String {
        format!("{}/{relative}", self.base_url)
    }

    async fn exists(
        &self,
        path: &Path,
        session_id: SessionId,
        project_id: ProjectId,
    ) -> Result<bool> {
        fs::try_exists(path)
            .await
            .map_err(|e| HeatmapError::artifacts(session_id, project_id, e))
    }

    async fn dom_urls(&self, session_id: SessionId, project_id: ProjectId) -> Result<Vec<String>> {
        let dir = self.root.join(project_id.to_string()).join(session_id.to_string());
        let mut urls = Vec::new();

        if !self.exists(&dir.join(DOM_FILE), session_id, project_id).await? {
            return Ok(urls);
        }
        urls.push(self.url(&format!("{project_id}/{session_id}/{DOM_FILE}")));

        // Overflow chunks are numbered contiguously from 1.
        let mut chunk = 1u32;
        loop {
            let name = format!("{DOM_FILE}e{chunk}");
            if !self.exists(&dir.join(&name), session_id, project_id).await? {
                break;
            }
            urls.push(self.url(&format!("{project_id}/{session_id}/{name}")));
            chunk += 1;
        }
        Ok(urls)
    }

    async fn legacy_urls(
        &self,
        session_id: SessionId,
        project_id: ProjectId,
    ) -> Result<Vec<String>> {
        let name = format!("{session_id}.mob");
        let path = self.root.join(LEGACY_DIR).join(&name);
        if self.exists(&path, session_id, project_id).await? {
            Ok(vec![self.url(&format!("{LEGACY_DIR}/{name}"))])
        } else {
            Ok(vec![])
        }
    }
}

#[async_trait]
impl ArtifactLocator for FsArtifactStore {
    async fn locate(
        &self,
        session_id: SessionId,
        project_id: ProjectId,
    ) -> Result<ReplayArtifacts> {
        let dom_urls = self.dom_urls(session_id, project_id).await?;
        let legacy_mob_urls = self.legacy_urls(session_id, project_id).await?;
        debug!(
            session_id,
            dom = dom_urls.len(),
            legacy = legacy_mob_urls.len(),
            "located replay artifacts"
        );
        Ok(ReplayArtifacts {
            dom_urls,
            legacy_mob_urls,
        })
    }
}

/// Locator that never finds artifacts. For heatmap-only deployments and
/// tests that exercise the no-replay path.
pub struct NullArtifactLocator;

#[async_trait]
impl ArtifactLocator for NullArtifactLocator {
    async fn locate(
        &self,
        _session_id: SessionId,
        _project_id: ProjectId,
    ) -> Result<ReplayArtifacts> {
        Ok(ReplayArtifacts::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(path, b"mob").expect("write");
    }

    #[tokio::test]
    async fn locates_dom_chunks_in_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        touch(&root.join("42/7/dom.mob"));
        touch(&root.join("42/7/dom.mobe1"));
        touch(&root.join("42/7/dom.mobe2"));

        let store = FsArtifactStore::new(root, "https://replay.example.com/mobs/");
        let artifacts = store.locate(7, 42).await.expect("locate");

        assert_eq!(
            artifacts.dom_urls,
            vec![
                "https://replay.example.com/mobs/42/7/dom.mob".to_string(),
                "https://replay.example.com/mobs/42/7/dom.mobe1".to_string(),
                "https://replay.example.com/mobs/42/7/dom.mobe2".to_string(),
            ]
        );
        assert!(artifacts.legacy_mob_urls.is_empty());
    }

    #[tokio::test]
    async fn chunk_gap_stops_discovery() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        touch(&root.join("42/7/dom.mob"));
        touch(&root.join("42/7/dom.mobe2")); // no e1

        let store = FsArtifactStore::new(root, "/mobs");
        let artifacts = store.locate(7, 42).await.expect("locate");
        assert_eq!(artifacts.dom_urls.len(), 1);
    }

    #[tokio::test]
    async fn falls_back_to_legacy_recording() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        touch(&root.join("legacy/7.mob"));

        let store = FsArtifactStore::new(root, "/mobs");
        let artifacts = store.locate(7, 42).await.expect("locate");

        assert!(artifacts.dom_urls.is_empty());
        assert_eq!(artifacts.legacy_mob_urls, vec!["/mobs/legacy/7.mob".to_string()]);
        assert!(!artifacts.is_empty());
    }

    #[tokio::test]
    async fn missing_session_yields_empty_artifacts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsArtifactStore::new(dir.path(), "/mobs");
        let artifacts = store.locate(999, 42).await.expect("locate");
        assert!(artifacts.is_empty());
    }

    #[tokio::test]
    async fn null_locator_always_empty() {
        let artifacts = NullArtifactLocator.locate(1, 1).await.expect("locate");
        assert!(artifacts.is_empty());
    }
}
