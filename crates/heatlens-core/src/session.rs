//! Session identity and enrichment types.

use serde::{Deserialize, Serialize};

pub type ProjectId = u32;
pub type SessionId = u64;
pub type UserId = u64;
pub type MessageId = u64;

/// Sentinel stored in [`EnrichedSession::issue`] when a session has no
/// replay artifacts left in storage. Soft-fail marker, not an error.
pub const ISSUE_MOB_FILE_NOT_FOUND: &str = "mob file not found";

/// Event type reported for navigation entries.
pub const NAVIGATION_EVENT_TYPE: &str = "LOCATION";

/// Minimal session identity/time projection. Created fresh per query,
/// never persisted by this module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub project_id: ProjectId,
    pub session_id: SessionId,
    /// Epoch milliseconds.
    pub start_ts: i64,
    /// Milliseconds.
    pub duration: i64,
}

/// The stored session row as written by the recorder pipeline. Mirrors the
/// backends' `sessions` table; used by ingestion helpers and test fixtures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub project_id: ProjectId,
    pub session_id: SessionId,
    pub platform: String,
    /// Epoch milliseconds.
    pub start_ts: i64,
    /// Milliseconds.
    pub duration: i64,
    pub events_count: i64,
}

impl SessionRecord {
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            project_id: self.project_id,
            session_id: self.session_id,
            start_ts: self.start_ts,
            duration: self.duration,
        }
    }
}

/// One page-navigation event, ordered by `(timestamp, message_id)`.
///
/// `value` and `url` mirror `path`; the replay player consumes either key
/// depending on the timeline widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationEvent {
    pub message_id: MessageId,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub host: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub value: String,
    pub url: String,
    #[serde(rename = "type")]
    pub event_type: String,
}

impl NavigationEvent {
    /// Build a navigation event from the raw page columns, deriving the
    /// `value`/`url` mirrors of `path`.
    pub fn from_page(
        message_id: MessageId,
        timestamp: i64,
        host: String,
        path: String,
        query: Option<String>,
    ) -> Self {
        Self {
            message_id,
            timestamp,
            host,
            value: path.clone(),
            url: path.clone(),
            path,
            query,
            event_type: NAVIGATION_EVENT_TYPE.to_string(),
        }
    }
}

/// A session summary enriched with replay artifact URLs and navigation
/// events, ready to drive the heatmap overlay plus the replay player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedSession {
    #[serde(flatten)]
    pub session: SessionSummary,
    pub dom_urls: Vec<String>,
    pub legacy_mob_urls: Vec<String>,
    pub events: Vec<NavigationEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_event_mirrors_path() {
        let ev = NavigationEvent::from_page(7, 1_700_000_000_000, "shop.example.com".into(), "/pricing".into(), Some("ref=nav".into()));
        assert_eq!(ev.value, "/pricing");
        assert_eq!(ev.url, "/pricing");
        assert_eq!(ev.event_type, NAVIGATION_EVENT_TYPE);
    }

    #[test]
    fn issue_sentinel_is_omitted_when_absent() {
        let enriched = EnrichedSession {
            session: SessionSummary {
                project_id: 1,
                session_id: 2,
                start_ts: 0,
                duration: 1000,
            },
            dom_urls: vec![],
            legacy_mob_urls: vec![],
            events: vec![],
            issue: None,
        };
        let json = serde_json::to_value(&enriched).expect("serialize");
        assert!(json.get("issue").is_none());
        assert_eq!(json["session_id"], 2);
    }
}
