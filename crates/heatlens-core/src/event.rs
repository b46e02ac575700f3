//! Captured replay events and page-URL representations.

use serde::{Deserialize, Serialize};

use crate::session::{MessageId, ProjectId, SessionId};

/// Discriminator for captured replay events as stored by the backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Click,
    Location,
    Issue,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Click => "CLICK",
            EventKind::Location => "LOCATION",
            EventKind::Issue => "ISSUE",
        }
    }
}

/// Both URL representations stored for a captured page event.
///
/// Clicks and navigations keep `hostpath` ("example.com/pricing") and
/// `path` ("/pricing") side by side so a heatmap request can match either
/// form of the requested URL string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageUrl {
    pub host: String,
    pub path: String,
    pub hostpath: String,
    pub query: Option<String>,
}

impl PageUrl {
    pub fn parse(raw: &str) -> Result<Self, url::ParseError> {
        let parsed = url::Url::parse(raw)?;
        let host = parsed.host_str().unwrap_or_default().to_string();
        let path = parsed.path().to_string();
        Ok(Self {
            hostpath: format!("{host}{path}"),
            host,
            path,
            query: parsed.query().map(str::to_string),
        })
    }
}

/// One recorded event row, as produced by the recorder pipeline. Mirrors
/// the backends' `events` table; fields stay `None` for kinds they do not
/// apply to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedEvent {
    pub project_id: ProjectId,
    pub session_id: SessionId,
    pub message_id: MessageId,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub kind: EventKind,
    pub url_hostpath: Option<String>,
    pub url_path: Option<String>,
    pub host: Option<String>,
    pub path: Option<String>,
    pub query: Option<String>,
    pub selector: Option<String>,
    pub normalized_x: Option<f64>,
    pub normalized_y: Option<f64>,
    pub issue_id: Option<String>,
}

impl CapturedEvent {
    fn base(
        project_id: ProjectId,
        session_id: SessionId,
        message_id: MessageId,
        timestamp: i64,
        kind: EventKind,
    ) -> Self {
        Self {
            project_id,
            session_id,
            message_id,
            timestamp,
            kind,
            url_hostpath: None,
            url_path: None,
            host: None,
            path: None,
            query: None,
            selector: None,
            normalized_x: None,
            normalized_y: None,
            issue_id: None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn click(
        project_id: ProjectId,
        session_id: SessionId,
        message_id: MessageId,
        timestamp: i64,
        page: &PageUrl,
        selector: &str,
        normalized_x: Option<f64>,
        normalized_y: Option<f64>,
    ) -> Self {
        let mut ev = Self::base(project_id, session_id, message_id, timestamp, EventKind::Click);
        ev.url_hostpath = Some(page.hostpath.clone());
        ev.url_path = Some(page.path.clone());
        ev.selector = Some(selector.to_string());
        ev.normalized_x = normalized_x;
        ev.normalized_y = normalized_y;
        ev
    }

    pub fn location(
        project_id: ProjectId,
        session_id: SessionId,
        message_id: MessageId,
        timestamp: i64,
        page: &PageUrl,
    ) -> Self {
        let mut ev = Self::base(project_id, session_id, message_id, timestamp, EventKind::Location);
        ev.url_hostpath = Some(page.hostpath.clone());
        ev.url_path = Some(page.path.clone());
        ev.host = Some(page.host.clone());
        ev.path = Some(page.path.clone());
        ev.query = page.query.clone();
        ev
    }

    pub fn issue(
        project_id: ProjectId,
        session_id: SessionId,
        message_id: MessageId,
        timestamp: i64,
        issue_id: &str,
    ) -> Self {
        let mut ev = Self::base(project_id, session_id, message_id, timestamp, EventKind::Issue);
        ev.issue_id = Some(issue_id.to_string());
        ev
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_url_splits_host_and_path() {
        let page = PageUrl::parse("https://shop.example.com/pricing?plan=pro").expect("parse");
        assert_eq!(page.host, "shop.example.com");
        assert_eq!(page.path, "/pricing");
        assert_eq!(page.hostpath, "shop.example.com/pricing");
        assert_eq!(page.query.as_deref(), Some("plan=pro"));
    }

    #[test]
    fn page_url_root_path() {
        let page = PageUrl::parse("https://example.com").expect("parse");
        assert_eq!(page.path, "/");
        assert_eq!(page.hostpath, "example.com/");
        assert!(page.query.is_none());
    }

    #[test]
    fn page_url_rejects_garbage() {
        assert!(PageUrl::parse("not a url").is_err());
    }

    #[test]
    fn click_event_carries_both_url_forms() {
        let page = PageUrl::parse("https://example.com/pricing").expect("parse");
        let ev = CapturedEvent::click(42, 1, 10, 1_700_000_000_000, &page, "button.buy", Some(0.5), Some(0.5));
        assert_eq!(ev.kind, EventKind::Click);
        assert_eq!(ev.url_hostpath.as_deref(), Some("example.com/pricing"));
        assert_eq!(ev.url_path.as_deref(), Some("/pricing"));
        assert!(ev.issue_id.is_none());
    }
}
