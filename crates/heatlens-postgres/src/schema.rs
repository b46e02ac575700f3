//! PostgreSQL schema for the clickstream store.
//!
//! Same logical model as the columnar backend: BIGINT identifiers,
//! epoch-millisecond timestamps.

pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS sessions (
    project_id   BIGINT NOT NULL,
    session_id   BIGINT NOT NULL PRIMARY KEY,
    platform     TEXT   NOT NULL DEFAULT 'desktop',
    start_ts     BIGINT NOT NULL,
    duration     BIGINT NOT NULL,
    events_count BIGINT NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS events (
    project_id   BIGINT NOT NULL,
    session_id   BIGINT NOT NULL,
    message_id   BIGINT NOT NULL,
    timestamp    BIGINT NOT NULL,
    event_type   TEXT   NOT NULL,
    url_hostpath TEXT,
    url_path     TEXT,
    host         TEXT,
    path         TEXT,
    query        TEXT,
    selector     TEXT,
    normalized_x DOUBLE PRECISION,
    normalized_y DOUBLE PRECISION,
    issue_id     TEXT
);

CREATE TABLE IF NOT EXISTS issues (
    project_id BIGINT NOT NULL,
    issue_id   TEXT   NOT NULL PRIMARY KEY,
    issue_type TEXT   NOT NULL
);

CREATE TABLE IF NOT EXISTS bookmarks (
    user_id    BIGINT NOT NULL,
    project_id BIGINT NOT NULL,
    session_id BIGINT NOT NULL,
    PRIMARY KEY (user_id, session_id)
);

CREATE INDEX IF NOT EXISTS idx_events_session ON events (session_id);
CREATE INDEX IF NOT EXISTS idx_events_project_ts ON events (project_id, timestamp);
CREATE INDEX IF NOT EXISTS idx_sessions_project ON sessions (project_id);
"#;
