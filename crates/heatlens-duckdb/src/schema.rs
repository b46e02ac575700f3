//! DuckDB schema for the clickstream store.
//!
//! Identifier columns are BIGINT; the Rust layer converts to the unsigned
//! core id types at the edges. `timestamp`, `start_ts` and `duration` are
//! epoch/interval milliseconds.

/// Schema + settings batch run at open time. `memory_limit` is a DuckDB
/// size string such as "1GB" or "512MB".
pub fn init_sql(memory_limit: &str) -> String {
    format!(
        r#"
SET memory_limit = '{memory_limit}';
SET threads TO 2;

CREATE TABLE IF NOT EXISTS sessions (
    project_id   BIGINT  NOT NULL,
    session_id   BIGINT  NOT NULL,
    platform     VARCHAR NOT NULL DEFAULT 'desktop',
    start_ts     BIGINT  NOT NULL,
    duration     BIGINT  NOT NULL,
    events_count BIGINT  NOT NULL DEFAULT 0,
    PRIMARY KEY (session_id)
);

CREATE TABLE IF NOT EXISTS events (
    project_id   BIGINT  NOT NULL,
    session_id   BIGINT  NOT NULL,
    message_id   BIGINT  NOT NULL,
    timestamp    BIGINT  NOT NULL,
    event_type   VARCHAR NOT NULL,
    url_hostpath VARCHAR,
    url_path     VARCHAR,
    host         VARCHAR,
    path         VARCHAR,
    query        VARCHAR,
    selector     VARCHAR,
    normalized_x DOUBLE,
    normalized_y DOUBLE,
    issue_id     VARCHAR
);

CREATE TABLE IF NOT EXISTS issues (
    project_id BIGINT  NOT NULL,
    issue_id   VARCHAR NOT NULL,
    issue_type VARCHAR NOT NULL,
    PRIMARY KEY (issue_id)
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
"#
    )
}

#[cfg(test)]
mod tests {
    use super::init_sql;

    #[test]
    fn init_sql_embeds_memory_limit() {
        let sql = init_sql("512MB");
        assert!(sql.contains("SET memory_limit = '512MB'"));
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS events"));
    }
}
