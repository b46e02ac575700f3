//! Runtime configuration, read from `HEATLENS_*` environment variables.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Embedded columnar analytics store.
    DuckDb,
    /// External row store.
    Postgres,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendKind,
    /// Directory holding the DuckDB database file.
    pub data_dir: String,
    /// DuckDB size string, e.g. "1GB" or "512MB".
    pub duckdb_memory_limit: String,
    /// Required when `backend` is [`BackendKind::Postgres`].
    pub database_url: Option<String>,
    /// Root directory of stored replay recordings.
    pub artifacts_dir: String,
    /// Public base URL prefixed onto located artifact paths.
    pub artifacts_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let backend = match std::env::var("HEATLENS_BACKEND")
            .unwrap_or_else(|_| "duckdb".to_string())
            .as_str()
        {
            "duckdb" => BackendKind::DuckDb,
            "postgres" => BackendKind::Postgres,
            other => {
                return Err(format!(
                    "HEATLENS_BACKEND must be 'duckdb' or 'postgres', got {other:?}"
                ))
            }
        };

        let database_url = std::env::var("HEATLENS_DATABASE_URL").ok();
        if backend == BackendKind::Postgres && database_url.is_none() {
            return Err("HEATLENS_DATABASE_URL required when HEATLENS_BACKEND=postgres".to_string());
        }

        Ok(Self {
            backend,
            data_dir: std::env::var("HEATLENS_DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
            duckdb_memory_limit: std::env::var("HEATLENS_DUCKDB_MEMORY")
                .unwrap_or_else(|_| "1GB".to_string()),
            database_url,
            artifacts_dir: std::env::var("HEATLENS_ARTIFACTS_DIR")
                .unwrap_or_else(|_| "./artifacts".to_string()),
            artifacts_base_url: std::env::var("HEATLENS_ARTIFACTS_BASE_URL")
                .unwrap_or_else(|_| "/artifacts".to_string()),
        })
    }
}
