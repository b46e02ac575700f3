//! Heatlens: clickstream heatmap retrieval and representative-session
//! selection for session-replay analytics.
//!
//! The workspace splits into a storage-agnostic core, two interchangeable
//! store backends (columnar DuckDB, row-store PostgreSQL) and filesystem
//! replay-artifact location. This facade wires them together: backend
//! selection happens here, once, at process start, never inside the
//! selection algorithm.
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! heatlens::init_tracing()?;
//! let config = heatlens_core::config::Config::from_env().map_err(anyhow::Error::msg)?;
//! let service = heatlens::service_from_config(&config).await?;
//!
//! let spec = heatlens::search::SearchSpec::new(1_700_000_000_000, 1_700_003_600_000);
//! let session = service
//!     .select_representative_session(
//!         &spec,
//!         42,
//!         7,
//!         true,
//!         &Default::default(),
//!         heatlens::service::DEFAULT_MAX_RETRIES,
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

pub use heatlens_core::{
    artifacts, config, error, event, heatmap, search, service, session, store, HeatmapError,
    HeatmapService,
};

pub use heatlens_artifacts::{FsArtifactStore, NullArtifactLocator};
pub use heatlens_duckdb::DuckDbStore;
pub use heatlens_postgres::PgStore;

use heatlens_core::artifacts::ArtifactLocator;
use heatlens_core::config::{BackendKind, Config};
use heatlens_core::store::HeatmapStore;

/// Initialise structured JSON logging. Level controlled via `RUST_LOG`.
pub fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("heatlens=info".parse()?),
        )
        .json()
        .init();
    Ok(())
}

/// Open the configured clickstream store.
///
/// DuckDB opens (and migrates) an embedded database file under
/// `config.data_dir`; Postgres connects a pool and ensures the schema.
pub async fn open_store(config: &Config) -> Result<Arc<dyn HeatmapStore>> {
    match config.backend {
        BackendKind::DuckDb => {
            std::fs::create_dir_all(&config.data_dir)?;
            let db_path = format!("{}/heatlens.db", config.data_dir);
            let store = DuckDbStore::open(&db_path, &config.duckdb_memory_limit)?;
            info!(backend = "duckdb", path = %db_path, "clickstream store ready");
            Ok(Arc::new(store))
        }
        BackendKind::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("database_url required for the postgres backend"))?;
            let store = PgStore::connect(url).await?;
            store.ensure_schema().await?;
            info!(backend = "postgres", "clickstream store ready");
            Ok(Arc::new(store))
        }
    }
}

/// Build the filesystem artifact locator from config.
pub fn open_artifacts(config: &Config) -> Arc<dyn ArtifactLocator> {
    Arc::new(FsArtifactStore::new(
        &config.artifacts_dir,
        &config.artifacts_base_url,
    ))
}

/// Convenience: store + artifact locator + service in one call.
pub async fn service_from_config(config: &Config) -> Result<HeatmapService> {
    Ok(HeatmapService::new(
        open_store(config).await?,
        open_artifacts(config),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use heatlens_core::config::{BackendKind, Config};

    fn duckdb_config(dir: &str) -> Config {
        Config {
            backend: BackendKind::DuckDb,
            data_dir: dir.to_string(),
            duckdb_memory_limit: "512MB".to_string(),
            database_url: None,
            artifacts_dir: format!("{dir}/artifacts"),
            artifacts_base_url: "/artifacts".to_string(),
        }
    }

    #[tokio::test]
    async fn duckdb_store_opens_from_config() {
        let dir = std::env::temp_dir().join(format!("heatlens-facade-{}", std::process::id()));
        let dir = dir.to_string_lossy().to_string();
        let config = duckdb_config(&dir);

        let service = service_from_config(&config).await.expect("service");
        let points = service
            .click_points(1, &heatmap::HeatmapQuery::new("/", 0, 1))
            .await
            .expect("empty heatmap");
        assert!(points.is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn postgres_config_requires_database_url() {
        let mut config = duckdb_config("/tmp");
        config.backend = BackendKind::Postgres;
        config.database_url = None;
        let err = open_store(&config).await.err().expect("must fail");
        assert!(err.to_string().contains("database_url"));
    }
}
