//! Builder for creating and configuring Gateway instances.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use log::debug;
use tokio::task;

use super::{Gateway, GatewayConfig};
use crate::{
    cache::PlanCache,
    db::Database,
    error::{GatewayError, Result},
    incidents::IncidentStore,
    prompt::PromptTemplate,
    ratelimit::RateLimiter,
    store::{KvStore, MemoryStore, SqliteStore},
    upstream::{ChatBackend, HttpChatBackend, UpstreamClient},
};

/// Builder for creating and configuring Gateway instances.
#[derive(Clone, Default)]
pub struct GatewayBuilder {
    database_path: Option<PathBuf>,
    in_memory: bool,
    backend: Option<Arc<dyn ChatBackend>>,
    config: GatewayConfig,
    skip_plan_cache: bool,
    skip_incident_store: bool,
    skip_rate_limit: bool,
}

impl GatewayBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/rescue/rescue.db` or `~/.local/share/rescue/rescue.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Keeps all state in process memory instead of SQLite.
    pub fn with_memory_store(mut self) -> Self {
        self.in_memory = true;
        self
    }

    /// Uses `backend` for completions instead of the HTTP client.
    pub fn with_backend(mut self, backend: Arc<dyn ChatBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_config(mut self, config: GatewayConfig) -> Self {
        self.config = config;
        self
    }

    /// Disables plan caching; every request calls the model.
    pub fn without_plan_cache(mut self) -> Self {
        self.skip_plan_cache = true;
        self
    }

    /// Leaves the incident endpoints unbound.
    pub fn without_incident_store(mut self) -> Self {
        self.skip_incident_store = true;
        self
    }

    /// Disables per-caller rate limiting.
    pub fn without_rate_limit(mut self) -> Self {
        self.skip_rate_limit = true;
        self
    }

    /// Builds the configured gateway.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::FileSystem` if the database directory cannot
    /// be created, `GatewayError::Storage` if database initialization fails,
    /// and `GatewayError::Configuration` if the HTTP client cannot be built.
    pub async fn build(self) -> Result<Gateway> {
        let store: Arc<dyn KvStore> = if self.in_memory {
            debug!("Using in-memory store");
            Arc::new(MemoryStore::new())
        } else {
            let db_path = match self.database_path {
                Some(path) => path,
                None => Self::default_database_path()?,
            };
            Arc::new(Self::open_sqlite(db_path).await?)
        };

        let upstream = match self.backend {
            Some(backend) => Some(backend),
            None => match &self.config.api_key {
                Some(key) => Some(Arc::new(HttpChatBackend::new(
                    self.config.upstream_url.as_str(),
                    key.as_str(),
                    self.config.timeout,
                )?) as Arc<dyn ChatBackend>),
                None => None,
            },
        }
        .map(UpstreamClient::new);

        Ok(Gateway {
            incidents: (!self.skip_incident_store).then(|| IncidentStore::new(store.clone())),
            plans: (!self.skip_plan_cache).then(|| PlanCache::new(store.clone())),
            limiter: RateLimiter::new((!self.skip_rate_limit).then_some(store)),
            upstream,
            prompt: PromptTemplate::standard(),
            config: self.config,
        })
    }

    async fn open_sqlite(db_path: PathBuf) -> Result<SqliteStore> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| GatewayError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let db_path_clone = db_path.clone();
        task::spawn_blocking(move || {
            let _db = Database::new(&db_path_clone)?;
            Ok::<(), GatewayError>(())
        })
        .await
        .map_err(GatewayError::join)??;

        debug!("Using database at {}", db_path.display());
        Ok(SqliteStore::new(db_path))
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("rescue")
            .place_data_file("rescue.db")
            .map_err(|e| GatewayError::XdgDirectory(e.to_string()))
    }
}
