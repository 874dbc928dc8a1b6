//! Lily back-office client.
//!
//! Typed access to the distribution back-office REST API (customers,
//! orders, materials, inventory, bottle labels, fuel, trips, vehicles, users,
//! employees), the signed-in session, and the local receipt-printer agent.
//!
//! ```no_run
//! # async fn run() -> lily_backoffice::ApiResult<()> {
//! use lily_backoffice::{resources::customers, Backoffice, ClientConfig};
//!
//! let backoffice = Backoffice::from_config(&ClientConfig::from_env())?;
//! lily_backoffice::resources::auth::login(backoffice.api(), "caja1", "secret").await?;
//! let page = customers::list(backoffice.api(), &Default::default()).await?;
//! # let _ = page;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod print_agent;
pub mod resources;
pub mod session;
pub mod storage;
pub mod stores;
pub mod token;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use api::{ApiClient, QueryParams, RequestOptions};
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult, StorageError};
pub use print_agent::{PrintAgent, PrintError};
pub use session::{LoginSession, SessionPhase, SessionSnapshot, SessionStore};
pub use storage::{CredentialStore, KeyringStore, MemoryStore};

/// Everything a back-office screen needs: the API client (with its session)
/// and the print agent.
#[derive(Clone)]
pub struct Backoffice {
    api: ApiClient,
    printer: PrintAgent,
}

impl Backoffice {
    /// Build with the OS keyring as credential store and hydrate any
    /// persisted session.
    pub fn from_config(config: &ClientConfig) -> ApiResult<Self> {
        let storage = Arc::new(KeyringStore::new(config.keyring_service.clone()));
        Self::with_storage(config, storage)
    }

    pub fn with_storage(
        config: &ClientConfig,
        storage: Arc<dyn CredentialStore>,
    ) -> ApiResult<Self> {
        let session = Arc::new(SessionStore::new(storage));
        session.initialize();

        let api = ApiClient::new(config, session)?;
        let printer =
            PrintAgent::new(config).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

        info!(api_url = %config.api_url, print_agent = %config.print_agent_url, "backoffice client ready");
        Ok(Self { api, printer })
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn printer(&self) -> &PrintAgent {
        &self.printer
    }

    pub fn session(&self) -> &SessionStore {
        self.api.session()
    }
}

/// Install console and daily-rolling file logging.
///
/// `RUST_LOG` overrides the default filter. Returns `false` when a global
/// subscriber was already installed.
pub fn init_logging(config: &ClientConfig) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lily_backoffice=debug"));

    let log_dir = &config.log_dir;
    std::fs::create_dir_all(log_dir).ok();
    let pruned = diagnostics::prune_old_logs(log_dir);

    let file_appender = tracing_appender::rolling::daily(log_dir, diagnostics::LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);
    let console_layer = fmt::layer().with_target(true);
    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .is_ok();

    if installed {
        // Dropping the guard stops the writer thread; logging lasts until exit.
        std::mem::forget(guard);
        info!(
            version = env!("CARGO_PKG_VERSION"),
            git_sha = env!("BUILD_GIT_SHA"),
            log_dir = %log_dir.display(),
            pruned,
            "Starting Lily back-office client"
        );
    }
    installed
}
