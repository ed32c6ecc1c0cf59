//! Application state wiring all services together.
//!
//! Core services are generic over the `MessageStore` trait; AppState pins
//! them to the concrete SQLite implementation from `platewire-infra`.

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use platewire_core::registry::SessionRegistry;
use platewire_core::replay::HistoryReplayer;
use platewire_core::router::MessageRouter;
use platewire_infra::auth::AuthGate;
use platewire_infra::config::{load_config, resolve_data_dir};
use platewire_infra::sqlite::message::SqliteMessageStore;
use platewire_infra::sqlite::pool::DatabasePool;
use platewire_types::config::ServerConfig;

/// Concrete type aliases for the service generics pinned to the SQLite store.
pub type ConcreteReplayer = HistoryReplayer<SqliteMessageStore>;
pub type ConcreteRouter = MessageRouter<SqliteMessageStore>;

/// Shared application state for the WebSocket handlers and CLI commands.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    pub replayer: Arc<ConcreteReplayer>,
    pub router: Arc<ConcreteRouter>,
    pub auth: Arc<AuthGate>,
    pub config: Arc<ServerConfig>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
    /// Cancelled on shutdown; live connection loops watch it.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Initialize the application state: load config, connect to the
    /// database, wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_config(&data_dir).await;

        let db_url = format!(
            "sqlite://{}?mode=rwc",
            data_dir.join("platewire.db").display()
        );
        let db_pool = DatabasePool::new(&db_url).await?;

        let store = Arc::new(SqliteMessageStore::new(db_pool.clone()));
        let registry = Arc::new(SessionRegistry::new());
        let replayer = Arc::new(HistoryReplayer::new(store.clone(), config.replay_limit));
        let router = Arc::new(MessageRouter::new(store, registry.clone()));
        let auth = Arc::new(AuthGate::new(config.auth.secret.as_bytes()));

        Ok(Self {
            registry,
            replayer,
            router,
            auth,
            config: Arc::new(config),
            data_dir,
            db_pool,
            shutdown: CancellationToken::new(),
        })
    }
}
