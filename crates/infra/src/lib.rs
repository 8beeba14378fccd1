mod config;
mod repos;
mod services;
mod system;

pub use config::Config;
pub use repos::{
    INotificationLogRepo, INotificationUserRepo, IReminderRepo, IUserPlantRepo, Repos,
};
pub use services::*;
use std::sync::Arc;
pub use system::ISys;
use system::RealSys;
use tokio::sync::Mutex;
use tracing::info;

/// Everything a use case needs to run: record stores, configuration, the
/// clock and the push transport. Cloning is cheap, all members are shared.
#[derive(Clone)]
pub struct SproutContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub push: Arc<dyn IPushGateway>,
    /// Held for the duration of a reminder sweep so that overlapping
    /// triggers cannot dispatch and advance the same reminder twice
    pub sweep_lock: Arc<Mutex<()>>,
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> SproutContext {
    let config = Config::new();
    let repos = match config.database_url.clone() {
        Some(connection_string) => Repos::create_postgres(&connection_string)
            .await
            .expect("Postgres credentials must be valid"),
        None => {
            info!("DATABASE_URL not set. Using in-memory record stores.");
            Repos::create_inmemory()
        }
    };
    let push = Arc::new(ExpoPushGateway::new(
        config.expo_access_token.clone(),
        config.push_timeout,
    ));

    SproutContext {
        repos,
        config,
        sys: Arc::new(RealSys {}),
        push,
        sweep_lock: Arc::new(Mutex::new(())),
    }
}

/// Context backed entirely by in-memory implementations. Used by tests,
/// which typically swap `sys` and `push` for instrumented versions.
pub fn setup_context_inmemory() -> SproutContext {
    let config = Config::new();
    let push = Arc::new(InMemoryPushGateway::new(100));

    SproutContext {
        repos: Repos::create_inmemory(),
        config,
        sys: Arc::new(RealSys {}),
        push,
        sweep_lock: Arc::new(Mutex::new(())),
    }
}
