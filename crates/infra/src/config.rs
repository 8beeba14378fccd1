use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Seconds between interval-triggered reminder sweeps
    pub sweep_interval_secs: u64,
    /// Optional bearer token for the Expo push API. Expo only requires one
    /// for accounts with enhanced security enabled.
    pub expo_access_token: Option<String>,
    /// Postgres connection string. When absent the service runs against
    /// in-memory record stores.
    pub database_url: Option<String>,
    /// Upper bound on one push gateway chunk submission
    pub push_timeout: Duration,
    /// Upper bound on one record store write during schedule commit
    pub store_timeout: Duration,
}

impl Config {
    pub fn new() -> Self {
        let default_port = "5000";
        let port = std::env::var("PORT").unwrap_or_else(|_| default_port.into());
        let port = match port.parse::<usize>() {
            Ok(port) => port,
            Err(_) => {
                warn!(
                    "The given PORT: {} is not valid, falling back to the default port: {}.",
                    port, default_port
                );
                default_port.parse::<usize>().unwrap()
            }
        };

        let default_sweep_interval = "300";
        let sweep_interval = std::env::var("REMINDER_SWEEP_INTERVAL")
            .unwrap_or_else(|_| default_sweep_interval.into());
        let sweep_interval_secs = match sweep_interval.parse::<u64>() {
            Ok(secs) if secs > 0 => secs,
            _ => {
                warn!(
                    "The given REMINDER_SWEEP_INTERVAL: {} is not valid, falling back to the default: {} seconds.",
                    sweep_interval, default_sweep_interval
                );
                default_sweep_interval.parse::<u64>().unwrap()
            }
        };

        let expo_access_token = match std::env::var("EXPO_ACCESS_TOKEN") {
            Ok(token) if !token.is_empty() => Some(token),
            _ => {
                info!("Did not find EXPO_ACCESS_TOKEN environment variable. Push submissions will be unauthenticated.");
                None
            }
        };

        let database_url = std::env::var("DATABASE_URL").ok();

        Self {
            port,
            sweep_interval_secs,
            expo_access_token,
            database_url,
            push_timeout: Duration::from_secs(10),
            store_timeout: Duration::from_secs(5),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
