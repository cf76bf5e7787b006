use coral_cache::CacheConfig;
use coral_database::{PrimaryConfig, StorageKind};
use coral_tenant::{Environment, RoutingConfig};

/// Process configuration, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub storage: StorageKind,
    pub primary: PrimaryConfig,
    pub cache: CacheConfig,
    pub routing: RoutingConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            storage: StorageKind::from_env(),
            primary: PrimaryConfig::from_env(),
            cache: CacheConfig::from_env(),
            routing: RoutingConfig::from_env(),
            environment: Environment::from_env(),
        }
    }
}
