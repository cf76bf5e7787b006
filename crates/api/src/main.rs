mod config;
mod error;
mod handlers;
mod routes;
mod state;

use coral_auth::{AuthService, JwtService, RoleService, UserService};
use coral_cache::{Cache, CacheAside};
use coral_database::{connect_primary, TenantConnectionManager};
use coral_tenant::{IdentityResolver, TenantDirectory};
use config::Config;
use state::AppState;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "info,coral_api=debug,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!(storage = config.storage.as_str(), "🚀 Starting coral-api");

    let primary = connect_primary(config.storage, &config.primary).await?;
    tracing::info!("✅ Primary database connected");

    let cache = Cache::new(config.cache.clone())?;
    if let Err(e) = cache.ping().await {
        tracing::warn!(error = %e, "cache unreachable at startup, continuing without it");
    } else {
        tracing::info!("✅ Cache connected");
    }

    let directory = TenantDirectory::new(
        primary.clone(),
        CacheAside::new(cache),
        config.environment,
    );
    let resolver = IdentityResolver::new(config.routing.clone(), primary);
    let connections = TenantConnectionManager::from_env(config.storage);
    let jwt = JwtService::from_env();

    let state = AppState {
        auth: AuthService::new(
            resolver.clone(),
            directory.clone(),
            connections.clone(),
            jwt,
        ),
        roles: RoleService::new(connections.clone()),
        users: UserService::new(connections),
        resolver,
        directory,
    };

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🌐 Listening on {}", addr);
    axum::serve(listener, routes::router(state)).await?;

    Ok(())
}
