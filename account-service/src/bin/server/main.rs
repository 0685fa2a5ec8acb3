use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use account_service::config::Config;
use account_service::domain::account::service::AccountService;
use account_service::inbound::http::router::create_router;
use account_service::outbound::repositories::user::PostgresUserRepository;
use anyhow::Context;
use auth::AuthGateway;
use auth::InMemoryStore;
use auth::KeyValueStore;
use auth::RateLimiter;
use auth::RedisStore;
use auth::SecretProvider;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "account_service=debug,auth=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "account-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;
    let run_mode = config.run_mode();

    tracing::info!(
        run_mode = %run_mode,
        http_port = config.server.http_port,
        redis_enabled = config.redis.enabled,
        rate_limit_policy = ?config.rate_limit.policy,
        "Configuration loaded"
    );

    let secret = SecretProvider::new(config.auth.secret.clone(), run_mode)
        .signing_secret()
        .context("Signing secret rejected")?;

    let store: Arc<dyn KeyValueStore> = if config.redis.enabled {
        let redis = RedisStore::connect(&config.redis.store_config())
            .await
            .context("Redis is enabled but unreachable")?;
        tracing::info!(pool_size = config.redis.pool_size, "Redis store connected");
        Arc::new(redis)
    } else {
        tracing::warn!("Redis disabled; revocations and sessions are local to this process");
        let memory = Arc::new(InMemoryStore::new());
        spawn_purge_task(Arc::clone(&memory));
        memory
    };

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool));
    let account_service = Arc::new(AccountService::new(user_repository));
    let gateway = Arc::new(AuthGateway::new(&secret, Arc::clone(&store)));
    let rate_limiter = RateLimiter::new(store, config.rate_limit.policy);

    let http_application =
        create_router(account_service, gateway, rate_limiter, &config.rate_limit);

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(
        http_listener,
        http_application.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn spawn_purge_task(store: Arc<InMemoryStore>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let purged = store.purge_expired();
            if purged > 0 {
                tracing::debug!(purged, remaining = store.len(), "Expired store entries purged");
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return std::future::pending().await;
    }
    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
