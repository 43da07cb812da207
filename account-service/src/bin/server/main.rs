use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use account_service::config::Config;
use account_service::domain::auth::ports::AuthServicePort;
use account_service::domain::auth::service::AuthService;
use account_service::inbound::http::client::TrustedProxies;
use account_service::inbound::http::router::create_router;
use account_service::outbound::repositories::PostgresAccountRepository;
use account_service::outbound::repositories::PostgresAccountRoleRepository;
use account_service::outbound::repositories::PostgresRefreshSessionRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "account-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        access_ttl_minutes = config.jwt.access_ttl_minutes,
        refresh_ttl_hours = config.jwt.refresh_ttl_hours,
        reuse_grace_seconds = config.sessions.reuse_grace_seconds,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let password_hasher = Arc::new(auth::PasswordHasher::with_params(
        config.argon2_params(),
        config.password.max_length,
    )?);
    let token_generator = Arc::new(auth::TokenGenerator::new(config.token_settings())?);

    let auth_service = Arc::new(
        AuthService::new(
            Arc::new(PostgresAccountRepository::new(pg_pool.clone())),
            Arc::new(PostgresAccountRoleRepository::new(pg_pool.clone())),
            Arc::new(PostgresRefreshSessionRepository::new(pg_pool)),
            password_hasher,
            token_generator,
        )
        .with_policy(config.session_policy()),
    );

    if config.sessions.cleanup_interval_seconds > 0 {
        let service = Arc::clone(&auth_service);
        let period = Duration::from_secs(config.sessions.cleanup_interval_seconds);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                if let Err(e) = service.purge_expired_sessions().await {
                    tracing::warn!(error = %e, "Expired session purge failed");
                }
            }
        });
        tracing::info!(
            interval_seconds = config.sessions.cleanup_interval_seconds,
            "Expired session purge scheduled"
        );
    }

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let trusted_proxies = TrustedProxies::new(config.server.trusted_proxies.clone());
    let http_application = create_router(auth_service, trusted_proxies);
    axum::serve(
        http_listener,
        http_application.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    tracing::info!("Server exited");

    Ok(())
}
