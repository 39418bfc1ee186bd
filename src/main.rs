use codebuddy_server::core::{AppState, Config};
use codebuddy_server::create_router;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,codebuddy_server=debug")),
        )
        .init();

    let config = Config::from_env()?;
    config.print_info();

    let connect_options =
        SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);

    // Bounded acquire: a saturated pool surfaces as a retryable
    // transient error instead of a hung handler.
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect_with(connect_options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Migrations applied");

    let state = Arc::new(AppState::new(pool, config.jwt_secret.clone()));
    let app = create_router(state);

    let addr = SocketAddr::new(config.server_host.parse()?, config.server_port);
    info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
