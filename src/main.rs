use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use places_api::config::AppConfig;
use places_api::database::DatabaseManager;
use places_api::geocoding::GoogleGeocoder;

#[derive(Parser)]
#[command(name = "places-api")]
#[command(about = "REST backend for sharing geotagged places")]
#[command(version)]
struct Cli {
    #[arg(long, help = "Port to listen on (overrides PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Do not apply database migrations on startup")]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("places_api=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env();
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    tracing::info!("Starting Places API in {:?} mode", config.environment);
    if config.is_development() && std::env::var("JWT_SECRET").is_err() {
        tracing::warn!("JWT_SECRET not set, signing tokens with the development secret");
    }

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;

    if cli.skip_migrations {
        tracing::info!("Skipping database migrations");
    } else {
        DatabaseManager::migrate(&pool).await.context("failed to apply migrations")?;
    }

    let geocoder = GoogleGeocoder::new(&config.geocoding).context("invalid geocoding configuration")?;
    let state = places_api::build_state(&config, pool, Arc::new(geocoder)).context("invalid security configuration")?;

    state
        .images
        .ensure_dir()
        .await
        .with_context(|| format!("failed to create upload directory {}", state.images.dir().display()))?;

    let app = places_api::server::app(state, &config.server);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("Places API listening on http://{}", addr);
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
