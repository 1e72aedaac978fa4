use tracing::info;
use tracing_subscriber::EnvFilter;

use worms_arena_server::config::ServerConfig;
use worms_arena_server::server::session::Session;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Worms Arena Server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = ServerConfig::load_or_default();
    config.validate()?;
    info!(
        "Configuration loaded: {}x{} map, {} players, {} ms period, {:?}",
        config.map_width, config.map_height, config.max_players, config.period_millis, config.game_type
    );

    let session = Session::new(&config);

    // Shutdown signal handler
    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => {
                tracing::error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await
            }
        }
    };

    let session = session.run(shutdown).await;
    info!(
        "Server stopped after {} ticks ({}s simulated)",
        session.engine().ticks(),
        session.elapsed().as_secs()
    );

    Ok(())
}
