use anyhow::Result;
use muxpanel::config::Config;
use muxpanel::tmux::TmuxBackend;
use muxpanel::web::{routes, AppManagers, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::Level;
use tracing_subscriber::{filter::EnvFilter, FmtSubscriber};

fn setup_logging(log_level_str: &str) {
    let level = match log_level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("muxpanel={}", level)));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_level(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().expect("Failed to load configuration.");
    setup_logging(&config.log_level);

    tracing::info!(version = %env!("CARGO_PKG_VERSION"), root = %config.servers_root.display(), "Starting muxpanel");

    if which::which(&config.tmux_bin).is_err() {
        tracing::warn!(bin = %config.tmux_bin, "tmux is not installed or not in PATH. Session operations will fail until it is available.");
    }

    let config = Arc::new(config);
    let backend = Arc::new(TmuxBackend::new(config.tmux_bin.clone()));
    let state = AppState {
        managers: Arc::new(AppManagers::new(config.clone(), backend)),
    };

    let mut app = routes::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    if let Some(static_dir) = &config.static_dir {
        if static_dir.exists() {
            tracing::info!(dir = %static_dir.display(), "Serving static files");
            app = app.nest_service("/static", ServeDir::new(static_dir));
        }
    }

    let addr: SocketAddr = format!("{}:{}", config.http_host, config.http_port).parse()?;
    tracing::info!(%addr, "HTTP facade listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    tracing::info!("Server shutdown.");
    Ok(())
}
