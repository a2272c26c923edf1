use clap::Parser;
use quran_search_api::{build_router, with_rate_limit, ApiState, Config};
use quran_search_lib::AppState;
use std::net::SocketAddr;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::parse();
    let state_config = config.state_config();
    info!(dataset = %state_config.dataset_path.display(), "Starting Quran Search API");

    let state = match AppState::load(&state_config) {
        Ok(app) => {
            let corpus = app.search_engine.corpus();
            info!(
                chapters = corpus.chapter_count(),
                verses = corpus.verse_count(),
                "Corpus ready"
            );
            ApiState::ready(app)
        }
        Err(e) => {
            // Keep serving so health checks can report the fault.
            error!(error = %e, "Corpus failed to load; search routes will answer 503");
            ApiState::unavailable(e.to_string())
        }
    };

    let mut app = build_router(state);
    if let Some(per_second) = config.rate_limit_per_second {
        app = with_rate_limit(app, per_second, config.rate_limit_burst)?;
        info!(per_second, burst = config.rate_limit_burst, "Rate limiting enabled");
    }

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!("Listening on http://{}", config.bind);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("quran_search_api=info,quran_search_lib=info,tower_http=info,info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
