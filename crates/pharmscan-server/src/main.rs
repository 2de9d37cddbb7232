mod api;
mod middleware;

use std::sync::Arc;
use std::time::Duration;

use pharmscan_scraper::{PriceSearch, ResultCache};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, default_rate_limit_state, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = pharmscan_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let search = Arc::new(PriceSearch::from_app_config(&config)?);
    let enabled = search.registry().enabled().count();
    tracing::info!(
        env = %config.env,
        sources_path = %config.sources_path.display(),
        enabled_sources = enabled,
        "source registry ready"
    );

    let purge_every = Duration::from_secs(config.cache_ttl_secs.clamp(60, 900));
    tokio::spawn(purge_expired_entries(Arc::clone(&search), purge_every));

    let app = build_app(AppState { search }, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Periodically drops expired cache entries so memory tracks the live set.
async fn purge_expired_entries(search: Arc<PriceSearch>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let cache: &ResultCache = search.cache();
        let removed = cache.purge_expired();
        if removed > 0 {
            tracing::debug!(removed, remaining = cache.len(), "purged expired cache entries");
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
