use ielts_tracker::config::{BackendKind, Config};
use ielts_tracker::memory::MemoryBackend;
use ielts_tracker::remote::{AppwriteBackend, Backend};
use ielts_tracker::{router, AppState};
use std::{net::SocketAddr, sync::Arc};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;

    let backend: Arc<dyn Backend> = match config.backend {
        BackendKind::Appwrite(settings) => {
            info!(endpoint = %settings.endpoint, project = %settings.project_id, "using appwrite backend");
            Arc::new(AppwriteBackend::new(settings)?)
        }
        BackendKind::Memory => {
            warn!("using in-memory backend; scores are lost on exit");
            Arc::new(MemoryBackend::new(&config.identities))
        }
    };

    let state = AppState::new(backend, config.identities);
    if state.tracker.restore().await.is_none() {
        info!("no active session");
    }

    let app = router(state);
    let addr = SocketAddr::from((config.host, config.port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
