//! Walkie-talkie - one room, one speaker at a time.
//!
//! This is the main library crate for the walkie-talkie server. Authenticated
//! clients join a single room over WebSocket; one of them at a time may hold
//! the recorder lock and stream audio, which is relayed live to everyone else
//! and archived to disk.

pub mod archive;
pub mod commands;
pub mod config;
pub mod recorder;
pub mod room;
pub mod server;
pub mod session;
pub mod utils;

use anyhow::Context;
use archive::{ArchiveWriter, ArtifactStore, FsArtifactStore, RecordingIndex};
use config::ServerConfig;
use recorder::RoomCoordinator;
use server::AppState;
use session::StaticSessionDirectory;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utils::SystemClock;

/// Initialize tracing/logging
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "walkie_talkie_lib=debug,walkie_talkie=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the coordinator over a directory-backed archive
pub fn build_coordinator(store: FsArtifactStore, extension: &str) -> RoomCoordinator {
    let store: Arc<dyn ArtifactStore> = Arc::new(store);
    RoomCoordinator::new(
        ArchiveWriter::new(store.clone(), Arc::new(SystemClock), extension),
        RecordingIndex::new(store),
    )
}

/// Start the server and run until Ctrl-C
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    tracing::info!("Starting walkie-talkie v{}", env!("CARGO_PKG_VERSION"));

    let store = FsArtifactStore::new(&config.audio_dir);
    store
        .ensure_root()
        .await
        .with_context(|| format!("Failed to create audio directory {:?}", config.audio_dir))?;

    let sessions = StaticSessionDirectory::from_file(&config.sessions_file)
        .with_context(|| format!("Failed to load sessions from {:?}", config.sessions_file))?;

    let coordinator = build_coordinator(store, &config.artifact_extension);
    let state = AppState::new(coordinator, Arc::new(sessions));
    let app = server::router(state, &config.audio_dir);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!("Server is running on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server terminated unexpectedly")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
