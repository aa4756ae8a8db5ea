pub mod types;
pub mod config;
pub mod error;
pub mod store;
pub mod template;
pub mod graph;
pub mod resolve;
pub mod picks;
pub mod scoring;
pub mod schedule;
pub mod server;

use std::fs;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use store::Store;
use types::SharedStore;

// ── Entry point ────────────────────────────────────────────────────────

pub async fn run() {
    config::load_env_file();

    // Tracing goes to a daily-rolling file; RUST_LOG overrides the level.
    let logs_dir = config::repo_root().join("logs");
    fs::create_dir_all(&logs_dir).ok();
    let file_appender = tracing_appender::rolling::daily(&logs_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();
    info!("Bowl pick'em server starting");

    let app_config = config::load_config_inner().unwrap_or_else(|e| {
        warn!("{e}; falling back to defaults");
        config::apply_env_defaults(AppConfig::default())
    });

    let store: SharedStore = Arc::new(Mutex::new(Store::new()));

    if !app_config.schedule_path.trim().is_empty() {
        let path = config::resolve_repo_path(&app_config.schedule_path);
        if let Err(e) = schedule::load_schedule_file(&store, app_config.contest_id, &path) {
            warn!("startup schedule not loaded: {e}");
        }
    }

    server::serve(store, &app_config.bind_addr).await;
}
