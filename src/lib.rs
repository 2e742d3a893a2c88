pub mod handlers;
pub mod models;
pub mod services;
pub mod subsystems;
pub mod traits;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio_graceful_shutdown::{SubsystemBuilder, SubsystemHandle, Toplevel};
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::services::analyzer::ImageAnalyzer;
use crate::services::gemini_api::GeminiVisionApi;
use crate::services::mode_selector::{is_credential_configured, select_backend};
use crate::services::settings::{AppConfig, LoggingConfig, load_config_with_env};
use crate::subsystems::http::HttpSubsystem;
use crate::traits::vision_api::VisionApi;

/// High-level entrypoint: load config, init logging, serve
pub async fn run_with_config_path(path: &str) -> Result<()> {
    let cfg = load_config_with_env(path).with_context(|| format!("Failed to load {}", path))?;
    init_logging(&cfg.logging);
    run_server(cfg).await
}

/// Console logging filtered by `RUST_LOG` (or the configured level), plus a
/// daily rolling file when `log_dir` is set.
pub fn init_logging(cfg: &LoggingConfig) {
    let log_spec = std::env::var("RUST_LOG").unwrap_or_else(|_| cfg.level.to_lowercase());
    let console = fmt::layer().with_target(false).compact();
    let file = cfg.log_dir.as_ref().map(|dir| {
        fmt::layer()
            .with_writer(RollingFileAppender::new(Rotation::DAILY, dir, "iris.log"))
            .with_ansi(false)
    });

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new(log_spec))
        .with(console)
        .with(file)
        .try_init();
}

/// Picks the operating mode once and wraps it in an analyzer.
pub fn build_analyzer(cfg: &AppConfig) -> ImageAnalyzer {
    let selection = select_backend(cfg.gemini.api_key.as_ref(), cfg.demo_mode, |key| {
        GeminiVisionApi::new(key, &cfg.gemini).map(|api| Arc::new(api) as Arc<dyn VisionApi>)
    });
    ImageAnalyzer::new(selection)
}

/// Server runner: selects the backend and serves HTTP until shutdown
pub async fn run_server(cfg: AppConfig) -> Result<()> {
    let key_configured = is_credential_configured(cfg.gemini.api_key.as_ref());
    let analyzer = Arc::new(build_analyzer(&cfg));

    info!(
        app = %cfg.app.name,
        version = %cfg.app.version,
        mode = %analyzer.mode(),
        model = %cfg.gemini.model,
        api_key_configured = key_configured,
        demo_mode = cfg.demo_mode,
        debug = cfg.server.debug,
        "starting"
    );
    if !key_configured {
        warn!("GEMINI_API_KEY not configured; add it to .env for live analysis");
    }

    let shutdown_timeout = Duration::from_secs(cfg.server.shutdown_timeout_secs);
    let http = HttpSubsystem::builder().config(cfg).analyzer(analyzer).build();

    Toplevel::new(async move |s: SubsystemHandle| {
        s.start(SubsystemBuilder::new("http", async move |mut h: SubsystemHandle| http.run(&mut h).await));
    })
    .catch_signals()
    .handle_shutdown_requests(shutdown_timeout)
    .await
    .map_err(Into::into)
}
