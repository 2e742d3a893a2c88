use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use bon::Builder;
use tokio::net::TcpListener;
use tokio_graceful_shutdown::SubsystemHandle;
use tracing::info;

use crate::handlers::{AppState, router};
use crate::services::analyzer::ImageAnalyzer;
use crate::services::settings::AppConfig;

#[derive(Builder)]
pub struct HttpSubsystem {
    pub(crate) config: AppConfig,
    pub(crate) analyzer: Arc<ImageAnalyzer>,
}

impl HttpSubsystem {
    /// Binds the configured address and serves until the toplevel requests
    /// shutdown (Ctrl-C, SIGTERM or another subsystem failing).
    pub async fn run(self, subsys: &mut SubsystemHandle) -> Result<()> {
        info!("Starting HTTP subsystem");
        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;

        let token = subsys.create_cancellation_token();
        self.serve(listener, async move { token.cancelled().await }).await
    }

    /// Serves on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local = listener.local_addr()?;
        let state = AppState {
            analyzer: self.analyzer,
            config: Arc::new(self.config),
        };
        let app = router(state);

        info!(addr = %local, "HTTP server listening");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .context("HTTP server failed")?;
        info!("HTTP subsystem stopped");
        Ok(())
    }
}
