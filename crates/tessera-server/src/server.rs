//! HTTP server lifecycle.

use std::sync::Arc;
use tessera_core::TesseraConfig;
use tessera_pg::{ConnectionRouter, UserRepository};
use tokio::net::TcpListener;

use crate::routes;
use crate::state::AppState;

/// The Tessera HTTP server.
pub struct TesseraServer {
    config: TesseraConfig,
}

impl TesseraServer {
    pub fn new(config: TesseraConfig) -> Self {
        Self { config }
    }

    /// Connect to the database and serve until Ctrl-C.
    pub async fn run(&self) -> anyhow::Result<()> {
        let router = ConnectionRouter::connect(&self.config.upstream).await?;
        router.provisioner().prepare_default().await?;

        let state = AppState::new(&self.config, Arc::new(UserRepository::new(router)));
        let app = routes::create_router(state);

        let addr = self.config.server.bind_address();
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!(address = %addr, "tessera listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("tessera stopped");
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        self.config.server.bind_address()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
