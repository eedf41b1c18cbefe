use log::{error, info};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::api::{self, AppState};
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::storage::ServedRoot;
use crate::utils::network::access_urls;

pub struct Server {
    listener: TcpListener,
    state: AppState,
    config: ServerConfig,
}

impl Server {
    /// Resolve the served root and bind the listener. Both failures are fatal.
    pub async fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let root = ServedRoot::new(&config.serve_dir).map_err(|e| {
            error!("Invalid served directory {}: {}", config.serve_dir, e);
            ServerError::InvalidRoot(config.serve_dir.clone().into(), e)
        })?;
        info!("Serving directory {}", root.path().display());

        let addr = config.listen_addr();
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            error!("Failed to bind to {}: {}", addr, e);
            ServerError::Bind(addr.clone(), e)
        })?;
        info!("Server bound to {}", addr);

        let state = AppState::from_config(root, &config);

        Ok(Self {
            listener,
            state,
            config,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve requests until Ctrl-C. Each request runs on its own task.
    pub async fn start(self) -> Result<(), ServerError> {
        let port = self.local_addr().map(|a| a.port()).unwrap_or(self.config.port);

        info!(
            "Starting lanshare on port {} (upload policy: {}, body limit: {})",
            port,
            self.config.upload_policy.as_str(),
            match self.config.max_upload_bytes() {
                Some(bytes) => format!("{} bytes", bytes),
                None => "none".to_string(),
            }
        );
        info!("Access URLs:");
        for url in access_urls(&self.config.bind_address, port) {
            info!("  - {}", url);
        }

        let app = api::router(self.state);
        axum::serve(
            self.listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
