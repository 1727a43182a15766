//! Runs an MCP handler over the configured transport.
//!
//! [`McpServerBuilder`] owns the lifecycle: it serves the handler on stdio
//! or streamable HTTP, waits for the work to finish or a shutdown request
//! (SIGINT/SIGTERM, or a programmatic channel), and closes the transport
//! before returning.
//!
//! ```ignore
//! McpServerBuilder::new(handler)
//!     .with_transport(Transport::stdio())
//!     .run()
//!     .await?;
//! ```

use crate::transport::Transport;
use rmcp::{ServerHandler, ServiceExt};
use thiserror::Error;
use tokio::sync::oneshot;

/// Failures while serving.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The HTTP listener could not bind its port
    #[error("Could not bind port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// The underlying transport failed
    #[error("Transport error: {0}")]
    Transport(String),

    /// IO error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Configures and runs an MCP server for a given handler.
pub struct McpServerBuilder<H> {
    handler: H,
    transport: Transport,
    shutdown_rx: Option<oneshot::Receiver<()>>,
}

impl<H> McpServerBuilder<H>
where
    H: ServerHandler + Clone + Send + Sync + 'static,
{
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            transport: Transport::default(),
            shutdown_rx: None,
        }
    }

    /// Serve on the given transport instead of the default stdio.
    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    /// Trigger shutdown from the given channel instead of process signals.
    ///
    /// A send, or dropping the sender, stops the server.
    pub fn with_shutdown(mut self, shutdown_rx: oneshot::Receiver<()>) -> Self {
        self.shutdown_rx = Some(shutdown_rx);
        self
    }

    /// Run until the transport closes or shutdown is requested.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!(transport = %self.transport, "Serving");

        match self.transport {
            Transport::Stdio => Self::serve_stdio(self.handler, self.shutdown_rx).await,
            Transport::Http { port } => {
                Self::serve_http(self.handler, self.shutdown_rx, port).await
            }
        }
    }

    async fn serve_stdio(
        handler: H,
        shutdown_rx: Option<oneshot::Receiver<()>>,
    ) -> Result<(), ServerError> {
        let running = handler
            .serve(rmcp::transport::io::stdio())
            .await
            .map_err(|e| ServerError::Transport(e.to_string()))?;

        tokio::select! {
            finished = running.waiting() => {
                finished.map_err(|e| ServerError::Transport(e.to_string()))?;
            }
            _ = shutdown_requested(shutdown_rx) => {
                tracing::info!("Stopping, closing stdio transport");
            }
        }
        Ok(())
    }

    async fn serve_http(
        handler: H,
        shutdown_rx: Option<oneshot::Receiver<()>>,
        port: u16,
    ) -> Result<(), ServerError> {
        use rmcp::transport::streamable_http_server::{
            session::local::LocalSessionManager, StreamableHttpService,
        };

        let service = StreamableHttpService::new(
            move || Ok(handler.clone()),
            LocalSessionManager::default().into(),
            Default::default(),
        );
        let app = axum::Router::new().nest_service("/mcp", service);

        let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
            .await
            .map_err(|source| ServerError::Bind { port, source })?;
        tracing::info!(port, "Listening on /mcp");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_requested(shutdown_rx))
            .await
            .map_err(|e| ServerError::Transport(e.to_string()))?;

        tracing::info!("HTTP listener stopped");
        Ok(())
    }
}

/// Resolves when the caller should shut down: a message (or hangup) on the
/// channel when one was provided, a termination signal otherwise.
async fn shutdown_requested(rx: Option<oneshot::Receiver<()>>) {
    match rx {
        Some(rx) => {
            let _ = rx.await;
        }
        None => wait_for_signal().await,
    }
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut term = signal(SignalKind::terminate()).expect("SIGTERM handler");
        let mut int = signal(SignalKind::interrupt()).expect("SIGINT handler");

        let name = tokio::select! {
            _ = term.recv() => "SIGTERM",
            _ = int.recv() => "SIGINT",
        };
        tracing::info!(signal = name, "Shutdown signal received");
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.expect("Ctrl+C handler");
        tracing::info!("Ctrl+C received");
    }
}

/// A oneshot pair for [`McpServerBuilder::with_shutdown`]: keep the sender,
/// hand the receiver to the builder.
pub fn shutdown_channel() -> (oneshot::Sender<()>, oneshot::Receiver<()>) {
    oneshot::channel()
}
