//! Service infrastructure for the long-running pipeline processes

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

use crate::error::{PipelineError, Result};

/// Health status for liveness probes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub service_id: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Readiness status for readiness probes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessStatus {
    pub ready: bool,
    pub dependencies: Vec<DependencyStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyStatus {
    pub name: String,
    pub available: bool,
    pub latency_ms: Option<u64>,
}

/// Lifecycle every pipeline process implements
#[async_trait]
pub trait PipelineService: Send + Sync + 'static {
    /// Service identifier (e.g., "log-producer")
    fn service_id(&self) -> &'static str;

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// Health check - is the service alive?
    async fn health(&self) -> HealthStatus;

    /// Readiness check - are all dependencies available?
    /// Services without dependencies are ready as soon as they run.
    async fn ready(&self) -> ReadinessStatus {
        ReadinessStatus {
            ready: true,
            dependencies: Vec::new(),
        }
    }

    /// Release broker and store handles
    async fn shutdown(&self) -> Result<()>;

    /// Run until the work loop ends. Returning `Err` is fatal.
    async fn start(&self) -> Result<()>;
}

/// Standard process bootstrap: start, wait for a signal, shut down
pub struct ServiceRuntime;

impl ServiceRuntime {
    /// Run a service with standard lifecycle management.
    ///
    /// A start failure ends the process with that error; a termination
    /// signal triggers `shutdown` and a clean exit.
    pub async fn run<S: PipelineService>(service: Arc<S>) -> Result<()> {
        info!(
            service_id = service.service_id(),
            version = service.version(),
            "Starting service"
        );

        let service_clone = service.clone();
        let mut service_handle = tokio::spawn(async move { service_clone.start().await });

        let outcome = tokio::select! {
            joined = &mut service_handle => {
                match joined {
                    Ok(Ok(())) => {
                        info!("Service work loop finished");
                        Ok(())
                    }
                    Ok(Err(e)) => {
                        error!(error = %e, code = e.error_code(), "Service failed");
                        Err(e)
                    }
                    Err(e) => Err(PipelineError::Internal(format!("service task panicked: {}", e))),
                }
            }
            _ = Self::wait_for_shutdown() => {
                info!("Shutdown signal received, gracefully stopping...");
                Ok(())
            }
        };

        if let Err(e) = service.shutdown().await {
            warn!("Error during shutdown: {}", e);
        }

        service_handle.abort();

        let health = service.health().await;
        info!(
            service_id = %health.service_id,
            uptime_seconds = health.uptime_seconds,
            "Service stopped"
        );

        outcome
    }

    async fn wait_for_shutdown() {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    warn!("Failed to listen for SIGTERM: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    }
}
