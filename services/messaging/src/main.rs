//! Marketplace Messaging Service
//!
//! Real-time buyer/seller messaging for the campus marketplace:
//! - One conversation per (buyer, seller, listing)
//! - Append-only message log with per-recipient read state
//! - On-demand unread totals
//! - Best-effort live fan-out to connected peers

#![allow(dead_code)]

use bazaar_core::{
    BazaarService, DependencyStatus, HealthStatus, ReadinessStatus, Result, ServiceRuntime,
};
use std::sync::Arc;
use tracing::info;

mod api;
mod config;
mod domain;
mod handlers;
mod infrastructure;
mod read_model;

pub use config::MessagingConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bazaar_messaging=debug".parse().unwrap()),
        )
        .json()
        .init();

    info!("Starting marketplace messaging service");

    let service = Arc::new(MessagingService::new());
    ServiceRuntime::run(service).await
}

pub struct MessagingService {
    config: MessagingConfig,
    state: api::AppState,
    start_time: std::time::Instant,
}

impl MessagingService {
    pub fn new() -> Self {
        let config = MessagingConfig::from_env();
        let state = api::AppState::new(&config);
        Self {
            config,
            state,
            start_time: std::time::Instant::now(),
        }
    }
}

impl Default for MessagingService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl BazaarService for MessagingService {
    fn service_id(&self) -> &'static str {
        "messaging"
    }

    async fn health(&self) -> HealthStatus {
        HealthStatus {
            healthy: true,
            service_id: self.service_id().to_string(),
            version: self.version().to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    async fn ready(&self) -> ReadinessStatus {
        ReadinessStatus {
            ready: true,
            dependencies: vec![
                DependencyStatus {
                    name: "user-directory".to_string(),
                    available: true,
                    latency_ms: Some(0),
                },
                DependencyStatus {
                    name: "listing-catalog".to_string(),
                    available: true,
                    latency_ms: Some(0),
                },
            ],
        }
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down messaging service");
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        info!(http = %self.config.http_bind, "Starting messaging server");

        let app = api::create_router(self.state.clone());

        let listener = tokio::net::TcpListener::bind(&self.config.http_bind).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
