//! Bazaar Core - Shared service infrastructure
//!
//! This crate provides:
//! - Standard service trait all services must implement
//! - Error taxonomy shared across the platform
//! - Configuration management
//! - Bounded retry policy for idempotent reads

pub mod config;
pub mod error;
pub mod retry;
pub mod service;

pub use config::ServiceConfig;
pub use error::{BazaarError, Result};
pub use retry::{with_read_retries, RetryPolicy};
pub use service::{BazaarService, DependencyStatus, HealthStatus, ReadinessStatus, ServiceRuntime};
