//! Performance Monitoring API client library.
//!
//! Provides a typed client for the Performance Monitoring REST API (system
//! metrics, error history, thresholds, load simulation) plus a helper that
//! times an arbitrary async operation and reports its failures upstream.

pub mod client;
pub mod config;
pub mod error;
pub mod helpers;
pub mod monitor;
pub mod stats;

pub use client::Client;
pub use config::Config;
pub use error::{ApiError, AuthError, Error, RateLimitError};
pub use helpers::format_timestamp_display;
pub use monitor::{StderrObserver, TimingObserver};

/// Library version for User-Agent and diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
