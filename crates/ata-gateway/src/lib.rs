//! HTTP client for the ata execution service
//!
//! [`HttpGateway`] implements the terminal [`Gateway`](ata_terminal::Gateway)
//! contract and the settings backend on top of the service's JSON API.
//! [`SystemMonitor`] polls the service's host metrics into a bounded history.

mod client;
mod config;
mod errors;
mod monitor;
mod system;
mod wire;

pub use client::HttpGateway;
pub use config::{GatewayConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
pub use errors::{ClientError, NETWORK_ERROR, TIMEOUT_ERROR};
pub use monitor::{
    MetricSample, MetricsHistory, MonitorUpdate, SystemMonitor, MAX_HISTORY_POINTS,
    MIN_UPDATE_INTERVAL,
};
pub use system::{CpuInfo, DiskInfo, MemoryInfo, NetworkInfo, SystemInfo, SystemSource};
pub use wire::ServerStatus;
