// Host metrics published by the execution service under `system/`

use ata_terminal::GatewayError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::client::HttpGateway;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuInfo {
    /// Utilisation in percent
    pub usage: f64,
    pub cores: u32,
    /// Current clock in GHz
    pub frequency: f64,
    pub architecture: Option<String>,
    pub processor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryInfo {
    pub total: u64,
    pub used: u64,
    pub available: u64,
    pub free: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskInfo {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkInfo {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
}

/// Combined reply of `system/info`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemInfo {
    pub os: String,
    pub platform: String,
    pub python_version: String,
    pub cpu_count: Option<u32>,
    pub working_directory: String,
    pub cpu: CpuInfo,
    pub memory: MemoryInfo,
    pub disk: Option<DiskInfo>,
}

/// Anything that can produce a [`SystemInfo`] snapshot
#[async_trait]
pub trait SystemSource: Send + Sync {
    async fn system_info(&self) -> Result<SystemInfo, GatewayError>;
}

impl HttpGateway {
    async fn fetch<T: DeserializeOwned + Default>(&self, endpoint: &str) -> Result<T, GatewayError> {
        let reply = self.get(endpoint).await?;
        if reply.body.trim().is_empty() {
            return Ok(T::default());
        }
        trace!(endpoint, bytes = reply.body.len(), "system metrics received");
        reply.decode()
    }

    pub async fn cpu_info(&self) -> Result<CpuInfo, GatewayError> {
        self.fetch("system/cpu").await
    }

    pub async fn memory_info(&self) -> Result<MemoryInfo, GatewayError> {
        self.fetch("system/memory").await
    }

    pub async fn disk_info(&self) -> Result<DiskInfo, GatewayError> {
        self.fetch("system/disk").await
    }

    pub async fn network_info(&self) -> Result<NetworkInfo, GatewayError> {
        self.fetch("system/network").await
    }
}

#[async_trait]
impl SystemSource for HttpGateway {
    async fn system_info(&self) -> Result<SystemInfo, GatewayError> {
        self.fetch("system/info").await
    }
}
