use anyhow::{Context, Result};
use ata_gateway::HttpGateway;
use ata_settings::{AppSettings, SettingsStore};
use ata_terminal::{output_channel, SessionRegistry};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::ClientConfig;

pub mod commands;
pub mod repl;

pub use commands::{run_exec, run_monitor, run_settings, run_status};
pub use repl::run_repl_mode;

/// Everything one client instance needs: gateway, settings and the
/// session registry fed by the gateway's push channel
pub struct App {
    pub gateway: Arc<HttpGateway>,
    pub settings: Arc<SettingsStore>,
    pub registry: Arc<SessionRegistry>,
    pump: JoinHandle<()>,
}

impl App {
    /// Wire up the components from the resolved configuration
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        let (output_tx, output_rx) = output_channel();
        let gateway = HttpGateway::new(config.gateway.clone())
            .context("Failed to create gateway client")?
            .with_output(output_tx);
        let gateway = Arc::new(gateway);

        let settings = Arc::new(SettingsStore::with_settings(AppSettings {
            terminal: config.terminal_settings(),
            ..Default::default()
        }));

        let registry = Arc::new(SessionRegistry::with_options(
            gateway.clone(),
            settings.clone(),
            config.registry_options(),
        ));
        let pump = registry.spawn_output_pump(output_rx);

        debug!(gateway = ?gateway, "client initialized");
        Ok(Self {
            gateway,
            settings,
            registry,
            pump,
        })
    }

    /// Close every open session, ignoring individual failures
    pub async fn shutdown(self) {
        for id in self.registry.session_ids() {
            if let Err(e) = self.registry.close_session(&id).await {
                tracing::warn!(session = %id, error = %e, "failed to close session on exit");
            }
        }
        self.pump.abort();
    }
}
