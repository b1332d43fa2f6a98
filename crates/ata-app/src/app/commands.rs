use anyhow::{Context, Result};
use ata_gateway::{HttpGateway, MonitorUpdate, SystemMonitor};
use ata_terminal::{RegistryEvent, TerminalSize};
use colored::Colorize;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

use super::App;

/// Run one command in a new session, stream its output to `out`, then close
/// the session. Output is collected until `wait` passes without new output.
pub async fn run_exec<W: Write>(
    app: &App,
    command: &str,
    size: Option<TerminalSize>,
    wait: Duration,
    out: &mut W,
) -> Result<()> {
    let mut events = app.registry.subscribe();
    let id = app
        .registry
        .create_session_with_size(size)
        .await
        .context("Failed to create session")?;

    let sent = app.registry.send_command(command).await;
    if let Err(e) = sent {
        if let Err(close_err) = app.registry.close_session(&id).await {
            tracing::warn!(session = %id, error = %close_err, "failed to close session after send failure");
        }
        return Err(e).context("Failed to send command");
    }

    loop {
        match tokio::time::timeout(wait, events.recv()).await {
            Ok(Ok(RegistryEvent::OutputAppended { id: source, data })) if source == id => {
                out.write_all(data.as_bytes())?;
                out.flush()?;
            }
            Ok(Ok(_)) | Ok(Err(RecvError::Lagged(_))) => continue,
            Ok(Err(RecvError::Closed)) | Err(_) => break,
        }
    }

    app.registry
        .close_session(&id)
        .await
        .context("Failed to close session")?;
    Ok(())
}

/// Print the service status; fails when it is unreachable
pub async fn run_status<W: Write>(gateway: &HttpGateway, out: &mut W) -> Result<()> {
    match gateway.status().await {
        Ok(status) => {
            writeln!(
                out,
                "{} {} ({})",
                "✓".green(),
                gateway.base_url(),
                if status.status.is_empty() { "ok" } else { status.status.as_str() }
            )?;
            if let Some(version) = &status.version {
                writeln!(out, "  version:  {}", version)?;
            }
            if let Some(provider) = &status.ai_provider {
                writeln!(out, "  provider: {}", provider)?;
            }
            if let Some(model) = &status.model {
                writeln!(out, "  model:    {}", model)?;
            }
            Ok(())
        }
        Err(e) => {
            writeln!(out, "{} {}: {}", "✗".red(), gateway.base_url(), e)?;
            Err(anyhow::anyhow!("Service unreachable: {}", e))
        }
    }
}

/// Load settings from the service and print them as JSON
pub async fn run_settings<W: Write>(app: &App, pretty: bool, out: &mut W) -> Result<()> {
    app.settings
        .load(app.gateway.as_ref())
        .await
        .context("Failed to load settings")?;

    let current = app.settings.current();
    let json = if pretty {
        serde_json::to_string_pretty(&current)?
    } else {
        serde_json::to_string(&current)?
    };
    writeln!(out, "{}", json)?;
    Ok(())
}

/// Poll host metrics and print one line per poll until `count` polls have
/// been reported or Ctrl-C is pressed. Without an explicit `interval` the
/// service's `updateInterval` setting is used.
pub async fn run_monitor<W: Write>(
    app: &App,
    interval: Option<Duration>,
    count: Option<usize>,
    out: &mut W,
) -> Result<()> {
    let interval = match interval {
        Some(interval) => interval,
        None => {
            if let Err(e) = app.settings.load(app.gateway.as_ref()).await {
                tracing::warn!(error = %e, "using local monitoring interval");
            }
            app.settings.current().system.update_period()
        }
    };

    let monitor = Arc::new(SystemMonitor::new(app.gateway.clone(), interval));
    let mut updates = monitor.subscribe();
    writeln!(
        out,
        "{} every {:?} (Ctrl-C to stop)",
        "Monitoring".bright_cyan().bold(),
        monitor.interval()
    )?;
    monitor.start();

    let mut reported = 0;
    while count.map_or(true, |limit| reported < limit) {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
        let update = updates.borrow_and_update().clone();
        match update {
            Some(MonitorUpdate::Sample(info)) => {
                let disk = info
                    .disk
                    .as_ref()
                    .map(|d| format!("{:5.1}%", d.percent))
                    .unwrap_or_else(|| "    -".to_string());
                writeln!(
                    out,
                    "{}  cpu {:5.1}%  mem {:5.1}%  disk {}",
                    chrono::Local::now().format("%H:%M:%S"),
                    info.cpu.usage,
                    info.memory.percent,
                    disk
                )?;
            }
            Some(MonitorUpdate::Failed(e)) => {
                writeln!(out, "{} {}", "✗".red(), e)?;
            }
            None => continue,
        }
        out.flush()?;
        reported += 1;
    }
    monitor.stop();

    let history = monitor.history();
    if let Some(peak) = history.peak_cpu() {
        writeln!(out, "{} samples, peak cpu {:.1}%", history.len(), peak)?;
    }
    Ok(())
}
