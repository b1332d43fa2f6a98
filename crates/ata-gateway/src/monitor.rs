use std::collections::VecDeque;
use std::sync::{Arc, Weak};
use std::time::Duration;

use ata_settings::SystemSettings;
use ata_terminal::GatewayError;
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::system::{SystemInfo, SystemSource};

/// Samples kept per metric before the oldest is dropped
pub const MAX_HISTORY_POINTS: usize = 60;

/// Polling faster than this only hammers the service
pub const MIN_UPDATE_INTERVAL: Duration = Duration::from_millis(100);

/// One CPU/memory reading
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub at: DateTime<Local>,
    /// CPU utilisation in percent
    pub cpu: f64,
    /// Memory utilisation in percent
    pub memory: f64,
}

impl MetricSample {
    pub fn from_info(info: &SystemInfo) -> Self {
        Self {
            at: Local::now(),
            cpu: info.cpu.usage,
            memory: info.memory.percent,
        }
    }

    /// Wall-clock label, e.g. `14:03:07`
    pub fn label(&self) -> String {
        self.at.format("%H:%M:%S").to_string()
    }
}

/// Fixed-capacity CPU/memory history, oldest first
#[derive(Debug, Clone)]
pub struct MetricsHistory {
    samples: VecDeque<MetricSample>,
    capacity: usize,
}

impl Default for MetricsHistory {
    fn default() -> Self {
        Self::new(MAX_HISTORY_POINTS)
    }
}

impl MetricsHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: MetricSample) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&MetricSample> {
        self.samples.back()
    }

    pub fn samples(&self) -> impl Iterator<Item = &MetricSample> {
        self.samples.iter()
    }

    pub fn cpu(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.cpu).collect()
    }

    pub fn memory(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.memory).collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.samples.iter().map(MetricSample::label).collect()
    }

    /// Highest CPU reading still in the window
    pub fn peak_cpu(&self) -> Option<f64> {
        self.samples.iter().map(|s| s.cpu).reduce(f64::max)
    }
}

/// Outcome of one poll, published to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorUpdate {
    Sample(SystemInfo),
    Failed(GatewayError),
}

/// Polls a [`SystemSource`] on an interval and keeps a bounded history.
///
/// Failed polls are logged and published but leave the history untouched.
pub struct SystemMonitor {
    source: Arc<dyn SystemSource>,
    interval: Mutex<Duration>,
    history: Mutex<MetricsHistory>,
    updates: watch::Sender<Option<MonitorUpdate>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for SystemMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemMonitor")
            .field("interval", &*self.interval.lock())
            .field("samples", &self.history.lock().len())
            .field("running", &self.is_running())
            .finish()
    }
}

impl SystemMonitor {
    pub fn new(source: Arc<dyn SystemSource>, interval: Duration) -> Self {
        let (updates, _) = watch::channel(None);
        Self {
            source,
            interval: Mutex::new(interval.max(MIN_UPDATE_INTERVAL)),
            history: Mutex::new(MetricsHistory::default()),
            updates,
            task: Mutex::new(None),
        }
    }

    /// Monitor polling at the configured `updateInterval`
    pub fn from_settings(source: Arc<dyn SystemSource>, settings: &SystemSettings) -> Self {
        Self::new(source, settings.update_period())
    }

    pub fn interval(&self) -> Duration {
        *self.interval.lock()
    }

    /// Latest poll outcome; the initial value is `None`
    pub fn subscribe(&self) -> watch::Receiver<Option<MonitorUpdate>> {
        self.updates.subscribe()
    }

    pub fn history(&self) -> MetricsHistory {
        self.history.lock().clone()
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
        debug!("metrics history cleared");
    }

    /// Poll once, recording the sample on success
    pub async fn refresh(&self) -> Result<SystemInfo, GatewayError> {
        match self.source.system_info().await {
            Ok(info) => {
                self.history.lock().push(MetricSample::from_info(&info));
                self.updates.send_replace(Some(MonitorUpdate::Sample(info.clone())));
                Ok(info)
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch system info");
                self.updates.send_replace(Some(MonitorUpdate::Failed(e.clone())));
                Err(e)
            }
        }
    }

    /// Poll right away and then on every interval tick. No-op when already
    /// running. Must be called from within a tokio runtime.
    pub fn start(self: &Arc<Self>) {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            return;
        }

        let period = self.interval();
        let monitor: Weak<Self> = Arc::downgrade(self);
        debug!(?period, "system monitoring started");
        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(monitor) = monitor.upgrade() else {
                    break;
                };
                // Errors are already logged and published
                let _ = monitor.refresh().await;
            }
        }));
    }

    pub fn stop(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
            debug!("system monitoring stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|t| !t.is_finished())
    }

    /// Change the polling interval, restarting the poll loop if it runs
    pub fn set_update_interval(self: &Arc<Self>, interval: Duration) {
        *self.interval.lock() = interval.max(MIN_UPDATE_INTERVAL);
        if self.is_running() {
            self.stop();
            self.start();
        }
    }
}

impl Drop for SystemMonitor {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.abort();
        }
    }
}
