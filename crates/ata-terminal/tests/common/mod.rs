#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ata_settings::TerminalSettings;
use ata_terminal::{
    CreatedSession, Gateway, GatewayError, RegistryOptions, SessionId, SessionRegistry,
    TerminalSize,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

/// Gateway calls recorded by the mock, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Create(Option<TerminalSize>),
    Close(SessionId),
    SendCommand(SessionId, String),
    Resize(SessionId, TerminalSize),
}

/// Pauses a gateway operation until the test releases it
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

/// In-memory gateway issuing sequential numeric ids starting at 1
#[derive(Default)]
pub struct MockGateway {
    next_id: AtomicU64,
    pub calls: Mutex<Vec<GatewayCall>>,
    pub create_error: Mutex<Option<GatewayError>>,
    pub close_error: Mutex<Option<GatewayError>>,
    pub send_error: Mutex<Option<GatewayError>>,
    pub resize_error: Mutex<Option<GatewayError>>,
    pub health_error: Mutex<Option<GatewayError>>,
    pub fixed_id: Mutex<Option<SessionId>>,
    pub close_gate: Mutex<Option<Arc<Gate>>>,
    pub send_gate: Mutex<Option<Arc<Gate>>>,
    pub resize_gate: Mutex<Option<Arc<Gate>>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().clone()
    }

    pub fn fail_create(&self, err: GatewayError) {
        *self.create_error.lock() = Some(err);
    }

    pub fn fail_close(&self, err: GatewayError) {
        *self.close_error.lock() = Some(err);
    }

    pub fn fail_send(&self, err: GatewayError) {
        *self.send_error.lock() = Some(err);
    }

    pub fn fail_resize(&self, err: GatewayError) {
        *self.resize_error.lock() = Some(err);
    }

    pub fn fail_health(&self, err: GatewayError) {
        *self.health_error.lock() = Some(err);
    }

    pub fn gate_close(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.close_gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    pub fn gate_send(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.send_gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    pub fn gate_resize(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.resize_gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    async fn pass(gate: &Mutex<Option<Arc<Gate>>>) {
        let gate = gate.lock().clone();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
    }

    fn check(slot: &Mutex<Option<GatewayError>>) -> Result<(), GatewayError> {
        match slot.lock().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn create(&self, size: Option<TerminalSize>) -> Result<CreatedSession, GatewayError> {
        self.calls.lock().push(GatewayCall::Create(size));
        Self::check(&self.create_error)?;
        let id = match self.fixed_id.lock().clone() {
            Some(id) => id,
            None => SessionId::from(self.next_id.fetch_add(1, Ordering::SeqCst)),
        };
        Ok(CreatedSession { id })
    }

    async fn close(&self, id: &SessionId) -> Result<(), GatewayError> {
        self.calls.lock().push(GatewayCall::Close(id.clone()));
        Self::pass(&self.close_gate).await;
        Self::check(&self.close_error)
    }

    async fn send_command(&self, id: &SessionId, command: &str) -> Result<(), GatewayError> {
        self.calls
            .lock()
            .push(GatewayCall::SendCommand(id.clone(), command.to_string()));
        Self::pass(&self.send_gate).await;
        Self::check(&self.send_error)
    }

    async fn resize(&self, id: &SessionId, size: TerminalSize) -> Result<(), GatewayError> {
        self.calls.lock().push(GatewayCall::Resize(id.clone(), size));
        Self::pass(&self.resize_gate).await;
        Self::check(&self.resize_error)
    }

    async fn health_check(&self) -> Result<(), GatewayError> {
        Self::check(&self.health_error)
    }

    fn gateway_name(&self) -> &str {
        "mock"
    }
}

/// Registry wired to a fresh mock gateway and default terminal settings
pub fn create_test_registry() -> (Arc<SessionRegistry>, Arc<MockGateway>) {
    create_test_registry_with(RegistryOptions::default())
}

pub fn create_test_registry_with(options: RegistryOptions) -> (Arc<SessionRegistry>, Arc<MockGateway>) {
    let gateway = Arc::new(MockGateway::new());
    let registry = SessionRegistry::with_options(
        gateway.clone(),
        Arc::new(TerminalSettings::default()),
        options,
    );
    (Arc::new(registry), gateway)
}

pub fn unavailable() -> GatewayError {
    GatewayError::Unavailable("network connection error".to_string())
}

pub fn server_error() -> GatewayError {
    GatewayError::Remote {
        status: Some(500),
        message: "internal server error".to_string(),
    }
}
