use ata_settings::{AppSettings, RemoteSettings, SettingsBackend, SettingsError};
use ata_terminal::{
    CreatedSession, Gateway, GatewayError, OutputChunk, OutputSender, SessionId, TerminalSize,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::config::GatewayConfig;
use crate::errors::{decode_error, status_error, transport_error, ClientError};
use crate::wire::{
    CloseRequest, CreateRequest, CreateResponse, ResizeRequest, SendCommandRequest,
    SendCommandResponse, ServerStatus,
};

/// Raw successful reply: status code and body text
pub(crate) struct Reply {
    pub(crate) status: u16,
    pub(crate) body: String,
}

impl Reply {
    pub(crate) fn decode<T: DeserializeOwned>(&self) -> Result<T, GatewayError> {
        serde_json::from_str(&self.body).map_err(|e| decode_error(self.status, e))
    }
}

/// Gateway that talks to the execution service over JSON/HTTP
pub struct HttpGateway {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
    output: Option<OutputSender>,
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.token.is_some())
            .field("push_channel", &self.output.is_some())
            .finish()
    }
}

impl HttpGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, ClientError> {
        let base_url = config.normalized_base_url().to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidBaseUrl(config.base_url));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            base_url,
            token: config.token,
            client,
            output: None,
        })
    }

    /// Forward output returned by send-command to the registry's push channel
    pub fn with_output(mut self, output: OutputSender) -> Self {
        self.output = Some(output);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Reply, GatewayError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            debug!(error = %e, "request to gateway failed");
            transport_error(e)
        })?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        // Only 200 and 201 count as success; other 2xx replies are rejected
        if !matches!(status.as_u16(), 200 | 201) {
            debug!(status = status.as_u16(), body = %body, "gateway returned an error");
            return Err(status_error(status.as_u16(), &body));
        }

        Ok(Reply {
            status: status.as_u16(),
            body,
        })
    }

    async fn post<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<Reply, GatewayError> {
        trace!(endpoint, "POST");
        let request = self
            .client
            .post(self.url(endpoint))
            .header("Content-Type", "application/json")
            .json(body);
        self.execute(request).await
    }

    pub(crate) async fn get(&self, endpoint: &str) -> Result<Reply, GatewayError> {
        trace!(endpoint, "GET");
        self.execute(self.client.get(self.url(endpoint))).await
    }

    /// Query the status endpoint
    pub async fn status(&self) -> Result<ServerStatus, GatewayError> {
        let reply = self.get("status").await?;
        if reply.body.trim().is_empty() {
            return Ok(ServerStatus::default());
        }
        reply.decode()
    }

    fn forward_output(&self, id: &SessionId, response: SendCommandResponse) {
        let Some(output) = &self.output else {
            return;
        };
        for line in response.output {
            if line.content.is_empty() {
                continue;
            }
            trace!(session = %id, kind = %line.kind, "forwarding output");
            if output.send(OutputChunk::new(id.clone(), line.content)).is_err() {
                warn!(session = %id, "output receiver dropped, discarding output");
                return;
            }
        }
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn create(&self, size: Option<TerminalSize>) -> Result<CreatedSession, GatewayError> {
        let body = CreateRequest {
            rows: size.map(|s| s.rows),
            cols: size.map(|s| s.cols),
        };
        let reply = self.post("terminal/create", &body).await?;
        let created: CreateResponse = reply.decode()?;
        let id = SessionId::from(created.id);
        debug!(session = %id, "remote terminal created");
        Ok(CreatedSession { id })
    }

    async fn close(&self, id: &SessionId) -> Result<(), GatewayError> {
        let body = CloseRequest {
            terminal_id: id.as_str(),
        };
        self.post("terminal/close", &body).await?;
        Ok(())
    }

    async fn send_command(&self, id: &SessionId, command: &str) -> Result<(), GatewayError> {
        let body = SendCommandRequest {
            terminal_id: id.as_str(),
            command,
        };
        let reply = self.post("terminal/send-command", &body).await?;
        if !reply.body.trim().is_empty() {
            let response: SendCommandResponse = reply.decode()?;
            self.forward_output(id, response);
        }
        Ok(())
    }

    async fn resize(&self, id: &SessionId, size: TerminalSize) -> Result<(), GatewayError> {
        let body = ResizeRequest {
            terminal_id: id.as_str(),
            rows: size.rows,
            cols: size.cols,
        };
        self.post("terminal/resize", &body).await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), GatewayError> {
        self.get("status").await?;
        Ok(())
    }

    fn gateway_name(&self) -> &str {
        "http"
    }
}

#[async_trait]
impl SettingsBackend for HttpGateway {
    async fn load_settings(&self) -> Result<RemoteSettings, SettingsError> {
        let reply = self
            .get("settings/load")
            .await
            .map_err(|e| SettingsError::Backend(e.to_string()))?;
        if reply.body.trim().is_empty() {
            return Ok(RemoteSettings::default());
        }
        serde_json::from_str(&reply.body).map_err(|e| SettingsError::Decode(e.to_string()))
    }

    async fn save_settings(&self, settings: &AppSettings) -> Result<(), SettingsError> {
        self.post("settings/save", settings)
            .await
            .map_err(|e| SettingsError::Backend(e.to_string()))?;
        Ok(())
    }
}
