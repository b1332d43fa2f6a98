#![allow(dead_code)]

use ata_gateway::{GatewayConfig, HttpGateway};
use serde_json::{json, Value};
use wiremock::matchers::*;
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_TOKEN: &str = "test-token";

/// Mock execution service for exercising the HTTP gateway
pub struct GatewayMockServer {
    server: MockServer,
}

impl GatewayMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Base URL the gateway should be configured with
    pub fn api_url(&self) -> String {
        format!("{}/api", self.server.uri())
    }

    pub fn gateway(&self) -> HttpGateway {
        HttpGateway::new(GatewayConfig::new(self.api_url())).unwrap()
    }

    pub fn authenticated_gateway(&self) -> HttpGateway {
        HttpGateway::new(GatewayConfig::new(self.api_url()).with_token(TEST_TOKEN)).unwrap()
    }

    /// Mock a successful create returning `id`
    pub async fn mock_create(&self, id: Value) {
        Mock::given(method("POST"))
            .and(path("/api/terminal/create"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": id })))
            .mount(&self.server)
            .await;
    }

    /// Mock a create that only succeeds for the given size
    pub async fn mock_create_sized(&self, rows: u16, cols: u16, id: Value) {
        Mock::given(method("POST"))
            .and(path("/api/terminal/create"))
            .and(body_json(json!({ "rows": rows, "cols": cols })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": id })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_close(&self, id: &str) {
        Mock::given(method("POST"))
            .and(path("/api/terminal/close"))
            .and(body_json(json!({ "terminalId": id })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Mock send-command answering with the given output lines
    pub async fn mock_send_command(&self, id: &str, command: &str, output: &[&str]) {
        let lines: Vec<Value> = output
            .iter()
            .map(|content| json!({ "type": "output", "content": content }))
            .collect();
        Mock::given(method("POST"))
            .and(path("/api/terminal/send-command"))
            .and(body_json(json!({ "terminalId": id, "command": command })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "output": lines })))
            .mount(&self.server)
            .await;
    }

    /// Mock send-command answering 200 with an empty body
    pub async fn mock_send_command_empty(&self) {
        Mock::given(method("POST"))
            .and(path("/api/terminal/send-command"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_resize(&self, id: &str, rows: u16, cols: u16) {
        Mock::given(method("POST"))
            .and(path("/api/terminal/resize"))
            .and(body_json(json!({ "terminalId": id, "rows": rows, "cols": cols })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_status(&self) {
        Mock::given(method("GET"))
            .and(path("/api/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "running",
                "version": "1.0.0",
                "ai_provider": "deepseek",
                "model": "deepseek-coder"
            })))
            .mount(&self.server)
            .await;
    }

    /// Answer every request to `endpoint` with `status` and a JSON body
    pub async fn mock_error(&self, http_method: &str, endpoint: &str, status: u16, body: Value) {
        Mock::given(method(http_method))
            .and(path(format!("/api/{}", endpoint)))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Create that only answers when the bearer token is present
    pub async fn mock_create_requiring_token(&self) {
        Mock::given(method("POST"))
            .and(path("/api/terminal/create"))
            .and(header("authorization", format!("Bearer {}", TEST_TOKEN).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "secure" })))
            .mount(&self.server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/terminal/create"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "no token" })))
            .mount(&self.server)
            .await;
    }

    /// Respond after `delay_ms` to exercise client timeouts
    pub async fn mock_slow_status(&self, delay_ms: u64) {
        Mock::given(method("GET"))
            .and(path("/api/status"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "status": "running" }))
                    .set_delay(std::time::Duration::from_millis(delay_ms)),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mock_settings_load(&self, document: Value) {
        Mock::given(method("GET"))
            .and(path("/api/settings/load"))
            .respond_with(ResponseTemplate::new(200).set_body_json(document))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_settings_save(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path("/api/settings/save"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "success": status < 400 })))
            .mount(&self.server)
            .await;
    }

    /// Answer `GET system/<endpoint>` with `body`
    pub async fn mock_system(&self, endpoint: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/api/system/{}", endpoint)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// `system/info` reporting the given CPU and memory utilisation
    pub async fn mock_system_info(&self, cpu: f64, memory: f64) {
        self.mock_system(
            "info",
            json!({
                "os": "Linux",
                "platform": "Linux-6.1-x86_64",
                "python_version": "3.11.4",
                "cpu_count": 4,
                "working_directory": "/srv/ata",
                "cpu": { "usage": cpu, "cores": 4, "frequency": 2.8 },
                "memory": { "total": 8589934592u64, "used": 4294967296u64, "available": 4294967296u64, "percent": memory },
                "disk": { "total": 1000, "used": 250, "free": 750, "percent": 25.0 }
            }),
        )
        .await;
    }

    /// Bodies of every request received so far, for the given endpoint
    pub async fn received_bodies(&self, endpoint: &str) -> Vec<Value> {
        let wanted = format!("/api/{}", endpoint);
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.url.path() == wanted)
            .map(|request| serde_json::from_slice(&request.body).unwrap_or(Value::Null))
            .collect()
    }
}
