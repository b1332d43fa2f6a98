// JSON bodies exchanged with the execution service

use ata_terminal::SessionId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct CreateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cols: Option<u16>,
}

/// Ids arrive either as strings or as bare numbers
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireId {
    Text(String),
    Number(u64),
}

impl From<WireId> for SessionId {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Text(text) => SessionId::from(text),
            WireId::Number(n) => SessionId::from(n),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateResponse {
    #[serde(alias = "terminalId")]
    pub id: WireId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CloseRequest<'a> {
    pub terminal_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SendCommandRequest<'a> {
    pub terminal_id: &'a str,
    pub command: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResizeRequest<'a> {
    pub terminal_id: &'a str,
    pub rows: u16,
    pub cols: u16,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SendCommandResponse {
    #[serde(default)]
    pub output: Vec<OutputLine>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OutputLine {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub content: String,
}

/// Fields servers use to describe a failure
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
    pub detail: Option<String>,
}

/// Reply of the status endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub ai_provider: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}
