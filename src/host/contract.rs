//! Versioned command/response envelopes for the host bridge.

use serde::{Deserialize, Serialize};

/// Contract version carried by every envelope.
pub const CONTRACT_VERSION: u32 = 1;

/// Request id used for responses to lines that could not be parsed.
pub const PARSE_ERROR_REQUEST_ID: &str = "parse-error";

/// Commands understood by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandName {
    #[serde(rename = "host.ping")]
    HostPing,
    #[serde(rename = "host.version")]
    HostVersion,
    #[serde(rename = "search.aggregate")]
    SearchAggregate,
    #[serde(rename = "filter.titles")]
    FilterTitles,
    #[serde(rename = "search.run")]
    SearchRun,
    #[serde(rename = "results.export_csv")]
    ResultsExportCsv,
    #[serde(rename = "config.get")]
    ConfigGet,
    #[serde(rename = "config.patch")]
    ConfigPatch,
    #[serde(rename = "runtime.stop")]
    RuntimeStop,
}

impl CommandName {
    /// Every command, in wire-documentation order.
    pub const ALL: [Self; 9] = [
        Self::HostPing,
        Self::HostVersion,
        Self::SearchAggregate,
        Self::FilterTitles,
        Self::SearchRun,
        Self::ResultsExportCsv,
        Self::ConfigGet,
        Self::ConfigPatch,
        Self::RuntimeStop,
    ];

    /// Render command name to wire format.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HostPing => "host.ping",
            Self::HostVersion => "host.version",
            Self::SearchAggregate => "search.aggregate",
            Self::FilterTitles => "filter.titles",
            Self::SearchRun => "search.run",
            Self::ResultsExportCsv => "results.export_csv",
            Self::ConfigGet => "config.get",
            Self::ConfigPatch => "config.patch",
            Self::RuntimeStop => "runtime.stop",
        }
    }

    /// Parse a command name from wire format.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == raw)
    }
}

/// A versioned command envelope from client -> host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub v: u32,
    pub request_id: String,
    pub command: CommandName,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl CommandEnvelope {
    /// Build a command envelope at the current contract version.
    #[must_use]
    pub fn new(
        request_id: impl Into<String>,
        command: CommandName,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            v: CONTRACT_VERSION,
            request_id: request_id.into(),
            command,
            payload,
        }
    }

    /// Validate envelope version and request id.
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.v != CONTRACT_VERSION {
            return Err(ContractError::UnsupportedVersion {
                got: self.v,
                expected: CONTRACT_VERSION,
            });
        }
        if self.request_id.trim().is_empty() {
            return Err(ContractError::EmptyRequestId);
        }
        Ok(())
    }
}

/// A versioned response envelope from host -> client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub v: u32,
    pub request_id: String,
    pub ok: bool,
    pub payload: serde_json::Value,
    pub error: Option<String>,
}

impl ResponseEnvelope {
    /// Build a successful response envelope.
    #[must_use]
    pub fn ok(request_id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            v: CONTRACT_VERSION,
            request_id: request_id.into(),
            ok: true,
            payload,
            error: None,
        }
    }

    /// Build an error response envelope.
    #[must_use]
    pub fn error(request_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            v: CONTRACT_VERSION,
            request_id: request_id.into(),
            ok: false,
            payload: serde_json::Value::Null,
            error: Some(message.into()),
        }
    }
}

/// Envelope validation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    #[error("unsupported contract version {got}; expected {expected}")]
    UnsupportedVersion { got: u32, expected: u32 },
    #[error("request_id cannot be empty")]
    EmptyRequestId,
}
