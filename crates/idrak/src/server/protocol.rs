//! WebSocket Protocol Messages
//!
//! Defines the message types exchanged between client and server.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::shell::{ShellCommand, ShellSnapshot};

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Apply a shell command
    Command {
        /// Request ID for correlation
        id: String,
        command: ShellCommand,
    },

    /// Ask for the current view without changing anything
    Snapshot { id: String },

    /// Ping for keep-alive
    Ping { id: String },
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Sent on initial connection
    Connected {
        session_id: String,
        server_version: String,
    },

    /// Response to a client request
    Response {
        id: String,
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// Pushed after every state change
    View { snapshot: Box<ShellSnapshot> },

    /// Error message
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        code: ErrorCode,
        message: String,
    },

    /// Pong response to ping
    Pong { id: String },
}

/// Error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidRequest,
    StorageError,
    InternalError,
}

impl ServerMessage {
    /// Create a connected message
    pub fn connected(session_id: impl Into<String>) -> Self {
        Self::Connected {
            session_id: session_id.into(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Create a success response
    pub fn success(id: impl Into<String>, data: Option<Value>) -> Self {
        Self::Response {
            id: id.into(),
            success: true,
            data,
            error: None,
        }
    }

    /// Create a failed response
    pub fn failure(id: impl Into<String>, code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::Response {
            id: id.into(),
            success: false,
            data: Some(serde_json::json!({ "code": code })),
            error: Some(message),
        }
    }

    /// Create an error message
    pub fn error(id: Option<String>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            id,
            code,
            message: message.into(),
        }
    }

    pub fn view(snapshot: ShellSnapshot) -> Self {
        Self::View {
            snapshot: Box::new(snapshot),
        }
    }

    /// Create a pong response
    pub fn pong(id: impl Into<String>) -> Self {
        Self::Pong { id: id.into() }
    }
}
