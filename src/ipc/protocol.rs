//! IPC message protocol definitions
//!
//! All messages are JSON-encoded, prefixed with a 4-byte little-endian length.

use serde::{Deserialize, Serialize};

use crate::events::KeyEvent;

/// Largest accepted message body
pub const MAX_FRAME_LEN: usize = 1024 * 1024;

/// Requests from a host UI to the daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Ping to check connectivity
    Ping,

    /// Request current daemon status
    GetStatus,

    /// A key was pressed in the host UI
    KeyDown { event: KeyEvent },

    /// Re-read the keymap file (rate limited)
    ReloadKeymap,
}

/// Responses from daemon to a host UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Pong response to ping
    Pong,

    /// Current daemon status
    Status(DaemonStatus),

    /// Bindings fired for a key-down event
    Dispatched {
        actions: Vec<String>,
        default_prevented: bool,
    },

    /// Reload accepted; it runs now or at the end of the throttle window
    ReloadScheduled,

    /// Error response
    Error { code: String, message: String },
}

impl Response {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// Full daemon status snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonStatus {
    /// Daemon version
    pub version: String,

    /// Number of registered bindings
    pub bindings: usize,

    /// Successful keymap reloads since start
    pub reloads: u64,

    /// Uptime in seconds
    pub uptime_secs: u64,
}

impl Default for DaemonStatus {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            bindings: 0,
            reloads: 0,
            uptime_secs: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_deserialization() {
        let json = r#"{"type":"key_down","event":{"metaKey":true,"key":"k","code":"KeyK"}}"#;
        let request: Request = serde_json::from_str(json).unwrap();
        match request {
            Request::KeyDown { event } => {
                assert!(event.meta_key);
                assert_eq!(event.key, "k");
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn test_response_serialization() {
        let resp = Response::Dispatched {
            actions: vec!["open_palette".into()],
            default_prevented: true,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"type\":\"dispatched\""));
        assert!(json.contains("open_palette"));

        let json = serde_json::to_string(&Response::Status(DaemonStatus::default())).unwrap();
        assert!(json.contains("status"));
    }
}
