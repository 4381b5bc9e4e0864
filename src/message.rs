//! JSON-RPC 2.0 message model.
//!
//! The transport only cares about the envelope: every frame body is one
//! message object, and the single piece of state the transport threads
//! through dispatch is the request id (so a failure can be answered with an
//! error response carrying the same id).
//!
//! # Example
//!
//! ```
//! use lspwire::message::{Message, MessageId};
//!
//! let text = r#"{"jsonrpc":"2.0","id":"1","method":"ping"}"#;
//! let message: Message = serde_json::from_str(text).unwrap();
//! assert_eq!(message.id(), Some(&MessageId::String("1".into())));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The fixed protocol version stamped on outgoing messages.
pub const JSONRPC_VERSION: &str = "2.0";

/// Reserved JSON-RPC 2.0 error codes used by the transport.
pub mod error_codes {
    /// Invalid JSON was received.
    pub const PARSE_ERROR: i64 = -32700;
    /// The JSON sent is not a valid request object.
    pub const INVALID_REQUEST: i64 = -32600;
    /// The method does not exist / is not available.
    pub const METHOD_NOT_FOUND: i64 = -32601;
    /// Invalid method parameters.
    pub const INVALID_PARAMS: i64 = -32602;
    /// Internal JSON-RPC error.
    pub const INTERNAL_ERROR: i64 = -32603;
}

/// A request or response id: a JSON number or string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageId {
    Number(i64),
    String(String),
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageId::Number(n) => write!(f, "{}", n),
            MessageId::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for MessageId {
    fn from(n: i64) -> Self {
        MessageId::Number(n)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        MessageId::String(s.to_string())
    }
}

/// A method invocation that expects a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,
    pub id: MessageId,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// A reply to a request: either a result or an error, echoing the id.
///
/// The id is optional because an error reply to an unparseable frame may
/// have no id to echo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<MessageId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
}

/// A method invocation with no response expected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// The error member of a failed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// One JSON-RPC message: request, response, or notification.
///
/// Serde representation is untagged, so the variant order matters: a request
/// (id + method) must win over a response, and a notification (method, no
/// id) must be tried before the all-optional response shape can absorb it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
    Request(RequestMessage),
    Notification(NotificationMessage),
    Response(ResponseMessage),
}

impl Message {
    /// The message id, when the message carries one.
    pub fn id(&self) -> Option<&MessageId> {
        match self {
            Message::Request(r) => Some(&r.id),
            Message::Response(r) => r.id.as_ref(),
            Message::Notification(_) => None,
        }
    }

    /// The protocol version field, when present.
    pub fn jsonrpc(&self) -> Option<&str> {
        match self {
            Message::Request(r) => r.jsonrpc.as_deref(),
            Message::Response(r) => r.jsonrpc.as_deref(),
            Message::Notification(n) => n.jsonrpc.as_deref(),
        }
    }

    /// Stamp the fixed protocol version if the field is unset.
    pub fn ensure_version(&mut self) {
        let slot = match self {
            Message::Request(r) => &mut r.jsonrpc,
            Message::Response(r) => &mut r.jsonrpc,
            Message::Notification(n) => &mut n.jsonrpc,
        };
        if slot.is_none() {
            *slot = Some(JSONRPC_VERSION.to_string());
        }
    }

    /// Build an error response, echoing `id` when one is known.
    pub fn error_response(id: Option<MessageId>, code: i64, message: impl Into<String>) -> Self {
        Message::Response(ResponseMessage {
            jsonrpc: Some(JSONRPC_VERSION.to_string()),
            id,
            result: None,
            error: Some(ResponseError {
                code,
                message: message.into(),
                data: None,
            }),
        })
    }
}
