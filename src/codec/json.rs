//! JSON codec using `serde_json`.
//!
//! Routing is by field presence: a `method` member makes the body a request
//! (with `id`) or notification (without), otherwise an `id` with `result` or
//! `error` makes it a response. Anything else is a parse error.

use serde_json::Value;

use super::MessageCodec;
use crate::error::{Result, WireError};
use crate::message::{Message, MessageId, NotificationMessage, RequestMessage, ResponseMessage};

/// Default codec for JSON-RPC 2.0 bodies.
pub struct JsonCodec;

impl MessageCodec for JsonCodec {
    fn parse(&self, text: &str) -> Result<Message> {
        let value: Value = serde_json::from_str(text).map_err(|e| WireError::Parse {
            reason: e.to_string(),
            id: None,
        })?;

        let id = recover_id(&value);

        let parsed = if value.get("method").is_some() {
            if value.get("id").is_some() {
                serde_json::from_value::<RequestMessage>(value).map(Message::Request)
            } else {
                serde_json::from_value::<NotificationMessage>(value).map(Message::Notification)
            }
        } else if value.get("result").is_some() || value.get("error").is_some() {
            serde_json::from_value::<ResponseMessage>(value).map(Message::Response)
        } else {
            return Err(WireError::Parse {
                reason: "message is neither request, response, nor notification".to_string(),
                id,
            });
        };

        parsed.map_err(|e| WireError::Parse {
            reason: e.to_string(),
            id,
        })
    }

    fn serialize(&self, message: &Message) -> Result<String> {
        Ok(serde_json::to_string(message)?)
    }
}

/// Best-effort id extraction from a structurally valid JSON body.
fn recover_id(value: &Value) -> Option<MessageId> {
    match value.get("id")? {
        Value::Number(n) => n.as_i64().map(MessageId::Number),
        Value::String(s) => Some(MessageId::String(s.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request() {
        let message = JsonCodec
            .parse(r#"{"jsonrpc":"2.0","id":"1","method":"ping"}"#)
            .unwrap();

        match message {
            Message::Request(req) => {
                assert_eq!(req.id, MessageId::String("1".into()));
                assert_eq!(req.method, "ping");
            }
            other => panic!("expected request, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_notification() {
        let message = JsonCodec
            .parse(r#"{"jsonrpc":"2.0","method":"exit"}"#)
            .unwrap();
        assert!(matches!(message, Message::Notification(_)));
    }

    #[test]
    fn test_parse_response() {
        let message = JsonCodec
            .parse(r#"{"jsonrpc":"2.0","id":5,"result":null}"#)
            .unwrap();
        assert!(matches!(message, Message::Response(_)));
    }

    #[test]
    fn test_invalid_json_has_no_id() {
        let err = JsonCodec.parse(r#"{"jsonrpc":"2.0","id":"1","#).unwrap_err();
        match err {
            WireError::Parse { id, .. } => assert!(id.is_none()),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_request_recovers_id() {
        // Valid JSON, invalid message: method has the wrong type.
        let err = JsonCodec
            .parse(r#"{"jsonrpc":"2.0","id":"1","method":42}"#)
            .unwrap_err();
        match err {
            WireError::Parse { id, .. } => {
                assert_eq!(id, Some(MessageId::String("1".into())));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_unrecognized_shape_is_parse_error() {
        let err = JsonCodec.parse(r#"{"jsonrpc":"2.0","id":9}"#).unwrap_err();
        match err {
            WireError::Parse { id, .. } => assert_eq!(id, Some(MessageId::Number(9))),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_serialize_round_trip() {
        let codec = JsonCodec;
        let message = codec
            .parse(r#"{"jsonrpc":"2.0","id":1,"method":"ping","params":{"a":1}}"#)
            .unwrap();
        let text = codec.serialize(&message).unwrap();
        let reparsed = codec.parse(&text).unwrap();
        assert_eq!(message, reparsed);
    }
}
