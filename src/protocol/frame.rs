//! WebSocket wire frames.
//!
//! Every frame is one JSON text message.
//!
//! # Format
//!
//! Request (local → server):
//! ```json
//! { "id": "uuid", "method": "get", "url": "/todos", "data": { ... } }
//! ```
//!
//! Response (server → local):
//! ```json
//! { "id": "uuid", "body": ... }
//! ```
//!
//! Push message (server → local):
//! ```json
//! { "event": "message", "data": ... }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::identifiers::RequestId;

use super::{TransportRequest, Verb};

// ============================================================================
// RequestFrame
// ============================================================================

/// Outbound request frame.
#[derive(Debug, Clone, Serialize)]
pub struct RequestFrame<'a> {
    /// Correlation ID echoed back in the response.
    pub id: RequestId,
    /// Transport verb.
    pub method: &'a Verb,
    /// Target endpoint.
    pub url: &'a str,
    /// Request body.
    pub data: &'a Map<String, Value>,
}

impl<'a> RequestFrame<'a> {
    /// Borrows a request as a frame.
    #[inline]
    #[must_use]
    pub fn new(id: RequestId, request: &'a TransportRequest) -> Self {
        Self {
            id,
            method: &request.verb,
            url: &request.url,
            data: &request.payload,
        }
    }
}

// ============================================================================
// InboundFrame
// ============================================================================

/// Frame received from the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InboundFrame {
    /// Response to an earlier request.
    Response {
        /// Matches the request `id`.
        id: RequestId,
        /// Response body passed to the success callback.
        #[serde(default)]
        body: Value,
    },
    /// Server-initiated push message.
    Push {
        /// Event name handlers subscribe to.
        event: String,
        /// Message payload.
        #[serde(default)]
        data: Value,
    },
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_request_frame_serialization() {
        let mut payload = Map::new();
        payload.insert("title".to_string(), json!("milk"));
        let request = TransportRequest::new("/todos", payload, Verb::Post);
        let id = RequestId::generate();

        let value = serde_json::to_value(RequestFrame::new(id, &request)).expect("serialize");
        assert_eq!(value["method"], "post");
        assert_eq!(value["url"], "/todos");
        assert_eq!(value["data"]["title"], "milk");
        assert_eq!(value["id"], id.to_string());
    }

    #[test]
    fn test_parse_response_frame() {
        let text = r#"{"id":"550e8400-e29b-41d4-a716-446655440000","body":[{"id":1}]}"#;
        let frame: InboundFrame = serde_json::from_str(text).expect("parse");
        match frame {
            InboundFrame::Response { body, .. } => assert_eq!(body, json!([{"id": 1}])),
            other => panic!("expected response, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_push_frame() {
        let text = r#"{"event":"message","data":{"verb":"update","id":7}}"#;
        let frame: InboundFrame = serde_json::from_str(text).expect("parse");
        match frame {
            InboundFrame::Push { event, data } => {
                assert_eq!(event, "message");
                assert_eq!(data["id"], 7);
            }
            other => panic!("expected push, got {other:?}"),
        }
    }

    #[test]
    fn test_response_without_body_defaults_to_null() {
        let text = r#"{"id":"550e8400-e29b-41d4-a716-446655440000"}"#;
        let frame: InboundFrame = serde_json::from_str(text).expect("parse");
        assert!(matches!(frame, InboundFrame::Response { body: Value::Null, .. }));
    }

    #[test]
    fn test_unrecognized_frame_fails() {
        assert!(serde_json::from_str::<InboundFrame>(r#"{"hello":"world"}"#).is_err());
    }
}
