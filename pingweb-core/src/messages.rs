//! # Gateway Messages
//!
//! Request and response messages exchanged with the ping gateway.
//!
//! The structs derive both `prost::Message` (binary mode) and `serde` (text mode), so the same
//! value can travel through either codec. In their JSON form fields use camelCase names and any
//! missing field takes its default value.
use serde::{Deserialize, Serialize};

/// Unary request. Created per call and never mutated once sent.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MessagePing {
    #[prost(int64, tag = "1")]
    pub timestamp: i64,
}

/// Unary response: the echoed timestamp and the name of the service that answered.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MessagePong {
    #[prost(int64, tag = "1")]
    pub timestamp: i64,
    #[prost(string, tag = "2")]
    pub service_name: String,
}

/// Server-streaming request.
///
/// `message_count` is clamped by [`crate::session::StreamSession`] before the request leaves the
/// process. `message_interval` (milliseconds) is a pacing hint for the gateway.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StreamingMessagePing {
    #[prost(int64, tag = "1")]
    pub timestamp: i64,
    #[prost(int32, tag = "2")]
    pub message_count: i32,
    #[prost(int32, tag = "3")]
    pub message_interval: i32,
}

/// One element of a server stream, in arrival order.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StreamingMessagePong {
    #[prost(int64, tag = "1")]
    pub timestamp: i64,
    #[prost(string, tag = "2")]
    pub service_name: String,
}

/// Common view over unary and streamed responses, used to render success notifications.
pub trait PongLike {
    fn timestamp(&self) -> i64;
    fn service_name(&self) -> &str;
}

impl PongLike for MessagePong {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }

    fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl PongLike for StreamingMessagePong {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }

    fn service_name(&self) -> &str {
        &self.service_name
    }
}
