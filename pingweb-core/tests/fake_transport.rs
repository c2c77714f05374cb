#![allow(dead_code)]

use futures_util::{StreamExt, stream};
use pingweb_core::{
    EncodingMode, PingTransport, UnaryMethod,
    grpc::client::GrpcRequestError,
    messages::{MessagePing, MessagePong, StreamingMessagePing, StreamingMessagePong},
    transport::PongStream,
};
use std::sync::{Arc, Mutex};
use tonic::{Response, Status};

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Unary {
        method: UnaryMethod,
        payload: MessagePing,
        headers: Vec<(String, String)>,
    },
    Streaming {
        payload: StreamingMessagePing,
        headers: Vec<(String, String)>,
    },
}

// A transport that records every call and answers from a script.
#[derive(Clone)]
pub struct FakeTransport {
    mode: EncodingMode,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    unary_reply: Result<String, Status>,
    stream_items: Vec<Result<StreamingMessagePong, Status>>,
    stream_rejection: Option<Status>,
    keep_stream_open: bool,
}

impl FakeTransport {
    pub fn new(mode: EncodingMode) -> Self {
        Self {
            mode,
            calls: Arc::default(),
            unary_reply: Ok("svc-a".to_string()),
            stream_items: vec![],
            stream_rejection: None,
            keep_stream_open: false,
        }
    }

    pub fn with_unary_error(mut self, status: Status) -> Self {
        self.unary_reply = Err(status);
        self
    }

    pub fn with_stream(mut self, items: Vec<Result<StreamingMessagePong, Status>>) -> Self {
        self.stream_items = items;
        self
    }

    pub fn rejecting_streams(mut self, status: Status) -> Self {
        self.stream_rejection = Some(status);
        self
    }

    /// The stream never ends after the scripted items.
    pub fn keeping_stream_open(mut self) -> Self {
        self.keep_stream_open = true;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn pong(timestamp: i64, seq: usize) -> StreamingMessagePong {
    StreamingMessagePong {
        timestamp,
        service_name: format!("svc-extra {seq}"),
    }
}

#[async_trait::async_trait]
impl PingTransport for FakeTransport {
    fn mode(&self) -> EncodingMode {
        self.mode
    }

    async fn unary(
        &self,
        method: UnaryMethod,
        payload: MessagePing,
        headers: Vec<(String, String)>,
    ) -> Result<Result<Response<MessagePong>, Status>, GrpcRequestError> {
        let timestamp = payload.timestamp;
        self.calls.lock().unwrap().push(RecordedCall::Unary {
            method,
            payload,
            headers,
        });

        Ok(self.unary_reply.clone().map(|service_name| {
            Response::new(MessagePong {
                timestamp,
                service_name,
            })
        }))
    }

    async fn streaming_ping(
        &self,
        payload: StreamingMessagePing,
        headers: Vec<(String, String)>,
    ) -> Result<Result<Response<PongStream>, Status>, GrpcRequestError> {
        self.calls
            .lock()
            .unwrap()
            .push(RecordedCall::Streaming { payload, headers });

        if let Some(status) = self.stream_rejection.clone() {
            return Ok(Err(status));
        }

        let items = stream::iter(self.stream_items.clone());
        let stream = if self.keep_stream_open {
            items.chain(stream::pending()).boxed()
        } else {
            items.boxed()
        };

        Ok(Ok(Response::new(stream)))
    }
}
