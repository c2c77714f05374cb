//! # Gateway gRPC Client
//!
//! This module wraps a standard `tonic` client bound to one [`EncodingMode`].
//!
//! ## How it works
//!
//! The [`GrpcClient`] keeps a `tonic::client::Grpc` over any `GrpcService` (a `Channel` in
//! production, an in-process service in tests). Each call clones that inner client, so a single
//! instance can serve many concurrent calls through `&self`.
//!
//! ## Features
//!
//! * **Codec selection**: [`JsonCodec`] for [`EncodingMode::Text`], `ProstCodec` for
//!   [`EncodingMode::Binary`].
//! * **Metadata Handling**: Converts string tuples into Tonic's `MetadataMap` for headers.
//! * **Access Patterns**: Unary and Server Streaming calls.
use super::codec::JsonCodec;
use crate::{
    BoxError,
    messages::{MessagePing, MessagePong, StreamingMessagePing, StreamingMessagePong},
    transport::{EncodingMode, PongStream, PingTransport, STREAMING_PING_PATH, UnaryMethod},
};
use futures_util::{StreamExt, stream};
use http_body::Body as HttpBody;
use std::str::FromStr;
use tonic::{
    Streaming,
    client::GrpcService,
    metadata::{
        MetadataKey, MetadataValue,
        errors::{InvalidMetadataKey, InvalidMetadataValue},
    },
    transport::Channel,
};
use tonic_prost::ProstCodec;
use tracing::debug;

#[derive(thiserror::Error, Debug)]
pub enum GrpcRequestError {
    #[error("Internal error, the client was not ready: '{0}'")]
    ClientNotReady(#[source] BoxError),
    #[error("Invalid metadata (header) key '{key}': '{source}'")]
    InvalidMetadataKey {
        key: String,
        source: InvalidMetadataKey,
    },
    #[error("Invalid metadata (header) value for key '{key}': '{source}'")]
    InvalidMetadataValue {
        key: String,
        source: InvalidMetadataValue,
    },
}

/// A gateway client bound to a single wire encoding.
#[derive(Debug, Clone)]
pub struct GrpcClient<S = Channel> {
    client: tonic::client::Grpc<S>,
    mode: EncodingMode,
}

impl<S> GrpcClient<S>
where
    S: GrpcService<tonic::body::Body> + Clone,
    S::Error: Into<BoxError>,
    S::ResponseBody: HttpBody<Data = tonic::codegen::Bytes> + Send + 'static,
    <S::ResponseBody as HttpBody>::Error: Into<BoxError> + Send,
{
    pub fn new(service: S, mode: EncodingMode) -> Self {
        let client = tonic::client::Grpc::new(service);
        Self { client, mode }
    }

    /// Performs a Unary gRPC call (Single Request -> Single Response).
    ///
    /// # Returns
    /// * `Ok(Ok(Response))` - Successful RPC execution.
    /// * `Ok(Err(Status))` - RPC executed, but server returned an error.
    /// * `Err(GrpcRequestError)` - Failed to send request.
    pub async fn unary(
        &self,
        method: UnaryMethod,
        payload: MessagePing,
        headers: Vec<(String, String)>,
    ) -> Result<Result<tonic::Response<MessagePong>, tonic::Status>, GrpcRequestError> {
        let mut client = self.client.clone();
        client
            .ready()
            .await
            .map_err(|e| GrpcRequestError::ClientNotReady(e.into()))?;

        let path = http_path(method.path());
        let request = build_request(payload, headers)?;

        let result = match self.mode {
            EncodingMode::Text => {
                client
                    .unary(request, path, JsonCodec::<MessagePing, MessagePong>::default())
                    .await
            }
            EncodingMode::Binary => {
                client
                    .unary(request, path, ProstCodec::<MessagePing, MessagePong>::default())
                    .await
            }
        };

        Ok(result)
    }

    /// Performs a Server Streaming gRPC call (Single Request -> Stream of Responses).
    ///
    /// # Returns
    ///
    /// * `Ok(Ok(Response))` - Successful RPC execution, the body holds the response stream.
    /// * `Ok(Err(Status))` - RPC executed, but server returned an error.
    /// * `Err(GrpcRequestError)` - Failed to send request.
    pub async fn server_streaming(
        &self,
        payload: StreamingMessagePing,
        headers: Vec<(String, String)>,
    ) -> Result<Result<tonic::Response<PongStream>, tonic::Status>, GrpcRequestError> {
        let mut client = self.client.clone();
        client
            .ready()
            .await
            .map_err(|e| GrpcRequestError::ClientNotReady(e.into()))?;

        let path = http_path(STREAMING_PING_PATH);
        let request = build_request(payload, headers)?;

        let result = match self.mode {
            EncodingMode::Text => {
                client
                    .server_streaming(
                        request,
                        path,
                        JsonCodec::<StreamingMessagePing, StreamingMessagePong>::default(),
                    )
                    .await
            }
            EncodingMode::Binary => {
                client
                    .server_streaming(
                        request,
                        path,
                        ProstCodec::<StreamingMessagePing, StreamingMessagePong>::default(),
                    )
                    .await
            }
        };

        Ok(result.map(|response| response.map(with_trailer_logging)))
    }
}

#[async_trait::async_trait]
impl<S> PingTransport for GrpcClient<S>
where
    S: GrpcService<tonic::body::Body> + Clone + Send + Sync + 'static,
    S::Future: Send,
    S::Error: Into<BoxError>,
    S::ResponseBody: HttpBody<Data = tonic::codegen::Bytes> + Send + 'static,
    <S::ResponseBody as HttpBody>::Error: Into<BoxError> + Send,
{
    fn mode(&self) -> EncodingMode {
        self.mode
    }

    async fn unary(
        &self,
        method: UnaryMethod,
        payload: MessagePing,
        headers: Vec<(String, String)>,
    ) -> Result<Result<tonic::Response<MessagePong>, tonic::Status>, GrpcRequestError> {
        GrpcClient::unary(self, method, payload, headers).await
    }

    async fn streaming_ping(
        &self,
        payload: StreamingMessagePing,
        headers: Vec<(String, String)>,
    ) -> Result<Result<tonic::Response<PongStream>, tonic::Status>, GrpcRequestError> {
        self.server_streaming(payload, headers).await
    }
}

fn http_path(path: &'static str) -> http::uri::PathAndQuery {
    http::uri::PathAndQuery::from_static(path)
}

fn build_request<T>(
    payload: T,
    headers: Vec<(String, String)>,
) -> Result<tonic::Request<T>, GrpcRequestError> {
    let mut request = tonic::Request::new(payload);
    for (k, v) in headers {
        let key =
            MetadataKey::from_str(&k).map_err(|source| GrpcRequestError::InvalidMetadataKey {
                key: k.clone(),
                source,
            })?;
        let val = MetadataValue::from_str(&v)
            .map_err(|source| GrpcRequestError::InvalidMetadataValue { key: k, source })?;
        request.metadata_mut().insert(key, val);
    }
    Ok(request)
}

/// Boxes a response stream, logging the trailers once the gateway closes it.
///
/// The stream ends after its first error.
fn with_trailer_logging(streaming: Streaming<StreamingMessagePong>) -> PongStream {
    stream::unfold(Some(streaming), |state| async move {
        let mut streaming = state?;
        match streaming.message().await {
            Ok(Some(pong)) => Some((Ok(pong), Some(streaming))),
            Ok(None) => match streaming.trailers().await {
                Ok(trailers) => {
                    debug!(?trailers, "Received stream trailers");
                    None
                }
                Err(status) => Some((Err(status), None)),
            },
            Err(status) => Some((Err(status), None)),
        }
    })
    .boxed()
}
