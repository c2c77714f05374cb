//! # Transports
//!
//! The seam between the orchestration logic and the wire.
//!
//! [`PingTransport`] is the set of calls the gateway offers. [`Transports`] holds the two
//! long-lived instances (text and binary) that every call is routed to. Both instances are
//! built once, point at the same gateway, and are only ever borrowed immutably afterwards.
use crate::{
    config::ClientConfig,
    grpc::client::{GrpcClient, GrpcRequestError},
    messages::{MessagePing, MessagePong, StreamingMessagePing, StreamingMessagePong},
};
use futures_util::stream::BoxStream;
use std::{fmt, str::FromStr, time::Duration};
use tonic::transport::{Channel, Endpoint};

/// Stream of responses produced by a server-streaming call.
pub type PongStream = BoxStream<'static, Result<StreamingMessagePong, tonic::Status>>;

/// The wire encoding used by a transport instance.
///
/// Only the bytes on the wire change between modes; message content is identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodingMode {
    /// Text-safe JSON payloads.
    Text,
    /// Protobuf payloads.
    Binary,
}

impl fmt::Display for EncodingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingMode::Text => write!(f, "text"),
            EncodingMode::Binary => write!(f, "binary"),
        }
    }
}

impl FromStr for EncodingMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "text" => Ok(EncodingMode::Text),
            "binary" => Ok(EncodingMode::Binary),
            other => Err(format!(
                "Unknown encoding mode '{other}'. Expected 'text' or 'binary'"
            )),
        }
    }
}

/// Unary methods exposed by the gateway. They all take a [`MessagePing`] and answer with a
/// [`MessagePong`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnaryMethod {
    #[default]
    ServiceAPing,
    ServiceAPost,
    ServiceExtraPing,
    ServiceExtraPost,
}

impl UnaryMethod {
    /// The HTTP/2 path of the method (e.g. `/v2.ServiceA/Ping`).
    pub fn path(&self) -> &'static str {
        match self {
            UnaryMethod::ServiceAPing => "/v2.ServiceA/Ping",
            UnaryMethod::ServiceAPost => "/v2.ServiceA/Post",
            UnaryMethod::ServiceExtraPing => "/v2.ServiceExtra/Ping",
            UnaryMethod::ServiceExtraPost => "/v2.ServiceExtra/Post",
        }
    }
}

/// Path of the only server-streaming method of the gateway.
pub const STREAMING_PING_PATH: &str = "/v2.ServiceExtra/StreamingPing";

/// A transport able to perform every gateway call.
///
/// # Returns
///
/// * `Ok(Ok(_))` - The call went through and the gateway answered.
/// * `Ok(Err(Status))` - The call went through but the gateway returned an error.
/// * `Err(GrpcRequestError)` - The request could not be sent at all.
#[async_trait::async_trait]
pub trait PingTransport: Send + Sync {
    /// The encoding this instance is bound to.
    fn mode(&self) -> EncodingMode;

    async fn unary(
        &self,
        method: UnaryMethod,
        payload: MessagePing,
        headers: Vec<(String, String)>,
    ) -> Result<Result<tonic::Response<MessagePong>, tonic::Status>, GrpcRequestError>;

    async fn streaming_ping(
        &self,
        payload: StreamingMessagePing,
        headers: Vec<(String, String)>,
    ) -> Result<Result<tonic::Response<PongStream>, tonic::Status>, GrpcRequestError>;
}

/// Errors that can occur when connecting to the gateway.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("Invalid URL '{0}': {1}")]
    InvalidUrl(String, #[source] tonic::transport::Error),
}

/// The two parallel transport instances of one gateway.
#[derive(Debug, Clone)]
pub struct Transports<T> {
    text: T,
    binary: T,
}

impl<T: PingTransport> Transports<T> {
    pub fn new(text: T, binary: T) -> Self {
        Self { text, binary }
    }

    /// Returns the instance handling calls made in `mode`.
    pub fn select(&self, mode: EncodingMode) -> &T {
        match mode {
            EncodingMode::Text => &self.text,
            EncodingMode::Binary => &self.binary,
        }
    }
}

impl Transports<GrpcClient<Channel>> {
    /// Builds both transport instances for the gateway configured in `config`.
    ///
    /// Each instance gets its own channel to the same endpoint. Channels connect on first use,
    /// so an unreachable gateway fails each call instead of the whole client.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn connect(config: &ClientConfig) -> Result<Self, ConnectError> {
        let text = connect_channel(config)?;
        let binary = connect_channel(config)?;

        Ok(Self::new(
            GrpcClient::new(text, EncodingMode::Text),
            GrpcClient::new(binary, EncodingMode::Binary),
        ))
    }
}

fn connect_channel(config: &ClientConfig) -> Result<Channel, ConnectError> {
    let addr = config.endpoint.as_str();

    let mut endpoint = Endpoint::new(addr.to_string())
        .map_err(|e| ConnectError::InvalidUrl(addr.to_string(), e))?;

    if let Some(timeout_ms) = config.timeout_ms {
        endpoint = endpoint.timeout(Duration::from_millis(timeout_ms));
    }

    Ok(endpoint.connect_lazy())
}

/// Converts any failure preparing a request into the status reported to the user.
pub(crate) fn request_error_status(err: &GrpcRequestError) -> tonic::Status {
    match err {
        GrpcRequestError::ClientNotReady(_) => tonic::Status::unavailable(err.to_string()),
        _ => tonic::Status::internal(err.to_string()),
    }
}
