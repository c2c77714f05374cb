//! # Request Orchestrator
//!
//! This module turns raw user input into gateway calls and reports every outcome.
//!
//! The [`Orchestrator`] owns the two transport instances, the notification sink and the client
//! configuration. The encoding mode is an argument of every call, so two calls issued back to
//! back in different modes never interfere with each other.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pingweb_core::{ClientConfig, EncodingMode, Notification, Orchestrator, Transports};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::default();
//! let transports = Transports::connect(&config)?;
//! let (sink, mut notifications) = tokio::sync::mpsc::unbounded_channel::<Notification>();
//!
//! let orchestrator = Orchestrator::new(transports, sink, config);
//! orchestrator.ping("11111", EncodingMode::Text).await?;
//!
//! while let Ok(notification) = notifications.try_recv() {
//!     println!("{notification}");
//! }
//! # Ok(())
//! # }
//! ```
mod input;

pub use input::{Input, parse_stream_input, parse_timestamp};

use crate::{
    config::ClientConfig,
    grpc::client::GrpcRequestError,
    messages::{MessagePing, MessagePong},
    notify::{Notification, NotificationSink},
    session::{SessionEnd, StreamSession},
    transport::{EncodingMode, PingTransport, Transports, UnaryMethod, request_error_status},
};
use tracing::{debug, warn};

/// Notification emitted when a unary input is rejected.
pub const INVALID_TIMESTAMP: &str = "Error: timestamp invalid format";
/// Notification emitted when a stream input is rejected.
pub const INVALID_STREAM_INPUT: &str = "Error: stream input invalid format";

/// Errors that can occur while handling a single call.
///
/// Every error is terminal for its call only; the orchestrator stays usable.
#[derive(Debug, thiserror::Error)]
pub enum PingError {
    #[error("Invalid input '{input}': expected {expected}")]
    InvalidInput {
        input: String,
        expected: &'static str,
    },
    #[error("Call failed: code={:?} message={:?}", .0.code(), .0.message())]
    Transport(tonic::Status),
    #[error("Stream failed: code={:?} message={:?}", .0.code(), .0.message())]
    Stream(tonic::Status),
    #[error("gRPC client request error: '{0}'")]
    Request(#[from] GrpcRequestError),
    #[error("Stream session was already started")]
    SessionAlreadyStarted,
}

/// Result of [`Orchestrator::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The input was blank, nothing was sent.
    Ignored,
    Pong(MessagePong),
    Streamed { received: usize, end: SessionEnd },
}

pub struct Orchestrator<T, N> {
    transports: Transports<T>,
    sink: N,
    config: ClientConfig,
}

impl<T, N> Orchestrator<T, N>
where
    T: PingTransport,
    N: NotificationSink,
{
    pub fn new(transports: Transports<T>, sink: N, config: ClientConfig) -> Self {
        Self {
            transports,
            sink,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Handles one line of the input field: blank lines are ignored, `<count> <timestamp>` opens
    /// a stream and anything else is treated as a unary timestamp.
    pub async fn submit(&self, raw: &str, mode: EncodingMode) -> Result<Outcome, PingError> {
        match Input::classify(raw) {
            Input::Empty => Ok(Outcome::Ignored),
            Input::Unary(timestamp) => self.ping(timestamp, mode).await.map(Outcome::Pong),
            Input::Streaming(line) => {
                let mut session = self.open_stream(line)?;
                let end = self.run_stream(&mut session, mode).await?;
                Ok(Outcome::Streamed {
                    received: session.received(),
                    end,
                })
            }
        }
    }

    /// Sends a `ServiceA/Ping` with the given timestamp.
    pub async fn ping(&self, raw: &str, mode: EncodingMode) -> Result<MessagePong, PingError> {
        self.unary(UnaryMethod::ServiceAPing, raw, mode).await
    }

    /// Sends `raw` as the timestamp of a unary `method` call.
    ///
    /// A success is reported after the configured response delay; a failure is reported
    /// immediately. Invalid input is reported and no call is made.
    #[tracing::instrument(skip(self))]
    pub async fn unary(
        &self,
        method: UnaryMethod,
        raw: &str,
        mode: EncodingMode,
    ) -> Result<MessagePong, PingError> {
        let Some(timestamp) = parse_timestamp(raw) else {
            self.sink.notify(Notification::danger(INVALID_TIMESTAMP));
            return Err(PingError::InvalidInput {
                input: raw.to_string(),
                expected: "a non-negative integer timestamp",
            });
        };

        let transport = self.transports.select(mode);
        let result = transport
            .unary(
                method,
                MessagePing { timestamp },
                self.config.unary_headers.clone(),
            )
            .await;

        let response = match result {
            Ok(Ok(response)) => response,
            Ok(Err(status)) => {
                warn!(code = ?status.code(), message = status.message(), "Call failed");
                self.sink.notify(Notification::status(&status));
                return Err(PingError::Transport(status));
            }
            Err(err) => {
                warn!(error = %err, "Request could not be sent");
                self.sink
                    .notify(Notification::status(&request_error_status(&err)));
                return Err(PingError::Request(err));
            }
        };

        if !response.metadata().is_empty() {
            debug!(metadata = ?response.metadata(), "Received metadata");
        }

        let pong = response.into_inner();
        tokio::time::sleep(self.config.response_delay()).await;
        self.sink.notify(Notification::response(&pong));

        Ok(pong)
    }

    /// Parses `<count> <timestamp>` into an idle [`StreamSession`].
    ///
    /// Invalid input is reported and no session is created.
    pub fn open_stream(&self, raw: &str) -> Result<StreamSession, PingError> {
        let Some((count, timestamp)) = parse_stream_input(raw) else {
            self.sink.notify(Notification::danger(INVALID_STREAM_INPUT));
            return Err(PingError::InvalidInput {
                input: raw.to_string(),
                expected: "'<count> <timestamp>' with a positive count",
            });
        };

        Ok(StreamSession::new(count, timestamp, &self.config))
    }

    /// Runs an idle session on the transport matching `mode`.
    pub async fn run_stream(
        &self,
        session: &mut StreamSession,
        mode: EncodingMode,
    ) -> Result<SessionEnd, PingError> {
        session.run(self.transports.select(mode), &self.sink).await
    }

    /// Opens a session from `raw` and runs it to the end.
    ///
    /// # Returns
    ///
    /// The finished session, whose state tells whether it completed or was cancelled.
    #[tracing::instrument(skip(self))]
    pub async fn streaming_ping(
        &self,
        raw: &str,
        mode: EncodingMode,
    ) -> Result<StreamSession, PingError> {
        let mut session = self.open_stream(raw)?;
        self.run_stream(&mut session, mode).await?;
        Ok(session)
    }
}
