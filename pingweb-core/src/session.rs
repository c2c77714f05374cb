//! # Stream Session
//!
//! A single bounded server-streaming call.
//!
//! A session is created [`Idle`](SessionState::Idle), moves to
//! [`Streaming`](SessionState::Streaming) when run, and ends in
//! [`Done`](SessionState::Done). There is no way back: a new call needs a new session.
//!
//! ```text
//! Idle --run--> Streaming --end------> Done(Completed)
//!                         --error----> Done(Failed)
//!                         --cancel---> Done(Cancelled)
//! ```
use crate::{
    config::ClientConfig,
    messages::StreamingMessagePing,
    notify::{Notification, NotificationSink},
    orchestrator::PingError,
    transport::{PingTransport, request_error_status},
};
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Metadata key the gateway requires on every stream.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Streaming,
    Done(SessionEnd),
}

/// How a session reached [`SessionState::Done`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// The gateway closed the stream normally.
    Completed,
    /// The call or the stream failed.
    Failed { code: tonic::Code, message: String },
    /// The caller cancelled the session.
    Cancelled,
}

#[derive(Debug)]
pub struct StreamSession {
    request: StreamingMessagePing,
    headers: Vec<(String, String)>,
    state: SessionState,
    received: usize,
    cancel: CancellationToken,
}

impl StreamSession {
    /// Builds an idle session asking for `count` messages, clamped to
    /// `config.max_stream_messages`.
    pub fn new(count: u32, timestamp: i64, config: &ClientConfig) -> Self {
        let message_count = count.min(config.max_stream_messages);
        if message_count < count {
            debug!(
                requested = count,
                max = config.max_stream_messages,
                "Clamping stream message count"
            );
        }

        let request = StreamingMessagePing {
            timestamp,
            message_count: i32::try_from(message_count).unwrap_or(i32::MAX),
            message_interval: i32::try_from(config.message_interval_ms).unwrap_or(i32::MAX),
        };

        let mut headers = config.streaming_headers.clone();
        headers.push((
            REQUEST_ID_HEADER.to_string(),
            uuid::Uuid::new_v4().to_string(),
        ));

        Self {
            request,
            headers,
            state: SessionState::Idle,
            received: 0,
            cancel: CancellationToken::new(),
        }
    }

    /// The request that is (or will be) sent to the gateway.
    pub fn request(&self) -> &StreamingMessagePing {
        &self.request
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Number of responses delivered so far.
    pub fn received(&self) -> usize {
        self.received
    }

    /// A token that cancels this session when triggered, even from another task.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Issues the call on `transport` and drives the stream until it ends, fails or is
    /// cancelled.
    ///
    /// Every response is reported to `sink` in arrival order. A failure is reported once and
    /// ends the session; nothing is processed after it. Cancellation is silent.
    ///
    /// # Returns
    ///
    /// * `Ok(SessionEnd)` - The stream completed or was cancelled; [`received`](Self::received)
    ///   tells how many responses arrived.
    /// * `Err(PingError)` - The call or the stream failed, or the session was already run.
    pub async fn run<T, N>(&mut self, transport: &T, sink: &N) -> Result<SessionEnd, PingError>
    where
        T: PingTransport + ?Sized,
        N: NotificationSink + ?Sized,
    {
        if self.state != SessionState::Idle {
            return Err(PingError::SessionAlreadyStarted);
        }
        self.state = SessionState::Streaming;

        let cancel = self.cancel.clone();
        let call = transport.streaming_ping(self.request.clone(), self.headers.clone());

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = call => Some(result),
        };

        let response = match outcome {
            None => return Ok(self.cancelled()),
            Some(Err(err)) => {
                self.fail(sink, &request_error_status(&err));
                return Err(PingError::Request(err));
            }
            Some(Ok(Err(status))) => {
                self.fail(sink, &status);
                return Err(PingError::Transport(status));
            }
            Some(Ok(Ok(response))) => response,
        };

        debug!(metadata = ?response.metadata(), "Received stream metadata");
        let mut stream = response.into_inner();

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                item = stream.next() => Some(item),
            };

            match next {
                None => return Ok(self.cancelled()),
                Some(Some(Ok(pong))) => {
                    self.received += 1;
                    sink.notify(Notification::response(&pong));
                }
                Some(Some(Err(status))) => {
                    self.fail(sink, &status);
                    return Err(PingError::Stream(status));
                }
                Some(None) => {
                    info!(received = self.received, "Stream ended");
                    self.state = SessionState::Done(SessionEnd::Completed);
                    return Ok(SessionEnd::Completed);
                }
            }
        }
    }

    fn cancelled(&mut self) -> SessionEnd {
        info!(received = self.received, "Stream cancelled");
        self.state = SessionState::Done(SessionEnd::Cancelled);
        SessionEnd::Cancelled
    }

    fn fail<N: NotificationSink + ?Sized>(&mut self, sink: &N, status: &tonic::Status) {
        warn!(code = ?status.code(), message = status.message(), "Stream failed");
        self.state = SessionState::Done(SessionEnd::Failed {
            code: status.code(),
            message: status.message().to_string(),
        });
        sink.notify(Notification::status(status));
    }
}
