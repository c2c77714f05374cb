//! # Pingweb Core
//!
//! `pingweb-core` is the library powering the `pingweb` CLI. It talks to a ping gateway exposing
//! the `v2.ServiceA` and `v2.ServiceExtra` services and turns call results into user-facing
//! notifications.
//!
//! ## Key Components
//!
//! * **[`Orchestrator`]:** The main entry point. It validates raw user input, picks the transport
//!   matching the requested [`EncodingMode`] and reports every outcome to a [`NotificationSink`].
//! * **[`StreamSession`]:** A bounded server-streaming call with an explicit lifecycle
//!   (`Idle -> Streaming -> Done`) and cancellation support.
//! * **[`Transports`]:** The pair of long-lived transport clients (text and binary) pointed at the
//!   same gateway.
//!
//! ## Internal clients
//!
//! * **[`GrpcClient`]:** A gRPC client bound to a single [`EncodingMode`]. It picks
//!   [`JsonCodec`](grpc::codec::JsonCodec) for the text-safe mode and `tonic_prost::ProstCodec`
//!   for the binary one.
//!
//! ## Re-exports
//!
//! This crate re-exports `prost` and `tonic` to ensure that consumers use compatible versions
//! of these underlying dependencies.
pub mod config;
pub mod grpc;
pub mod messages;
pub mod notify;
pub mod orchestrator;
pub mod session;
pub mod transport;

pub use config::ClientConfig;
pub use grpc::client::GrpcClient;
pub use notify::{Notification, NotificationSink, Severity};
pub use orchestrator::{Orchestrator, PingError};
pub use session::{SessionEnd, SessionState, StreamSession};
pub use transport::{EncodingMode, PingTransport, Transports, UnaryMethod};

// Re-exports
pub use prost;
pub use tonic;

/// Type alias for the standard boxed error used in generic bounds.
type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
