//! # gRPC Transport
//!
//! This module contains the low-level building blocks used to talk to the gateway.
//!
//! The gateway accepts the same messages in two encodings. The binary one is plain protobuf
//! (`tonic_prost::ProstCodec`); the text-safe one is JSON ([`codec::JsonCodec`]). A
//! [`client::GrpcClient`] is bound to exactly one of them for its whole lifetime.
pub mod client;
pub mod codec;
