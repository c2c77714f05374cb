//! # JSON Codec
//!
//! This module implements `tonic::codec::Codec` for any `serde` message, producing text-safe
//! payloads for the [`EncodingMode::Text`](crate::transport::EncodingMode::Text) transport.
//!
//! ## How it works
//!
//! 1. **Encoder (Message -> JSON)**:
//!    - Serializes the outgoing message with `serde_json`.
//!    - Writes the UTF-8 bytes into the gRPC frame buffer.
//!
//! 2. **Decoder (JSON -> Message)**:
//!    - Reads the whole frame from the wire.
//!    - Deserializes it into the expected response type.
//!
//! The codec is symmetric, so the same type also serves the server side of a call.
use bytes::{Buf, BufMut};
use serde::{Serialize, de::DeserializeOwned};
use std::marker::PhantomData;
use tonic::{
    Status,
    codec::{Codec, DecodeBuf, Decoder, EncodeBuf, Encoder},
};

/// A Codec that carries `serde` messages as JSON.
///
/// `E` is the type being sent and `D` the type being received.
#[derive(Debug)]
pub struct JsonCodec<E, D> {
    _pd: PhantomData<fn(E) -> D>,
}

impl<E, D> Default for JsonCodec<E, D> {
    fn default() -> Self {
        Self { _pd: PhantomData }
    }
}

impl<E, D> Codec for JsonCodec<E, D>
where
    E: Serialize + Send + 'static,
    D: DeserializeOwned + Send + 'static,
{
    type Encode = E;
    type Decode = D;

    type Encoder = JsonEncoder<E>;
    type Decoder = JsonDecoder<D>;

    fn encoder(&mut self) -> Self::Encoder {
        JsonEncoder(PhantomData)
    }

    fn decoder(&mut self) -> Self::Decoder {
        JsonDecoder(PhantomData)
    }
}

/// Responsible for encoding a message into JSON bytes.
#[derive(Debug)]
pub struct JsonEncoder<E>(PhantomData<fn(E)>);

impl<E: Serialize> Encoder for JsonEncoder<E> {
    type Item = E;
    type Error = Status;

    fn encode(&mut self, item: Self::Item, dst: &mut EncodeBuf<'_>) -> Result<(), Self::Error> {
        let bytes = serde_json::to_vec(&item)
            .map_err(|e| Status::internal(format!("Failed to encode JSON message: {}", e)))?;

        dst.put_slice(&bytes);
        Ok(())
    }
}

/// Responsible for decoding JSON bytes into a message.
#[derive(Debug)]
pub struct JsonDecoder<D>(PhantomData<fn() -> D>);

impl<D: DeserializeOwned> Decoder for JsonDecoder<D> {
    type Item = D;
    type Error = Status;

    fn decode(&mut self, src: &mut DecodeBuf<'_>) -> Result<Option<Self::Item>, Self::Error> {
        let bytes = src.copy_to_bytes(src.remaining());

        let item = serde_json::from_slice(&bytes)
            .map_err(|e| Status::internal(format!("Failed to decode JSON message: {}", e)))?;

        Ok(Some(item))
    }
}
