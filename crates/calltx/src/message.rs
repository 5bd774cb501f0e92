//! # Message Codec
//!
//! The generic encode/decode driver shared by every schema type.
//!
//! ## Invariants
//! - **Fixed Order**: known fields are written in ascending tag order, followed by
//!   preserved unknown records in arrival order. Encoding is therefore deterministic.
//! - **Type Strictness**: a known tag must arrive with the wire type of its kind.
//! - **Forward Compatibility**: unknown tags are retained, never rejected.
//! - **No Partial Results**: decode fills a fresh value and hands it out only on success.

use std::fmt;

use callpack::Decoder;
use callpack::Encoder;
use callpack::Value;

use crate::config::Limits;
use crate::error::Error;
use crate::error::Result;
use crate::schema::FieldKind;
use crate::schema::MessageDescriptor;
use crate::unknown::UnknownFields;

/// A field value whose wire type has already been checked against the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Uint64(u64),
    /// Opaque bytes, or the body of a nested message.
    Bytes(&'a [u8]),
}

/// A schema type with a stable wire representation.
pub trait Message: Default + Clone + PartialEq + fmt::Debug + Send + Sync {
    /// The descriptor the decoder dispatches on.
    fn descriptor() -> &'static MessageDescriptor;

    /// Writes every present known field, in ascending tag order.
    fn encode_fields(&self, enc: &mut Encoder) -> Result<()>;

    /// Folds one decoded field into `self`.
    ///
    /// `depth` is the nesting budget left for any message this field contains.
    fn merge_field(&mut self, tag: u32, value: FieldValue<'_>, depth: usize) -> Result<()>;

    fn unknown_fields(&self) -> &UnknownFields;

    fn unknown_fields_mut(&mut self) -> &mut UnknownFields;

    /// Writes known fields, then the preserved unknown records.
    fn encode_into(&self, enc: &mut Encoder) -> Result<()> {
        self.encode_fields(enc)?;
        self.unknown_fields().encode(enc);
        Ok(())
    }

    /// Encodes the message body. The zero value encodes to no bytes at all.
    fn encode(&self) -> Result<Vec<u8>> {
        let mut enc = Encoder::new();
        self.encode_into(&mut enc)?;
        Ok(enc.into_bytes()?)
    }

    /// Decodes a message body with default limits.
    fn decode(buf: &[u8]) -> Result<Self> {
        Self::decode_with(buf, &Limits::default())
    }

    /// Decodes a message body.
    ///
    /// # Errors
    /// - `Error::MessageTooLarge` if `buf` exceeds `limits.max_message_len`.
    /// - `Error::TypeMismatch` if a known tag carries the wrong wire type.
    /// - `Error::Wire` for truncation, malformed varints and other wire violations.
    fn decode_with(buf: &[u8], limits: &Limits) -> Result<Self> {
        if buf.len() > limits.max_message_len {
            return Err(Error::MessageTooLarge {
                len: buf.len() as u64,
                limit: limits.max_message_len,
            });
        }
        let mut msg = Self::default();
        merge(&mut msg, buf, limits.max_depth)?;
        Ok(msg)
    }
}

/// Reads every record of `buf` into `msg`.
pub(crate) fn merge<M: Message>(msg: &mut M, buf: &[u8], depth: usize) -> Result<()> {
    let descriptor = M::descriptor();
    let mut dec = Decoder::with_depth_limit(buf, depth);

    while let Some(record) = dec.record()? {
        let Some(field) = descriptor.field(record.tag) else {
            msg.unknown_fields_mut().push(&record);
            continue;
        };

        let value = match (field.kind, record.value) {
            (FieldKind::Uint64, Value::Varint(v)) => FieldValue::Uint64(v),
            (FieldKind::Bytes | FieldKind::Message(_), Value::Bytes(b)) => FieldValue::Bytes(b),
            _ => {
                return Err(Error::TypeMismatch {
                    message: descriptor.name,
                    field: field.name,
                    tag: field.tag,
                    expected: field.kind.wire_type(),
                    found: record.wire_type,
                });
            }
        };
        msg.merge_field(field.tag, value, depth)?;
    }
    Ok(())
}

/// Merges a nested message body into `msg`, spending one level of depth.
///
/// A message field seen twice is merged rather than replaced.
pub(crate) fn merge_message<M: Message>(msg: &mut M, body: &[u8], depth: usize) -> Result<()> {
    if depth == 0 {
        return Err(callpack::Error::RecursionLimitExceeded.into());
    }
    merge(msg, body, depth - 1)
}

pub(crate) fn unhandled<M: Message>(tag: u32) -> Error {
    Error::UnhandledField { message: M::descriptor().name, tag }
}

// Helpers for field emission

/// Implicit presence: empty is the default and is not written.
pub(crate) fn put_bytes(enc: &mut Encoder, tag: u32, v: &[u8]) -> Result<()> {
    if !v.is_empty() {
        enc.bytes(tag, v)?;
    }
    Ok(())
}

/// Implicit presence: zero is the default and is not written.
pub(crate) fn put_uint64(enc: &mut Encoder, tag: u32, v: u64) -> Result<()> {
    if v != 0 {
        enc.uint64(tag, v)?;
    }
    Ok(())
}

pub(crate) fn put_message<M: Message>(enc: &mut Encoder, tag: u32, msg: &M) -> Result<()> {
    enc.message_begin(tag)?;
    msg.encode_into(enc)?;
    enc.message_end()?;
    Ok(())
}
