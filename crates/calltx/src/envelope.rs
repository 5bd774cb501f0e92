//! # Transaction Envelope
//!
//! One message framed as `[Len: varint][Body: Len]`, the standard length-delimited
//! protobuf framing. The transport carries envelopes as opaque buffers.
//!
//! ## Invariants
//! - **Declared Length**: the body length is known before the body is read, so
//!   cutting an envelope short at any byte fails with `TruncatedInput`.
//! - **Exact Fit**: one buffer holds exactly one envelope; leftovers are rejected.
//! - **Bounded**: oversized bodies are rejected from the header alone.

use callpack::varint::decode_varint;
use callpack::varint::encode_varint;
use callpack::varint::encoded_len_varint;

use crate::config::Limits;
use crate::error::Error;
use crate::error::Result;
use crate::message::Message;

/// Encodes `msg` as a length-prefixed envelope.
pub fn encode_envelope<M: Message>(msg: &M) -> Result<Vec<u8>> {
    let body = msg.encode()?;
    let mut out = Vec::with_capacity(encoded_len_varint(body.len() as u64) + body.len());
    encode_varint(body.len() as u64, &mut out);
    out.extend_from_slice(&body);
    Ok(out)
}

/// Reads only the envelope header.
///
/// Returns `(header_len, body_len)`. Useful for sizing or routing before a
/// full decode.
pub fn peek_envelope_len(buf: &[u8], limits: &Limits) -> Result<(usize, usize)> {
    let (len, header_len) = decode_varint(buf)?;
    if len > limits.max_message_len as u64 {
        return Err(Error::MessageTooLarge { len, limit: limits.max_message_len });
    }
    Ok((header_len, len as usize))
}

/// Splits the first envelope off `buf`.
///
/// Returns the body and whatever follows it. For streams carrying several
/// envelopes back to back.
pub fn split_envelope<'a>(buf: &'a [u8], limits: &Limits) -> Result<(&'a [u8], &'a [u8])> {
    let (header_len, body_len) = peek_envelope_len(buf, limits)?;
    let rest = &buf[header_len..];
    if body_len > rest.len() {
        let available = rest.len();
        return Err(callpack::Error::TruncatedInput { needed: body_len, available }.into());
    }
    Ok(rest.split_at(body_len))
}

/// Decodes a buffer holding exactly one envelope.
///
/// # Errors
/// - `TruncatedInput` when the buffer ends before the declared body does.
/// - `TrailingBytes` when bytes follow the body.
/// - `MessageTooLarge` when the header declares more than `limits.max_message_len`.
pub fn decode_envelope<M: Message>(buf: &[u8], limits: &Limits) -> Result<M> {
    let (body, rest) = split_envelope(buf, limits)?;
    if !rest.is_empty() {
        return Err(Error::TrailingBytes(rest.len()));
    }
    M::decode_with(body, limits)
}
