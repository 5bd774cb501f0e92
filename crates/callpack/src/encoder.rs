use crate::Error;
use crate::Result;
use crate::WireType;
use crate::make_key;
use crate::varint::encode_varint;
use crate::varint::varint_bytes;

/// The kind of an open scope on the `Encoder` stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Length-delimited nested message; the length is back-patched on close.
    Message,
    /// Start/end-group pair; closed by writing the matching end-group key.
    Group,
}

/// An active scope on the `Encoder` stack.
struct Frame {
    /// Body start for messages, unused for groups.
    start: usize,
    tag: u32,
    scope: Scope,
}

/// A bounded, stack-driven encoder.
///
/// Fields are written in the order the caller emits them; the encoder never
/// reorders. Nested messages are opened with `message_begin` and closed with
/// `message_end`, at which point the varint body length is inserted in front
/// of the body.
///
/// # Structural Invariants
///
/// 1.  Every tag written must lie in `MIN_TAG..=MAX_TAG`.
/// 2.  Scopes close in LIFO order and with the matching `*_end` call.
/// 3.  The encoder must have no open scopes to finalize bytes.
pub struct Encoder {
    buf: Vec<u8>,
    stack: Vec<Frame>,
}

impl Encoder {
    /// Creates a new encoder with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            buf: Vec::with_capacity(cap),
            stack: Vec::with_capacity(4),
        }
    }

    /// Consumes the encoder and returns the final byte vector.
    ///
    /// # Errors
    /// Returns `Error::ScopeStillOpen` if any scope is open.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        if !self.stack.is_empty() {
            return Err(Error::ScopeStillOpen);
        }
        Ok(self.buf)
    }

    /// Returns a view of the current buffer.
    ///
    /// # Errors
    /// Returns `Error::ScopeStillOpen` if any scope is open.
    pub fn as_bytes(&self) -> Result<&[u8]> {
        if !self.stack.is_empty() {
            return Err(Error::ScopeStillOpen);
        }
        Ok(&self.buf)
    }

    /// Number of currently open scopes.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Writes a record key.
    pub fn key(&mut self, tag: u32, wire_type: WireType) -> Result<()> {
        let key = make_key(tag, wire_type)?;
        encode_varint(key, &mut self.buf);
        Ok(())
    }

    /// Encodes a varint record.
    pub fn uint64(&mut self, tag: u32, v: u64) -> Result<()> {
        self.key(tag, WireType::Varint)?;
        encode_varint(v, &mut self.buf);
        Ok(())
    }

    /// Encodes a fixed 32-bit record (LE).
    pub fn fixed32(&mut self, tag: u32, v: u32) -> Result<()> {
        self.key(tag, WireType::Fixed32)?;
        self.buf.extend_from_slice(&v.to_le_bytes());
        Ok(())
    }

    /// Encodes a fixed 64-bit record (LE).
    pub fn fixed64(&mut self, tag: u32, v: u64) -> Result<()> {
        self.key(tag, WireType::Fixed64)?;
        self.buf.extend_from_slice(&v.to_le_bytes());
        Ok(())
    }

    /// Encodes a length-delimited byte blob, emitted verbatim after its length.
    pub fn bytes(&mut self, tag: u32, v: &[u8]) -> Result<()> {
        self.key(tag, WireType::LengthDelimited)?;
        encode_varint(v.len() as u64, &mut self.buf);
        self.buf.extend_from_slice(v);
        Ok(())
    }

    /// Appends already-encoded records without inspecting them.
    pub fn raw(&mut self, records: &[u8]) {
        self.buf.extend_from_slice(records);
    }

    /// Begins a nested message.
    ///
    /// # Invariants
    /// - Must be closed via `message_end()`.
    pub fn message_begin(&mut self, tag: u32) -> Result<()> {
        self.key(tag, WireType::LengthDelimited)?;
        self.stack.push(Frame { start: self.buf.len(), tag, scope: Scope::Message });
        Ok(())
    }

    /// Ends a nested message, inserting its length prefix.
    pub fn message_end(&mut self) -> Result<()> {
        let frame = self.pop_scope(Scope::Message)?;
        let body_len = (self.buf.len() - frame.start) as u64;
        let (prefix, n) = varint_bytes(body_len);
        self.buf.splice(frame.start..frame.start, prefix[..n].iter().copied());
        Ok(())
    }

    /// Begins a group.
    ///
    /// # Invariants
    /// - Must be closed via `group_end()`, which writes the end-group key.
    pub fn group_begin(&mut self, tag: u32) -> Result<()> {
        self.key(tag, WireType::StartGroup)?;
        self.stack.push(Frame { start: self.buf.len(), tag, scope: Scope::Group });
        Ok(())
    }

    /// Ends a group.
    pub fn group_end(&mut self) -> Result<()> {
        let frame = self.pop_scope(Scope::Group)?;
        self.key(frame.tag, WireType::EndGroup)
    }

    fn pop_scope(&mut self, expected: Scope) -> Result<Frame> {
        let Some(frame) = self.stack.pop() else {
            return Err(Error::ScopeUnderflow);
        };
        if frame.scope != expected {
            let actual = frame.scope;
            self.stack.push(frame);
            return Err(Error::ScopeMismatch { expected, actual });
        }
        Ok(frame)
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}
