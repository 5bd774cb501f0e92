use crate::DEFAULT_MAX_DEPTH;
use crate::Error;
use crate::Result;
use crate::WireType;
use crate::split_key;
use crate::varint::decode_varint;

/// The value half of a record, borrowed from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value<'a> {
    Varint(u64),
    Fixed64(u64),
    Fixed32(u32),
    /// Body of a length-delimited record, without its length prefix.
    Bytes(&'a [u8]),
    /// Records between a start-group and its matching end-group key.
    Group(&'a [u8]),
}

/// One `(tag, wire type, value)` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    pub tag: u32,
    pub wire_type: WireType,
    pub value: Value<'a>,
    /// The whole record as it appeared on the wire: key, length and body.
    pub raw: &'a [u8],
}

/// A zero-copy, bounds-checked cursor over a byte slice.
///
/// Reading advances the internal cursor. Length-delimited bodies are returned
/// as sub-slices, so a nested decoder built from one can never read past the
/// declared length.
///
/// # Errors
/// All read operations return `Error::TruncatedInput` if the buffer is exhausted.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    buf: &'a [u8],
    max_depth: usize,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder over the slice.
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_depth_limit(buf, DEFAULT_MAX_DEPTH)
    }

    /// Creates a decoder that refuses groups nested deeper than `max_depth`.
    pub fn with_depth_limit(buf: &'a [u8], max_depth: usize) -> Self {
        Self { buf, max_depth }
    }

    /// Returns the remaining bytes in the view.
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The unread tail of the input.
    pub fn as_slice(&self) -> &'a [u8] {
        self.buf
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.buf.len() {
            return Err(Error::TruncatedInput { needed: n, available: self.buf.len() });
        }
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    /// Decodes a varint.
    pub fn varint(&mut self) -> Result<u64> {
        let (v, n) = decode_varint(self.buf)?;
        self.buf = &self.buf[n..];
        Ok(v)
    }

    /// Decodes a record key.
    pub fn key(&mut self) -> Result<(u32, WireType)> {
        let key = self.varint()?;
        split_key(key)
    }

    /// Decodes a fixed 32-bit value (LE).
    pub fn fixed32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Decodes a fixed 64-bit value (LE).
    pub fn fixed64(&mut self) -> Result<u64> {
        let mut out = [0u8; 8];
        out.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(out))
    }

    /// Decodes a length prefix and returns the body it covers.
    ///
    /// # Errors
    /// `Error::TruncatedInput` if the prefix exceeds the remaining bytes.
    pub fn length_delimited(&mut self) -> Result<&'a [u8]> {
        let len = self.varint()?;
        let len = usize::try_from(len).map_err(|_| Error::LengthOverflow(len))?;
        self.take(len)
    }

    /// Decodes the next record, or `None` at the end of input.
    pub fn record(&mut self) -> Result<Option<Record<'a>>> {
        if self.buf.is_empty() {
            return Ok(None);
        }
        let start = self.buf;
        let (tag, wire_type) = self.key()?;
        let value = match wire_type {
            WireType::Varint => Value::Varint(self.varint()?),
            WireType::Fixed64 => Value::Fixed64(self.fixed64()?),
            WireType::Fixed32 => Value::Fixed32(self.fixed32()?),
            WireType::LengthDelimited => Value::Bytes(self.length_delimited()?),
            WireType::StartGroup => Value::Group(self.group_body(tag, self.max_depth)?),
            WireType::EndGroup => return Err(Error::UnmatchedGroup(tag)),
        };
        let raw = &start[..start.len() - self.buf.len()];
        Ok(Some(Record { tag, wire_type, value, raw }))
    }

    /// Skips the value of a record whose key has already been read.
    pub fn skip_value(&mut self, tag: u32, wire_type: WireType) -> Result<()> {
        match wire_type {
            WireType::Varint => {
                self.varint()?;
            }
            WireType::Fixed64 => {
                self.take(8)?;
            }
            WireType::Fixed32 => {
                self.take(4)?;
            }
            WireType::LengthDelimited => {
                self.length_delimited()?;
            }
            WireType::StartGroup => {
                self.group_body(tag, self.max_depth)?;
            }
            WireType::EndGroup => return Err(Error::UnmatchedGroup(tag)),
        }
        Ok(())
    }

    /// Consumes records up to and including the end-group key for `tag`.
    ///
    /// Returns the records in between.
    fn group_body(&mut self, tag: u32, depth_left: usize) -> Result<&'a [u8]> {
        if depth_left == 0 {
            return Err(Error::RecursionLimitExceeded);
        }
        let body_start = self.buf;
        loop {
            let before = self.buf;
            let (inner_tag, wire_type) = self.key()?;
            match wire_type {
                WireType::EndGroup if inner_tag == tag => {
                    return Ok(&body_start[..body_start.len() - before.len()]);
                }
                WireType::EndGroup => return Err(Error::UnmatchedGroup(inner_tag)),
                WireType::StartGroup => {
                    self.group_body(inner_tag, depth_left - 1)?;
                }
                other => self.skip_value(inner_tag, other)?,
            }
        }
    }

    /// Iterates the remaining records.
    pub fn records(self) -> Records<'a> {
        Records { dec: self, failed: false }
    }
}

/// Iterator over the records of a decoder.
///
/// Yields at most one error, after which iteration stops.
#[derive(Debug, Clone)]
pub struct Records<'a> {
    dec: Decoder<'a>,
    failed: bool,
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<Record<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.dec.record() {
            Ok(record) => record.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
