//! # Callpack
//!
//! A small, strict, schema-agnostic implementation of the protobuf binary wire format.
//!
//! ## Philosophy
//!
//! - **Explicit state**: the `Encoder` tracks open scopes on a stack and back-patches
//!   length prefixes when a scope closes. No hidden buffers.
//! - **TLV Architecture**: every record is `[Key][Length?][Value]`, so unknown records
//!   can always be skipped by wire type alone.
//! - **Bounded**: the `Decoder` is a zero-copy, bounds-checked view. Nested bodies are
//!   handed out as sub-slices that can never read past their declared length.
//!
//! ## Format
//!
//! - **Key**: `varint((tag << 3) | wire_type)`
//! - **Varint**: `[Key][LEB128: 1..=10b]`
//! - **Fixed**: `[Key][Data: 4b | 8b]` (Little-Endian)
//! - **Length-delimited**: `[Key][Len: varint][Data: Len]`
//! - **Group**: `[Key(StartGroup)][Records..][Key(EndGroup)]`

pub mod decoder;
pub mod encoder;
pub mod varint;

pub use decoder::Decoder;
pub use decoder::Record;
pub use decoder::Records;
pub use decoder::Value;
pub use encoder::Encoder;
pub use encoder::Scope;


/// Smallest tag a field may carry.
pub const MIN_TAG: u32 = 1;
/// Largest tag a field may carry (29 bits).
pub const MAX_TAG: u32 = (1 << 29) - 1;
/// Default bound on group nesting while skipping unknown records.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Callpack serialization and deserialization errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Input ended before a declared length, a fixed-width value, or a varint was complete.
    #[error("truncated input: needed {needed} bytes, {available} available")]
    TruncatedInput { needed: usize, available: usize },
    /// A varint ran past 10 bytes or overflowed 64 bits.
    #[error("malformed varint")]
    MalformedVarint,
    /// Key carried wire type 6 or 7.
    #[error("invalid wire type {0}")]
    InvalidWireType(u8),
    /// Key carried tag 0 or a tag above `MAX_TAG`.
    #[error("invalid field tag {0}")]
    InvalidTag(u64),
    /// Length prefix does not fit in `usize`.
    #[error("length prefix {0} does not fit in memory")]
    LengthOverflow(u64),
    /// An end-group marker without a matching start-group of the same tag.
    #[error("unmatched end-group marker for tag {0}")]
    UnmatchedGroup(u32),
    /// Groups (or nested messages) deeper than the configured bound.
    #[error("nesting depth limit exceeded")]
    RecursionLimitExceeded,
    /// Closing a scope that does not match the active scope.
    #[error("scope mismatch: expected {expected:?}, found {actual:?}")]
    ScopeMismatch { expected: Scope, actual: Scope },
    /// Attempted to close a scope when none is open.
    #[error("no open scope to close")]
    ScopeUnderflow,
    /// Attempted to finalize the buffer with open scopes.
    #[error("encoder finalized with open scopes")]
    ScopeStillOpen,
}

/// Specialized `Result` for Callpack operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Identifies how the value of a record is laid out.
///
/// Used to skip records the reader has no schema for.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    StartGroup = 3,
    EndGroup = 4,
    Fixed32 = 5,
}

impl WireType {
    /// Returns the WireType for the low three bits of a key, or `None` if invalid.
    pub const fn from_u8(b: u8) -> Option<Self> {
        match b {
            0 => Some(WireType::Varint),
            1 => Some(WireType::Fixed64),
            2 => Some(WireType::LengthDelimited),
            3 => Some(WireType::StartGroup),
            4 => Some(WireType::EndGroup),
            5 => Some(WireType::Fixed32),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            WireType::Varint => "varint",
            WireType::Fixed64 => "fixed64",
            WireType::LengthDelimited => "length-delimited",
            WireType::StartGroup => "start-group",
            WireType::EndGroup => "end-group",
            WireType::Fixed32 => "fixed32",
        }
    }
}

impl std::fmt::Display for WireType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Packs a tag and wire type into a key value.
///
/// # Errors
/// Returns `Error::InvalidTag` if the tag is outside `MIN_TAG..=MAX_TAG`.
pub fn make_key(tag: u32, wire_type: WireType) -> Result<u64> {
    if !(MIN_TAG..=MAX_TAG).contains(&tag) {
        return Err(Error::InvalidTag(u64::from(tag)));
    }
    Ok((u64::from(tag) << 3) | wire_type as u64)
}

/// Splits a key value into its tag and wire type.
pub fn split_key(key: u64) -> Result<(u32, WireType)> {
    let wire = (key & 0x07) as u8;
    let wire_type = WireType::from_u8(wire).ok_or(Error::InvalidWireType(wire))?;
    let tag = key >> 3;
    if tag < u64::from(MIN_TAG) || tag > u64::from(MAX_TAG) {
        return Err(Error::InvalidTag(tag));
    }
    Ok((tag as u32, wire_type))
}
