//! # Error Definitions
//!
//! Every way a transaction can fail to encode or decode.

use callpack::WireType;

/// Codec failures. Returned to the caller, never logged or retried here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The underlying wire format was violated (truncation, bad varint, bad key).
    #[error(transparent)]
    Wire(#[from] callpack::Error),
    /// A known tag arrived with a wire type its schema does not allow.
    #[error("{message}.{field} (tag {tag}): expected {expected}, found {found}")]
    TypeMismatch {
        message: &'static str,
        field: &'static str,
        tag: u32,
        expected: WireType,
        found: WireType,
    },
    /// Bytes remained after a complete envelope.
    #[error("{0} trailing bytes after envelope")]
    TrailingBytes(usize),
    /// A message body is larger than the configured limit.
    #[error("message of {len} bytes exceeds the {limit} byte limit")]
    MessageTooLarge { len: u64, limit: usize },
    /// A message implementation does not handle a field its descriptor declares.
    #[error("{message} has no handler for tag {tag}")]
    UnhandledField { message: &'static str, tag: u32 },
}

/// A specialized Result type for codec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an `Error`, for callers deciding what to do with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input ended before a declared length was satisfied.
    TruncatedInput,
    /// A known tag carried the wrong wire type.
    TypeMismatch,
    /// A varint did not terminate within ten bytes.
    MalformedVarint,
    /// Any other structural corruption: bad keys, stray group markers, trailing bytes.
    Malformed,
    /// Size or depth bounds were exceeded.
    LimitExceeded,
    /// Encoder misuse or a schema/implementation disagreement.
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        use callpack::Error as Wire;
        match self {
            Error::Wire(Wire::TruncatedInput { .. }) => ErrorKind::TruncatedInput,
            Error::Wire(Wire::MalformedVarint) => ErrorKind::MalformedVarint,
            Error::Wire(Wire::InvalidWireType(_))
            | Error::Wire(Wire::InvalidTag(_))
            | Error::Wire(Wire::UnmatchedGroup(_)) => ErrorKind::Malformed,
            Error::Wire(Wire::LengthOverflow(_))
            | Error::Wire(Wire::RecursionLimitExceeded) => ErrorKind::LimitExceeded,
            Error::Wire(Wire::ScopeMismatch { .. })
            | Error::Wire(Wire::ScopeUnderflow)
            | Error::Wire(Wire::ScopeStillOpen) => ErrorKind::Internal,
            Error::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Error::TrailingBytes(_) => ErrorKind::Malformed,
            Error::MessageTooLarge { .. } => ErrorKind::LimitExceeded,
            Error::UnhandledField { .. } => ErrorKind::Internal,
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.kind() == ErrorKind::TruncatedInput
    }
}
