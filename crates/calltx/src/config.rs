//! Decode bounds. Passed explicitly to every decode entry point.

/// Resource bounds applied while decoding untrusted bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Largest accepted message body, in bytes.
    pub max_message_len: usize,
    /// Deepest accepted nesting of messages and unknown groups below the top level.
    pub max_depth: usize,
}

impl Limits {
    pub const DEFAULT_MAX_MESSAGE_LEN: usize = 4 * 1024 * 1024;
    pub const DEFAULT_MAX_DEPTH: usize = callpack::DEFAULT_MAX_DEPTH;

    pub const fn new() -> Self {
        Self {
            max_message_len: Self::DEFAULT_MAX_MESSAGE_LEN,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }

    pub const fn with_max_message_len(mut self, len: usize) -> Self {
        self.max_message_len = len;
        self
    }

    pub const fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::new()
    }
}
