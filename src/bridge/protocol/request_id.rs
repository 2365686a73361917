//! JSON-RPC request ID type for Brain MCP communication.

/// JSON-RPC request ID.
///
/// Wraps `i64` so request ids cannot be confused with other integers
/// (depths, limits, PR numbers) in transport signatures.
///
/// # Wire Format
///
/// JSON-RPC allows ids to be numbers or strings. The bridge generates every id
/// itself and only ever uses numbers, so string ids in replies never match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct RequestId(i64);

impl RequestId {
    #[inline]
    pub(crate) fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the underlying i64 value.
    ///
    /// Used when serializing to JSON for wire transmission.
    #[inline]
    pub(crate) fn as_i64(self) -> i64 {
        self.0
    }

    /// Extract RequestId from a JSON-RPC message.
    ///
    /// Returns `None` if the field is missing or not an integer
    /// (e.g., notifications or string ids).
    pub(crate) fn from_json(message: &serde_json::Value) -> Option<Self> {
        message.get("id")?.as_i64().map(Self)
    }

    /// Check if a JSON-RPC message's ID matches this RequestId.
    pub(crate) fn matches(&self, message: &serde_json::Value) -> bool {
        Self::from_json(message) == Some(*self)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic id allocator owned by one connection.
///
/// Ids start at 1 and are never reused for the lifetime of the sequence.
#[derive(Debug)]
pub(crate) struct RequestIdSequence {
    next: i64,
}

impl RequestIdSequence {
    pub(crate) fn new() -> Self {
        Self { next: 1 }
    }

    pub(crate) fn allocate(&mut self) -> RequestId {
        let id = RequestId::new(self.next);
        self.next += 1;
        id
    }
}
