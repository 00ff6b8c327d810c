//! Stream counters.

/// Cumulative stream counters.
///
/// These accumulate over the lifetime of a `Writer` or `Reader` and are
/// never reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Rows written or read
    pub rows: u64,
    /// Pages flushed or loaded
    pub pages: u64,
    /// Bytes written or consumed, including header and framing
    pub bytes: u64,
}
