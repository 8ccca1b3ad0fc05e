/// Result type in brokerwire
pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A read needs more bytes than remain unread.
    #[error("buffer underrun reading {field}: need {need} bytes, have {have}")]
    Underrun {
        field: &'static str,
        need: usize,
        have: usize,
    },
    #[error("malformed utf-8 text {0}")]
    MalformedText(#[from] std::str::Utf8Error),
    /// A sub-decoder or explicit-length payload larger than the unread region.
    #[error("invalid slice size {size}, only {remaining} bytes remain")]
    InvalidSliceSize { size: usize, remaining: usize },
    /// A negative length prefix other than the `-1` null sentinel.
    #[error("invalid {field} length {length}")]
    InvalidLength { field: &'static str, length: i64 },
    #[error("array count {count} exceeds the configured limit {limit}")]
    ArrayTooLong { count: usize, limit: usize },
}
