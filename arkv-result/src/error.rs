use std::{fmt, io};
use thiserror::Error;

/// Unified error type for all arkv operations.
///
/// Each variant corresponds to one failure class of the storage stack. Errors
/// propagate with `?`; the CLI is the only place they are turned into
/// operator-facing messages.
///
/// `Error` is `Send + Sync` so worker threads in the batch reader can hand
/// failures back to the joining thread.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error from the operating system or from a byte stream adapter.
    ///
    /// The chunk stream adapters implement `std::io::Read` / `std::io::Write`,
    /// so engine failures observed while the codec drives them surface here.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Arrow error raised while building, encoding or decoding a batch.
    ///
    /// A truncated or corrupt IPC stream is reported by Arrow and ends up in
    /// this variant. Like [`Error::Codec`] it only poisons the batch being
    /// decoded.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Malformed JSON handed to the ingestion path.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Requested collection, sequence, blob or field does not exist.
    ///
    /// The message names what was looked up. This is the one failure the CLI
    /// reports without treating it as an error.
    #[error("not found: {0}")]
    NotFound(String),

    /// A value or column has a type outside the supported set.
    ///
    /// Raised, for example, when an equality lookup targets a non-text column
    /// or when ingestion meets a JSON value with no column mapping. Fatal for
    /// the current operation only.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// A stored blob or pointer could not be decoded.
    ///
    /// Covers head pointers of the wrong width and IPC streams that contain
    /// no batch where exactly one is expected.
    #[error("codec failure: {0}")]
    Codec(String),

    /// The KV engine failed to complete a single-key operation.
    #[error("engine failure: {0}")]
    Engine(String),

    /// Invalid user input or API parameter.
    #[error("Invalid argument: {0}")]
    InvalidArgumentError(String),

    /// Internal error indicating a bug or unexpected state.
    ///
    /// Lock poisoning and worker-pool disconnections are reported here.
    #[error("An internal operation failed: {0}")]
    Internal(String),
}

impl Error {
    /// Wrap any displayable failure as [`Error::Codec`].
    ///
    /// ```
    /// use arkv_result::Error;
    ///
    /// let err = Error::codec("head pointer must be 4 bytes");
    /// assert!(matches!(err, Error::Codec(msg) if msg.contains("4 bytes")));
    /// ```
    #[inline]
    pub fn codec<E: fmt::Display>(err: E) -> Self {
        Error::Codec(err.to_string())
    }

    /// Wrap any displayable failure as [`Error::Engine`].
    #[inline]
    pub fn engine<E: fmt::Display>(err: E) -> Self {
        Error::Engine(err.to_string())
    }

    /// Wrap any displayable failure as [`Error::UnsupportedType`].
    #[inline]
    pub fn unsupported<E: fmt::Display>(err: E) -> Self {
        Error::UnsupportedType(err.to_string())
    }

    /// `true` for [`Error::NotFound`].
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(inner) => inner,
            Error::NotFound(msg) => io::Error::new(io::ErrorKind::NotFound, msg),
            other => io::Error::other(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }

    #[test]
    fn io_round_trip_keeps_kind() {
        let err: io::Error = Error::NotFound("collection `x`".into()).into();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);

        let back: Error = io::Error::new(io::ErrorKind::UnexpectedEof, "eof").into();
        assert!(matches!(back, Error::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof));
    }

    #[test]
    fn engine_helper_keeps_message() {
        let err = Error::engine("disk full");
        assert_eq!(err.to_string(), "engine failure: disk full");
        assert!(!err.is_not_found());
    }
}
