use crate::error::Error;

/// Result type alias used throughout arkv.
pub type Result<T> = std::result::Result<T, Error>;
