//! Result and Error types for single_toolkit

/// Type alias for Result<T, single_toolkit::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `single_toolkit` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("index sort backend failed: {0}")]
    BackendFailure(String),

    #[error("inconsistent {context} (expected {expected:?}, found {found:?})")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("regular expression did not compile")]
    Regex(#[from] regex::Error),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}
