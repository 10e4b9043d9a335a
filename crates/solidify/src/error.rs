//! Solidifier error types.

/// Error type for solidification.
///
/// Distinguishes caller mistakes (handing over a value that cannot be a
/// top-level dump target) from invariant violations found mid-traversal
/// and from sink write failures, so embedders can map each onto their own
/// exception kinds.
#[derive(Debug)]
pub enum SolidifyError {
    /// The top-level value is not a closure, class, or module
    Value(String),
    /// An invariant of the object graph was broken during traversal
    /// (unsupported constant type, bad map key, non-builtin global, ...)
    Internal(String),
    /// The output sink failed
    Io(std::io::Error),
}

impl std::fmt::Display for SolidifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolidifyError::Value(s) => write!(f, "value_error: {}", s),
            SolidifyError::Internal(s) => write!(f, "internal_error: {}", s),
            SolidifyError::Io(e) => write!(f, "output error: {}", e),
        }
    }
}

impl std::error::Error for SolidifyError {}

impl From<std::io::Error> for SolidifyError {
    fn from(e: std::io::Error) -> Self {
        SolidifyError::Io(e)
    }
}
