use core::fmt;

/// Errors raised by construction-time operations, as opposed to the
/// per-call lifecycle state returned by [`crate::DrbgStatus`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DrbgError {
    /// The requested security strength is not in the descriptor's supported
    /// set.
    UnsupportedStrength(u32),
    /// An input byte string exceeds the descriptor's boundary for its kind.
    InputTooLarge { field: &'static str, max: usize },
}

impl fmt::Display for DrbgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrbgError::UnsupportedStrength(s) => {
                write!(f, "security strength {} is not supported by this descriptor", s)
            }
            DrbgError::InputTooLarge { field, max } => {
                write!(f, "{} exceeds maximum length of {} bytes", field, max)
            }
        }
    }
}

impl std::error::Error for DrbgError {}
