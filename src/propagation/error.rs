//! Error type shared by the propagation core.

/// Failure raised by a propagation or unit-conversion call.
///
/// Both variants carry a human readable description of the offending input.
/// Errors are raised synchronously at the point of the call; nothing in the
/// core retries, since every computation is a pure function of its inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum PropagationError {
    /// Invalid numeric input: non-positive frequency, logarithm of a
    /// non-positive value, zero precision, ground-level antenna under the
    /// two-ray model, colocated nodes, non-positive minimum distance.
    Domain(String),
    /// Malformed model parameters, e.g. a linear gain that is not positive
    /// or a system loss below unity.
    Configuration(String),
}

impl PropagationError {
    pub(crate) fn domain(msg: impl Into<String>) -> Self {
        PropagationError::Domain(msg.into())
    }

    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        PropagationError::Configuration(msg.into())
    }

    pub fn is_domain(&self) -> bool {
        matches!(self, PropagationError::Domain(_))
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, PropagationError::Configuration(_))
    }
}

impl std::fmt::Display for PropagationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropagationError::Domain(msg) => write!(f, "Domain error: {}", msg),
            PropagationError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for PropagationError {}
