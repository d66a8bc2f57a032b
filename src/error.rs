use thiserror::Error;

/// Errors produced by transforms, metrics, and the search driver.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("dimension mismatch: {left_width}x{left_height} vs {right_width}x{right_height}")]
    DimensionMismatch {
        left_width: usize,
        left_height: usize,
        right_width: usize,
        right_height: usize,
    },
}

impl RegistrationError {
    pub(crate) fn invalid<S: Into<String>>(message: S) -> Self {
        RegistrationError::InvalidParameter(message.into())
    }
}
