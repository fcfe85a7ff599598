use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Message(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("corrupt generator state: {0}")]
    CorruptState(String),
}

impl AppError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        AppError::InvalidArgument(message.into())
    }

    pub fn corrupt_state(message: impl Into<String>) -> Self {
        AppError::CorruptState(message.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_prefix() {
        let err = AppError::invalid_argument("bound must be positive");
        assert_eq!(err.to_string(), "invalid argument: bound must be positive");

        let err = AppError::corrupt_state("empty state");
        assert_eq!(err.to_string(), "corrupt generator state: empty state");
    }

    #[test]
    fn message_is_passed_through() {
        let err = AppError::Message("failed to read config".into());
        assert_eq!(err.to_string(), "failed to read config");
    }
}
