use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimpleReminderError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("{0}")]
    Validation(String),
    #[error("reminder not found: {0}")]
    NotFound(String),
    #[error("runtime error: {0}")]
    Runtime(String),
}

pub type Result<T> = std::result::Result<T, SimpleReminderError>;

impl From<serde_json::Error> for SimpleReminderError {
    fn from(err: serde_json::Error) -> Self {
        SimpleReminderError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_keeps_validation_message_bare() {
        let err = SimpleReminderError::Validation("date must be in the future".to_string());
        assert_eq!(err.to_string(), "date must be in the future");

        let err = SimpleReminderError::NotFound("abc".to_string());
        assert!(format!("{err}").contains("not found"));

        let err: SimpleReminderError = serde_json::from_str::<u8>("nope").unwrap_err().into();
        assert!(matches!(err, SimpleReminderError::Serialization(_)));
    }
}
