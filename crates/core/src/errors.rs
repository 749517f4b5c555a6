use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

/// Failure classes of the webhook ingestion path. None of them may escape the
/// dispatch boundary; each maps to a log record and, at most, a chat message.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("unknown event type `{0}`")]
    UnknownEventType(String),
    #[error("unrecognized command `{0}`")]
    UnrecognizedCommand(String),
    #[error("invalid command arguments: {0}")]
    InvalidCommandArguments(String),
    #[error("downstream failure: {0}")]
    DownstreamFailure(String),
}

impl DispatchError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::MalformedPayload(_) => "malformed_payload",
            Self::UnknownEventType(_) => "unknown_event_type",
            Self::UnrecognizedCommand(_) => "unrecognized_command",
            Self::InvalidCommandArguments(_) => "invalid_command_arguments",
            Self::DownstreamFailure(_) => "downstream_failure",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MalformedPayload(_) | Self::UnknownEventType(_) => {
                "The event could not be processed."
            }
            Self::UnrecognizedCommand(_) => "Unknown command. Mention me with `help` to see usage.",
            Self::InvalidCommandArguments(_) => {
                "The command arguments were not valid. Check inputs and try again."
            }
            Self::DownstreamFailure(_) => {
                "The service is temporarily unavailable. Please retry shortly."
            }
        }
    }
}

impl From<DomainError> for DispatchError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::InvariantViolation(message) => Self::InvalidCommandArguments(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{DispatchError, DomainError};

    #[test]
    fn domain_error_maps_to_invalid_arguments() {
        let error = DispatchError::from(DomainError::InvariantViolation(
            "month must be in range 1..=12, got 13".to_owned(),
        ));

        assert!(matches!(error, DispatchError::InvalidCommandArguments(ref message) if message.contains("13")));
        assert_eq!(error.error_class(), "invalid_command_arguments");
    }

    #[test]
    fn downstream_failure_has_user_safe_message() {
        let error = DispatchError::DownstreamFailure("database is locked".to_owned());
        assert_eq!(
            error.user_message(),
            "The service is temporarily unavailable. Please retry shortly."
        );
        assert!(!error.user_message().contains("locked"));
    }
}
