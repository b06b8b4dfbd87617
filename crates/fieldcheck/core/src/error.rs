//! Error types for validators, presenters and the controller

use thiserror::Error;

/// A validator or handler was given an argument it cannot work with
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("argument {index} must be a string")]
    NotAString { index: usize },

    #[error("argument {index} is required")]
    MissingArgument { index: usize },

    #[error("argument {index} is not a finite number")]
    NonFiniteNumber { index: usize },

    #[error("argument {index} cannot be converted: {reason}")]
    Unconvertible { index: usize, reason: String },

    #[error("validator rejected its arguments: {0}")]
    Rejected(String),
}

/// Failure reported by a presenter while touching the UI
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresenterError {
    #[error("field not found: {0}")]
    FieldNotFound(String),

    #[error("form not found: {0}")]
    FormNotFound(String),

    #[error("DOM operation failed: {0}")]
    Dom(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("validator \"{0}\" is not attached to the controller")]
    UnknownValidator(String),

    #[error("handler after validation \"{0}\" is not attached to the controller")]
    UnknownHandler(String),

    #[error("validator \"{validator}\" has not been applied to a field")]
    Unbound { validator: String },

    #[error("invalid argument for \"{name}\": {source}")]
    InvalidArgument {
        name: String,
        #[source]
        source: ArgumentError,
    },

    #[error(transparent)]
    Presenter(#[from] PresenterError),
}

impl ControllerError {
    /// Configuration errors reference a name nobody registered
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::UnknownValidator(_) | Self::UnknownHandler(_))
    }

    /// Configuration and usage errors only mean some feedback is skipped
    pub fn is_recoverable(&self) -> bool {
        self.is_configuration() || matches!(self, Self::Unbound { .. })
    }
}
