//! Helper functions for creating specific error types

use super::types::MeterError;

impl MeterError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn parsing<S: Into<String>>(message: S) -> Self {
        Self::Parsing(message.into())
    }

    pub fn stream<S: Into<String>>(message: S) -> Self {
        Self::Stream(message.into())
    }

    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Whether the error came from an external collaborator rather than from
    /// the caller's input.
    pub fn is_boundary_error(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Io(_))
    }
}
