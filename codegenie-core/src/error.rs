//! CodeGenie core error types
//!
//! Re-exports codegenie-error and provides core-specific conveniences.

pub use codegenie_error::{Error, ErrorKind, ErrorStatus, Result};

/// Create an IoFailed error
pub fn io_error(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::IoFailed, message)
}

/// Create a SerializationFailed error
pub fn serialization_error(message: impl Into<String>) -> Error {
    Error::serialization_failed(message)
}

/// Create a ParseFailed error
pub fn parse_error(message: impl Into<String>) -> Error {
    Error::parse_failed(message)
}

/// Create a StorageFailed error
pub fn storage_failed(reason: impl Into<String>) -> Error {
    Error::storage_failed(reason)
}

/// Create an InvalidArgument error
pub fn invalid_argument(message: impl Into<String>) -> Error {
    Error::invalid_argument(message)
}

/// Create a ConfigInvalid error for an environment variable
pub fn config_invalid(key: &'static str, value: impl Into<String>) -> Error {
    let value = value.into();
    Error::config_invalid(key, format!("invalid value '{}' for {}", value, key))
        .with_context("value", value)
}

/// Create an EmptyCompletion error
pub fn empty_completion() -> Error {
    Error::empty_completion()
}
