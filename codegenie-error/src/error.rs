//! The error type shared by every codegenie crate

use crate::{ErrorKind, ErrorStatus};
use std::fmt;

/// An error with enough attached to act on it and to trace it.
///
/// The kind says what failed and the status whether trying again could
/// help. The operation names where it failed; each layer that re-tags an
/// error pushes the previous operation into the context as `called`.
///
/// ```rust
/// use codegenie_error::{Error, ErrorKind};
///
/// let err = Error::new(ErrorKind::RateLimited, "too many requests")
///     .with_operation("provider::generate")
///     .with_context("model", "mistralai/Mistral-7B-Instruct-v0.2");
///
/// assert_eq!(err.kind(), ErrorKind::RateLimited);
/// assert!(err.status().is_retryable());
/// ```
pub struct Error {
    kind: ErrorKind,
    message: String,
    status: ErrorStatus,
    operation: &'static str,
    context: Vec<(&'static str, String)>,
    source: Option<anyhow::Error>,
}

impl Error {
    /// The status starts out temporary for retryable kinds, permanent otherwise.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: if kind.is_retryable() {
                ErrorStatus::Temporary
            } else {
                ErrorStatus::Permanent
            },
            operation: "",
            context: Vec::new(),
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> ErrorStatus {
        self.status
    }

    /// Innermost operation name, empty when never tagged
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn context(&self) -> &[(&'static str, String)] {
        &self.context
    }

    pub fn source_ref(&self) -> Option<&anyhow::Error> {
        self.source.as_ref()
    }

    /// Tag the operation; an earlier tag moves into the context as `called`.
    pub fn with_operation(mut self, operation: &'static str) -> Self {
        if !self.operation.is_empty() {
            let previous = std::mem::replace(&mut self.operation, operation);
            self.context.push(("called", previous.to_string()));
        } else {
            self.operation = operation;
        }
        self
    }

    pub fn with_context(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.context.push((key, value.into()));
        self
    }

    /// Attach the underlying error. Only one source may be set.
    pub fn set_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        debug_assert!(self.source.is_none(), "source error already set");
        self.source = Some(source.into());
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.status.is_retryable()
    }

    /// The text shown to a person at the edge of the program.
    ///
    /// Account and input errors repeat their message verbatim; everything
    /// else is prefixed with the area that failed.
    pub fn user_message(&self) -> String {
        match self.kind {
            ErrorKind::DuplicateUsername => "Username already exists".to_string(),
            ErrorKind::DuplicateEmail => "Email already in use".to_string(),
            ErrorKind::EmailNotFound => "Email not found".to_string(),
            ErrorKind::InvalidArgument => self.message.clone(),
            ErrorKind::AuthenticationFailed => format!("Authentication error: {}", self.message),
            ErrorKind::InferenceFailed
            | ErrorKind::EmptyCompletion
            | ErrorKind::ProviderUnavailable
            | ErrorKind::RateLimited
            | ErrorKind::NetworkFailed => format!("Error generating code: {}", self.message),
            ErrorKind::ConfigInvalid => format!("Configuration error: {}", self.message),
            _ => format!("An unexpected error occurred: {}", self.message),
        }
    }
}

/// One line: `[kind/status] operation: message (key=value, ...)`
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}/{}]", self.kind, self.status)?;
        if !self.operation.is_empty() {
            write!(f, " {}:", self.operation)?;
        }
        write!(f, " {}", self.message)?;

        if let Some(((first_key, first_value), rest)) = self.context.split_first() {
            write!(f, " ({}={}", first_key, first_value)?;
            for (key, value) in rest {
                write!(f, ", {}={}", key, value)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Error");
        out.field("kind", &self.kind)
            .field("status", &self.status)
            .field("message", &self.message);
        if !self.operation.is_empty() {
            out.field("operation", &self.operation);
        }
        if !self.context.is_empty() {
            out.field("context", &self.context);
        }
        if let Some(source) = &self.source {
            out.field("source", &format_args!("{:#}", source));
        }
        out.finish()
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            _ => ErrorKind::IoFailed,
        };
        Error::new(kind, err.to_string())
            .with_operation("io")
            .set_source(err)
    }
}

impl Error {
    /// Create an InvalidArgument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    /// Create a ConfigInvalid error naming the offending setting
    pub fn config_invalid(key: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message).with_context("key", key)
    }

    /// Create a DuplicateUsername error
    pub fn duplicate_username(username: impl Into<String>) -> Self {
        let username = username.into();
        Self::new(
            ErrorKind::DuplicateUsername,
            format!("username '{}' already exists", username),
        )
        .with_context("username", username)
    }

    /// Create a DuplicateEmail error
    pub fn duplicate_email(email: impl Into<String>) -> Self {
        let email = email.into();
        Self::new(ErrorKind::DuplicateEmail, format!("email '{}' already in use", email))
            .with_context("email", email)
    }

    /// Create an EmailNotFound error
    pub fn email_not_found(email: impl Into<String>) -> Self {
        let email = email.into();
        Self::new(ErrorKind::EmailNotFound, format!("no account uses email '{}'", email))
            .with_context("email", email)
    }

    /// Create an EmptyCompletion error
    pub fn empty_completion() -> Self {
        Self::new(ErrorKind::EmptyCompletion, "no usable text in response")
    }

    /// Create a StorageFailed error
    pub fn storage_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StorageFailed, message)
    }

    /// Create a SerializationFailed error
    pub fn serialization_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SerializationFailed, message)
    }

    /// Create a ParseFailed error
    pub fn parse_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParseFailed, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::new(ErrorKind::EmailNotFound, "no account uses email 'a@b.c'");
        assert_eq!(err.kind(), ErrorKind::EmailNotFound);
        assert_eq!(err.message(), "no account uses email 'a@b.c'");
        assert_eq!(err.status(), ErrorStatus::Permanent);
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::new(ErrorKind::InferenceFailed, "bad gateway")
            .with_operation("provider::generate")
            .with_context("model", "bigscience/bloomz-7b1")
            .with_context("status", "502");

        assert_eq!(err.operation(), "provider::generate");
        assert_eq!(err.context().len(), 2);
        assert_eq!(err.context()[0], ("model", "bigscience/bloomz-7b1".to_string()));
    }

    #[test]
    fn test_operation_chaining() {
        let err = Error::new(ErrorKind::IoFailed, "write failed")
            .with_operation("credentials::save")
            .with_operation("credentials::register");

        assert_eq!(err.operation(), "credentials::register");
        assert_eq!(err.context().len(), 1);
        assert_eq!(err.context()[0], ("called", "credentials::save".to_string()));
    }

    #[test]
    fn test_default_status() {
        let err = Error::new(ErrorKind::NetworkFailed, "connection refused");
        assert!(err.is_retryable());

        let err = Error::new(ErrorKind::DuplicateUsername, "taken");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_display() {
        let err = Error::new(ErrorKind::ProviderUnavailable, "model is loading")
            .with_operation("provider::generate")
            .with_context("model", "codellama/CodeLlama-7b-Instruct-hf");

        assert_eq!(
            err.to_string(),
            "[ProviderUnavailable/temporary] provider::generate: model is loading \
             (model=codellama/CodeLlama-7b-Instruct-hf)"
        );
        assert_eq!(
            Error::invalid_argument("empty").to_string(),
            "[InvalidArgument/permanent] empty"
        );
    }

    #[test]
    fn test_user_message() {
        assert_eq!(
            Error::duplicate_username("alice").user_message(),
            "Username already exists"
        );
        assert_eq!(Error::duplicate_email("a@b.c").user_message(), "Email already in use");
        assert_eq!(Error::email_not_found("a@b.c").user_message(), "Email not found");
        assert_eq!(
            Error::invalid_argument("Please enter a prompt first.").user_message(),
            "Please enter a prompt first."
        );
        assert_eq!(
            Error::empty_completion().user_message(),
            "Error generating code: no usable text in response"
        );
    }

    #[test]
    fn test_set_source() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = Error::serialization_failed("users file is corrupt").set_source(json_err);

        assert!(err.source_ref().is_some());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io_err.into();
        assert_eq!(err.kind(), ErrorKind::FileNotFound);
        assert_eq!(err.operation(), "io");
    }
}
