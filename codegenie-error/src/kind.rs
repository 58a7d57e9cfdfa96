//! What went wrong, as a closed set of categories

use std::fmt;

/// Category of an [`Error`](crate::Error).
///
/// Front ends match on the kind to pick a message; see
/// [`Error::user_message`](crate::Error::user_message).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Nothing more specific applies
    Unexpected,
    /// A setting (usually an environment variable) has an unusable value
    ConfigInvalid,
    /// Caller input was rejected: empty prompt, short password, bad email
    InvalidArgument,

    // accounts
    DuplicateUsername,
    DuplicateEmail,
    EmailNotFound,
    /// Credentials were rejected, locally or by the inference service
    AuthenticationFailed,

    // persistence
    StorageFailed,
    SerializationFailed,

    // inference
    /// The service answered with an error status or an error body
    InferenceFailed,
    /// The completion had no code left after extraction
    EmptyCompletion,
    /// Model loading or service down (HTTP 503)
    ProviderUnavailable,
    RateLimited,

    // filesystem and network
    FileNotFound,
    PermissionDenied,
    IoFailed,
    /// Connect failure, timeout or broken response body
    NetworkFailed,

    /// Text that should have had a known shape did not
    ParseFailed,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        use ErrorKind::*;
        match self {
            Unexpected => "Unexpected",
            ConfigInvalid => "ConfigInvalid",
            InvalidArgument => "InvalidArgument",
            DuplicateUsername => "DuplicateUsername",
            DuplicateEmail => "DuplicateEmail",
            EmailNotFound => "EmailNotFound",
            AuthenticationFailed => "AuthenticationFailed",
            StorageFailed => "StorageFailed",
            SerializationFailed => "SerializationFailed",
            InferenceFailed => "InferenceFailed",
            EmptyCompletion => "EmptyCompletion",
            ProviderUnavailable => "ProviderUnavailable",
            RateLimited => "RateLimited",
            FileNotFound => "FileNotFound",
            PermissionDenied => "PermissionDenied",
            IoFailed => "IoFailed",
            NetworkFailed => "NetworkFailed",
            ParseFailed => "ParseFailed",
        }
    }

    /// Transient conditions: a later attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::NetworkFailed | ErrorKind::RateLimited | ErrorKind::ProviderUnavailable
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_variant() {
        assert_eq!(ErrorKind::DuplicateEmail.to_string(), "DuplicateEmail");
        assert_eq!(ErrorKind::EmptyCompletion.to_string(), "EmptyCompletion");
    }

    #[test]
    fn test_transient_kinds() {
        let transient: Vec<_> = [
            ErrorKind::InvalidArgument,
            ErrorKind::NetworkFailed,
            ErrorKind::RateLimited,
            ErrorKind::ProviderUnavailable,
            ErrorKind::InferenceFailed,
            ErrorKind::EmptyCompletion,
        ]
        .into_iter()
        .filter(ErrorKind::is_retryable)
        .collect();
        assert_eq!(
            transient,
            vec![
                ErrorKind::NetworkFailed,
                ErrorKind::RateLimited,
                ErrorKind::ProviderUnavailable
            ]
        );
    }
}
