//! # codegenie-error
//!
//! The one error type used across the codegenie workspace.
//!
//! An [`Error`] carries an [`ErrorKind`] (what failed), an [`ErrorStatus`]
//! (whether another attempt could help), the operation that failed, a list
//! of key/value context and, optionally, the underlying error.
//!
//! ```rust
//! use codegenie_error::{Error, ErrorKind};
//!
//! fn reset(email: &str) -> codegenie_error::Result<()> {
//!     Err(Error::new(ErrorKind::EmailNotFound, "no account uses this email")
//!         .with_operation("credentials::reset_password")
//!         .with_context("email", email))
//! }
//!
//! assert_eq!(reset("ghost@example.com").unwrap_err().user_message(), "Email not found");
//! ```
//!
//! Library code wraps foreign errors with `set_source` instead of `From`
//! impls; `std::io::Error` is the only automatic conversion. Callers that
//! re-tag an error only add context.

mod error;
mod kind;
mod status;

pub use error::Error;
pub use kind::ErrorKind;
pub use status::ErrorStatus;

/// Result type alias using codegenie Error
pub type Result<T> = std::result::Result<T, Error>;
