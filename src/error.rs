//! Public error type for the ledger.
//!
//! Internally the crate works with `anyhow::Result` and attaches context as errors bubble up. At
//! the public boundary the error is classified with an `ErrorType` so that presentation code can
//! decide how to surface it without parsing messages.

use std::fmt::{self, Debug, Display, Formatter};

/// The broad class of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// The home directory or `config.json` could not be created or loaded.
    Config,
    /// The expense store failed: the medium is unavailable or a constraint was violated.
    Database,
    /// A filter window name was not recognized.
    Filter,
    /// The ledger session was used before it was started.
    Session,
}

impl Display for ErrorType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorType::Config => "configuration error",
            ErrorType::Database => "database error",
            ErrorType::Filter => "filter error",
            ErrorType::Session => "session error",
        };
        f.write_str(s)
    }
}

/// An error returned from the public API of this crate.
pub struct Error {
    error_type: ErrorType,
    inner: anyhow::Error,
}

impl Error {
    pub(crate) fn new(error_type: ErrorType, inner: impl Into<anyhow::Error>) -> Self {
        Self {
            error_type,
            inner: inner.into(),
        }
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.error_type, self.inner)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // The alternate form prints the whole context chain, e.g. "outer: inner: root".
        write!(f, "{}: {:#}", self.error_type, self.inner)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Converts an internal result into a public `Result`, tagging the error with `ErrorType`.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}

impl From<crate::model::UnhandledFilterWindow> for Error {
    fn from(e: crate::model::UnhandledFilterWindow) -> Self {
        Error::new(ErrorType::Filter, e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_pub_result_tags_error_type() {
        let r: anyhow::Result<()> = Err(anyhow::anyhow!("disk gone")).context("Unable to insert");
        let err = r.pub_result(ErrorType::Database).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Database);
        let msg = err.to_string();
        assert!(msg.starts_with("database error"), "{msg}");
        assert!(msg.contains("Unable to insert"), "{msg}");
        assert!(msg.contains("disk gone"), "{msg}");
    }

    #[test]
    fn test_pub_result_passes_ok_through() {
        let r: anyhow::Result<u8> = Ok(7);
        assert_eq!(r.pub_result(ErrorType::Config).unwrap(), 7);
    }

    #[test]
    fn test_unknown_window_is_a_filter_error() {
        let err: Error = crate::model::UnhandledFilterWindow::new("fortnight").into();
        assert_eq!(err.error_type(), ErrorType::Filter);
        assert!(err.to_string().contains("fortnight"), "{err}");
    }
}
