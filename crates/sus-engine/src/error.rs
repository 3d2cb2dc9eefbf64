//! Error types for the sus-engine crate.
//!
//! This module provides the [`EngineError`] type for errors that can occur
//! while locking, reading, or rewriting a file.

use camino::Utf8PathBuf;

/// Errors that can occur during engine operations.
///
/// # Error Recovery Strategy
///
/// - **Already locked** ([`EngineError::AlreadyLocked`]): Programming error - the
///   caller must release the current [`LockedFile`](crate::LockedFile) first
/// - **I/O errors** ([`EngineError::Io`]): Record against the file, continue the batch
/// - **Encoding errors** ([`EngineError::Encoding`]): Record against the file, continue the batch
///
/// # Examples
///
/// ```
/// use sus_engine::EngineError;
///
/// fn handle_error(err: &EngineError) {
///     match err {
///         EngineError::AlreadyLocked => eprintln!("another file is still locked"),
///         EngineError::Io { path, .. } => eprintln!("I/O error: {path}"),
///         EngineError::Encoding { path } => eprintln!("not UTF-8: {path}"),
///     }
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A file is already locked by this engine.
    #[error("access denied: a file is still locked")]
    AlreadyLocked,

    /// Opening, locking, reading, or writing a file failed.
    ///
    /// Covers missing files, permission errors, and files locked elsewhere.
    #[error("{path}: {source}")]
    Io {
        /// The file that failed.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid UTF-8 and cannot be rewritten safely.
    #[error("{path}: file is not valid UTF-8 text")]
    Encoding {
        /// The file that failed to decode.
        path: Utf8PathBuf,
    },
}

impl EngineError {
    /// Creates a new [`EngineError::Io`] error.
    #[inline]
    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`EngineError::Encoding`] error.
    #[inline]
    pub fn encoding(path: impl Into<Utf8PathBuf>) -> Self {
        Self::Encoding { path: path.into() }
    }

    /// Returns `true` if this error only concerns one file, so a batch can continue.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Encoding { .. })
    }

    /// Returns `true` if this error indicates misuse of the engine.
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Returns the file path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::Io { path, .. } | Self::Encoding { path } => Some(path),
            Self::AlreadyLocked => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_engine_error_io() {
        let err = EngineError::io("src/a.cs", io::Error::new(io::ErrorKind::NotFound, "not found"));
        assert!(err.is_recoverable());
        assert!(!err.is_fatal());
        assert_eq!(err.path().map(|p| p.as_str()), Some("src/a.cs"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_engine_error_encoding() {
        let err = EngineError::encoding("bin.dat");
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_engine_error_already_locked() {
        let err = EngineError::AlreadyLocked;
        assert!(err.is_fatal());
        assert!(err.path().is_none());
        assert_eq!(err.to_string(), "access denied: a file is still locked");
    }
}
