//! Error types for the sus-batch crate.
//!
//! This module provides the [`BatchError`] type for errors returned when a
//! batch run is started and for errors reported in a run's completion event.

use camino::Utf8PathBuf;
use sus_engine::EngineError;

/// Errors that can occur during batch operations.
///
/// # Error Recovery Strategy
///
/// - **Start rejections** ([`BatchError::AlreadyRunning`], [`BatchError::NoInputs`],
///   [`BatchError::CapacityExceeded`], [`BatchError::EmptyWorkList`],
///   [`BatchError::Pattern`]): Nothing was started, the caller can retry later
/// - **Input errors** ([`BatchError::Input`]): Logged, the input is skipped
/// - **Engine errors** ([`BatchError::Engine`]): Recorded against the item, the run continues
/// - **Rollback failures** ([`BatchError::Rollback`]): Reported once in the completion event
///
/// # Examples
///
/// ```
/// use sus_batch::BatchError;
///
/// fn describe(err: &BatchError) -> &'static str {
///     if err.is_rejection() { "not started" } else { "failed during the run" }
/// }
///
/// assert_eq!(describe(&BatchError::AlreadyRunning), "not started");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// Another batch operation is in flight.
    #[error("another operation is already running")]
    AlreadyRunning,

    /// No input paths were given.
    #[error("no input paths were given")]
    NoInputs,

    /// The work list already holds the maximum number of items.
    #[error("the work list is full ({capacity} items)")]
    CapacityExceeded {
        /// The work list capacity.
        capacity: usize,
    },

    /// The work list has no items to process.
    #[error("the work list is empty")]
    EmptyWorkList,

    /// A file name pattern is not a valid glob.
    #[error("invalid file pattern: {0}")]
    Pattern(#[from] globset::Error),

    /// An input path could not be resolved.
    #[error("cannot read input {path}: {source}")]
    Input {
        /// The input as given.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Some files trolled by a cancelled run could not be restored.
    #[error("failed to restore {failed} file(s) after cancellation")]
    Rollback {
        /// Number of files left with look-alike characters.
        failed: usize,
    },

    /// A file-level operation failed.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The background worker did not finish normally.
    #[error("batch worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl BatchError {
    /// Creates a new [`BatchError::Input`] error.
    #[inline]
    pub fn input(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Input {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`BatchError::CapacityExceeded`] error.
    #[inline]
    #[must_use]
    pub const fn capacity_exceeded(capacity: usize) -> Self {
        Self::CapacityExceeded { capacity }
    }

    /// Returns `true` if this error means the operation was never started.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::AlreadyRunning
                | Self::NoInputs
                | Self::CapacityExceeded { .. }
                | Self::EmptyWorkList
                | Self::Pattern(_)
        )
    }

    /// Returns `true` if the run can continue past this error.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Input { .. } | Self::Rollback { .. } => true,
            Self::Engine(e) => e.is_recoverable(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejections() {
        assert!(BatchError::AlreadyRunning.is_rejection());
        assert!(BatchError::NoInputs.is_rejection());
        assert!(BatchError::EmptyWorkList.is_rejection());
        assert!(BatchError::capacity_exceeded(1000).is_rejection());
        assert!(!BatchError::Rollback { failed: 1 }.is_rejection());
    }

    #[test]
    fn test_engine_errors_delegate() {
        let err = BatchError::from(EngineError::encoding("a.c"));
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("a.c"));

        let err = BatchError::from(EngineError::AlreadyLocked);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_input_error() {
        let err = BatchError::input(
            "missing/",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert!(err.is_recoverable());
        assert!(!err.is_rejection());
        assert_eq!(err.to_string(), "cannot read input missing/: not found");
    }

    #[test]
    fn test_display() {
        assert_eq!(
            BatchError::capacity_exceeded(1000).to_string(),
            "the work list is full (1000 items)"
        );
        assert_eq!(
            BatchError::Rollback { failed: 2 }.to_string(),
            "failed to restore 2 file(s) after cancellation"
        );
    }
}
