//! Events published by batch runs.
//!
//! A run streams [`BatchEvent`]s over a bounded `tokio::sync::mpsc` channel
//! to a single consumer loop.
//!
//! # Event Flow
//!
//! ```text
//! add / remove_checked / clear      scan / troll_init
//!            │                              │
//!            ▼                              ▼
//!      ItemsChanged              Progress, ItemUpdated (per item)
//!                                           │
//!                                           ▼
//!                                   Completed (exactly once)
//! ```

use std::fmt;

use sus_core::{Direction, WorkItem};

use crate::error::BatchError;

/// The kind of run that produced a [`BatchEvent::Completed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Counting look-alikes in every item.
    Scan,
    /// Replacing semicolons with look-alikes.
    Trolling,
    /// Replacing look-alikes with semicolons.
    DeTrolling,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Scan => "Scan",
            Self::Trolling => "Trolling",
            Self::DeTrolling => "De-trolling",
        })
    }
}

/// Which substitution [`troll_init`](crate::BatchCoordinator::troll_init) runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrollType {
    /// Semicolons become look-alikes.
    Troll,
    /// Look-alikes become semicolons.
    DeTroll,
}

impl TrollType {
    /// The substitution direction.
    #[inline]
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::Troll => Direction::ToMarker,
            Self::DeTroll => Direction::ToCanonical,
        }
    }

    /// The operation kind reported on completion.
    #[inline]
    #[must_use]
    pub const fn kind(self) -> OperationKind {
        match self {
            Self::Troll => OperationKind::Trolling,
            Self::DeTroll => OperationKind::DeTrolling,
        }
    }

    /// Progress verbs for the start and end of one item.
    pub(crate) const fn verbs(self) -> (&'static str, &'static str) {
        match self {
            Self::Troll => ("Trolling", "Trolled"),
            Self::DeTroll => ("De-trolling", "De-trolled"),
        }
    }
}

/// An update sent by a running batch operation.
#[derive(Debug)]
pub enum BatchEvent {
    /// A step of a scan or substitution run.
    Progress {
        /// Items finished so far.
        current: usize,
        /// Items in the run.
        total: usize,
        /// Human-readable description of the step.
        message: String,
    },

    /// One item changed; the consumer can refresh a single row.
    ItemUpdated {
        /// Position of the item in the work list.
        index: usize,
        /// The item after the change.
        item: WorkItem,
    },

    /// The whole work list changed.
    ItemsChanged {
        /// Snapshot of the work list.
        items: Vec<WorkItem>,
    },

    /// A scan or substitution run ended.
    ///
    /// Sent exactly once per run, after the coordinator is idle again.
    Completed {
        /// The run that ended.
        kind: OperationKind,
        /// `true` if the run stopped because of [`cancel`](crate::BatchCoordinator::cancel).
        cancelled: bool,
        /// Set when the run ended badly for a reason other than cancellation.
        error: Option<BatchError>,
    },
}

impl BatchEvent {
    pub(crate) fn progress(current: usize, total: usize, message: impl Into<String>) -> Self {
        Self::Progress {
            current,
            total,
            message: message.into(),
        }
    }

    /// Returns `true` for [`BatchEvent::Completed`].
    #[inline]
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_troll_type_mapping() {
        assert_eq!(TrollType::Troll.direction(), Direction::ToMarker);
        assert_eq!(TrollType::DeTroll.direction(), Direction::ToCanonical);
        assert_eq!(TrollType::Troll.kind(), OperationKind::Trolling);
        assert_eq!(TrollType::DeTroll.verbs(), ("De-trolling", "De-trolled"));
    }

    #[test]
    fn test_operation_kind_display() {
        assert_eq!(OperationKind::Scan.to_string(), "Scan");
        assert_eq!(OperationKind::DeTrolling.to_string(), "De-trolling");
    }
}
