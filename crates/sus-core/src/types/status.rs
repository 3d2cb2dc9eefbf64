//! Item status types.
//!
//! This module provides the [`ItemStatus`] enum recording the last batch
//! operation applied to a work item.

use serde::{Deserialize, Serialize};

use super::marker::Direction;

/// The last batch operation applied to a work item.
///
/// # Examples
///
/// ```
/// use sus_core::ItemStatus;
///
/// let status = ItemStatus::default();
/// assert_eq!(status, ItemStatus::Unprocessed);
/// assert_eq!(ItemStatus::DeTrolled.label(), "De-trolled");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ItemStatus {
    /// Added to the list, not touched by any run yet.
    #[default]
    Unprocessed,

    /// Counted by a scan run.
    Scanned,

    /// Rewritten with look-alike characters.
    Trolled,

    /// Rewritten back to plain semicolons.
    DeTrolled,

    /// The run that last touched the list was cancelled.
    Cancelled,
}

impl ItemStatus {
    /// Returns the status a substitution run in `direction` leaves behind.
    ///
    /// # Examples
    ///
    /// ```
    /// use sus_core::{Direction, ItemStatus};
    ///
    /// assert_eq!(ItemStatus::after_substitution(Direction::ToMarker), ItemStatus::Trolled);
    /// assert_eq!(ItemStatus::after_substitution(Direction::ToCanonical), ItemStatus::DeTrolled);
    /// ```
    #[inline]
    #[must_use]
    pub const fn after_substitution(direction: Direction) -> Self {
        match direction {
            Direction::ToMarker => Self::Trolled,
            Direction::ToCanonical => Self::DeTrolled,
        }
    }

    /// Returns `true` if the item has been processed by a run that finished.
    #[inline]
    #[must_use]
    pub const fn is_processed(self) -> bool {
        matches!(self, Self::Scanned | Self::Trolled | Self::DeTrolled)
    }

    /// Returns a human-readable label for this status.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unprocessed => "---",
            Self::Scanned => "Scanned",
            Self::Trolled => "Trolled",
            Self::DeTrolled => "De-trolled",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_status_labels() {
        assert_eq!(ItemStatus::Unprocessed.label(), "---");
        assert_eq!(ItemStatus::Scanned.label(), "Scanned");
        assert_eq!(ItemStatus::Trolled.label(), "Trolled");
        assert_eq!(ItemStatus::DeTrolled.label(), "De-trolled");
        assert_eq!(ItemStatus::Cancelled.label(), "Cancelled");
    }

    #[test]
    fn test_item_status_is_processed() {
        assert!(!ItemStatus::Unprocessed.is_processed());
        assert!(ItemStatus::Scanned.is_processed());
        assert!(ItemStatus::Trolled.is_processed());
        assert!(ItemStatus::DeTrolled.is_processed());
        assert!(!ItemStatus::Cancelled.is_processed());
    }

    #[test]
    fn test_item_status_serialization() {
        assert_eq!(
            serde_json::to_string(&ItemStatus::DeTrolled).unwrap(),
            r#""de_trolled""#
        );
        let status: ItemStatus = serde_json::from_str(r#""cancelled""#).unwrap();
        assert_eq!(status, ItemStatus::Cancelled);
    }
}
