//! The canonical character, its look-alike, and scan results.

use serde::{Deserialize, Serialize};

/// The ASCII semicolon.
pub const CANONICAL: char = ';';

/// The Greek question mark, rendered identically to [`CANONICAL`] in most fonts.
pub const MARKER: char = '\u{037E}';

/// Which way a substitution rewrites a file.
///
/// # Examples
///
/// ```
/// use sus_core::{Direction, CANONICAL, MARKER};
///
/// assert_eq!(Direction::ToMarker.source(), CANONICAL);
/// assert_eq!(Direction::ToMarker.target(), MARKER);
/// assert_eq!(Direction::ToCanonical.source(), MARKER);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Replace semicolons with the look-alike ("troll").
    ToMarker,
    /// Replace look-alikes with semicolons ("de-troll").
    ToCanonical,
}

impl Direction {
    /// The character being replaced.
    #[inline]
    #[must_use]
    pub const fn source(self) -> char {
        match self {
            Self::ToMarker => CANONICAL,
            Self::ToCanonical => MARKER,
        }
    }

    /// The character written in its place.
    #[inline]
    #[must_use]
    pub const fn target(self) -> char {
        match self {
            Self::ToMarker => MARKER,
            Self::ToCanonical => CANONICAL,
        }
    }
}

/// Character counts produced by scanning one file.
///
/// `total` counts both characters, `markers` only the look-alike.
///
/// # Examples
///
/// ```
/// use sus_core::MarkerCount;
///
/// let count = MarkerCount { total: 4, markers: 1 };
/// assert_eq!(count.percentage(), Some(25));
/// assert_eq!(count.summary(), "25% (1 troll character/s found!)");
///
/// let empty = MarkerCount::default();
/// assert_eq!(empty.percentage(), None);
/// assert_eq!(empty.summary(), "Failed.");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerCount {
    /// Semicolons plus look-alikes.
    pub total: usize,
    /// Look-alikes only.
    pub markers: usize,
}

impl MarkerCount {
    /// Counts both characters in `text`.
    #[must_use]
    pub fn of(text: &str) -> Self {
        text.chars().fold(Self::default(), |mut count, c| {
            if c == CANONICAL || c == MARKER {
                count.total += 1;
            }
            if c == MARKER {
                count.markers += 1;
            }
            count
        })
    }

    /// Share of look-alikes among all counted characters, rounded down.
    ///
    /// Returns `None` when the file contains neither character.
    #[inline]
    #[must_use]
    pub const fn percentage(self) -> Option<usize> {
        if self.total == 0 {
            None
        } else {
            Some(self.markers * 100 / self.total)
        }
    }

    /// The one-line summary shown next to a scanned item.
    #[must_use]
    pub fn summary(self) -> String {
        match self.percentage() {
            Some(percent) => format!("{percent}% ({} troll character/s found!)", self.markers),
            None => "Failed.".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_count_of_mixed_text() {
        let count = MarkerCount::of("a; b\u{037E} c; d;");
        assert_eq!(count.total, 4);
        assert_eq!(count.markers, 1);
        assert_eq!(count.percentage(), Some(25));
    }

    #[test]
    fn test_marker_count_rounds_down() {
        let count = MarkerCount { total: 3, markers: 2 };
        assert_eq!(count.percentage(), Some(66));
    }

    #[test]
    fn test_marker_count_without_characters() {
        let count = MarkerCount::of("no separators here");
        assert_eq!(count, MarkerCount::default());
        assert_eq!(count.summary(), "Failed.");
    }

    #[test]
    fn test_summary_untouched_file() {
        let count = MarkerCount::of("int a; int b; int c;");
        assert_eq!(count.summary(), "0% (0 troll character/s found!)");
    }

    #[test]
    fn test_direction_roundtrip_characters() {
        for direction in [Direction::ToMarker, Direction::ToCanonical] {
            assert_ne!(direction.source(), direction.target());
        }
        assert_eq!(Direction::ToMarker.source(), Direction::ToCanonical.target());
    }
}
