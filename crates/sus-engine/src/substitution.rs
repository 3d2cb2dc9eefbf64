//! In-memory character substitution.
//!
//! [`Substitution`] describes one rewrite of a file's text. [`Substitution::apply`]
//! is a pure function over a string, so the whole replacement can be built
//! before the backing file is touched.

use rand::Rng;
use sus_core::{Direction, SubstitutionSettings};

/// A rewrite to apply to a locked file.
///
/// # Examples
///
/// ```
/// use sus_engine::Substitution;
///
/// let mut rng = rand::thread_rng();
///
/// let (trolled, replaced) = Substitution::to_marker().apply("a; b;", &mut rng);
/// assert_eq!(trolled, "a\u{037E} b\u{037E}");
/// assert_eq!(replaced, 2);
///
/// let (restored, _) = Substitution::to_canonical().apply(&trolled, &mut rng);
/// assert_eq!(restored, "a; b;");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Substitution {
    /// Which character is replaced by which.
    direction: Direction,
    /// Chance (0-100) of keeping each semicolon, for randomized runs.
    keep_chance: Option<u8>,
}

impl Substitution {
    /// Replaces every semicolon with the look-alike.
    #[inline]
    #[must_use]
    pub const fn to_marker() -> Self {
        Self {
            direction: Direction::ToMarker,
            keep_chance: None,
        }
    }

    /// Replaces every look-alike with a semicolon.
    #[inline]
    #[must_use]
    pub const fn to_canonical() -> Self {
        Self {
            direction: Direction::ToCanonical,
            keep_chance: None,
        }
    }

    /// Replaces each semicolon independently, keeping it with `keep_chance` percent.
    ///
    /// A uniform draw in `0..100` replaces the semicolon when it is at least
    /// `keep_chance`, so 100 replaces nothing and 0 replaces everything.
    /// Values above 100 behave like 100.
    #[inline]
    #[must_use]
    pub const fn randomized(keep_chance: u8) -> Self {
        Self {
            direction: Direction::ToMarker,
            keep_chance: Some(keep_chance),
        }
    }

    /// Builds the substitution a batch run performs in `direction`.
    ///
    /// Randomization only applies towards the look-alike; restoring semicolons
    /// is always complete.
    #[must_use]
    pub const fn from_settings(direction: Direction, settings: SubstitutionSettings) -> Self {
        match direction {
            Direction::ToMarker if settings.randomized => {
                Self::randomized(settings.randomized_chance)
            }
            Direction::ToMarker => Self::to_marker(),
            Direction::ToCanonical => Self::to_canonical(),
        }
    }

    /// The direction of this substitution.
    #[inline]
    #[must_use]
    pub const fn direction(self) -> Direction {
        self.direction
    }

    /// The keep chance, if this substitution is randomized.
    #[inline]
    #[must_use]
    pub const fn keep_chance(self) -> Option<u8> {
        self.keep_chance
    }

    /// Rewrites `text` line by line, returning the new text and the number of
    /// replaced characters.
    ///
    /// Line terminators are carried over unchanged.
    pub fn apply<R: Rng + ?Sized>(self, text: &str, rng: &mut R) -> (String, usize) {
        let source = self.direction.source();
        let target = self.direction.target();
        let mut output = String::with_capacity(text.len() + text.len() / 8);
        let mut replaced = 0;

        for line in text.split_inclusive('\n') {
            for c in line.chars() {
                if c == source && self.should_replace(rng) {
                    output.push(target);
                    replaced += 1;
                } else {
                    output.push(c);
                }
            }
        }

        (output, replaced)
    }

    fn should_replace<R: Rng + ?Sized>(self, rng: &mut R) -> bool {
        match self.keep_chance {
            Some(keep) if self.direction == Direction::ToMarker => {
                rng.gen_range(0..100_u8) >= keep.min(100)
            }
            _ => true,
        }
    }
}
