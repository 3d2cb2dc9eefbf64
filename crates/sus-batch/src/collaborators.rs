//! Interfaces the coordinator reads from its surroundings.
//!
//! - [`SettingsProvider`] supplies the substitution settings for a troll run
//! - [`CheckedItems`] tells [`remove_checked`](crate::BatchCoordinator::remove_checked)
//!   which items the user selected

use camino::Utf8PathBuf;
use parking_lot::RwLock;
use rustc_hash::FxHashSet;
use sus_core::{SubstitutionSettings, WorkItem};

/// Source of the substitution settings.
///
/// Read once at the start of every troll run and never written by the
/// coordinator.
///
/// # Thread Safety
///
/// Providers are shared with the background worker, so they must be
/// [`Send`] and [`Sync`].
///
/// # Examples
///
/// ```
/// use parking_lot::RwLock;
/// use sus_batch::SettingsProvider;
/// use sus_core::SubstitutionSettings;
///
/// let live = RwLock::new(SubstitutionSettings::default());
/// live.write().randomized = true;
/// assert!(live.substitution_settings().randomized);
/// ```
pub trait SettingsProvider: Send + Sync {
    /// Returns the current settings.
    fn substitution_settings(&self) -> SubstitutionSettings;
}

impl SettingsProvider for SubstitutionSettings {
    fn substitution_settings(&self) -> SubstitutionSettings {
        *self
    }
}

impl SettingsProvider for RwLock<SubstitutionSettings> {
    fn substitution_settings(&self) -> SubstitutionSettings {
        *self.read()
    }
}

/// The user's selection in a list display.
///
/// # Examples
///
/// ```
/// use sus_batch::CheckedItems;
/// use sus_core::WorkItem;
///
/// let only_headers = |item: &WorkItem| item.path.extension() == Some("h");
/// let item = WorkItem::new("/src/a.h".into());
/// assert!(only_headers.is_checked(&item));
/// ```
pub trait CheckedItems {
    /// Returns `true` if `item` is selected.
    fn is_checked(&self, item: &WorkItem) -> bool;
}

impl<F> CheckedItems for F
where
    F: Fn(&WorkItem) -> bool,
{
    fn is_checked(&self, item: &WorkItem) -> bool {
        self(item)
    }
}

impl CheckedItems for FxHashSet<Utf8PathBuf> {
    fn is_checked(&self, item: &WorkItem) -> bool {
        self.contains(item.path())
    }
}

impl CheckedItems for [Utf8PathBuf] {
    fn is_checked(&self, item: &WorkItem) -> bool {
        self.iter().any(|path| path == item.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_settings() {
        let settings = SubstitutionSettings {
            randomized: true,
            randomized_chance: 10,
        };
        assert_eq!(settings.substitution_settings(), settings);
    }

    #[test]
    fn test_live_settings_follow_writes() {
        let live = RwLock::new(SubstitutionSettings::default());
        assert!(!live.substitution_settings().randomized);

        live.write().randomized_chance = 55;
        assert_eq!(live.substitution_settings().randomized_chance, 55);
    }

    #[test]
    fn test_checked_by_path_set() {
        let mut checked = FxHashSet::default();
        checked.insert(Utf8PathBuf::from("/a.c"));

        assert!(checked.is_checked(&WorkItem::new("/a.c".into())));
        assert!(!checked.is_checked(&WorkItem::new("/b.c".into())));
    }

    #[test]
    fn test_checked_by_slice() {
        let checked = vec![Utf8PathBuf::from("/b.c")];
        assert!(checked.as_slice().is_checked(&WorkItem::new("/b.c".into())));
    }
}
