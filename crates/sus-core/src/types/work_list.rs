//! The bounded list of tracked files.
//!
//! [`WorkList`] keeps items in insertion order, rejects duplicate paths, and
//! never grows past [`WORK_LIST_CAPACITY`]. Membership is tested by path
//! equality through an [`FxHashSet`] index kept alongside the items.

use camino::{Utf8Path, Utf8PathBuf};
use rustc_hash::FxHashSet;

use super::item::WorkItem;
use super::status::ItemStatus;

/// Maximum number of items a [`WorkList`] holds.
pub const WORK_LIST_CAPACITY: usize = 1000;

/// Outcome of [`WorkList::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Insert {
    /// The item was appended.
    Added,
    /// An item with the same path is already tracked.
    Duplicate,
    /// The list is at capacity.
    Full,
}

/// Ordered, capacity-bounded, path-unique list of [`WorkItem`]s.
///
/// # Examples
///
/// ```
/// use sus_core::{WorkItem, WorkList};
/// use sus_core::types::Insert;
/// use camino::Utf8PathBuf;
///
/// let mut list = WorkList::new();
/// assert_eq!(list.insert(WorkItem::new(Utf8PathBuf::from("/a.c"))), Insert::Added);
/// assert_eq!(list.insert(WorkItem::new(Utf8PathBuf::from("/a.c"))), Insert::Duplicate);
/// assert_eq!(list.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WorkList {
    /// Items in insertion order.
    items: Vec<WorkItem>,
    /// Paths of `items`, for constant-time duplicate checks.
    paths: FxHashSet<Utf8PathBuf>,
}

impl WorkList {
    /// Creates an empty work list.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the list holds no items.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns `true` if no further items can be inserted.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.items.len() >= WORK_LIST_CAPACITY
    }

    /// Number of items that can still be inserted.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        WORK_LIST_CAPACITY.saturating_sub(self.items.len())
    }

    /// Returns `true` if an item with `path` is tracked.
    #[must_use]
    pub fn contains(&self, path: &Utf8Path) -> bool {
        self.paths.contains(path)
    }

    /// Appends `item` unless its path is already present or the list is full.
    pub fn insert(&mut self, item: WorkItem) -> Insert {
        if self.is_full() {
            return Insert::Full;
        }
        if !self.paths.insert(item.path.clone()) {
            return Insert::Duplicate;
        }
        self.items.push(item);
        Insert::Added
    }

    /// Returns the item at `index`.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&WorkItem> {
        self.items.get(index)
    }

    /// Records a run outcome on the item at `index` and returns the updated item.
    ///
    /// Paths are immutable once inserted, so this is the only way to change an item.
    pub fn update(
        &mut self,
        index: usize,
        status: ItemStatus,
        summary: impl Into<String>,
    ) -> Option<&WorkItem> {
        let item = self.items.get_mut(index)?;
        item.record(status, summary);
        Some(item)
    }

    /// Marks every item as cancelled.
    pub fn mark_all_cancelled(&mut self) {
        self.items.iter_mut().for_each(WorkItem::mark_cancelled);
    }

    /// Keeps only the items for which `keep` returns `true`.
    ///
    /// Returns the number of removed items.
    pub fn retain(&mut self, mut keep: impl FnMut(&WorkItem) -> bool) -> usize {
        let before = self.items.len();
        let paths = &mut self.paths;
        self.items.retain(|item| {
            let kept = keep(item);
            if !kept {
                paths.remove(&item.path);
            }
            kept
        });
        before - self.items.len()
    }

    /// Removes every item.
    pub fn clear(&mut self) {
        self.items.clear();
        self.paths.clear();
    }

    /// Iterates over items in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, WorkItem> {
        self.items.iter()
    }

    /// Returns the items as a slice.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[WorkItem] {
        &self.items
    }
}

impl<'a> IntoIterator for &'a WorkList {
    type Item = &'a WorkItem;
    type IntoIter = std::slice::Iter<'a, WorkItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(path: &str) -> WorkItem {
        WorkItem::new(Utf8PathBuf::from(path))
    }

    #[test]
    fn test_insert_preserves_order() {
        let mut list = WorkList::new();
        list.insert(item("/b.c"));
        list.insert(item("/a.c"));
        let names: Vec<_> = list.iter().map(|i| i.display_name.as_str()).collect();
        assert_eq!(names, vec!["b.c", "a.c"]);
    }

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut list = WorkList::new();
        assert_eq!(list.insert(item("/x/a.c")), Insert::Added);
        assert_eq!(list.insert(item("/x/a.c")), Insert::Duplicate);
        assert_eq!(list.insert(item("/y/a.c")), Insert::Added);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_insert_stops_at_capacity() {
        let mut list = WorkList::new();
        for i in 0..WORK_LIST_CAPACITY {
            assert_eq!(list.insert(item(&format!("/f{i}.c"))), Insert::Added);
        }
        assert!(list.is_full());
        assert_eq!(list.remaining(), 0);
        assert_eq!(list.insert(item("/overflow.c")), Insert::Full);
        assert_eq!(list.len(), WORK_LIST_CAPACITY);
    }

    #[test]
    fn test_retain_updates_index() {
        let mut list = WorkList::new();
        list.insert(item("/a.c"));
        list.insert(item("/b.c"));
        list.insert(item("/c.c"));

        let removed = list.retain(|i| i.display_name != "b.c");
        assert_eq!(removed, 1);
        assert!(!list.contains(Utf8Path::new("/b.c")));
        assert!(list.contains(Utf8Path::new("/a.c")));

        // The removed path can be added again.
        assert_eq!(list.insert(item("/b.c")), Insert::Added);
    }

    #[test]
    fn test_update_and_cancel_all() {
        let mut list = WorkList::new();
        list.insert(item("/a.c"));
        list.insert(item("/b.c"));

        let updated = list.update(1, ItemStatus::Scanned, "Failed.").cloned();
        assert_eq!(updated.map(|i| i.summary), Some("Failed.".to_owned()));
        assert!(list.update(5, ItemStatus::Scanned, "x").is_none());

        list.mark_all_cancelled();
        assert!(list.iter().all(|i| i.status == ItemStatus::Cancelled));
    }

    #[test]
    fn test_clear() {
        let mut list = WorkList::new();
        list.insert(item("/a.c"));
        list.clear();
        assert!(list.is_empty());
        assert!(!list.contains(Utf8Path::new("/a.c")));
    }
}
