//! Work item type for tracked files.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use super::status::ItemStatus;

/// Summary shown for an item that has no scan result.
pub const EMPTY_SUMMARY: &str = "---";

/// One tracked file and its last-known scan or substitution result.
///
/// Items are keyed by [`path`](Self::path); a [`WorkList`](crate::WorkList)
/// never holds two items with the same path.
///
/// # Examples
///
/// ```
/// use sus_core::{ItemStatus, WorkItem};
/// use camino::Utf8PathBuf;
///
/// let item = WorkItem::new(Utf8PathBuf::from("/src/main.cs"));
/// assert_eq!(item.display_name, "main.cs");
/// assert_eq!(item.summary, "---");
/// assert_eq!(item.status, ItemStatus::Unprocessed);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// File name shown to the user.
    pub display_name: String,

    /// Result of the last scan or substitution.
    pub summary: String,

    /// The last operation applied to this item.
    pub status: ItemStatus,

    /// Absolute path of the file.
    pub path: Utf8PathBuf,
}

impl WorkItem {
    /// Creates an unprocessed item for `path`.
    #[must_use]
    pub fn new(path: Utf8PathBuf) -> Self {
        let display_name = path.file_name().unwrap_or(path.as_str()).to_owned();
        Self {
            display_name,
            summary: EMPTY_SUMMARY.to_owned(),
            status: ItemStatus::Unprocessed,
            path,
        }
    }

    /// Returns the file path.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Records the outcome of a run on this item.
    pub fn record(&mut self, status: ItemStatus, summary: impl Into<String>) {
        self.status = status;
        self.summary = summary.into();
    }

    /// Resets the item after a cancelled run.
    pub fn mark_cancelled(&mut self) {
        self.record(ItemStatus::Cancelled, EMPTY_SUMMARY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_file_name() {
        let item = WorkItem::new(Utf8PathBuf::from("/a/b/lib.java"));
        assert_eq!(item.display_name, "lib.java");
        assert_eq!(item.path(), Utf8Path::new("/a/b/lib.java"));
    }

    #[test]
    fn test_record_and_cancel() {
        let mut item = WorkItem::new(Utf8PathBuf::from("x.c"));
        item.record(ItemStatus::Scanned, "0% (0 troll character/s found!)");
        assert_eq!(item.status, ItemStatus::Scanned);

        item.mark_cancelled();
        assert_eq!(item.status, ItemStatus::Cancelled);
        assert_eq!(item.summary, EMPTY_SUMMARY);
    }

    #[test]
    fn test_work_item_snapshot() {
        let item = WorkItem::new(Utf8PathBuf::from("/src/app.js"));
        insta::assert_json_snapshot!(item, @r###"
        {
          "display_name": "app.js",
          "summary": "---",
          "status": "unprocessed",
          "path": "/src/app.js"
        }
        "###);
    }
}
