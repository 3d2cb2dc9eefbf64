//! Input expansion into file paths.
//!
//! [`FileDiscovery`] turns the paths a user drops onto the tool into the
//! files to track:
//!
//! - A file is kept if its name matches one of the patterns
//! - A directory is listed (one level by default, or recursively) and every
//!   matching file in it is kept
//! - Anything else is skipped
//!
//! Patterns are globs such as `*.cs`, matched case-insensitively against the
//! file name only. Unlike a source-tree walk, hidden files and ignore files
//! are not special: every file in a listed directory is a candidate.

use std::ops::ControlFlow;

use camino::{Utf8Path, Utf8PathBuf};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use tracing::{debug, warn};

use crate::error::BatchError;

/// Expands input paths into matching files.
///
/// # Examples
///
/// ```
/// use sus_batch::FileDiscovery;
/// use camino::Utf8Path;
///
/// let patterns = vec!["*.c".to_owned(), "*.h".to_owned()];
/// let discovery = FileDiscovery::new(Some(&patterns))?;
///
/// assert!(discovery.matches(Utf8Path::new("/src/main.c")));
/// assert!(discovery.matches(Utf8Path::new("/src/LIB.H")));
/// assert!(!discovery.matches(Utf8Path::new("/src/main.rs")));
/// # Ok::<(), sus_batch::BatchError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct FileDiscovery {
    /// File name patterns; `None` accepts every file.
    matcher: Option<GlobSet>,
    /// Whether directories are listed recursively.
    recursive: bool,
}

impl FileDiscovery {
    /// Creates a discovery for the given patterns.
    ///
    /// `None` accepts every file.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Pattern`] if a pattern is not a valid glob.
    pub fn new(patterns: Option<&[String]>) -> Result<Self, BatchError> {
        let matcher = match patterns {
            Some(patterns) => Some(build_matcher(patterns)?),
            None => None,
        };
        Ok(Self {
            matcher,
            recursive: false,
        })
    }

    /// Creates a discovery that accepts every file.
    #[must_use]
    pub fn all_files() -> Self {
        Self::default()
    }

    /// Configures whether directories are listed recursively.
    #[must_use]
    pub const fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Returns `true` if the file name of `path` matches a pattern.
    #[must_use]
    pub fn matches(&self, path: &Utf8Path) -> bool {
        match &self.matcher {
            None => true,
            Some(set) => path.file_name().is_some_and(|name| set.is_match(name)),
        }
    }

    /// Calls `on_file` with the absolute path of every matching file under `input`.
    ///
    /// Stops early when `on_file` returns [`ControlFlow::Break`], and returns
    /// that value. Unreadable directory entries and non-UTF-8 paths are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Input`] if `input` does not exist or cannot be
    /// resolved.
    pub fn visit(
        &self,
        input: &Utf8Path,
        mut on_file: impl FnMut(Utf8PathBuf) -> ControlFlow<()>,
    ) -> Result<ControlFlow<()>, BatchError> {
        let root = input
            .canonicalize_utf8()
            .map_err(|e| BatchError::input(input, e))?;

        if root.is_file() {
            if self.matches(&root) {
                return Ok(on_file(root));
            }
            debug!(path = %root, "Input does not match any pattern");
            return Ok(ControlFlow::Continue(()));
        }

        if !root.is_dir() {
            debug!(path = %root, "Input is neither a file nor a directory");
            return Ok(ControlFlow::Continue(()));
        }

        for result in self.build_walker(&root) {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(root = %root, error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let Some(path) = Utf8Path::from_path(entry.path()) else {
                debug!(path = %entry.path().display(), "Skipping non-UTF-8 path");
                continue;
            };

            if !self.matches(path) {
                continue;
            }

            if on_file(path.to_owned()).is_break() {
                return Ok(ControlFlow::Break(()));
            }
        }

        Ok(ControlFlow::Continue(()))
    }

    /// Collects every matching file under `input`.
    ///
    /// # Errors
    ///
    /// See [`visit`](Self::visit).
    pub fn collect(&self, input: &Utf8Path) -> Result<Vec<Utf8PathBuf>, BatchError> {
        let mut paths = Vec::new();
        let _flow = self.visit(input, |path| {
            paths.push(path);
            ControlFlow::Continue(())
        })?;
        Ok(paths)
    }

    fn build_walker(&self, root: &Utf8Path) -> ignore::Walk {
        WalkBuilder::new(root)
            // Every file counts; no hidden-file or ignore-file filtering
            .standard_filters(false)
            .follow_links(false)
            .max_depth(if self.recursive { None } else { Some(1) })
            .sort_by_file_name(|a, b| a.cmp(b))
            .build()
    }
}

fn build_matcher(patterns: &[String]) -> Result<GlobSet, BatchError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(
            GlobBuilder::new(pattern)
                .case_insensitive(true)
                .literal_separator(true)
                .build()?,
        );
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().canonicalize().unwrap()).unwrap()
    }

    fn patterns(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_matches_file_name_only() {
        let discovery = FileDiscovery::new(Some(&patterns(&["*.cs"]))).unwrap();
        assert!(discovery.matches(Utf8Path::new("/x.cs/Program.cs")));
        assert!(!discovery.matches(Utf8Path::new("/x.cs/readme.md")));
    }

    #[test]
    fn test_all_files_matches_everything() {
        let discovery = FileDiscovery::all_files();
        assert!(discovery.matches(Utf8Path::new("Makefile")));
        assert!(discovery.matches(Utf8Path::new("a.out")));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = FileDiscovery::new(Some(&patterns(&["*.{c"]))).unwrap_err();
        assert!(matches!(err, BatchError::Pattern(_)));
    }

    #[test]
    fn test_flat_listing_skips_subdirectories() {
        let dir = TempDir::new().unwrap();
        let root = utf8(&dir);
        fs::write(root.join("a.c"), ";").unwrap();
        fs::write(root.join("b.txt"), ";").unwrap();
        fs::write(root.join(".hidden.c"), ";").unwrap();
        fs::create_dir(root.join("nested")).unwrap();
        fs::write(root.join("nested/c.c"), ";").unwrap();

        let discovery = FileDiscovery::new(Some(&patterns(&["*.c"]))).unwrap();
        let found = discovery.collect(&root).unwrap();
        assert_eq!(found, vec![root.join(".hidden.c"), root.join("a.c")]);

        let found = discovery.with_recursive(true).collect(&root).unwrap();
        assert_eq!(found.len(), 3);
        assert!(found.contains(&root.join("nested/c.c")));
    }

    #[test]
    fn test_file_input() {
        let dir = TempDir::new().unwrap();
        let root = utf8(&dir);
        fs::write(root.join("main.java"), "class A {}").unwrap();

        let discovery = FileDiscovery::new(Some(&patterns(&["*.java"]))).unwrap();
        assert_eq!(
            discovery.collect(&root.join("main.java")).unwrap(),
            vec![root.join("main.java")]
        );

        let discovery = FileDiscovery::new(Some(&patterns(&["*.js"]))).unwrap();
        assert!(discovery.collect(&root.join("main.java")).unwrap().is_empty());
    }

    #[test]
    fn test_visit_stops_on_break() {
        let dir = TempDir::new().unwrap();
        let root = utf8(&dir);
        for i in 0..5 {
            fs::write(root.join(format!("f{i}.c")), ";").unwrap();
        }

        let mut seen = 0;
        let flow = FileDiscovery::all_files()
            .visit(&root, |_| {
                seen += 1;
                if seen == 2 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .unwrap();
        assert!(flow.is_break());
        assert_eq!(seen, 2);
    }

    #[test]
    fn test_missing_input() {
        let dir = TempDir::new().unwrap();
        let missing = utf8(&dir).join("nope");
        let err = FileDiscovery::all_files().collect(&missing).unwrap_err();
        assert!(matches!(err, BatchError::Input { .. }));
    }
}
