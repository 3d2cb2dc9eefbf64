//! Exclusive file handles.
//!
//! [`FileEngine`] opens files for exclusive read-write access and hands out
//! a [`LockedFile`] per file. An engine holds at most one live handle; the
//! handle releases its OS lock and the engine slot when dropped.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use camino::{Utf8Path, Utf8PathBuf};
use fs2::FileExt;
use rand::Rng;
use sus_core::MarkerCount;
use tracing::{debug, trace, warn};

use crate::error::EngineError;
use crate::substitution::Substitution;

/// Hands out exclusive [`LockedFile`] handles, one at a time.
///
/// Clones share the same slot, so a clone cannot lock a second file while
/// the first handle is alive.
///
/// # Examples
///
/// ```no_run
/// use camino::Utf8Path;
/// use sus_engine::{FileEngine, Substitution};
///
/// # fn main() -> Result<(), sus_engine::EngineError> {
/// let engine = FileEngine::new();
/// let mut file = engine.lock(Utf8Path::new("src/main.c"))?;
///
/// let before = file.count_markers()?;
/// file.substitute(Substitution::to_marker())?;
/// file.unlock()?;
///
/// println!("{}", before.summary());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct FileEngine {
    held: Arc<AtomicBool>,
}

impl FileEngine {
    /// Creates an engine with no file locked.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while a [`LockedFile`] from this engine is alive.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }

    /// Opens `path` for reading and writing and takes an exclusive OS lock on it.
    ///
    /// The lock is non-blocking: a file locked by another handle fails
    /// immediately.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::AlreadyLocked`] if this engine already holds a
    /// file, or [`EngineError::Io`] if the file cannot be opened or locked.
    pub fn lock(&self, path: &Utf8Path) -> Result<LockedFile, EngineError> {
        if self
            .held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(EngineError::AlreadyLocked);
        }

        match open_exclusive(path) {
            Ok(file) => {
                debug!(path = %path, "Locked file");
                Ok(LockedFile {
                    file,
                    path: path.to_owned(),
                    held: Arc::clone(&self.held),
                    released: false,
                })
            }
            Err(e) => {
                self.held.store(false, Ordering::Release);
                Err(EngineError::io(path, e))
            }
        }
    }
}

fn open_exclusive(path: &Utf8Path) -> std::io::Result<File> {
    let file = OpenOptions::new().read(true).write(true).open(path)?;
    FileExt::try_lock_exclusive(&file)?;
    Ok(file)
}

fn read_from_start(file: &mut File) -> std::io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    file.seek(SeekFrom::Start(0))?;
    file.read_to_end(&mut bytes)?;
    file.seek(SeekFrom::Start(0))?;
    Ok(bytes)
}

/// A file opened with exclusive read-write access.
///
/// Every operation leaves the cursor at the start of the file. Dropping the
/// handle flushes and releases it; use [`unlock`](Self::unlock) to observe
/// release errors.
#[derive(Debug)]
pub struct LockedFile {
    file: File,
    path: Utf8PathBuf,
    held: Arc<AtomicBool>,
    released: bool,
}

impl LockedFile {
    /// The locked file's path.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Counts semicolons and look-alikes in the whole file.
    ///
    /// Invalid UTF-8 is decoded lossily, so binary content simply yields low
    /// counts. The file is not modified.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] if the file cannot be read.
    pub fn count_markers(&mut self) -> Result<MarkerCount, EngineError> {
        let bytes = self.read_all()?;
        let count = MarkerCount::of(&String::from_utf8_lossy(&bytes));
        trace!(path = %self.path, total = count.total, markers = count.markers, "Counted markers");
        Ok(count)
    }

    /// Rewrites the file according to `substitution`, using the thread RNG.
    ///
    /// Returns the number of replaced characters.
    ///
    /// # Errors
    ///
    /// See [`substitute_with_rng`](Self::substitute_with_rng).
    pub fn substitute(&mut self, substitution: Substitution) -> Result<usize, EngineError> {
        self.substitute_with_rng(substitution, &mut rand::thread_rng())
    }

    /// Rewrites the file according to `substitution`, drawing from `rng`.
    ///
    /// The new content is built in memory first. The file is only truncated
    /// and rewritten when at least one character changed.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Encoding`] if the file is not valid UTF-8, in
    /// which case it is left untouched, or [`EngineError::Io`] if reading or
    /// writing fails.
    pub fn substitute_with_rng<R: Rng + ?Sized>(
        &mut self,
        substitution: Substitution,
        rng: &mut R,
    ) -> Result<usize, EngineError> {
        let bytes = self.read_all()?;
        let text = String::from_utf8(bytes).map_err(|_| EngineError::encoding(&self.path))?;

        let (rewritten, replaced) = substitution.apply(&text, rng);
        if replaced == 0 {
            trace!(path = %self.path, "Nothing to substitute");
            return Ok(0);
        }

        self.overwrite(rewritten.as_bytes())
            .map_err(|e| EngineError::io(&self.path, e))?;

        debug!(
            path = %self.path,
            direction = ?substitution.direction(),
            replaced,
            "Substituted characters"
        );
        Ok(replaced)
    }

    /// Flushes and releases the file.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] if flushing or releasing the OS lock fails.
    /// The handle is released either way.
    pub fn unlock(mut self) -> Result<(), EngineError> {
        let result = self.release();
        result.map_err(|e| EngineError::io(&self.path, e))
    }

    fn read_all(&mut self) -> Result<Vec<u8>, EngineError> {
        read_from_start(&mut self.file).map_err(|e| EngineError::io(&self.path, e))
    }

    fn overwrite(&mut self, content: &[u8]) -> std::io::Result<()> {
        self.file.set_len(0)?;
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(content)?;
        self.file.flush()?;
        self.file.seek(SeekFrom::Start(0))?;
        Ok(())
    }

    fn release(&mut self) -> std::io::Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;

        let flushed = self.file.flush().and_then(|()| self.file.sync_data());
        let unlocked = FileExt::unlock(&self.file);
        self.held.store(false, Ordering::Release);
        debug!(path = %self.path, "Released file");

        flushed.and(unlocked)
    }
}

impl Drop for LockedFile {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(path = %self.path, error = %e, "Failed to release file cleanly");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::fs;
    use tempfile::TempDir;

    fn write_fixture(dir: &TempDir, name: &str, content: &[u8]) -> Utf8PathBuf {
        let path = Utf8PathBuf::from_path_buf(dir.path().join(name)).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_count_plain_semicolons() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir, "a.c", b"int a;\nint b;\nint c;\n");
        let engine = FileEngine::new();

        let mut file = engine.lock(&path).unwrap();
        let count = file.count_markers().unwrap();
        assert_eq!(count, MarkerCount { total: 3, markers: 0 });
        assert_eq!(count.percentage(), Some(0));
    }

    #[test]
    fn test_to_marker_then_count_is_full() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir, "a.c", b"a;\nb;\nc;\nd;\n");
        let engine = FileEngine::new();

        let mut file = engine.lock(&path).unwrap();
        assert_eq!(file.substitute(Substitution::to_marker()).unwrap(), 4);
        let count = file.count_markers().unwrap();
        assert_eq!(count.percentage(), Some(100));
        assert_eq!(count.markers, 4);
        file.unlock().unwrap();

        let on_disk = fs::read_to_string(&path).unwrap();
        assert_eq!(on_disk, "a\u{037E}\nb\u{037E}\nc\u{037E}\nd\u{037E}\n");
    }

    #[test]
    fn test_round_trip_restores_bytes() {
        let original = b"for (i = 0; i < n; i++) {\r\n  x;\r\n}\n\nend;";
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir, "loop.js", original);
        let engine = FileEngine::new();

        let mut file = engine.lock(&path).unwrap();
        file.substitute(Substitution::to_marker()).unwrap();
        file.substitute(Substitution::to_canonical()).unwrap();
        file.unlock().unwrap();

        assert_eq!(fs::read(&path).unwrap(), original);
    }

    #[test]
    fn test_count_twice_is_stable() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir, "m.cs", "x\u{037E} y;".as_bytes());
        let engine = FileEngine::new();

        let mut file = engine.lock(&path).unwrap();
        let first = file.count_markers().unwrap();
        let second = file.count_markers().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.percentage(), Some(50));
        drop(file);

        assert_eq!(fs::read(&path).unwrap(), "x\u{037E} y;".as_bytes());
    }

    #[test]
    fn test_randomized_bounds_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir, "r.c", ";;;;;;;;;;".as_bytes());
        let engine = FileEngine::new();
        let mut rng = StdRng::seed_from_u64(42);

        let mut file = engine.lock(&path).unwrap();
        let replaced = file
            .substitute_with_rng(Substitution::randomized(100), &mut rng)
            .unwrap();
        assert_eq!(replaced, 0);
        assert_eq!(file.count_markers().unwrap().markers, 0);

        let replaced = file
            .substitute_with_rng(Substitution::randomized(0), &mut rng)
            .unwrap();
        assert_eq!(replaced, 10);
        assert_eq!(file.count_markers().unwrap().percentage(), Some(100));
    }

    #[test]
    fn test_canonical_on_clean_file_is_noop() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir, "clean.h", b"void f();\n");
        let engine = FileEngine::new();

        let mut file = engine.lock(&path).unwrap();
        assert_eq!(file.substitute(Substitution::to_canonical()).unwrap(), 0);
        file.unlock().unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"void f();\n");
    }

    #[test]
    fn test_invalid_utf8_is_rejected_before_write() {
        let content = [b'a', b';', 0xFF, 0xFE, b';'];
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir, "bin.c", &content);
        let engine = FileEngine::new();

        let mut file = engine.lock(&path).unwrap();
        let count = file.count_markers().unwrap();
        assert_eq!(count.total, 2);

        let err = file.substitute(Substitution::to_marker()).unwrap_err();
        assert!(matches!(err, EngineError::Encoding { .. }));
        drop(file);

        assert_eq!(fs::read(&path).unwrap(), content);
    }

    #[test]
    fn test_second_lock_on_same_engine_is_rejected() {
        let dir = TempDir::new().unwrap();
        let a = write_fixture(&dir, "a.c", b";");
        let b = write_fixture(&dir, "b.c", b";");
        let engine = FileEngine::new();

        let held = engine.lock(&a).unwrap();
        assert!(engine.is_locked());
        assert!(matches!(engine.lock(&b), Err(EngineError::AlreadyLocked)));
        assert!(matches!(
            engine.clone().lock(&b),
            Err(EngineError::AlreadyLocked)
        ));

        drop(held);
        assert!(!engine.is_locked());
        assert!(engine.lock(&b).is_ok());
    }

    #[test]
    fn test_file_locked_elsewhere_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir, "busy.c", b";");
        let first = FileEngine::new();
        let second = FileEngine::new();

        let _held = first.lock(&path).unwrap();
        let err = second.lock(&path).unwrap_err();
        assert!(matches!(err, EngineError::Io { .. }));
        assert_eq!(err.path(), Some(&path));
        assert!(!second.is_locked());
    }

    #[test]
    fn test_missing_file_frees_slot() {
        let dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("missing.c")).unwrap();
        let engine = FileEngine::new();

        let err = engine.lock(&path).unwrap_err();
        assert!(err.is_recoverable());
        assert!(!engine.is_locked());
    }
}
