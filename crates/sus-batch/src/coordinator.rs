//! The batch coordinator.
//!
//! [`BatchCoordinator`] owns the work list and runs one operation at a time on
//! a blocking worker. Starting an operation is synchronous: it either rejects
//! immediately or returns a [`RunHandle`] while the work happens in the
//! background and reports through the event channel.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Blocking Worker (spawn_blocking)           │
//! │   RunContext ── FileEngine ── LockedFile (one at a time)    │
//! └───────────────────────────────┬─────────────────────────────┘
//!                                 │ blocking_send
//!                                 ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Async Runtime (tokio)                      │
//! │   mpsc::Receiver<BatchEvent> ──> consumer loop              │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use camino::Utf8PathBuf;
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use sus_core::{WORK_LIST_CAPACITY, WorkItem, WorkList};
use sus_engine::{FileEngine, Substitution};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::collaborators::{CheckedItems, SettingsProvider};
use crate::discovery::FileDiscovery;
use crate::error::BatchError;
use crate::events::{BatchEvent, OperationKind, TrollType};
use crate::run::{Outcome, RunContext};

/// State shared between the coordinator and its worker.
struct Shared {
    items: Mutex<WorkList>,
    running: AtomicBool,
    cancel: Mutex<CancellationToken>,
    engine: FileEngine,
    settings: Arc<dyn SettingsProvider>,
    events: mpsc::Sender<BatchEvent>,
}

impl Shared {
    fn send(&self, event: BatchEvent) {
        if self.events.blocking_send(event).is_err() {
            trace!("Event receiver dropped");
        }
    }

    fn snapshot(&self) -> Vec<WorkItem> {
        self.items.lock().as_slice().to_vec()
    }
}

/// Clears the running flag when a run ends, however it ends.
struct RunGuard {
    shared: Arc<Shared>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        let mut cancel = self.shared.cancel.lock();
        *cancel = CancellationToken::new();
        self.shared.running.store(false, Ordering::Release);
    }
}

/// Handle to a started batch run.
///
/// Dropping the handle detaches the run; it keeps going in the background.
#[derive(Debug)]
pub struct RunHandle {
    task: JoinHandle<()>,
}

impl RunHandle {
    /// Waits for the worker to finish.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Worker`] if the worker panicked.
    pub async fn join(self) -> Result<(), BatchError> {
        self.task.await?;
        Ok(())
    }

    /// Returns `true` once the worker has finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Runs batch operations over a bounded list of files.
///
/// At most one operation (add, remove, clear, scan, troll) is in flight at a
/// time; starting a second one fails with [`BatchError::AlreadyRunning`].
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use sus_batch::{BatchCoordinator, BatchEvent};
/// use sus_core::SubstitutionSettings;
/// use tokio::sync::mpsc;
///
/// # async fn demo() -> Result<(), sus_batch::BatchError> {
/// let (tx, mut rx) = mpsc::channel(256);
/// let coordinator = BatchCoordinator::new(Arc::new(SubstitutionSettings::default()), tx);
///
/// coordinator.add(vec!["./src".into()], None)?.join().await?;
/// coordinator.scan()?;
///
/// while let Some(event) = rx.recv().await {
///     if let BatchEvent::Completed { kind, cancelled, .. } = event {
///         println!("{kind} finished (cancelled: {cancelled})");
///         break;
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct BatchCoordinator {
    shared: Arc<Shared>,
    runtime: Handle,
    recursive: bool,
}

impl BatchCoordinator {
    /// Creates a coordinator that runs its workers on the current runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn new(settings: Arc<dyn SettingsProvider>, events: mpsc::Sender<BatchEvent>) -> Self {
        Self::with_runtime(Handle::current(), settings, events)
    }

    /// Creates a coordinator that runs its workers on `runtime`.
    #[must_use]
    pub fn with_runtime(
        runtime: Handle,
        settings: Arc<dyn SettingsProvider>,
        events: mpsc::Sender<BatchEvent>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                items: Mutex::new(WorkList::new()),
                running: AtomicBool::new(false),
                cancel: Mutex::new(CancellationToken::new()),
                engine: FileEngine::new(),
                settings,
                events,
            }),
            runtime,
            recursive: false,
        }
    }

    /// Configures whether [`add`](Self::add) lists directories recursively.
    #[must_use]
    pub const fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Returns `true` while an operation is in flight.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Returns a snapshot of the work list.
    #[must_use]
    pub fn items(&self) -> Vec<WorkItem> {
        self.shared.snapshot()
    }

    /// Number of tracked items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.items.lock().len()
    }

    /// Returns `true` if no items are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.items.lock().is_empty()
    }

    /// Adds the files matching `patterns` found under `inputs`.
    ///
    /// Files are added directly; directories are listed. `None` accepts every
    /// file. Paths already tracked are skipped and adding stops once the list
    /// holds [`WORK_LIST_CAPACITY`] items. Sends one
    /// [`BatchEvent::ItemsChanged`] when done.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::AlreadyRunning`], [`BatchError::NoInputs`],
    /// [`BatchError::CapacityExceeded`], or [`BatchError::Pattern`] without
    /// starting anything.
    pub fn add(
        &self,
        inputs: Vec<Utf8PathBuf>,
        patterns: Option<Vec<String>>,
    ) -> Result<RunHandle, BatchError> {
        let guard = self.begin()?;
        if inputs.is_empty() {
            return Err(BatchError::NoInputs);
        }
        if self.shared.items.lock().is_full() {
            return Err(BatchError::capacity_exceeded(WORK_LIST_CAPACITY));
        }
        let discovery =
            FileDiscovery::new(patterns.as_deref())?.with_recursive(self.recursive);

        debug!(inputs = inputs.len(), recursive = self.recursive, "Adding inputs");
        Ok(self.spawn(guard, move |ctx| {
            ctx.add(&inputs, &discovery);
        }))
    }

    /// Removes the items `selection` marks as checked.
    ///
    /// Returns `Ok(None)` without starting a run when the list is empty.
    /// Otherwise sends one [`BatchEvent::ItemsChanged`] when done.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::AlreadyRunning`] if another operation is in flight.
    pub fn remove_checked<S>(&self, selection: &S) -> Result<Option<RunHandle>, BatchError>
    where
        S: CheckedItems + ?Sized,
    {
        let guard = self.begin()?;
        let checked: FxHashSet<Utf8PathBuf> = {
            let items = self.shared.items.lock();
            if items.is_empty() {
                return Ok(None);
            }
            items
                .iter()
                .filter(|item| selection.is_checked(item))
                .map(|item| item.path.clone())
                .collect()
        };

        debug!(checked = checked.len(), "Removing checked items");
        Ok(Some(self.spawn(guard, move |ctx| {
            ctx.remove(&checked);
        })))
    }

    /// Removes every item.
    ///
    /// Behaves like [`remove_checked`](Self::remove_checked) with every item checked.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::AlreadyRunning`] if another operation is in flight.
    pub fn clear(&self) -> Result<Option<RunHandle>, BatchError> {
        self.remove_checked(&|_: &WorkItem| true)
    }

    /// Requests cancellation of the current run.
    ///
    /// The worker stops before its next item. Does nothing when idle.
    pub fn cancel(&self) {
        let cancel = self.shared.cancel.lock();
        if self.is_running() {
            debug!("Cancellation requested");
            cancel.cancel();
        }
    }

    /// Counts look-alikes in every item.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::AlreadyRunning`] or [`BatchError::EmptyWorkList`]
    /// without starting anything.
    pub fn scan(&self) -> Result<RunHandle, BatchError> {
        let guard = self.begin()?;
        self.ensure_items()?;

        Ok(self.spawn_reporting(guard, OperationKind::Scan, |_, ctx, emit| {
            ctx.scan(emit)
        }))
    }

    /// Replaces semicolons in every item, in the direction of `troll_type`.
    ///
    /// The substitution settings are read once, now.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::AlreadyRunning`] or [`BatchError::EmptyWorkList`]
    /// without starting anything.
    pub fn troll_init(&self, troll_type: TrollType) -> Result<RunHandle, BatchError> {
        let guard = self.begin()?;
        self.ensure_items()?;

        let settings = self.shared.settings.substitution_settings();
        let substitution = Substitution::from_settings(troll_type.direction(), settings);
        debug!(?troll_type, ?substitution, "Starting troll run");

        Ok(self.spawn_reporting(guard, troll_type.kind(), move |_, ctx, emit| {
            ctx.substitute(troll_type, substitution, emit)
        }))
    }

    /// Marks the coordinator as running.
    ///
    /// The token was replaced when the previous run ended, so a `cancel()`
    /// from here on reaches this run.
    fn begin(&self) -> Result<RunGuard, BatchError> {
        self.shared
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| BatchError::AlreadyRunning)?;

        Ok(RunGuard {
            shared: Arc::clone(&self.shared),
        })
    }

    fn ensure_items(&self) -> Result<(), BatchError> {
        if self.shared.items.lock().is_empty() {
            return Err(BatchError::EmptyWorkList);
        }
        Ok(())
    }

    /// Runs a list edit, then reports the new list once the run has ended.
    fn spawn<F>(&self, guard: RunGuard, work: F) -> RunHandle
    where
        F: FnOnce(&RunContext<'_>) + Send + 'static,
    {
        let task = self.runtime.spawn_blocking(move || {
            let shared = Arc::clone(&guard.shared);
            let token = shared.cancel.lock().clone();
            work(&RunContext {
                items: &shared.items,
                engine: &shared.engine,
                token: &token,
            });
            let items = shared.snapshot();
            drop(guard);

            shared.send(BatchEvent::ItemsChanged { items });
        });
        RunHandle { task }
    }

    fn spawn_reporting<F>(&self, guard: RunGuard, kind: OperationKind, work: F) -> RunHandle
    where
        F: FnOnce(&Shared, &RunContext<'_>, &mut dyn FnMut(BatchEvent)) -> Outcome + Send + 'static,
    {
        let task = self.runtime.spawn_blocking(move || {
            let shared = Arc::clone(&guard.shared);
            let token = shared.cancel.lock().clone();
            let outcome = {
                let ctx = RunContext {
                    items: &shared.items,
                    engine: &shared.engine,
                    token: &token,
                };
                work(&shared, &ctx, &mut |event| shared.send(event))
            };
            drop(guard);

            let (cancelled, error) = match outcome {
                Outcome::Finished => (false, None),
                Outcome::Cancelled { rollback_failed: 0 } => (true, None),
                Outcome::Cancelled { rollback_failed } => (
                    true,
                    Some(BatchError::Rollback {
                        failed: rollback_failed,
                    }),
                ),
            };
            shared.send(BatchEvent::Completed {
                kind,
                cancelled,
                error,
            });
        });
        RunHandle { task }
    }
}

impl std::fmt::Debug for BatchCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchCoordinator")
            .field("items", &self.len())
            .field("running", &self.is_running())
            .field("recursive", &self.recursive)
            .finish_non_exhaustive()
    }
}
