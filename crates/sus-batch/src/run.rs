//! Synchronous bodies of the background runs.
//!
//! Each function here runs on the blocking worker thread. It walks the work
//! list strictly in order, polls the cancellation token once per item, and
//! reports through an `emit` sink. The coordinator turns the sink into
//! channel sends and sends the completion event itself.

use std::ops::ControlFlow;

use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use sus_core::{Insert, ItemStatus, MarkerCount, WorkItem, WorkList};
use sus_engine::{EngineError, FileEngine, Substitution};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::discovery::FileDiscovery;
use crate::events::{BatchEvent, TrollType};

pub(crate) const COMPLETED_MESSAGE: &str = "Process completed.";
pub(crate) const CANCELLED_MESSAGE: &str = "Process has been cancelled!";
pub(crate) const CANT_SCAN: &str = "Can't scan!";
pub(crate) const CANT_WRITE: &str = "Can't write!";

/// How a scan or substitution run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Finished,
    Cancelled {
        /// Files that could not be restored by the compensating pass.
        rollback_failed: usize,
    },
}

/// State shared by every run of one coordinator.
pub(crate) struct RunContext<'a> {
    pub(crate) items: &'a Mutex<WorkList>,
    pub(crate) engine: &'a FileEngine,
    pub(crate) token: &'a CancellationToken,
}

impl RunContext<'_> {
    /// Expands `inputs` into the work list until it is full.
    ///
    /// Returns the number of added items.
    pub(crate) fn add(&self, inputs: &[Utf8PathBuf], discovery: &FileDiscovery) -> usize {
        let mut added = 0;
        let mut duplicates = 0;

        for input in inputs {
            let result = discovery.visit(input, |path| {
                match self.items.lock().insert(WorkItem::new(path)) {
                    Insert::Added => added += 1,
                    Insert::Duplicate => duplicates += 1,
                    Insert::Full => return ControlFlow::Break(()),
                }
                ControlFlow::Continue(())
            });

            match result {
                Ok(ControlFlow::Break(())) => {
                    info!(input = %input, "Work list is full, ignoring remaining inputs");
                    break;
                }
                Ok(ControlFlow::Continue(())) => {}
                Err(e) => warn!(input = %input, error = %e, "Skipping input"),
            }
        }

        debug!(added, duplicates, "Finished adding inputs");
        added
    }

    /// Removes the items whose paths are in `checked`.
    pub(crate) fn remove(&self, checked: &FxHashSet<Utf8PathBuf>) -> usize {
        let removed = self
            .items
            .lock()
            .retain(|item| !checked.contains(item.path()));
        debug!(removed, "Removed items");
        removed
    }

    /// Counts look-alikes in every item.
    pub(crate) fn scan(&self, emit: &mut dyn FnMut(BatchEvent)) -> Outcome {
        let total = self.items.lock().len();
        info!(total, "Starting scan");

        for index in 0..total {
            if self.token.is_cancelled() {
                self.cancel_all(index, total, emit);
                return Outcome::Cancelled { rollback_failed: 0 };
            }

            let Some(item) = self.items.lock().get(index).cloned() else {
                break;
            };
            let name = &item.display_name;
            emit(BatchEvent::progress(index, total, format!("Scanning {name}...")));

            match self.measure(item.path()) {
                Ok(count) => {
                    self.record(index, ItemStatus::Scanned, count.summary(), emit);
                    emit(BatchEvent::progress(index + 1, total, format!("Scanned {name}")));
                }
                Err(e) => {
                    warn!(path = %item.path, error = %e, "Failed to scan file");
                    self.record(index, ItemStatus::Scanned, CANT_SCAN, emit);
                    emit(BatchEvent::progress(index + 1, total, format!("Failed to scan {e}")));
                }
            }
        }

        emit(BatchEvent::progress(total, total, COMPLETED_MESSAGE));
        info!(total, "Scan completed");
        Outcome::Finished
    }

    /// Applies `substitution` to every item.
    ///
    /// A cancelled [`TrollType::Troll`] run restores the items it trolled,
    /// newest first, before reporting cancellation.
    pub(crate) fn substitute(
        &self,
        troll_type: TrollType,
        substitution: Substitution,
        emit: &mut dyn FnMut(BatchEvent),
    ) -> Outcome {
        let total = self.items.lock().len();
        let (doing, done) = troll_type.verbs();
        let status = ItemStatus::after_substitution(troll_type.direction());
        let mut trolled = Vec::new();
        info!(total, kind = %troll_type.kind(), "Starting substitution");

        for index in 0..total {
            if self.token.is_cancelled() {
                let rollback_failed = match troll_type {
                    TrollType::Troll => self.roll_back(&trolled),
                    TrollType::DeTroll => 0,
                };
                self.cancel_all(index, total, emit);
                return Outcome::Cancelled { rollback_failed };
            }

            let Some(item) = self.items.lock().get(index).cloned() else {
                break;
            };
            let name = &item.display_name;
            emit(BatchEvent::progress(index, total, format!("{doing} {name}...")));

            match self.rewrite(item.path(), substitution) {
                Ok(count) => {
                    self.record(index, status, count.summary(), emit);
                    trolled.push(index);
                    emit(BatchEvent::progress(index + 1, total, format!("{done} {name}")));
                }
                Err(e) => {
                    warn!(path = %item.path, error = %e, "Failed to rewrite file");
                    self.record(index, status, CANT_WRITE, emit);
                    emit(BatchEvent::progress(
                        index + 1,
                        total,
                        format!("Failed to write: {e}"),
                    ));
                }
            }
        }

        emit(BatchEvent::progress(total, total, COMPLETED_MESSAGE));
        info!(total, kind = %troll_type.kind(), "Substitution completed");
        Outcome::Finished
    }

    fn measure(&self, path: &Utf8Path) -> Result<MarkerCount, EngineError> {
        let mut file = self.engine.lock(path)?;
        let count = file.count_markers()?;
        file.unlock()?;
        Ok(count)
    }

    fn rewrite(&self, path: &Utf8Path, substitution: Substitution) -> Result<MarkerCount, EngineError> {
        let mut file = self.engine.lock(path)?;
        file.substitute(substitution)?;
        let count = file.count_markers()?;
        file.unlock()?;
        Ok(count)
    }

    /// Restores semicolons in the items at `indices`, newest first.
    ///
    /// Returns the number of files that could not be restored.
    fn roll_back(&self, indices: &[usize]) -> usize {
        let mut failed = 0;
        for &index in indices.iter().rev() {
            let Some(path) = self.items.lock().get(index).map(|item| item.path.clone()) else {
                continue;
            };
            if let Err(e) = self.rewrite(&path, Substitution::to_canonical()) {
                warn!(path = %path, error = %e, "Failed to restore file");
                failed += 1;
            }
        }
        info!(restored = indices.len() - failed, failed, "Rolled back cancelled run");
        failed
    }

    fn record(
        &self,
        index: usize,
        status: ItemStatus,
        summary: impl Into<String>,
        emit: &mut dyn FnMut(BatchEvent),
    ) {
        let updated = self.items.lock().update(index, status, summary).cloned();
        if let Some(item) = updated {
            emit(BatchEvent::ItemUpdated { index, item });
        }
    }

    fn cancel_all(&self, index: usize, total: usize, emit: &mut dyn FnMut(BatchEvent)) {
        let items = {
            let mut items = self.items.lock();
            items.mark_all_cancelled();
            items.as_slice().to_vec()
        };
        info!(index, total, "Run cancelled");
        emit(BatchEvent::ItemsChanged { items });
        emit(BatchEvent::progress(index, total, CANCELLED_MESSAGE));
    }
}
