//! Background batch runs over a bounded list of tracked files.
//!
//! This crate drives [`sus_engine`] across many files while a user interface
//! stays responsive. The main entry point is [`BatchCoordinator`], which
//! combines:
//!
//! - [`FileDiscovery`]: expands dropped files and directories with glob patterns
//! - [`sus_core::WorkList`]: the ordered, path-unique list of at most 1000 items
//! - A blocking worker per run, cancelled cooperatively between items
//! - [`BatchEvent`]s streamed over a bounded `tokio::sync::mpsc` channel
//!
//! # Streaming API
//!
//! ```no_run
//! use std::sync::Arc;
//! use sus_batch::{BatchCoordinator, BatchEvent, TrollType};
//! use sus_core::SubstitutionSettings;
//! use tokio::sync::mpsc;
//!
//! # async fn demo() -> Result<(), sus_batch::BatchError> {
//! let (tx, mut rx) = mpsc::channel(256);
//! let coordinator = BatchCoordinator::new(Arc::new(SubstitutionSettings::default()), tx);
//!
//! coordinator.add(vec!["./src".into()], Some(vec!["*.cs".to_owned()]))?.join().await?;
//! coordinator.troll_init(TrollType::Troll)?;
//!
//! while let Some(event) = rx.recv().await {
//!     match event {
//!         BatchEvent::Progress { current, total, message } => {
//!             println!("[{current}/{total}] {message}");
//!         }
//!         BatchEvent::ItemUpdated { item, .. } => println!("{}: {}", item.display_name, item.summary),
//!         BatchEvent::ItemsChanged { items } => println!("{} items", items.len()),
//!         BatchEvent::Completed { kind, cancelled, error } => {
//!             println!("{kind} done, cancelled={cancelled}, error={error:?}");
//!             break;
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod collaborators;
mod coordinator;
mod discovery;
mod error;
mod events;
mod run;

pub use collaborators::{CheckedItems, SettingsProvider};
pub use coordinator::{BatchCoordinator, RunHandle};
pub use discovery::FileDiscovery;
pub use error::BatchError;
pub use events::{BatchEvent, OperationKind, TrollType};
