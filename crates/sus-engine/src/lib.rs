//! Exclusive single-file scanning and substitution.
//!
//! This crate provides the file-level half of semisus:
//!
//! - [`FileEngine`] hands out one [`LockedFile`] at a time
//! - [`LockedFile::count_markers`] measures how many semicolons are look-alikes
//! - [`LockedFile::substitute`] rewrites semicolons in either direction
//! - [`Substitution`] describes a rewrite and applies it to text in memory
//!
//! # Example
//!
//! ```no_run
//! use camino::Utf8Path;
//! use sus_engine::{FileEngine, Substitution};
//!
//! # fn main() -> Result<(), sus_engine::EngineError> {
//! let engine = FileEngine::new();
//!
//! let mut file = engine.lock(Utf8Path::new("Program.cs"))?;
//! file.substitute(Substitution::randomized(90))?;
//! println!("{}", file.count_markers()?.summary());
//! file.unlock()?;
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod engine;
pub mod error;
pub mod substitution;

pub use engine::{FileEngine, LockedFile};
pub use error::EngineError;
pub use substitution::Substitution;
