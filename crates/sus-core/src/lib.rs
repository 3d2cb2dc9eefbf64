//! Core types, errors, and configuration for semisus.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - [`WorkItem`] and [`WorkList`], the bounded list of tracked files
//! - [`ItemStatus`], the last operation applied to an item
//! - [`MarkerCount`] and [`Direction`], the vocabulary of the substitution engine
//! - Configuration structures ([`Config`], [`DiscoveryConfig`], [`SubstitutionSettings`])
//! - [`ConfigError`] for configuration loading and validation
//!
//! # The Two Characters
//!
//! The tool works with two visually identical characters:
//!
//! ```
//! use sus_core::{CANONICAL, MARKER};
//!
//! assert_eq!(CANONICAL, ';');        // U+003B SEMICOLON
//! assert_eq!(MARKER, '\u{037E}');    // U+037E GREEK QUESTION MARK
//! assert_ne!(CANONICAL, MARKER);
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, DiscoveryConfig, SubstitutionSettings};
pub use error::ConfigError;
pub use types::{
    CANONICAL, Direction, Insert, ItemStatus, MARKER, MarkerCount, WORK_LIST_CAPACITY, WorkItem,
    WorkList,
};
