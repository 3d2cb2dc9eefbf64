//! Domain types for semisus.
//!
//! # Module Organization
//!
//! - [`item`] - A single tracked file
//! - [`marker`] - The two characters, substitution direction and scan counts
//! - [`status`] - The last operation applied to an item
//! - [`work_list`] - The bounded, de-duplicated list of items
//!
//! All public types are re-exported here and at the crate root:
//!
//! ```
//! use sus_core::{ItemStatus, WorkItem, WorkList};
//! ```

pub mod item;
pub mod marker;
pub mod status;
pub mod work_list;

pub use item::WorkItem;
pub use marker::{CANONICAL, Direction, MARKER, MarkerCount};
pub use status::ItemStatus;
pub use work_list::{Insert, WORK_LIST_CAPACITY, WorkList};
