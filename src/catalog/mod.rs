//! Course catalog preparation.
//!
//! Turns a flat section list into per-group option lists for the search:
//!
//! 1. [`index_sections`] validates sections and groups them by course.
//! 2. [`derive_constraints`] marks which companion roles each group needs.
//! 3. [`enumerate_selections`] lists every legal section combination.
//!
//! All three are pure functions over in-memory data. Groups are kept in
//! `BTreeMap`s so that every later stage iterates them in a stable order.

mod constraints;
mod index;
mod selection;

pub use constraints::derive_constraints;
pub use index::{index_sections, CatalogIndex};
pub use selection::{enumerate_selections, expected_selection_count};
