//! Folio identity merging.
//!
//! Some authors have several accounts in the content store. A static merge
//! table, loaded once at startup, names one canonical account per group and
//! the aliases (`from`) and extra siblings (`include`) that belong to it.
//!
//! - [`MergeTable::canonicalize`] folds an alias onto its canonical id.
//! - [`MergeTable::related_ids`] returns the canonical id plus every sibling,
//!   for queries that must cover all of a merged author's content.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod error;
mod table;

pub use error::{MergeConfigError, MergeResult};
pub use table::{MergeGroup, MergeTable, RelatedIds};
