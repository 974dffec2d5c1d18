//! Document key model
//!
//! A document is addressed by `(table, id, sub_key)`:
//! - `table` selects the schema and the backing table
//! - `id` plus `sub_key` identify the document inside that table
//! - an empty sub-key is the same as no sub-key
//!
//! Table names are not checked against the schema registry here;
//! the document store does that before touching storage.

mod errors;
mod types;

pub use errors::{KeyError, KeyResult};
pub use types::DocumentKey;
