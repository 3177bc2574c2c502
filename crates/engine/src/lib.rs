//! `tabletalk-engine` — Tabular data model.
//!
//! Pure model crate: typed cell values, columns with inferred semantic
//! types, and the immutable-after-build [`Dataset`]. No IO dependencies.

pub mod dataset;
pub mod infer;
pub mod value;

pub use dataset::{BuildError, Column, ColumnType, Dataset};
pub use infer::infer_type;
pub use value::Value;
