//! `tabletalk-query` — Query interpretation and aggregation engine.
//!
//! Pure engine crate: takes a built [`tabletalk_engine::Dataset`] and a
//! free-text question, returns a result descriptor (text, table or chart
//! spec). No CLI or IO dependencies. Errors never escape [`answer`];
//! every branch terminates in a well-formed descriptor.

pub mod chart;
pub mod conditions;
pub mod engine;
pub mod filter;
pub mod intent;
pub mod model;

pub use engine::{answer, preview};
pub use model::{Answer, ChartKind, CondValue, Condition, Intent, Operator, Payload, SeriesPoint};
