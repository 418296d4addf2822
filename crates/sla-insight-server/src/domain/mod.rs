//! Canonical enumerations for customers and tickets.
//!
//! Storage keeps these as text: ingestion must be able to persist
//! out-of-vocabulary values (e.g. an unrepaired priority) verbatim.

pub mod customer;
pub mod ticket;

pub use customer::{Plan, Region};
pub use ticket::{Category, Channel, Priority};
