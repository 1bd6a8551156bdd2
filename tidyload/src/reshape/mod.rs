//! Reshaping and aggregation over tidy tables.
//!
//! - `melt`: wide-to-long pivot
//! - `aggregate`: group-sum and substring/equality row subsets
//!
//! All functions take a table by reference and return a new one.

pub mod aggregate;
pub mod melt;

pub use aggregate::{exclude_contains, filter_contains, filter_equals, group_sum};
pub use melt::{melt, melt_with, MeltSpec, DEFAULT_AXIS_NAME, DEFAULT_VALUE_NAME};
