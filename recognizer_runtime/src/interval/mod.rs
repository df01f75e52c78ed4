//! Closed integer intervals and disjoint interval sets.

pub mod closed;
pub mod error;
pub mod set;

pub use closed::Interval;
pub use error::IntervalSetError;
pub use set::IntervalSet;
