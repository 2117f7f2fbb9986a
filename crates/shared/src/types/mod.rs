//! Shared value types.

pub mod sum;

pub use sum::Sum;
