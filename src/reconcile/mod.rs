//! Reconciliation lifecycle: state machine, posting, and projections

pub mod core;
pub mod reports;

pub use core::*;
pub use reports::*;
