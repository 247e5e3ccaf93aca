//! Utility modules

pub mod memory_directory;
pub mod memory_store;
pub mod validation;

pub use memory_directory::*;
pub use memory_store::*;
pub use validation::*;
