//! Utility modules

pub mod memory_source;
pub mod money;
pub mod validation;

pub use memory_source::*;
pub use money::*;
pub use validation::*;
