//! Table administration for GC policies
//!
//! Defines the interface used to apply a policy to a column family and read
//! it back, plus an in-memory implementation for development and tests.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::AdminError;
pub use memory::InMemoryAdmin;
pub use traits::{FamilyInfo, TableAdmin, TableInfo};
