// Core types for the College Football Data adapter: endpoint contracts,
// typed query records and argument validation. No I/O happens here.

pub mod error;
pub mod queries;
pub mod types;

pub use error::{ValidationError, ValidationResult};
pub use queries::{all_endpoints, check_arguments, Endpoint};
pub use types::*;
