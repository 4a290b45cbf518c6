//! Error types for hdb
//!
//! Every fallible operation in the workspace returns [`HdbResult`]. The
//! variants map one-to-one onto the failure taxonomy the CLI reports:
//! lookup misses, corrupt configuration, validation failures, transport
//! failures and the operator cancelling a prompt.

mod constructors;
mod conversions;
mod types;
mod unified_error;

pub use types::{HdbError, HdbResult, UnifiedError};
pub use unified_error::{EXIT_CANCELLED, EXIT_FAILURE, EXIT_INTERRUPTED};
