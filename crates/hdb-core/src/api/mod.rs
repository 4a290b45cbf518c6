//! HarperDB operations API
//!
//! Every request is a POST of `{ "operation": <name>, ...params }` to the
//! instance URL with basic authentication.

mod client;
pub mod components;
pub mod logs;
mod params;

pub use client::{ApiClient, Operations, operation_body};
pub use params::parse_operation_params;
