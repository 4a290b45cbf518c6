//! Command handlers
//!
//! Each handler receives the shared [`Session`](crate::router::Session);
//! the ones that talk to an instance also get the resolved target.

pub mod api;
pub mod components;
pub mod config;
pub mod external;
pub mod init;
pub mod logs;
