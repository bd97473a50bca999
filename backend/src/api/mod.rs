//! HTTP API module.
//!
//! This module provides the HTTP server, response types and the log
//! broadcaster shared with the rest of the pipeline.

pub mod logs;
pub mod server;
pub mod types;

pub use logs::*;
pub use server::{router, serve, start_server};
pub use types::*;
