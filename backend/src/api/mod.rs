//! HTTP API module.
//!
//! The server, the `{status, messages}` response type and the log stream.

pub mod logs;
pub mod server;
pub mod types;

pub use logs::*;
pub use server::{router, start_server};
pub use types::*;
