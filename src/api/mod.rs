//! Pivot API Server module
//!
//! Serves the upload form and the report endpoints.
//! Run with `pivot-server`.

pub mod handlers;
pub mod server;

pub use server::{build_router, run_api_server};
