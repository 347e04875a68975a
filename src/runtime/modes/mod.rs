//! Mode routing
//!
//! This module provides unified entry points for the execution modes:
//! - Server mode (HTTP server)
//! - Fetch mode (database provisioning)
//! - Lookup mode (one-shot query)

pub mod fetch;
pub mod lookup;
pub mod server;

pub use fetch::run_fetch;
pub use lookup::run_lookup;
pub use server::run_server;
