//! HTTP layer
//!
//! Thin handlers that call into the lookup service and format JSON.

pub mod services;
