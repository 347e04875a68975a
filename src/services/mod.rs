//! Service layer for business logic
//!
//! This module provides the lookup logic shared between the HTTP API
//! and the command-line interface.

pub mod geoip;

pub use geoip::{ClientCache, GeoLocation, GeoLookupService, LookupResult};
