//! ipecho - An IP geolocation echo service
//!
//! This library resolves client addresses to structured location records
//! using offline MaxMind DB files, keeping the database handles warm in a
//! per-address-family cache that refreshes on a fixed TTL.
//!
//! # Architecture
//! - `utils::ip`: Address normalization, classification and header extraction
//! - `services::geoip`: Client cache, dual-stack routing and lookup orchestration
//! - `api`: HTTP handlers (`/health`, `/api/ip`)
//! - `config`: Configuration management
//! - `runtime`: Execution modes (server, fetch, lookup)
//! - `system`: Logging

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod system;
pub mod utils;
