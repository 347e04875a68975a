//! Command-line interface definitions using clap
//!
//! This module defines the CLI structure for ipecho using clap's derive macros.

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_PATH;

/// ipecho - IP geolocation echo service
#[derive(Parser, Debug)]
#[command(name = "ipecho")]
#[command(version)]
#[command(about = "Resolve client IPs against offline geolocation databases", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(long, short = 'c', global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Download the v4 / v6 database files into the data directory
    Fetch,

    /// Look up a single address against the local databases
    Lookup {
        /// IPv4 or IPv6 address
        ip: String,
    },

    /// Print a sample configuration file
    Config,
}
