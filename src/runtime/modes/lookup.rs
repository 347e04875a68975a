//! Lookup mode
//!
//! One-shot lookup against the local database files, printed as JSON.

use anyhow::{Result, bail};

use crate::config::StaticConfig;
use crate::runtime::lifetime::startup;

pub async fn run_lookup(config: &StaticConfig, ip: &str) -> Result<()> {
    let service = startup::prepare_lookup_service(&config.geoip);

    match service.lookup(Some(ip)).await? {
        Some(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        None => bail!("invalid ip: {}", ip),
    }
}
