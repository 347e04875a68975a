//! Server mode
//!
//! This module contains the HTTP server startup logic.

use actix_web::{App, HttpServer, middleware::DefaultHeaders, web};
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::services::{SourceInfo, health_routes, ip_routes};
use crate::config::StaticConfig;
use crate::runtime::lifetime::startup;

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function.
/// actix-web handles Ctrl+C / SIGTERM and drains in-flight requests.
pub async fn run_server(config: &StaticConfig) -> Result<()> {
    let lookup_service = startup::prepare_lookup_service(&config.geoip);
    startup::warm_up(&lookup_service).await;

    let source = SourceInfo::from_config(&config.geoip);

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    info!("Using {} CPU cores for the server", cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(lookup_service.clone()))
            .app_data(web::Data::new(source.clone()))
            .wrap(DefaultHeaders::new().add(("Cache-Control", "no-cache, no-store, must-revalidate")))
            .service(health_routes())
            .service(ip_routes())
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .workers(cpu_count)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?;

    warn!("Starting server at http://{}", bind_address);
    server.run().await.context("HTTP server error")?;
    info!("Server stopped");

    Ok(())
}
