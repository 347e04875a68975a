pub mod health;
pub mod ip;

pub use health::{HealthService, health_routes};
pub use ip::{IpService, SourceInfo, ip_routes};
