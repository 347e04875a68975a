use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use tracing::trace;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub struct HealthService;

impl HealthService {
    // 存活检查，不触碰数据库
    pub async fn health_check() -> impl Responder {
        trace!("Received health check request");

        HttpResponse::Ok().json(HealthResponse { status: "ok" })
    }
}

/// Health 路由配置
pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
}
