use std::sync::Arc;
use std::time::Instant;

use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::Serialize;
use tracing::{debug, error};

use crate::config::GeoIpConfig;
use crate::services::{GeoLocation, GeoLookupService};
use crate::utils::ip::{AddressFamily, extract_client_ip};

/// 响应中回显的数据来源信息
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub source: String,
    pub attribution: String,
}

impl SourceInfo {
    pub fn from_config(config: &GeoIpConfig) -> Self {
        Self {
            source: config.source.clone(),
            attribution: config.attribution.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IpLookupResponse<'a> {
    pub ip: String,
    pub version: AddressFamily,
    pub location: Option<GeoLocation>,
    pub latency_ms: u64,
    pub source: &'a str,
    pub attribution: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IpErrorResponse<'a> {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    pub source: &'a str,
    pub attribution: &'a str,
    pub latency_ms: u64,
}

pub struct IpService;

impl IpService {
    /// 查询请求方 IP 的地理位置
    ///
    /// - 非法地址：400
    /// - 数据库加载 / 查询失败：503
    /// - 其他错误：500
    pub async fn lookup_ip(
        req: HttpRequest,
        lookup: web::Data<Arc<GeoLookupService>>,
        source: web::Data<SourceInfo>,
    ) -> impl Responder {
        let started = Instant::now();
        let raw_ip = extract_client_ip(&req);
        let result = lookup.lookup(raw_ip.as_deref()).await;
        let latency_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(Some(result)) => HttpResponse::Ok().json(IpLookupResponse {
                ip: result.address,
                version: result.family,
                location: result.location,
                latency_ms,
                source: &source.source,
                attribution: &source.attribution,
            }),
            Ok(None) => {
                debug!("Invalid client ip: {:?}", raw_ip);
                HttpResponse::BadRequest().json(IpErrorResponse {
                    error: "invalid ip".to_string(),
                    ip: raw_ip,
                    source: &source.source,
                    attribution: &source.attribution,
                    latency_ms,
                })
            }
            Err(e) => {
                error!("IP lookup failed: {}", e);
                let mut response = if e.is_backend_failure() {
                    HttpResponse::ServiceUnavailable()
                } else {
                    HttpResponse::InternalServerError()
                };
                response.json(IpErrorResponse {
                    error: e.error_type().to_string(),
                    ip: None,
                    source: &source.source,
                    attribution: &source.attribution,
                    latency_ms,
                })
            }
        }
    }
}

/// IP 查询路由配置
pub fn ip_routes() -> actix_web::Scope {
    web::scope("/api").route("/ip", web::get().to(IpService::lookup_ip))
}
