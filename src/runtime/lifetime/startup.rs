use std::sync::Arc;

use tracing::{info, warn};

use crate::config::GeoIpConfig;
use crate::services::{ClientCache, GeoLookupService};
use crate::utils::ip::AddressFamily;

/// 构建进程级的客户端缓存和查询服务
///
/// 缓存为空启动，首个请求触发加载
pub fn prepare_lookup_service(config: &GeoIpConfig) -> Arc<GeoLookupService> {
    let cache = Arc::new(ClientCache::from_config(config));
    info!(
        "GeoIP: databases at {}/{{{}, {}}}, client TTL {}s",
        config.data_dir,
        config.v4_file,
        config.v6_file,
        cache.ttl().num_seconds()
    );
    Arc::new(GeoLookupService::new(cache))
}

/// 预热两个槽位
///
/// 失败只记录警告：数据库可能稍后才通过 `fetch` 准备好，
/// 之后的每次请求都会重新尝试加载
pub async fn warm_up(service: &GeoLookupService) {
    for family in [AddressFamily::V4, AddressFamily::V6] {
        if let Err(e) = service.cache().get_client(family).await {
            warn!("GeoIP: warm-up for {} failed: {}", family, e);
        }
    }
}
