//! IP 查询编排
//!
//! 校验/规范化 → 取对应协议族的缓存客户端 → 原始查询 → 映射为结构化位置

use std::sync::Arc;

use serde::Serialize;
use tracing::trace;

use super::cache::ClientCache;
use super::provider::RECORD_DELIMITER;
use crate::errors::Result;
use crate::utils::ip::{self, AddressFamily};

/// 地理位置信息，缺失字段为空串
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeoLocation {
    pub country: String,
    pub province: String,
    pub city: String,
    pub isp: String,
    pub iso2: String,
}

/// 查询结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupResult {
    #[serde(rename = "ip")]
    pub address: String,
    #[serde(rename = "version")]
    pub family: AddressFamily,
    pub location: Option<GeoLocation>,
}

/// 将原始记录按位置拆分为五个字段
///
/// 缺失的尾部字段为空串，多余字段忽略；空记录得到全空的 GeoLocation
pub fn parse_region(record: &str) -> GeoLocation {
    let mut fields = record.split(RECORD_DELIMITER).map(str::to_string);
    let mut next = || fields.next().unwrap_or_default();

    GeoLocation {
        country: next(),
        province: next(),
        city: next(),
        isp: next(),
        iso2: next(),
    }
}

/// IP 查询服务
#[derive(Clone)]
pub struct GeoLookupService {
    cache: Arc<ClientCache>,
}

impl GeoLookupService {
    pub fn new(cache: Arc<ClientCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<ClientCache> {
        &self.cache
    }

    /// 查询原始地址
    ///
    /// - 地址缺失或非法：`Ok(None)`，不是错误
    /// - 加载或查询失败：`Err`
    /// - 查询成功但无数据：字段全空的 location
    pub async fn lookup(&self, raw: Option<&str>) -> Result<Option<LookupResult>> {
        let Some(parsed) = ip::parse(raw) else {
            trace!("Rejected lookup input: {:?}", raw);
            return Ok(None);
        };

        let family = parsed.family();
        let client = self.cache.get_client(family).await?;
        let record = client.search(parsed.value()).await?;
        trace!(
            "Raw record for {} via {}: {:?}",
            parsed.value(),
            client.name(),
            record
        );

        Ok(Some(LookupResult {
            address: parsed.into_value(),
            family,
            location: Some(parse_region(&record)),
        }))
    }
}
