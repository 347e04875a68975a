//! MaxMind DB 数据库实现
//!
//! 使用本地 `.mmdb` 文件进行 IP 地理位置查询，v4 / v6 各一个文件

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use maxminddb::Reader;
use serde::Deserialize;
use tracing::{debug, trace};

use super::cache::ClientLoader;
use super::provider::{GeoSearcher, RECORD_DELIMITER, route_query};
use crate::config::GeoIpConfig;
use crate::errors::{IpEchoError, Result};
use crate::utils::ip::AddressFamily;

/// 名称回退语言
const FALLBACK_LOCALE: &str = "en";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Place {
    iso_code: Option<String>,
    names: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Traits {
    isp: Option<String>,
    organization: Option<String>,
    autonomous_system_organization: Option<String>,
}

/// mmdb 记录中我们关心的字段
///
/// City 库、ISP 库以及自建库的字段并不一致，全部按可选处理
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GeoRecord {
    country: Place,
    registered_country: Place,
    subdivisions: Vec<Place>,
    city: Place,
    isp: Option<String>,
    organization: Option<String>,
    traits: Traits,
}

impl GeoRecord {
    /// 渲染为 `country|province|city|isp|iso2`，全部为空时返回空串
    fn render(&self, locale: &str) -> String {
        let country = if self.country.names.is_empty() {
            &self.registered_country
        } else {
            &self.country
        };

        let fields = [
            localized(&country.names, locale),
            self.subdivisions
                .first()
                .map(|s| localized(&s.names, locale))
                .unwrap_or_default(),
            localized(&self.city.names, locale),
            self.isp
                .as_deref()
                .or(self.traits.isp.as_deref())
                .or(self.organization.as_deref())
                .or(self.traits.organization.as_deref())
                .or(self.traits.autonomous_system_organization.as_deref())
                .unwrap_or_default()
                .to_string(),
            country.iso_code.clone().unwrap_or_default(),
        ];

        if fields.iter().all(|f| f.is_empty()) {
            return String::new();
        }

        fields.join(&RECORD_DELIMITER.to_string())
    }
}

fn localized(names: &BTreeMap<String, String>, locale: &str) -> String {
    names
        .get(locale)
        .or_else(|| names.get(FALLBACK_LOCALE))
        .cloned()
        .unwrap_or_default()
}

/// 单个 mmdb 文件的 searcher
pub struct MmdbSearcher {
    reader: Reader<Vec<u8>>,
    locale: String,
}

impl MmdbSearcher {
    /// 从内存中的数据库内容创建
    pub fn from_bytes(buf: Vec<u8>, locale: &str) -> Result<Self> {
        let reader = Reader::from_source(buf)
            .map_err(|e| IpEchoError::load(format!("invalid mmdb data: {}", e)))?;
        Ok(Self {
            reader,
            locale: locale.to_string(),
        })
    }

    /// 数据库元信息中的类型，如 `GeoLite2-City`
    pub fn database_type(&self) -> &str {
        &self.reader.metadata.database_type
    }
}

#[async_trait]
impl GeoSearcher for MmdbSearcher {
    async fn search(&self, address: &str) -> Result<String> {
        let ip_addr: IpAddr = address
            .parse()
            .map_err(|e| IpEchoError::query(format!("invalid address {}: {}", address, e)))?;

        let result = self
            .reader
            .lookup(ip_addr)
            .map_err(|e| IpEchoError::query(format!("lookup {} failed: {}", address, e)))?;
        let record: Option<GeoRecord> = result
            .decode()
            .map_err(|e| IpEchoError::query(format!("decode {} failed: {}", address, e)))?;

        let rendered = record
            .map(|r| r.render(&self.locale))
            .unwrap_or_default();
        trace!("mmdb lookup for {}: {:?}", address, rendered);

        Ok(rendered)
    }

    fn name(&self) -> &'static str {
        "MaxMind"
    }
}

/// 从数据目录加载 v4 + v6 数据库
pub struct MmdbLoader {
    data_dir: PathBuf,
    v4_file: String,
    v6_file: String,
    locale: String,
}

impl MmdbLoader {
    pub fn new(config: &GeoIpConfig) -> Self {
        Self {
            data_dir: PathBuf::from(&config.data_dir),
            v4_file: config.v4_file.clone(),
            v6_file: config.v6_file.clone(),
            locale: config.locale.clone(),
        }
    }

    /// 数据库文件路径
    pub fn path_for(&self, family: AddressFamily) -> PathBuf {
        match family {
            AddressFamily::V4 => self.data_dir.join(&self.v4_file),
            AddressFamily::V6 => self.data_dir.join(&self.v6_file),
        }
    }

    async fn read_database(path: &Path) -> Result<Vec<u8>> {
        tokio::fs::read(path)
            .await
            .map_err(|e| IpEchoError::load(format!("failed to read {}: {}", path.display(), e)))
    }
}

#[async_trait]
impl ClientLoader for MmdbLoader {
    /// 每次加载都会读取并校验两个文件，任一不可读或被拒绝即失败；
    /// 槽位只保留自己协议族的 reader
    async fn load(&self, family: AddressFamily) -> Result<Arc<dyn GeoSearcher>> {
        let v4_path = self.path_for(AddressFamily::V4);
        let v6_path = self.path_for(AddressFamily::V6);

        let v4_buf = Self::read_database(&v4_path).await?;
        let v6_buf = Self::read_database(&v6_path).await?;

        let v4 = MmdbSearcher::from_bytes(v4_buf, &self.locale)?;
        let v6 = MmdbSearcher::from_bytes(v6_buf, &self.locale)?;

        let path = route_query(family, &v4_path, &v6_path);
        let searcher = route_query(family, v4, v6);
        debug!(
            "Loaded mmdb for {} slot: {} ({})",
            family,
            path.display(),
            searcher.database_type()
        );

        Ok(Arc::new(searcher))
    }
}
