//! GeoIP 服务模块
//!
//! 提供 IP 地址地理位置查询功能：
//! - 按协议族缓存、定期刷新的数据库客户端
//! - 本地 MaxMind DB（v4 / v6 各一个文件）
//! - 查询编排与结果映射

mod cache;
mod lookup;
mod maxmind;
mod provider;

pub use cache::{CacheEntry, ClientCache, ClientLoader, Clock, SystemClock};
pub use lookup::{GeoLocation, GeoLookupService, LookupResult, parse_region};
pub use maxmind::{MmdbLoader, MmdbSearcher};
pub use provider::{GeoSearcher, RECORD_DELIMITER, route_query};
