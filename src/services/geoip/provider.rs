//! GeoIP 查询能力抽象层
//!
//! 缓存只认 `GeoSearcher` 这一种能力，不关心背后的实现；
//! 每个缓存槽位持有自己协议族的客户端（如 `MmdbSearcher`）

use async_trait::async_trait;

use crate::errors::Result;
use crate::utils::ip::AddressFamily;

/// 原始记录分隔符：`country|province|city|isp|iso2`
pub const RECORD_DELIMITER: char = '|';

/// GeoIP 原始查询 trait
#[async_trait]
pub trait GeoSearcher: Send + Sync {
    /// 查询已经校验、规范化的地址
    ///
    /// 返回 `|` 分隔的原始记录；无数据时返回空串（不是错误）。
    /// 仅在后端本身出错时返回 `Err`。
    async fn search(&self, address: &str) -> Result<String>;

    /// 获取 searcher 名称（用于日志）
    fn name(&self) -> &'static str;
}

/// 按协议族在一对候选中选出对应的一个
///
/// 既用于挑选客户端，也用于加载时挑选要保留的数据库
pub fn route_query<T>(family: AddressFamily, v4: T, v6: T) -> T {
    match family {
        AddressFamily::V4 => v4,
        AddressFamily::V6 => v6,
    }
}
