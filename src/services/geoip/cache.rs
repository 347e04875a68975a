//! 数据库客户端缓存
//!
//! 每个协议族一个槽位，互不影响：
//!
//! ```text
//! Empty ──> Loading ──> Fresh ──(age > ttl)──> Stale ──> Loading
//! ```
//!
//! - 读路径无锁（`ArcSwapOption`）
//! - 同一协议族的加载经由异步互斥串行化（singleflight），
//!   等待者拿到锁后会重新检查槽位，直接复用刚加载好的条目
//! - 加载失败时槽位保持原状，旧的（可能已过期的）客户端不会被清除
//! - 失败原样返回给调用方，由调用方决定是否记录

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Mutex;
use tracing::{info, trace};

use super::maxmind::MmdbLoader;
use super::provider::GeoSearcher;
use crate::config::GeoIpConfig;
use crate::errors::Result;
use crate::utils::ip::AddressFamily;

/// 时间源，测试中可注入固定时间
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 系统时钟
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 客户端加载器
#[async_trait]
pub trait ClientLoader: Send + Sync {
    /// 为指定协议族构建一个可查询的客户端
    async fn load(&self, family: AddressFamily) -> Result<Arc<dyn GeoSearcher>>;
}

/// 缓存条目，构造后不可变；刷新时整体替换
pub struct CacheEntry {
    pub client: Arc<dyn GeoSearcher>,
    pub loaded_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(client: Arc<dyn GeoSearcher>, loaded_at: DateTime<Utc>) -> Self {
        Self { client, loaded_at }
    }
}

impl std::fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheEntry")
            .field("client", &self.client.name())
            .field("loaded_at", &self.loaded_at)
            .finish()
    }
}

#[derive(Default)]
struct CacheSlot {
    entry: ArcSwapOption<CacheEntry>,
    load_lock: Mutex<()>,
}

/// 按协议族缓存数据库客户端
///
/// 进程内只应有一个实例（服务启动时创建，随进程退出回收）；
/// 测试可自由创建互相隔离的实例。
pub struct ClientCache {
    ttl: TimeDelta,
    loader: Arc<dyn ClientLoader>,
    clock: Arc<dyn Clock>,
    v4: CacheSlot,
    v6: CacheSlot,
}

impl ClientCache {
    /// 使用系统时钟创建
    pub fn new(loader: Arc<dyn ClientLoader>, ttl: Duration) -> Self {
        Self::with_clock(loader, Arc::new(SystemClock), ttl)
    }

    pub fn with_clock(loader: Arc<dyn ClientLoader>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            loader,
            clock,
            v4: CacheSlot::default(),
            v6: CacheSlot::default(),
        }
    }

    /// 根据 GeoIpConfig 创建基于 mmdb 文件的缓存
    pub fn from_config(config: &GeoIpConfig) -> Self {
        Self::new(
            Arc::new(MmdbLoader::new(config)),
            Duration::from_secs(config.cache_ttl_secs),
        )
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    fn slot(&self, family: AddressFamily) -> &CacheSlot {
        match family {
            AddressFamily::V4 => &self.v4,
            AddressFamily::V6 => &self.v6,
        }
    }

    /// 条目年龄严格大于 TTL 才算过期
    pub fn is_expired(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now - entry.loaded_at > self.ttl
    }

    /// 调用加载器构建新客户端，不触碰槽位
    pub async fn load_client(&self, family: AddressFamily) -> Result<Arc<dyn GeoSearcher>> {
        self.loader.load(family).await
    }

    /// 未过期则原样返回（无 I/O），否则加载并以 `now` 打上时间戳
    pub async fn refresh(
        &self,
        family: AddressFamily,
        current: Option<Arc<CacheEntry>>,
        now: DateTime<Utc>,
    ) -> Result<Arc<CacheEntry>> {
        if let Some(entry) = current
            && !self.is_expired(&entry, now)
        {
            return Ok(entry);
        }

        let client = self.load_client(family).await?;
        Ok(Arc::new(CacheEntry::new(client, now)))
    }

    /// 获取指定协议族的可用客户端
    ///
    /// 读取槽位 → refresh → 写回槽位。加载失败时槽位保持不变。
    pub async fn get_client(&self, family: AddressFamily) -> Result<Arc<dyn GeoSearcher>> {
        let slot = self.slot(family);

        if let Some(entry) = slot.entry.load_full()
            && !self.is_expired(&entry, self.clock.now())
        {
            trace!("GeoIP client cache hit for {}", family);
            return Ok(entry.client.clone());
        }

        let _guard = slot.load_lock.lock().await;

        // 等锁期间其他请求可能已经完成加载
        let current = slot.entry.load_full();
        let entry = self.refresh(family, current.clone(), self.clock.now()).await?;

        let reused = current
            .as_ref()
            .is_some_and(|existing| Arc::ptr_eq(existing, &entry));
        if !reused {
            info!(
                "GeoIP client for {} {} at {}",
                family,
                if current.is_some() { "reloaded" } else { "loaded" },
                entry.loaded_at
            );
            slot.entry.store(Some(entry.clone()));
        }

        Ok(entry.client.clone())
    }

    /// 当前槽位中的条目（可能已过期）
    pub fn current(&self, family: AddressFamily) -> Option<Arc<CacheEntry>> {
        self.slot(family).entry.load_full()
    }

    /// 直接写入槽位，用于预热或测试注入
    pub fn prime(&self, family: AddressFamily, entry: Arc<CacheEntry>) {
        self.slot(family).entry.store(Some(entry));
    }
}
