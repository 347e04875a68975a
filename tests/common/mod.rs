//! Shared fakes for integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};

use ipecho::errors::{IpEchoError, Result};
use ipecho::services::geoip::{ClientCache, ClientLoader, Clock, GeoSearcher};
use ipecho::utils::ip::AddressFamily;

pub const TTL: Duration = Duration::from_secs(60 * 60);

/// Searcher that always answers with the same record
pub struct StaticSearcher {
    pub record: String,
}

impl StaticSearcher {
    pub fn new(record: &str) -> Self {
        Self {
            record: record.to_string(),
        }
    }
}

#[async_trait]
impl GeoSearcher for StaticSearcher {
    async fn search(&self, _address: &str) -> Result<String> {
        Ok(self.record.clone())
    }

    fn name(&self) -> &'static str {
        "Static"
    }
}

/// Searcher whose backend is broken
pub struct BrokenSearcher;

#[async_trait]
impl GeoSearcher for BrokenSearcher {
    async fn search(&self, address: &str) -> Result<String> {
        Err(IpEchoError::query(format!("corrupt index while searching {}", address)))
    }

    fn name(&self) -> &'static str {
        "Broken"
    }
}

/// Searcher that fails outside the database backend
pub struct MisconfiguredSearcher;

#[async_trait]
impl GeoSearcher for MisconfiguredSearcher {
    async fn search(&self, _address: &str) -> Result<String> {
        Err(IpEchoError::config("locale table missing"))
    }

    fn name(&self) -> &'static str {
        "Misconfigured"
    }
}

/// Loader that hands out a fixed searcher and counts calls
pub struct FakeLoader {
    searcher: Arc<dyn GeoSearcher>,
    delay: Option<Duration>,
    fail: bool,
    pub calls: AtomicUsize,
}

impl FakeLoader {
    pub fn returning(searcher: Arc<dyn GeoSearcher>) -> Self {
        Self {
            searcher,
            delay: None,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn slow(searcher: Arc<dyn GeoSearcher>, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::returning(searcher)
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::returning(Arc::new(StaticSearcher::new("")))
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClientLoader for FakeLoader {
    async fn load(&self, _family: AddressFamily) -> Result<Arc<dyn GeoSearcher>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(IpEchoError::load("ipdb_v4.mmdb: No such file or directory"));
        }
        Ok(self.searcher.clone())
    }
}

/// Clock that only moves when told to
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()),
        }
    }

    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap();
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub fn cache_with(loader: Arc<FakeLoader>, clock: Arc<ManualClock>) -> Arc<ClientCache> {
    Arc::new(ClientCache::with_clock(loader, clock, TTL))
}
