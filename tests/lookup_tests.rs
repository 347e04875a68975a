//! Lookup orchestration tests
//!
//! Drive `GeoLookupService` end to end against fake loaders and searchers.

mod common;

use std::sync::Arc;

use ipecho::errors::IpEchoError;
use ipecho::services::geoip::GeoSearcher;
use ipecho::services::{GeoLocation, GeoLookupService, LookupResult};
use ipecho::utils::ip::AddressFamily;

use common::{BrokenSearcher, FakeLoader, ManualClock, StaticSearcher, cache_with};

fn service_with(searcher: Arc<dyn GeoSearcher>) -> (GeoLookupService, Arc<FakeLoader>) {
    let loader = Arc::new(FakeLoader::returning(searcher));
    let cache = cache_with(loader.clone(), Arc::new(ManualClock::new()));
    (GeoLookupService::new(cache), loader)
}

#[tokio::test]
async fn test_lookup_maps_full_record() {
    let (service, _) = service_with(Arc::new(StaticSearcher::new("中国|江苏省|南京市|电信|CN")));

    let result = service.lookup(Some("1.2.3.4")).await.unwrap();

    assert_eq!(
        result,
        Some(LookupResult {
            address: "1.2.3.4".to_string(),
            family: AddressFamily::V4,
            location: Some(GeoLocation {
                country: "中国".to_string(),
                province: "江苏省".to_string(),
                city: "南京市".to_string(),
                isp: "电信".to_string(),
                iso2: "CN".to_string(),
            }),
        })
    );
}

#[tokio::test]
async fn test_lookup_invalid_input_is_none() {
    let (service, loader) = service_with(Arc::new(StaticSearcher::new("US")));

    assert_eq!(service.lookup(Some("not-an-ip")).await.unwrap(), None);
    assert_eq!(service.lookup(Some("")).await.unwrap(), None);
    assert_eq!(service.lookup(None).await.unwrap(), None);
    // 非法输入不应触发数据库加载
    assert_eq!(loader.calls(), 0);
}

#[tokio::test]
async fn test_lookup_normalizes_mapped_address() {
    let (service, _) = service_with(Arc::new(StaticSearcher::new("US|CA")));

    let result = service.lookup(Some(" ::ffff:8.8.8.8 ")).await.unwrap().unwrap();

    assert_eq!(result.address, "8.8.8.8");
    assert_eq!(result.family, AddressFamily::V4);
    assert_eq!(result.location.unwrap().province, "CA");
}

#[tokio::test]
async fn test_lookup_ipv6_uses_v6_slot() {
    let (service, loader) = service_with(Arc::new(StaticSearcher::new("")));

    let result = service.lookup(Some("2001:db8::1")).await.unwrap().unwrap();

    assert_eq!(result.family, AddressFamily::V6);
    assert!(service.cache().current(AddressFamily::V6).is_some());
    assert!(service.cache().current(AddressFamily::V4).is_none());
    assert_eq!(loader.calls(), 1);
}

#[tokio::test]
async fn test_lookup_empty_record_is_not_an_error() {
    let (service, _) = service_with(Arc::new(StaticSearcher::new("")));

    let result = service.lookup(Some("10.0.0.1")).await.unwrap().unwrap();

    assert_eq!(result.location, Some(GeoLocation::default()));
}

#[tokio::test]
async fn test_lookup_propagates_query_error() {
    let (service, _) = service_with(Arc::new(BrokenSearcher));

    let err = service.lookup(Some("1.2.3.4")).await.unwrap_err();

    assert!(matches!(err, IpEchoError::Query(_)));
    assert!(err.is_backend_failure());
}

#[tokio::test]
async fn test_lookup_propagates_load_error() {
    let loader = Arc::new(FakeLoader::failing());
    let service = GeoLookupService::new(cache_with(loader.clone(), Arc::new(ManualClock::new())));

    let err = service.lookup(Some("1.2.3.4")).await.unwrap_err();
    assert!(matches!(err, IpEchoError::Load(_)));

    // 每次调用都是一次重试
    let _ = service.lookup(Some("1.2.3.4")).await;
    assert_eq!(loader.calls(), 2);
}
