//! End-to-end lookups against the MaxMind DB files in `tests/fixtures`
//!
//! `ipdb_v4.mmdb` maps every IPv4 address to a Nanjing record (names in `en`
//! and `zh-CN`, ISP under `traits.isp`). `ipdb_v6.mmdb` maps the lower half of
//! the IPv6 space to a record with only `registered_country`, an English-only
//! country name and a top-level `isp`; the upper half has no data.

use std::sync::Arc;

use ipecho::config::GeoIpConfig;
use ipecho::services::geoip::ClientCache;
use ipecho::services::{GeoLocation, GeoLookupService};
use ipecho::utils::ip::AddressFamily;

fn fixture_service(locale: &str) -> GeoLookupService {
    let config = GeoIpConfig {
        data_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures").to_string(),
        locale: locale.to_string(),
        ..Default::default()
    };
    GeoLookupService::new(Arc::new(ClientCache::from_config(&config)))
}

fn location(country: &str, province: &str, city: &str, isp: &str, iso2: &str) -> GeoLocation {
    GeoLocation {
        country: country.to_string(),
        province: province.to_string(),
        city: city.to_string(),
        isp: isp.to_string(),
        iso2: iso2.to_string(),
    }
}

#[tokio::test]
async fn test_v4_lookup_english() {
    let service = fixture_service("en");

    let result = service.lookup(Some("1.2.3.4")).await.unwrap().unwrap();

    assert_eq!(result.address, "1.2.3.4");
    assert_eq!(result.family, AddressFamily::V4);
    assert_eq!(
        result.location,
        Some(location("China", "Jiangsu", "Nanjing", "China Telecom", "CN"))
    );
}

#[tokio::test]
async fn test_v4_lookup_chinese() {
    let service = fixture_service("zh-CN");

    let result = service.lookup(Some("1.2.3.4")).await.unwrap().unwrap();

    assert_eq!(
        result.location,
        Some(location("中国", "江苏省", "南京市", "China Telecom", "CN"))
    );
}

#[tokio::test]
async fn test_v6_lookup_english() {
    let service = fixture_service("en");

    let result = service.lookup(Some("2001:db8::1")).await.unwrap().unwrap();

    assert_eq!(result.family, AddressFamily::V6);
    assert_eq!(
        result.location,
        Some(location("United States", "", "Mountain View", "Example Networks", "US"))
    );
}

#[tokio::test]
async fn test_v6_lookup_chinese_falls_back_to_english_names() {
    let service = fixture_service("zh-CN");

    let result = service.lookup(Some("2001:db8::1")).await.unwrap().unwrap();

    assert_eq!(
        result.location,
        Some(location("United States", "", "山景城", "Example Networks", "US"))
    );
}

#[tokio::test]
async fn test_mapped_address_uses_v4_database() {
    let service = fixture_service("en");

    let result = service.lookup(Some("::FFFF:1.2.3.4")).await.unwrap().unwrap();

    assert_eq!(result.address, "1.2.3.4");
    assert_eq!(result.family, AddressFamily::V4);
    assert_eq!(result.location.unwrap().city, "Nanjing");
}

#[tokio::test]
async fn test_address_without_data_yields_empty_location() {
    let service = fixture_service("en");

    let result = service.lookup(Some("ffff::1")).await.unwrap().unwrap();

    assert_eq!(result.family, AddressFamily::V6);
    assert_eq!(result.location, Some(GeoLocation::default()));
}

#[tokio::test]
async fn test_slots_load_on_first_use() {
    let service = fixture_service("en");
    let cache = service.cache();
    assert!(cache.current(AddressFamily::V4).is_none());

    service.lookup(Some("8.8.8.8")).await.unwrap();

    assert!(cache.current(AddressFamily::V4).is_some());
    assert!(cache.current(AddressFamily::V6).is_none());
}
