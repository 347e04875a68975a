//! IP 地址处理工具
//!
//! 纯函数，无状态：
//! - 规范化（去除空白、IPv4-mapped IPv6 还原为 IPv4）
//! - 协议族判定（v4 / v6）
//! - 从代理请求头中提取候选客户端 IP

use std::net::{IpAddr, Ipv4Addr};

use actix_web::HttpRequest;
use actix_web::http::header::HeaderMap;
use serde_repr::Serialize_repr;

/// IPv4-mapped IPv6 前缀
const IPV4_MAPPED_PREFIX: &str = "::ffff:";

/// 地址协议族，序列化为 4 / 6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr)]
#[repr(u8)]
pub enum AddressFamily {
    V4 = 4,
    V6 = 6,
}

impl AddressFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V4 => "v4",
            Self::V6 => "v6",
        }
    }
}

impl std::fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 经过校验的地址，只能通过 [`parse`] 构造
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAddress {
    value: String,
    family: AddressFamily,
}

impl ParsedAddress {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn family(&self) -> AddressFamily {
        self.family
    }

    pub fn into_value(self) -> String {
        self.value
    }
}

/// 规范化地址字符串
///
/// 去除首尾空白；`::ffff:a.b.c.d` 形式（前缀不区分大小写）的 IPv4-mapped
/// 地址还原为内嵌的 IPv4。前缀后不是点分 IPv4 的地址（如 `::ffff:102:304`）
/// 保持原样。不做其他改写。
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    let split = IPV4_MAPPED_PREFIX.len();

    if let (Some(prefix), Some(embedded)) = (trimmed.get(..split), trimmed.get(split..))
        && prefix.eq_ignore_ascii_case(IPV4_MAPPED_PREFIX)
        && embedded.parse::<Ipv4Addr>().is_ok()
    {
        return embedded.to_string();
    }

    trimmed.to_string()
}

/// 判定规范化后的地址属于哪个协议族，非法字面量返回 None
pub fn classify(normalized: &str) -> Option<AddressFamily> {
    match normalized.parse::<IpAddr>().ok()? {
        IpAddr::V4(_) => Some(AddressFamily::V4),
        IpAddr::V6(_) => Some(AddressFamily::V6),
    }
}

/// 解析不可信输入
///
/// 缺失、空串或非法地址均返回 None，从不报错
pub fn parse(raw: Option<&str>) -> Option<ParsedAddress> {
    let raw = raw.filter(|s| !s.is_empty())?;
    let value = normalize(raw);
    let family = classify(&value)?;

    Some(ParsedAddress { value, family })
}

/// 从请求头提取候选客户端 IP
///
/// 优先 X-Forwarded-For（取第一个，即原始客户端 IP），其次 X-Real-IP。
/// 不做任何校验，结果交给 [`parse`]。
pub fn extract_candidate(headers: &HeaderMap) -> Option<String> {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|h| h.to_str().ok())
            .filter(|s| !s.is_empty())
    };

    if let Some(forwarded) = header_value("x-forwarded-for") {
        return forwarded.split(',').next().map(|s| s.trim().to_string());
    }

    header_value("x-real-ip").map(|s| s.trim().to_string())
}

/// 从 HttpRequest 提取客户端 IP
///
/// 没有代理头时回退到连接对端地址
pub fn extract_client_ip(req: &HttpRequest) -> Option<String> {
    extract_candidate(req.headers()).or_else(|| {
        req.connection_info()
            .peer_addr()
            .map(|addr| addr.to_string())
    })
}
