//! Fetch mode
//!
//! 下载 v4 / v6 数据库文件到数据目录

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use tracing::info;
use ureq::Agent;

use crate::config::GeoIpConfig;
use crate::errors::{IpEchoError, Result};
use crate::utils::ip::AddressFamily;

/// 单个文件的下载超时
const HTTP_TIMEOUT_SECS: u64 = 300;
/// 下载体积上限（ureq 默认只允许 10MB）
const MAX_DOWNLOAD_BYTES: u64 = 512 * 1024 * 1024;

/// 全局 HTTP Agent（ureq 的 Agent 是 Send + Sync）
static HTTP_AGENT: OnceLock<Agent> = OnceLock::new();

fn get_agent() -> &'static Agent {
    HTTP_AGENT.get_or_init(|| {
        Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(HTTP_TIMEOUT_SECS)))
            .build()
            .into()
    })
}

/// 一个待下载的数据库文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTarget {
    pub family: AddressFamily,
    pub url: String,
    pub path: PathBuf,
}

/// 根据配置解析下载目标，任一地址未配置即报错
pub fn fetch_targets(config: &GeoIpConfig) -> Result<Vec<FetchTarget>> {
    let data_dir = Path::new(&config.data_dir);

    [
        (AddressFamily::V4, &config.v4_url, &config.v4_file),
        (AddressFamily::V6, &config.v6_url, &config.v6_file),
    ]
    .into_iter()
    .map(|(family, url, file)| {
        if url.trim().is_empty() {
            return Err(IpEchoError::config(format!(
                "no download url configured for {} (set geoip.{}_url)",
                family, family
            )));
        }
        Ok(FetchTarget {
            family,
            url: url.trim().to_string(),
            path: data_dir.join(file),
        })
    })
    .collect()
}

/// 同步下载（在 spawn_blocking 中调用）
fn download_sync(url: &str) -> Result<Vec<u8>> {
    let resp = get_agent()
        .get(url)
        .call()
        .map_err(|e| IpEchoError::download(format!("request to {} failed: {}", url, e)))?;

    let mut body = resp.into_body();
    body.with_config()
        .limit(MAX_DOWNLOAD_BYTES)
        .read_to_vec()
        .map_err(|e| IpEchoError::download(format!("reading body from {} failed: {}", url, e)))
}

async fn download(url: String) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || download_sync(&url))
        .await
        .map_err(|e| IpEchoError::download(format!("download task failed: {}", e)))?
}

/// 下载全部目标，空响应视为失败
pub async fn fetch_databases(config: &GeoIpConfig) -> Result<Vec<FetchTarget>> {
    let targets = fetch_targets(config)?;
    tokio::fs::create_dir_all(&config.data_dir).await?;

    for target in &targets {
        let buffer = download(target.url.clone()).await?;
        if buffer.is_empty() {
            return Err(IpEchoError::download(format!(
                "empty download for {}",
                target.family
            )));
        }

        tokio::fs::write(&target.path, &buffer).await?;
        info!(
            "Downloaded {} database ({} bytes) to {}",
            target.family,
            buffer.len(),
            target.path.display()
        );
    }

    Ok(targets)
}

pub async fn run_fetch(config: &GeoIpConfig) -> anyhow::Result<()> {
    let targets = fetch_databases(config).await?;
    info!("Fetched {} database files into {}", targets.len(), config.data_dir);
    Ok(())
}
