use serde::{Deserialize, Serialize};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - server: 服务器地址、端口、CPU 数量
/// - geoip: 数据库目录、文件名、客户端缓存 TTL、下载地址
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub geoip: GeoIpConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从指定 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：IPECHO，分隔符：__
    /// 示例：IPECHO__SERVER__PORT=9999
    ///
    /// 日志系统此时尚未初始化，因此使用 eprintln 输出
    pub fn load_from(path: &str) -> Self {
        match Self::try_load_from(path) {
            Ok(config) => {
                if std::path::Path::new(path).exists() {
                    eprintln!("[INFO] Configuration loaded from: {}", path);
                }
                config
            }
            Err(e) => {
                eprintln!("[ERROR] Failed to load config: {}", e);
                Self::default()
            }
        }
    }

    /// 同 `load_from`，但将错误返回给调用方
    pub fn try_load_from(path: &str) -> Result<Self, config::ConfigError> {
        use config::{Config, Environment, File};

        Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖，前缀 IPECHO，分隔符 __
            .add_source(
                Environment::with_prefix("IPECHO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<StaticConfig>()
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// GeoIP 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoIpConfig {
    /// 数据库目录（相对路径基于当前工作目录）
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_v4_file")]
    pub v4_file: String,
    #[serde(default = "default_v6_file")]
    pub v6_file: String,
    /// 客户端缓存有效期（秒），过期后下一次查询会重新加载数据库
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// 名称语言，缺失时回退到英文
    #[serde(default = "default_locale")]
    pub locale: String,
    /// `fetch` 命令的下载地址，留空表示未配置
    #[serde(default)]
    pub v4_url: String,
    #[serde(default)]
    pub v6_url: String,
    /// API 响应中回显的数据来源
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "default_attribution")]
    pub attribution: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_file")]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    3000
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_v4_file() -> String {
    "ipdb_v4.mmdb".to_string()
}

fn default_v6_file() -> String {
    "ipdb_v6.mmdb".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    60 * 60
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_source() -> String {
    "mmdb".to_string()
}

fn default_attribution() -> String {
    "IP geolocation data provided by the configured MaxMind DB files.".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_file() -> Option<String> {
    None
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for GeoIpConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            v4_file: default_v4_file(),
            v6_file: default_v6_file(),
            cache_ttl_secs: default_cache_ttl_secs(),
            locale: default_locale(),
            v4_url: String::new(),
            v6_url: String::new(),
            source: default_source(),
            attribution: default_attribution(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: default_log_file(),
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}
