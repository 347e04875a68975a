use std::fmt;

#[derive(Debug, Clone)]
pub enum IpEchoError {
    /// 数据库文件缺失、不可读，或被 mmdb 解析器拒绝
    Load(String),
    /// 客户端已就绪但查询本身失败
    Query(String),
    Config(String),
    FileOperation(String),
    Download(String),
    Serialization(String),
}

impl IpEchoError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            IpEchoError::Load(_) => "E001",
            IpEchoError::Query(_) => "E002",
            IpEchoError::Config(_) => "E003",
            IpEchoError::FileOperation(_) => "E004",
            IpEchoError::Download(_) => "E005",
            IpEchoError::Serialization(_) => "E006",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            IpEchoError::Load(_) => "Database Load Error",
            IpEchoError::Query(_) => "Database Query Error",
            IpEchoError::Config(_) => "Configuration Error",
            IpEchoError::FileOperation(_) => "File Operation Error",
            IpEchoError::Download(_) => "Download Error",
            IpEchoError::Serialization(_) => "Serialization Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            IpEchoError::Load(msg) => msg,
            IpEchoError::Query(msg) => msg,
            IpEchoError::Config(msg) => msg,
            IpEchoError::FileOperation(msg) => msg,
            IpEchoError::Download(msg) => msg,
            IpEchoError::Serialization(msg) => msg,
        }
    }

    /// 后端故障（加载或查询失败），区别于"无数据"
    pub fn is_backend_failure(&self) -> bool {
        matches!(self, IpEchoError::Load(_) | IpEchoError::Query(_))
    }

    /// 格式化为彩色输出（用于终端）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for IpEchoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for IpEchoError {}

// 便捷的构造函数
impl IpEchoError {
    pub fn load<T: Into<String>>(msg: T) -> Self {
        IpEchoError::Load(msg.into())
    }

    pub fn query<T: Into<String>>(msg: T) -> Self {
        IpEchoError::Query(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        IpEchoError::Config(msg.into())
    }

    pub fn download<T: Into<String>>(msg: T) -> Self {
        IpEchoError::Download(msg.into())
    }
}

// maxminddb 的错误既可能出现在加载阶段也可能出现在查询阶段，
// 因此不提供 From 实现，由调用方显式映射
impl From<std::io::Error> for IpEchoError {
    fn from(err: std::io::Error) -> Self {
        IpEchoError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for IpEchoError {
    fn from(err: serde_json::Error) -> Self {
        IpEchoError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for IpEchoError {
    fn from(err: config::ConfigError) -> Self {
        IpEchoError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IpEchoError>;
