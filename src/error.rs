//! 错误处理模块
//!
//! 定义应用程序的统一错误类型

use thiserror::Error;

/// Domain Availability 应用程序的主要错误类型
#[derive(Error, Debug)]
pub enum AvailabilityError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 传输层错误
    #[error("传输错误: {0}")]
    Transport(#[from] TransportError),

    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON序列化/反序列化错误
    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置文件解析错误
    #[error("配置文件解析失败: {0}")]
    ParseError(String),

    /// 配置验证错误
    #[error("配置验证失败: {0}")]
    ValidationError(String),

    /// 配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 环境变量替换错误
    #[error("环境变量替换失败: {var}")]
    EnvVarError { var: String },
}

/// 传输层错误类型
///
/// 探测器在边界处把它转换为不健康的结果，不会继续向上传播
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// 请求超时
    #[error("Request timeout")]
    Timeout,

    /// 连接失败（拒绝连接、DNS解析失败等）
    #[error("Connection failed: {0}")]
    Connect(String),

    /// 请求构建或发送失败
    #[error("Request failed: {0}")]
    Request(String),

    /// 读取响应体失败
    #[error("Response body error: {0}")]
    Body(String),

    /// 无效的HTTP方法
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// 无效的请求头
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TransportError::Timeout
        } else if error.is_connect() {
            TransportError::Connect(error.to_string())
        } else if error.is_body() || error.is_decode() {
            TransportError::Body(error.to_string())
        } else {
            TransportError::Request(error.to_string())
        }
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, AvailabilityError>;
