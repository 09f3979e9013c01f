//! 配置数据结构定义
//!
//! 定义应用程序的配置结构体和验证逻辑

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// 支持的HTTP方法
pub const VALID_METHODS: [&str; 7] = ["GET", "POST", "PUT", "DELETE", "HEAD", "OPTIONS", "PATCH"];

/// 主配置结构，包含全局配置和端点列表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 全局配置项
    #[serde(default)]
    pub global: GlobalConfig,
    /// 端点配置列表（顺序即每轮探测顺序）
    #[serde(default)]
    pub endpoints: Vec<EndpointSpec>,
}

/// 全局配置结构
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlobalConfig {
    /// 每轮探测之间的间隔（秒）
    #[serde(default = "default_check_interval")]
    pub check_interval_seconds: u64,
    /// 请求超时时间（秒），不设置则不限制
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            check_interval_seconds: default_check_interval(),
            request_timeout_seconds: None,
            log_level: default_log_level(),
        }
    }
}

impl GlobalConfig {
    /// 轮次间隔
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_seconds)
    }

    /// 请求超时
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_seconds.map(Duration::from_secs)
    }
}

/// 单个端点的探测配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointSpec {
    /// 端点URL
    pub url: String,
    /// HTTP方法
    #[serde(default = "default_method")]
    pub method: String,
    /// 请求体，原样发送
    #[serde(default)]
    pub body: Option<String>,
    /// 显示名称
    #[serde(default)]
    pub name: Option<String>,
    /// 请求头
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl EndpointSpec {
    /// 以默认方法（GET）创建端点
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: default_method(),
            body: None,
            name: None,
            headers: HashMap::new(),
        }
    }

    /// 设置HTTP方法
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// 添加请求头
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// 设置请求体
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// 设置显示名称
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// 显示名称，未配置时使用URL
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.url)
    }

    /// 请求体字节
    pub fn body_bytes(&self) -> Option<&[u8]> {
        self.body.as_deref().map(str::as_bytes)
    }
}

// 默认值函数
fn default_check_interval() -> u64 {
    15
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_method() -> String {
    "GET".to_string()
}

/// 配置验证函数
///
/// # 参数
/// * `config` - 要验证的配置
///
/// # 返回
/// * `Result<(), String>` - 验证结果，错误时返回错误信息
pub fn validate_config(config: &Config) -> Result<(), String> {
    if config.global.check_interval_seconds == 0 {
        return Err("检测间隔不能为0".to_string());
    }

    if config.global.request_timeout_seconds == Some(0) {
        return Err("请求超时时间不能为0".to_string());
    }

    let valid_log_levels = ["debug", "info", "warn", "error"];
    if !valid_log_levels.contains(&config.global.log_level.as_str()) {
        return Err(format!(
            "无效的日志级别: {}，支持的级别: {:?}",
            config.global.log_level, valid_log_levels
        ));
    }

    if config.endpoints.is_empty() {
        return Err("至少需要配置一个端点".to_string());
    }

    for endpoint in &config.endpoints {
        if !endpoint.url.starts_with("http://") && !endpoint.url.starts_with("https://") {
            return Err(format!("端点 {} 的URL格式无效", endpoint.display_name()));
        }

        let method = endpoint.method.to_uppercase();
        if !VALID_METHODS.contains(&method.as_str()) {
            return Err(format!(
                "端点 {} 的HTTP方法 {} 无效，支持的方法: {:?}",
                endpoint.display_name(),
                endpoint.method,
                VALID_METHODS
            ));
        }
    }

    Ok(())
}
