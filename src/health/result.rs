//! 探测结果数据结构
//!
//! 聚合只关心 `healthy`，其余字段用于日志和一次性检测报告

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 单次探测的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// 是否健康
    pub healthy: bool,
    /// 端点显示名称
    pub endpoint_name: String,
    /// 端点URL
    pub endpoint_url: String,
    /// 探测时间戳
    pub timestamp: DateTime<Utc>,
    /// 主请求返回的HTTP状态码
    pub status_code: Option<u16>,
    /// 延迟测量请求的耗时
    #[serde(with = "duration_ms_serde", default)]
    pub latency: Option<Duration>,
    /// 不健康的原因
    pub error_message: Option<String>,
}

impl ProbeResult {
    /// 创建新的探测结果，默认不健康
    pub fn new(endpoint_name: String, endpoint_url: String) -> Self {
        Self {
            healthy: false,
            endpoint_name,
            endpoint_url,
            timestamp: Utc::now(),
            status_code: None,
            latency: None,
            error_message: None,
        }
    }

    /// 设置健康标记
    pub fn with_healthy(mut self, healthy: bool) -> Self {
        self.healthy = healthy;
        self
    }

    /// 设置HTTP状态码
    pub fn with_status_code(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// 设置延迟
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// 设置错误信息
    pub fn with_error(mut self, error_message: String) -> Self {
        self.error_message = Some(error_message);
        self
    }

    /// 延迟（毫秒）
    pub fn latency_ms(&self) -> Option<u64> {
        self.latency.map(|latency| latency.as_millis() as u64)
    }

    /// 转换为JSON字符串
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

mod duration_ms_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration
            .map(|d| d.as_millis() as u64)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Option::<u64>::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}
