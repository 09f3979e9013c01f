//! 端点探测器
//!
//! 对单个端点发起请求并判定健康状态。健康的条件是：
//! 主请求状态码位于 `[200, 300)`，并且延迟严格小于 0.5 秒。
//!
//! 延迟并不取自主请求，而是向同一URL再发一次不带请求头和请求体的 `GET`，
//! 只对这第二次请求计时。所以每次探测固定产生两次请求，
//! 状态码和延迟来自两次独立的往返。

use crate::config::EndpointSpec;
use crate::error::TransportError;
use crate::health::result::ProbeResult;
use crate::health::transport::{Transport, TransportRequest};
use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// 健康状态码范围，左闭右开
pub const HEALTHY_STATUS_RANGE: Range<u16> = 200..300;

/// 延迟上限（不含）
pub const LATENCY_THRESHOLD: Duration = Duration::from_millis(500);

/// 判断状态码和延迟是否满足健康条件
///
/// 延迟缺失（测量请求失败）时一律视为不健康
pub fn is_healthy(status_code: u16, latency: Option<Duration>) -> bool {
    HEALTHY_STATUS_RANGE.contains(&status_code)
        && latency.is_some_and(|latency| latency < LATENCY_THRESHOLD)
}

/// 端点探测器
#[derive(Clone)]
pub struct Prober {
    /// HTTP传输
    transport: Arc<dyn Transport>,
}

impl Prober {
    /// 创建新的探测器
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// 探测单个端点
    ///
    /// 传输层错误只记录日志并转换为不健康的结果，不会返回给调用方
    pub async fn probe(&self, spec: &EndpointSpec) -> ProbeResult {
        let result = ProbeResult::new(spec.display_name().to_string(), spec.url.clone());

        let response = match self
            .transport
            .send(TransportRequest {
                method: &spec.method,
                url: &spec.url,
                headers: &spec.headers,
                body: spec.body_bytes(),
            })
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to connect to {}: {}", spec.url, e);
                return result.with_error(e.to_string());
            }
        };

        let status_code = response.status_code;
        let result = result.with_status_code(status_code);

        let latency = match self.measure_latency(&spec.url).await {
            Ok(latency) => latency,
            Err(e) => {
                error!("延迟测量失败 {}: {}", spec.url, e);
                return result.with_error(format!("Latency unavailable: {e}"));
            }
        };

        let result = result.with_latency(latency);
        let healthy = is_healthy(status_code, Some(latency));

        debug!(
            endpoint = %spec.display_name(),
            status_code,
            latency_ms = latency.as_millis() as u64,
            healthy,
            "探测完成"
        );

        if healthy {
            return result.with_healthy(true);
        }

        let reason = describe_failure(status_code, latency);
        warn!("端点 {} 不健康: {}", spec.display_name(), reason);
        result.with_error(reason)
    }

    /// 向同一URL发送一次不带请求头和请求体的GET，返回其耗时
    async fn measure_latency(&self, url: &str) -> std::result::Result<Duration, TransportError> {
        let headers = HashMap::new();
        let response = self
            .transport
            .send(TransportRequest {
                method: "GET",
                url,
                headers: &headers,
                body: None,
            })
            .await?;

        Ok(response.latency)
    }
}

fn describe_failure(status_code: u16, latency: Duration) -> String {
    let mut reasons = Vec::new();

    if !HEALTHY_STATUS_RANGE.contains(&status_code) {
        let reason = reqwest::StatusCode::from_u16(status_code)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown");
        reasons.push(format!("HTTP {status_code} {reason}"));
    }

    if latency >= LATENCY_THRESHOLD {
        reasons.push(format!(
            "latency {}ms >= {}ms",
            latency.as_millis(),
            LATENCY_THRESHOLD.as_millis()
        ));
    }

    reasons.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::testing::{response, ScriptedTransport};

    fn prober_with(transport: ScriptedTransport) -> (Prober, Arc<ScriptedTransport>) {
        let transport = Arc::new(transport);
        (Prober::new(transport.clone()), transport)
    }

    #[test]
    fn test_is_healthy_boundaries() {
        let fast = Some(Duration::from_millis(100));

        assert!(is_healthy(200, fast));
        assert!(is_healthy(299, fast));
        assert!(!is_healthy(199, fast));
        assert!(!is_healthy(300, fast));

        assert!(is_healthy(200, Some(Duration::from_millis(499))));
        assert!(!is_healthy(200, Some(LATENCY_THRESHOLD)));
        assert!(!is_healthy(200, None));
    }

    #[tokio::test]
    async fn test_ok_and_fast_is_healthy() {
        let (prober, _) = prober_with(ScriptedTransport::fixed(200, Duration::from_millis(100)));

        let result = prober.probe(&EndpointSpec::new("https://api.example.com/ok")).await;

        assert!(result.healthy);
        assert_eq!(result.status_code, Some(200));
        assert_eq!(result.latency_ms(), Some(100));
        assert!(result.error_message.is_none());
    }

    #[tokio::test]
    async fn test_not_found_is_unhealthy() {
        let (prober, _) = prober_with(ScriptedTransport::fixed(404, Duration::from_millis(100)));

        let result = prober.probe(&EndpointSpec::new("https://api.example.com/missing")).await;

        assert!(!result.healthy);
        assert_eq!(result.status_code, Some(404));
        assert!(result.error_message.unwrap().contains("HTTP 404"));
    }

    #[tokio::test]
    async fn test_slow_response_is_unhealthy() {
        let (prober, _) = prober_with(ScriptedTransport::fixed(200, Duration::from_millis(800)));

        let result = prober.probe(&EndpointSpec::new("https://api.example.com/slow")).await;

        assert!(!result.healthy);
        assert!(result.error_message.unwrap().contains("latency 800ms"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_unhealthy() {
        let (prober, transport) = prober_with(ScriptedTransport::new(|_, _| {
            Err(TransportError::Connect("Connection refused".to_string()))
        }));

        let result = prober.probe(&EndpointSpec::new("http://127.0.0.1:9/")).await;

        assert!(!result.healthy);
        assert!(result.status_code.is_none());
        assert!(result.error_message.unwrap().contains("Connection refused"));
        // 主请求失败时不再发起延迟测量
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_latency_request_failure_is_unhealthy() {
        let (prober, _) = prober_with(ScriptedTransport::new(|method, _| {
            if method == "POST" {
                Ok(response(200, Duration::from_millis(10)))
            } else {
                Err(TransportError::Timeout)
            }
        }));

        let spec = EndpointSpec::new("https://api.example.com/submit").with_method("POST");
        let result = prober.probe(&spec).await;

        assert!(!result.healthy);
        assert_eq!(result.status_code, Some(200));
        assert!(result.latency.is_none());
        assert!(result.error_message.unwrap().contains("Latency unavailable"));
    }

    #[tokio::test]
    async fn test_probe_issues_two_requests() {
        let (prober, transport) =
            prober_with(ScriptedTransport::fixed(201, Duration::from_millis(50)));

        let spec = EndpointSpec::new("https://api.example.com/items")
            .with_method("POST")
            .with_header("Authorization", "Bearer token")
            .with_body(r#"{"name":"probe"}"#);
        let result = prober.probe(&spec).await;
        assert!(result.healthy);

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);

        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].header_count, 1);
        assert_eq!(requests[0].body.as_deref(), Some(br#"{"name":"probe"}"#.as_slice()));

        // 延迟测量请求忽略原始的方法、请求头和请求体
        assert_eq!(requests[1].method, "GET");
        assert_eq!(requests[1].url, "https://api.example.com/items");
        assert_eq!(requests[1].header_count, 0);
        assert!(requests[1].body.is_none());
    }

    #[tokio::test]
    async fn test_latency_comes_from_second_request() {
        // 主请求很慢但状态码正常，测量请求很快：按第二次请求的耗时判定
        let (prober, _) = prober_with(ScriptedTransport::new(|method, _| {
            if method == "PUT" {
                Ok(response(200, Duration::from_secs(3)))
            } else {
                Ok(response(200, Duration::from_millis(20)))
            }
        }));

        let spec = EndpointSpec::new("https://api.example.com/put").with_method("PUT");
        let result = prober.probe(&spec).await;

        assert!(result.healthy);
        assert_eq!(result.latency_ms(), Some(20));
    }
}
