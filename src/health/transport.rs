//! HTTP传输层
//!
//! 探测器只依赖 [`Transport`] trait：发送一次请求，返回状态码、响应体和耗时，
//! 或者一个传输错误。默认实现基于 reqwest。

use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// 一次HTTP请求的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP状态码
    pub status_code: u16,
    /// 响应体
    pub body: Vec<u8>,
    /// 从发送请求到读完响应体的耗时
    pub latency: Duration,
}

/// 一次HTTP请求的描述
#[derive(Debug, Clone, Copy)]
pub struct TransportRequest<'a> {
    pub method: &'a str,
    pub url: &'a str,
    pub headers: &'a HashMap<String, String>,
    pub body: Option<&'a [u8]>,
}

/// HTTP传输trait
#[async_trait]
pub trait Transport: Send + Sync {
    /// 发送一次请求
    ///
    /// # 返回
    /// * `Result<TransportResponse, TransportError>` - 响应或传输错误
    async fn send(
        &self,
        request: TransportRequest<'_>,
    ) -> std::result::Result<TransportResponse, TransportError>;
}

/// 基于reqwest的传输实现
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    /// HTTP客户端
    client: Client,
}

impl ReqwestTransport {
    /// 创建新的传输实例
    ///
    /// # 参数
    /// * `timeout` - 单次请求超时，`None` 表示不限制
    pub fn new(timeout: Option<Duration>) -> std::result::Result<Self, TransportError> {
        let mut builder =
            Client::builder().user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION));

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build()?;

        Ok(Self { client })
    }

    fn build_headers(
        headers: &HashMap<String, String>,
    ) -> std::result::Result<HeaderMap, TransportError> {
        let mut header_map = HeaderMap::with_capacity(headers.len());
        for (key, value) in headers {
            let name = HeaderName::from_str(key)
                .map_err(|_| TransportError::InvalidHeader(key.clone()))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| TransportError::InvalidHeader(key.clone()))?;
            header_map.insert(name, value);
        }
        Ok(header_map)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: TransportRequest<'_>,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let method = Method::from_str(&request.method.to_uppercase())
            .map_err(|_| TransportError::InvalidMethod(request.method.to_string()))?;

        let mut builder = self
            .client
            .request(method, request.url)
            .headers(Self::build_headers(request.headers)?);

        if let Some(body) = request.body {
            builder = builder.body(body.to_vec());
        }

        let start_time = Instant::now();
        let response = builder.send().await?;
        let status_code = response.status().as_u16();
        let body = response.bytes().await?;
        let latency = start_time.elapsed();

        Ok(TransportResponse {
            status_code,
            body: body.to_vec(),
            latency,
        })
    }
}
