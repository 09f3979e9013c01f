//! 测试用的脚本化传输、挂起传输和快照消费者

use crate::error::TransportError;
use crate::health::tally::AvailabilitySnapshot;
use crate::health::transport::{Transport, TransportRequest, TransportResponse};
use crate::report::SnapshotSink;
use async_trait::async_trait;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::broadcast;

/// 记录下来的一次请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub header_count: usize,
    pub body: Option<Vec<u8>>,
}

type Responder =
    dyn Fn(&str, &str) -> std::result::Result<TransportResponse, TransportError> + Send + Sync;

/// 根据 (method, url) 计算响应的传输实现，并记录所有请求
pub struct ScriptedTransport {
    responder: Box<Responder>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str, &str) -> std::result::Result<TransportResponse, TransportError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 所有请求都返回同一个状态码和延迟
    pub fn fixed(status_code: u16, latency: Duration) -> Self {
        Self::new(move |_, _| Ok(response(status_code, latency)))
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        request: TransportRequest<'_>,
    ) -> std::result::Result<TransportResponse, TransportError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method: request.method.to_string(),
            url: request.url.to_string(),
            header_count: request.headers.len(),
            body: request.body.map(<[u8]>::to_vec),
        });
        (self.responder)(request.method, request.url)
    }
}

/// URL 包含指定片段的请求永不返回，其余请求返回 200
pub struct HangingTransport {
    hang_on: String,
    hung: AtomicUsize,
}

impl HangingTransport {
    pub fn new(hang_on: &str) -> Self {
        Self {
            hang_on: hang_on.to_string(),
            hung: AtomicUsize::new(0),
        }
    }

    /// 已挂起的请求数
    pub fn hung_requests(&self) -> usize {
        self.hung.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for HangingTransport {
    async fn send(
        &self,
        request: TransportRequest<'_>,
    ) -> std::result::Result<TransportResponse, TransportError> {
        if request.url.contains(&self.hang_on) {
            self.hung.fetch_add(1, Ordering::SeqCst);
            std::future::pending::<()>().await;
        }
        Ok(response(200, Duration::from_millis(10)))
    }
}

pub fn response(status_code: u16, latency: Duration) -> TransportResponse {
    TransportResponse {
        status_code,
        body: Vec::new(),
        latency,
    }
}

/// 记录所有快照的消费者，可在第 N 次输出后发送关闭信号
#[derive(Default)]
pub struct RecordingSink {
    emitted: Vec<AvailabilitySnapshot>,
    final_snapshot: Option<AvailabilitySnapshot>,
    stop_after: Option<(usize, broadcast::Sender<()>)>,
}

impl RecordingSink {
    pub fn stop_after(rounds: usize, shutdown_tx: broadcast::Sender<()>) -> Self {
        Self {
            stop_after: Some((rounds, shutdown_tx)),
            ..Default::default()
        }
    }

    pub fn emitted(&self) -> &[AvailabilitySnapshot] {
        &self.emitted
    }

    pub fn final_snapshot(&self) -> Option<AvailabilitySnapshot> {
        self.final_snapshot.clone()
    }
}

impl SnapshotSink for RecordingSink {
    fn emit(&mut self, snapshot: &AvailabilitySnapshot) -> io::Result<()> {
        self.emitted.push(snapshot.clone());
        if let Some((rounds, shutdown_tx)) = &self.stop_after {
            if self.emitted.len() >= *rounds {
                let _ = shutdown_tx.send(());
            }
        }
        Ok(())
    }

    fn shutdown(&mut self, snapshot: &AvailabilitySnapshot) -> io::Result<()> {
        self.final_snapshot = Some(snapshot.clone());
        Ok(())
    }
}
