//! 健康探测模块
//!
//! 提供端点探测、按域名的可用性计数和轮次调度

pub mod prober;
pub mod result;
pub mod scheduler;
pub mod tally;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

// 重新导出主要类型
pub use prober::{is_healthy, Prober, HEALTHY_STATUS_RANGE, LATENCY_THRESHOLD};
pub use result::ProbeResult;
pub use scheduler::{AggregatorLoop, LoopState, RoundReport, DEFAULT_ROUND_INTERVAL};
pub use tally::{domain_of, AvailabilitySnapshot, AvailabilityTally, DomainAvailability, DomainCounters};
pub use transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};
