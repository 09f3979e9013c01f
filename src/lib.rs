//! Domain Availability - 按域名统计HTTP端点可用性
//!
//! 周期性地探测一组HTTP端点，按域名累计健康探测的占比：
//! - 状态码位于 `[200, 300)` 且延迟小于 500ms 视为健康
//! - 每轮结束输出各域名的可用性百分比
//! - 收到中断信号后输出最终状态并正常退出

pub mod cli;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod report;
pub mod signal;

// 重新导出主要类型
pub use config::{Config, EndpointSpec, GlobalConfig};
pub use error::AvailabilityError;
pub use health::{AggregatorLoop, AvailabilitySnapshot, AvailabilityTally, ProbeResult, Prober};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
