//! 报告模块
//!
//! 把可用性快照输出到控制台

pub mod sink;

// 重新导出主要类型
pub use sink::{ConsoleSink, ReportFormat, SnapshotSink, SHUTDOWN_MESSAGE};
