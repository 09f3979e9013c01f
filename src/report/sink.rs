//! 快照输出
//!
//! 聚合循环每轮结束时把快照交给 [`SnapshotSink`]，停止时再调用一次 `shutdown`

use crate::health::tally::AvailabilitySnapshot;
use clap::ValueEnum;
use std::io::{self, Write};

/// 关闭时输出的提示
pub const SHUTDOWN_MESSAGE: &str = "Exiting program...";

/// 快照消费者trait
pub trait SnapshotSink: Send {
    /// 输出一轮结束时的快照
    fn emit(&mut self, snapshot: &AvailabilitySnapshot) -> io::Result<()>;

    /// 循环停止时输出最终状态
    fn shutdown(&mut self, snapshot: &AvailabilitySnapshot) -> io::Result<()>;
}

/// 报告格式
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// 每个域名一行文本
    #[default]
    Text,
    /// 每轮一行JSON
    Json,
}

/// 写入任意输出流的快照消费者，默认是标准输出
pub struct ConsoleSink<W: Write + Send> {
    writer: W,
    format: ReportFormat,
}

impl ConsoleSink<io::Stdout> {
    /// 输出到标准输出
    pub fn stdout(format: ReportFormat) -> Self {
        Self::new(io::stdout(), format)
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(writer: W, format: ReportFormat) -> Self {
        Self { writer, format }
    }

    /// 取回底层输出流
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> SnapshotSink for ConsoleSink<W> {
    fn emit(&mut self, snapshot: &AvailabilitySnapshot) -> io::Result<()> {
        match self.format {
            ReportFormat::Text => {
                for line in snapshot.render_lines() {
                    writeln!(self.writer, "{line}")?;
                }
                writeln!(self.writer)?;
            }
            ReportFormat::Json => {
                serde_json::to_writer(&mut self.writer, snapshot)?;
                writeln!(self.writer)?;
            }
        }
        self.writer.flush()
    }

    fn shutdown(&mut self, snapshot: &AvailabilitySnapshot) -> io::Result<()> {
        match self.format {
            ReportFormat::Text => {
                for entry in &snapshot.domains {
                    writeln!(
                        self.writer,
                        "{}: {}/{} successful",
                        entry.domain, entry.counters.successful, entry.counters.total
                    )?;
                }
                writeln!(self.writer, "{SHUTDOWN_MESSAGE}")?;
            }
            // JSON 模式下最后一行仍是 JSON 对象
            ReportFormat::Json => {
                let summary = serde_json::json!({
                    "event": "shutdown",
                    "message": SHUTDOWN_MESSAGE,
                    "domains": snapshot.domains,
                });
                serde_json::to_writer(&mut self.writer, &summary)?;
                writeln!(self.writer)?;
            }
        }
        self.writer.flush()
    }
}
