//! 可用性聚合循环
//!
//! 按配置顺序逐个探测端点，把结果计入所属域名，每轮结束输出快照，
//! 然后休眠一个间隔再开始下一轮，直到收到关闭信号。
//!
//! 关闭信号在每次探测之前检查，并在探测和休眠期间等待。
//! 探测进行中收到信号时该请求被放弃，不计入统计。

use crate::config::EndpointSpec;
use crate::health::prober::Prober;
use crate::health::result::ProbeResult;
use crate::health::tally::{AvailabilitySnapshot, AvailabilityTally};
use crate::report::SnapshotSink;
use crate::signal::ShutdownSignal;
use std::time::Duration;
use tracing::{debug, error, info};

/// 默认轮次间隔
pub const DEFAULT_ROUND_INTERVAL: Duration = Duration::from_secs(15);

/// 循环状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// 正在重复执行轮次
    Running,
    /// 已收到关闭信号，终态
    Stopped,
}

/// 一轮探测的结果
#[derive(Debug, Clone, Default)]
pub struct RoundReport {
    /// 本轮已完成的探测，按端点顺序
    pub results: Vec<ProbeResult>,
    /// 是否因关闭信号提前结束
    pub interrupted: bool,
}

impl RoundReport {
    pub fn healthy_count(&self) -> usize {
        self.results.iter().filter(|result| result.healthy).count()
    }
}

/// 可用性聚合循环
pub struct AggregatorLoop {
    prober: Prober,
    endpoints: Vec<EndpointSpec>,
    interval: Duration,
    tally: AvailabilityTally,
    state: LoopState,
    rounds_completed: u64,
}

impl AggregatorLoop {
    /// 创建新的聚合循环
    ///
    /// # 参数
    /// * `prober` - 端点探测器
    /// * `endpoints` - 端点列表，顺序即探测顺序
    /// * `interval` - 两轮之间的休眠时长
    pub fn new(prober: Prober, endpoints: Vec<EndpointSpec>, interval: Duration) -> Self {
        Self {
            prober,
            endpoints,
            interval,
            tally: AvailabilityTally::new(),
            state: LoopState::Running,
            rounds_completed: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn tally(&self) -> &AvailabilityTally {
        &self.tally
    }

    pub fn rounds_completed(&self) -> u64 {
        self.rounds_completed
    }

    /// 当前快照
    pub fn snapshot(&self) -> AvailabilitySnapshot {
        self.tally.snapshot()
    }

    /// 执行一轮探测
    ///
    /// 每次探测前检查关闭信号，探测期间收到信号则放弃该探测；
    /// 已计入的结果不会回滚
    pub async fn run_round(&mut self, shutdown: &mut ShutdownSignal) -> RoundReport {
        let mut report = RoundReport {
            results: Vec::with_capacity(self.endpoints.len()),
            interrupted: false,
        };

        for endpoint in &self.endpoints {
            if shutdown.is_triggered() {
                info!(
                    "第 {} 轮在 {}/{} 个端点后被中断",
                    self.rounds_completed + 1,
                    report.results.len(),
                    self.endpoints.len()
                );
                report.interrupted = true;
                return report;
            }

            // 收到信号时放弃进行中的请求，该探测不计入
            let result = tokio::select! {
                biased;
                result = self.prober.probe(endpoint) => result,
                _ = shutdown.recv() => {
                    info!(
                        "第 {} 轮在探测 {} 时被中断",
                        self.rounds_completed + 1,
                        endpoint.url
                    );
                    report.interrupted = true;
                    return report;
                }
            };
            self.tally.record(&endpoint.url, result.healthy);
            report.results.push(result);
        }

        self.rounds_completed += 1;
        debug!(
            "第 {} 轮完成: {}/{} 个端点健康",
            self.rounds_completed,
            report.healthy_count(),
            report.results.len()
        );

        report
    }

    /// 运行直到收到关闭信号
    ///
    /// 停止时把最终计数交给 `sink.shutdown`，并返回计数器
    pub async fn run(
        mut self,
        sink: &mut dyn SnapshotSink,
        mut shutdown: ShutdownSignal,
    ) -> AvailabilityTally {
        info!(
            "开始可用性监控: {} 个端点，间隔 {:?}",
            self.endpoints.len(),
            self.interval
        );

        while self.state == LoopState::Running {
            let report = self.run_round(&mut shutdown).await;
            if report.interrupted {
                self.state = LoopState::Stopped;
                break;
            }

            if let Err(e) = sink.emit(&self.tally.snapshot()) {
                error!("输出可用性快照失败: {e}");
            }

            if shutdown.sleep(self.interval).await {
                self.state = LoopState::Stopped;
            }
        }

        info!("可用性监控已停止，共完成 {} 轮", self.rounds_completed);

        if let Err(e) = sink.shutdown(&self.tally.snapshot()) {
            error!("输出最终状态失败: {e}");
        }

        self.tally
    }
}
