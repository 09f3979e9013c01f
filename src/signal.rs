//! 信号处理模块
//!
//! 把 SIGINT/SIGTERM（或 Ctrl+C）转换为广播的关闭信号，
//! 聚合循环通过 [`ShutdownSignal`] 轮询或等待该信号。

use crate::error::Result;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{error, info, warn};

#[cfg(unix)]
use signal_hook::consts::{SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook_tokio::Signals;

/// 第二次中断信号时的退出码（128 + SIGINT）
const FORCED_EXIT_CODE: i32 = 130;

/// 设置信号处理器，收到中断信号后向 `shutdown_tx` 广播
pub fn setup_signal_handlers(shutdown_tx: broadcast::Sender<()>) -> Result<()> {
    #[cfg(unix)]
    {
        setup_unix_signals(shutdown_tx)
    }
    #[cfg(not(unix))]
    {
        setup_ctrl_c(shutdown_tx);
        Ok(())
    }
}

/// Unix/Linux系统信号处理
///
/// 第一个信号触发优雅关闭，再次收到信号时立即退出进程
#[cfg(unix)]
fn setup_unix_signals(shutdown_tx: broadcast::Sender<()>) -> Result<()> {
    use futures::stream::StreamExt;

    let mut signals = Signals::new([SIGINT, SIGTERM])?;

    tokio::spawn(async move {
        let mut received = 0u32;
        while let Some(signal) = signals.next().await {
            let name = if signal == SIGINT { "SIGINT" } else { "SIGTERM" };
            received += 1;
            if received > 1 {
                warn!("再次接收到 {name} 信号，强制退出");
                std::process::exit(FORCED_EXIT_CODE);
            }
            info!("接收到 {name} 信号，开始优雅关闭...");
            if let Err(e) = shutdown_tx.send(()) {
                error!("发送关闭信号失败: {e}");
            }
        }
    });

    Ok(())
}

#[cfg(not(unix))]
fn setup_ctrl_c(shutdown_tx: broadcast::Sender<()>) {
    tokio::spawn(async move {
        let mut received = 0u32;
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("监听中断信号失败: {e}");
                return;
            }
            received += 1;
            if received > 1 {
                warn!("再次接收到 Ctrl+C，强制退出");
                std::process::exit(FORCED_EXIT_CODE);
            }
            info!("接收到 Ctrl+C，开始优雅关闭...");
            if let Err(e) = shutdown_tx.send(()) {
                error!("发送关闭信号失败: {e}");
            }
        }
    });
}

/// 关闭信号的接收端
///
/// 发送端全部释放后视为永远不会再收到信号
#[derive(Debug)]
pub struct ShutdownSignal {
    rx: broadcast::Receiver<()>,
    closed: bool,
    triggered: bool,
}

impl ShutdownSignal {
    pub fn new(rx: broadcast::Receiver<()>) -> Self {
        Self {
            rx,
            closed: false,
            triggered: false,
        }
    }

    /// 永远不会触发的信号，用于一次性检测
    pub fn never() -> Self {
        let (_tx, rx) = broadcast::channel(1);
        Self::new(rx)
    }

    /// 非阻塞地检查是否已收到关闭信号
    pub fn is_triggered(&mut self) -> bool {
        if self.triggered || self.closed {
            return self.triggered;
        }

        match self.rx.try_recv() {
            Ok(()) | Err(TryRecvError::Lagged(_)) => self.triggered = true,
            Err(TryRecvError::Closed) => self.closed = true,
            Err(TryRecvError::Empty) => {}
        }
        self.triggered
    }

    /// 等待关闭信号
    ///
    /// 发送端全部释放后永远不会返回，适合放在 `select!` 中与其他任务竞争
    pub async fn recv(&mut self) {
        if self.is_triggered() {
            return;
        }

        if !self.closed {
            match self.rx.recv().await {
                Ok(()) | Err(RecvError::Lagged(_)) => {
                    self.triggered = true;
                    return;
                }
                Err(RecvError::Closed) => self.closed = true,
            }
        }

        std::future::pending::<()>().await
    }

    /// 休眠指定时长，期间收到关闭信号则提前返回 `true`
    pub async fn sleep(&mut self, duration: Duration) -> bool {
        if self.is_triggered() {
            return true;
        }

        tokio::select! {
            _ = tokio::time::sleep(duration) => false,
            _ = self.recv() => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_is_triggered_after_send() {
        let (tx, rx) = broadcast::channel(1);
        let mut signal = ShutdownSignal::new(rx);

        assert!(!signal.is_triggered());
        tx.send(()).unwrap();
        assert!(signal.is_triggered());
        // 触发后保持触发状态
        assert!(signal.is_triggered());
    }

    #[tokio::test]
    async fn test_sleep_interrupted() {
        let (tx, rx) = broadcast::channel(1);
        let mut signal = ShutdownSignal::new(rx);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let _ = tx.send(());
        });

        let start = std::time::Instant::now();
        assert!(signal.sleep(Duration::from_secs(60)).await);
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_sleep_completes_without_signal() {
        let (_tx, rx) = broadcast::channel(1);
        let mut signal = ShutdownSignal::new(rx);

        assert!(!signal.sleep(Duration::from_millis(20)).await);
    }

    #[tokio::test]
    async fn test_closed_channel_never_triggers() {
        let mut signal = ShutdownSignal::never();

        assert!(!signal.is_triggered());
        let start = std::time::Instant::now();
        assert!(!signal.sleep(Duration::from_millis(30)).await);
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_recv_returns_after_send() {
        let (tx, rx) = broadcast::channel(1);
        let mut signal = ShutdownSignal::new(rx);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let _ = tx.send(());
        });

        tokio::time::timeout(Duration::from_secs(5), signal.recv())
            .await
            .expect("应在收到信号后返回");
        assert!(signal.is_triggered());
    }

    #[tokio::test]
    async fn test_recv_pending_when_closed() {
        let mut signal = ShutdownSignal::never();

        let waited = tokio::time::timeout(Duration::from_millis(30), signal.recv()).await;
        assert!(waited.is_err());
        assert!(!signal.is_triggered());
    }
}
