//! Domain Availability 主程序入口
//!
//! 按域名统计HTTP端点可用性

use anyhow::{Context, Result};
use clap::Parser;
use domain_availability::cli::{command_for, Args, Commands};
use domain_availability::config::ConfigLoader;
use domain_availability::logging::{parse_level, LogConfig, LoggingSystem};
use log::LevelFilter;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_config = LogConfig {
        level: resolve_log_level(&args).await,
        file_path: args.log_file.clone(),
        json_format: args.json_logs,
        ..Default::default()
    };

    LoggingSystem::setup_logging(&log_config).context("初始化日志系统失败")?;

    info!("Domain Availability v{} 启动", domain_availability::VERSION);

    if let Err(e) = command_for(&args).execute(&args).await {
        error!("命令执行失败: {}", e);
        eprintln!("错误: {e}");
        std::process::exit(1);
    }

    Ok(())
}

/// 确定日志级别：命令行优先，其次是配置文件，最后是 info
async fn resolve_log_level(args: &Args) -> LevelFilter {
    if let Some(level) = args.log_level {
        return level.into();
    }

    if !matches!(args.command, Commands::Run { .. } | Commands::Check { .. }) {
        return LevelFilter::Info;
    }

    // 配置错误留给命令本身报告
    ConfigLoader::new(true)
        .load_from_file(args.get_config_path())
        .await
        .map(|config| parse_level(&config.global.log_level))
        .unwrap_or(LevelFilter::Info)
}
