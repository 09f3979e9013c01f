//! 命令处理逻辑
//!
//! 实现各种CLI命令的处理逻辑

use crate::cli::args::{Args, Commands};
use crate::config::{validate_config, Config, ConfigFormat, ConfigLoader};
use crate::error::{ConfigError, Result};
use crate::health::{AggregatorLoop, ProbeResult, Prober, ReqwestTransport, RoundReport};
use crate::report::{ConsoleSink, ReportFormat};
use crate::signal::{setup_signal_handlers, ShutdownSignal};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

/// 示例配置模板
const CONFIG_TEMPLATE: &str = include_str!("../../templates/endpoints.toml");
const YAML_CONFIG_TEMPLATE: &str = include_str!("../../templates/endpoints.yaml");

/// 命令处理器trait
#[async_trait]
pub trait Command: Send + Sync {
    /// 执行命令
    async fn execute(&self, args: &Args) -> Result<()>;
}

/// 根据子命令选择处理器
pub fn command_for(args: &Args) -> Box<dyn Command> {
    match args.command {
        Commands::Run { .. } => Box::new(RunCommand),
        Commands::Check { .. } => Box::new(CheckCommand),
        Commands::Validate { .. } => Box::new(ValidateCommand),
        Commands::Init { .. } => Box::new(InitCommand),
        Commands::Version { .. } => Box::new(VersionCommand),
    }
}

/// 加载配置并应用命令行覆盖
///
/// # 参数
/// * `config_path` - 配置文件路径
/// * `interval` - 覆盖轮次间隔（秒）
/// * `timeout` - 覆盖请求超时（秒）
pub async fn load_config(
    config_path: &Path,
    interval: Option<u64>,
    timeout: Option<u64>,
) -> Result<Config> {
    let loader = ConfigLoader::new(true);
    let mut config = loader.load_from_file(config_path).await?;

    if let Some(interval) = interval {
        config.global.check_interval_seconds = interval;
    }
    if let Some(timeout) = timeout {
        config.global.request_timeout_seconds = Some(timeout);
    }

    if interval.is_some() || timeout.is_some() {
        validate_config(&config).map_err(ConfigError::ValidationError)?;
    }

    Ok(config)
}

fn build_prober(config: &Config) -> Result<Prober> {
    let transport = ReqwestTransport::new(config.global.request_timeout())?;
    Ok(Prober::new(Arc::new(transport)))
}

/// 持续监控命令
pub struct RunCommand;

#[async_trait]
impl Command for RunCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Run {
            interval,
            timeout,
            format,
        } = &args.command
        {
            let config = load_config(&args.get_config_path(), *interval, *timeout).await?;
            let prober = build_prober(&config)?;

            let (shutdown_tx, shutdown_rx) = broadcast::channel(4);
            setup_signal_handlers(shutdown_tx)?;

            let aggregator = AggregatorLoop::new(
                prober,
                config.endpoints,
                config.global.check_interval(),
            );
            let mut sink = ConsoleSink::stdout(*format);

            aggregator
                .run(&mut sink, ShutdownSignal::new(shutdown_rx))
                .await;

            info!("程序正常退出");
        }
        Ok(())
    }
}

/// 一次性检测命令
pub struct CheckCommand;

#[async_trait]
impl Command for CheckCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Check { timeout, format } = &args.command {
            let config = load_config(&args.get_config_path(), None, *timeout).await?;
            let prober = build_prober(&config)?;
            let interval = config.global.check_interval();

            let mut aggregator = AggregatorLoop::new(prober, config.endpoints, interval);
            let report = aggregator.run_round(&mut ShutdownSignal::never()).await;

            match format {
                ReportFormat::Json => {
                    let output = serde_json::json!({
                        "results": report.results,
                        "availability": aggregator.snapshot(),
                    });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                ReportFormat::Text => {
                    self.print_text_results(&report);
                    for line in aggregator.snapshot().render_lines() {
                        println!("{line}");
                    }
                }
            }
        }
        Ok(())
    }
}

impl CheckCommand {
    /// 打印文本格式结果
    fn print_text_results(&self, report: &RoundReport) {
        for result in &report.results {
            println!("{}", Self::format_result(result));
            if let Some(error) = &result.error_message {
                println!("  错误: {error}");
            }
        }
        println!();
    }

    fn format_result(result: &ProbeResult) -> String {
        let status_icon = if result.healthy { "✓" } else { "✗" };
        let status_code = result
            .status_code
            .map(|code| code.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let latency = result
            .latency_ms()
            .map(|ms| format!("{ms}ms"))
            .unwrap_or_else(|| "N/A".to_string());

        if result.endpoint_name == result.endpoint_url {
            format!("{status_icon} {} - {status_code} - {latency}", result.endpoint_url)
        } else {
            format!(
                "{status_icon} {} ({}) - {status_code} - {latency}",
                result.endpoint_name, result.endpoint_url
            )
        }
    }
}

/// 验证命令
pub struct ValidateCommand;

#[async_trait]
impl Command for ValidateCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Validate {
            config_path,
            verbose,
        } = &args.command
        {
            let config_file = config_path
                .clone()
                .unwrap_or_else(|| args.get_config_path());

            self.validate_config_file(&config_file, *verbose).await
        } else {
            Ok(())
        }
    }
}

impl ValidateCommand {
    /// 验证配置文件
    async fn validate_config_file(&self, config_path: &Path, verbose: bool) -> Result<()> {
        println!("验证配置文件: {}", config_path.display());

        let config = load_config(config_path, None, None).await?;

        if verbose {
            println!("配置验证通过！");
            println!("全局配置:");
            println!("  轮次间隔: {}秒", config.global.check_interval_seconds);
            match config.global.request_timeout_seconds {
                Some(timeout) => println!("  请求超时: {timeout}秒"),
                None => println!("  请求超时: 不限制"),
            }
            println!("  日志级别: {}", config.global.log_level);

            println!("端点配置:");
            for (i, endpoint) in config.endpoints.iter().enumerate() {
                println!("  {}. {} ({})", i + 1, endpoint.display_name(), endpoint.url);
                println!("     方法: {}", endpoint.method);
                println!("     域名: {}", crate::health::domain_of(&endpoint.url));
                if !endpoint.headers.is_empty() {
                    println!("     请求头: {} 个", endpoint.headers.len());
                }
            }
        } else {
            println!("✓ 配置文件验证通过");
            println!("✓ 找到 {} 个端点配置", config.endpoints.len());
        }

        Ok(())
    }
}

/// 初始化命令
pub struct InitCommand;

#[async_trait]
impl Command for InitCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Init { config_path, force } = &args.command {
            self.create_config_file(config_path, *force).await
        } else {
            Ok(())
        }
    }
}

impl InitCommand {
    /// 创建配置文件
    async fn create_config_file(&self, config_path: &Path, force: bool) -> Result<()> {
        if config_path.exists() && !force {
            eprintln!("配置文件已存在: {}", config_path.display());
            eprintln!("使用 --force 参数覆盖现有文件");
            return Ok(());
        }

        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let template = match ConfigFormat::from_path(config_path) {
            ConfigFormat::Toml => CONFIG_TEMPLATE,
            ConfigFormat::Yaml => YAML_CONFIG_TEMPLATE,
        };
        tokio::fs::write(config_path, template).await?;

        println!("配置文件已创建: {}", config_path.display());
        println!("请编辑配置文件以添加您的端点");

        Ok(())
    }
}

/// 版本命令
pub struct VersionCommand;

#[async_trait]
impl Command for VersionCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Version { format } = &args.command {
            match format {
                ReportFormat::Json => {
                    let version_info = serde_json::json!({
                        "name": crate::APP_NAME,
                        "version": crate::VERSION,
                        "description": crate::APP_DESCRIPTION
                    });
                    println!("{}", serde_json::to_string_pretty(&version_info)?);
                }
                ReportFormat::Text => {
                    println!("{} v{}", crate::APP_NAME, crate::VERSION);
                    println!("{}", crate::APP_DESCRIPTION);
                }
            }
        }
        Ok(())
    }
}
