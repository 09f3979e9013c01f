//! 端点清单加载
//!
//! 按扩展名选择格式：`.yaml`/`.yml` 按 YAML 解析，其余按 TOML 解析。
//! YAML 可以直接是端点的顶层列表，也可以是与 TOML 相同的 `global` + `endpoints` 结构。

use crate::config::types::{validate_config, Config, EndpointSpec};
use crate::error::{ConfigError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "endpoints.toml";

/// YAML 端点清单的文件名
pub const YAML_CONFIG_FILE: &str = "endpoints.yaml";

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
}

impl ConfigFormat {
    /// 根据扩展名判断格式，无法识别时按 TOML 处理
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Toml,
        }
    }
}

/// 配置加载器
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// 是否替换 `${VAR}` 环境变量
    substitute_env: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConfigLoader {
    pub fn new(substitute_env: bool) -> Self {
        Self { substitute_env }
    }

    /// 从文件加载并验证配置
    pub async fn load_from_file(&self, path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            }
            .into());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::ParseError(format!("读取文件失败: {e}")))?;

        let config = self.load_from_str(&content, ConfigFormat::from_path(path))?;

        log::info!(
            "成功加载配置文件: {} ({} 个端点)",
            path.display(),
            config.endpoints.len()
        );
        log::debug!("配置内容: {config:?}");

        Ok(config)
    }

    /// 解析并验证配置内容
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> Result<Config> {
        let content = self.substitute_env_vars(content)?;

        let config: Config = match format {
            ConfigFormat::Toml => toml::from_str(&content)
                .map_err(|e| ConfigError::ParseError(format!("TOML解析失败: {e}")))?,
            ConfigFormat::Yaml => parse_yaml(&content)?,
        };

        validate_config(&config).map_err(ConfigError::ValidationError)?;
        Ok(config)
    }

    /// 替换 `${VAR_NAME}`，变量缺失时报错
    ///
    /// 只扫描一遍原文，替换进来的值不会被再次展开
    fn substitute_env_vars(&self, content: &str) -> Result<String> {
        if !self.substitute_env {
            return Ok(content.to_string());
        }

        let pattern = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
            .map_err(|e| ConfigError::ParseError(format!("正则表达式错误: {e}")))?;

        let mut output = String::with_capacity(content.len());
        let mut copied = 0;
        for captures in pattern.captures_iter(content) {
            let (Some(whole), Some(var)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            let value = std::env::var(var.as_str()).map_err(|_| ConfigError::EnvVarError {
                var: var.as_str().to_string(),
            })?;

            output.push_str(&content[copied..whole.start()]);
            output.push_str(&value);
            copied = whole.end();
        }
        output.push_str(&content[copied..]);

        Ok(output)
    }
}

fn parse_yaml(content: &str) -> Result<Config> {
    let document: serde_yaml::Value = serde_yaml::from_str(content)
        .map_err(|e| ConfigError::ParseError(format!("YAML解析失败: {e}")))?;

    let config = if document.is_sequence() {
        let endpoints: Vec<EndpointSpec> = serde_yaml::from_value(document)
            .map_err(|e| ConfigError::ParseError(format!("YAML端点列表无效: {e}")))?;
        Config {
            global: Default::default(),
            endpoints,
        }
    } else {
        serde_yaml::from_value(document)
            .map_err(|e| ConfigError::ParseError(format!("YAML解析失败: {e}")))?
    };

    Ok(config)
}

/// 获取默认配置文件路径
///
/// 依次查找当前目录的 `endpoints.toml`、`endpoints.yaml`，都不存在时使用用户配置目录
pub fn get_default_config_path() -> PathBuf {
    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    if local.exists() {
        return local;
    }

    let local_yaml = PathBuf::from(YAML_CONFIG_FILE);
    if local_yaml.exists() {
        return local_yaml;
    }

    dirs::config_dir()
        .map(|config_dir| config_dir.join(crate::APP_NAME).join(DEFAULT_CONFIG_FILE))
        .unwrap_or(local)
}
