//! 配置管理模块
//!
//! 负责端点清单的加载、解析和验证

pub mod loader;
pub mod types;

// 重新导出主要类型
pub use loader::{get_default_config_path, ConfigFormat, ConfigLoader};
pub use types::{validate_config, Config, EndpointSpec, GlobalConfig};
