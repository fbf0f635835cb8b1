//! # Configuration Loader / 配置加载器
//!
//! ## Responsibilities / 职责
//!
//! - ✅ Read TOML configuration files / 读取 TOML 配置文件
//! - ✅ Parse TOML into AppConfig DTO / 将 TOML 解析为 AppConfig DTO
//! - ✅ Report I/O and parsing errors with context / 报告带上下文的 I/O 和解析错误
//!
//! ## Prohibited / 禁止事项
//!
//! ❌ **No validation logic / 禁止验证逻辑**
//! ❌ **No default value logic / 禁止默认值逻辑**
//!
//! Endpoint defaults and URL checks live in `bk_infra::config::ServiceConfig`.

use anyhow::Context;
use bk_core::config::AppConfig;
use std::path::PathBuf;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "BASEKIT_CONFIG";

/// Load configuration from a TOML file
/// 从 TOML 文件加载配置
///
/// **NO validation is performed**: an empty base URL or an unknown scan mode
/// is loaded as-is.
/// **不执行任何验证**：空地址或未知扫描模式按原样加载。
///
/// # Errors / 错误
///
/// Returns error if the file cannot be read or is not valid TOML.
/// 文件无法读取或不是有效 TOML 时返回错误。
pub fn load_config(config_path: PathBuf) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    AppConfig::from_toml(&toml_value)
}
