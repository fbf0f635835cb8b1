use std::path::PathBuf;

/// Application configuration DTO (pure data, no logic)
/// 应用配置 DTO（纯数据，无逻辑）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the plugin backend (may be empty - this is a fact, not an error)
    /// 插件后端的基础地址（可能为空）
    pub service_base_url: String,

    /// Path of the URL shortening endpoint, empty when not configured
    pub shorten_path: String,

    /// Path of the background removal endpoint, empty when not configured
    pub remove_bg_path: String,

    /// Per-request timeout; `None` means no timeout at all
    /// 单个请求超时时间；`None` 表示不设置超时
    pub request_timeout_secs: Option<u64>,

    /// Raw scan mode string (`cell` / `field`), unparsed
    pub scan_mode: String,

    /// Directory for rolling log files, `None` disables file logging
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Create AppConfig from TOML value
    /// 从 TOML 值创建 AppConfig
    ///
    /// **Prohibited / 禁止**: This method must NOT contain any validation
    /// or default value logic.
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        let service = toml_value.get("service");
        let service_str = |key: &str| {
            service
                .and_then(|s| s.get(key))
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string()
        };

        Ok(Self {
            service_base_url: service_str("base_url"),
            shorten_path: service_str("shorten_path"),
            remove_bg_path: service_str("remove_bg_path"),
            request_timeout_secs: service
                .and_then(|s| s.get("request_timeout_secs"))
                .and_then(|v| v.as_integer())
                .map(|secs| secs.max(0) as u64),
            scan_mode: toml_value
                .get("sync")
                .and_then(|s| s.get("scan_mode"))
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            log_dir: toml_value
                .get("logging")
                .and_then(|l| l.get("dir"))
                .and_then(|v| v.as_str())
                .map(PathBuf::from),
        })
    }

    /// Create empty AppConfig (all empty/default values)
    /// 创建空的 AppConfig（所有字段为空/默认值）
    pub fn empty() -> Self {
        Self {
            service_base_url: String::new(),
            shorten_path: String::new(),
            remove_bg_path: String::new(),
            request_timeout_secs: None,
            scan_mode: String::new(),
            log_dir: None,
        }
    }
}
