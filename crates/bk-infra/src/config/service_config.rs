use std::time::Duration;

use bk_core::AppConfig;
use reqwest::Url;

/// 默认接口路径（与插件后端保持一致）
pub const DEFAULT_SHORTEN_PATH: &str = "/api/shorten_url";
pub const DEFAULT_REMOVE_BG_PATH: &str = "/api/remove_image_bg";

#[derive(Debug, thiserror::Error)]
pub enum ServiceConfigError {
    #[error("service base_url is not configured")]
    MissingBaseUrl,

    #[error("invalid service url {url:?}: {message}")]
    InvalidUrl { url: String, message: String },
}

/// Resolved endpoints of the plugin backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Always ends with `/`; endpoint paths resolve beneath it.
    pub base_url: Url,
    pub shorten_path: String,
    pub remove_bg_path: String,
    /// `None` means requests never time out.
    pub timeout: Option<Duration>,
}

impl ServiceConfig {
    /// Apply endpoint defaults to the raw configuration DTO.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ServiceConfigError> {
        let raw = config.service_base_url.trim();
        if raw.is_empty() {
            return Err(ServiceConfigError::MissingBaseUrl);
        }
        let mut base_url = Url::parse(raw).map_err(|e| ServiceConfigError::InvalidUrl {
            url: raw.to_string(),
            message: e.to_string(),
        })?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            shorten_path: non_empty_or(&config.shorten_path, DEFAULT_SHORTEN_PATH),
            remove_bg_path: non_empty_or(&config.remove_bg_path, DEFAULT_REMOVE_BG_PATH),
            timeout: config.request_timeout_secs.map(Duration::from_secs),
        })
    }

    pub fn shorten_url(&self) -> Result<Url, ServiceConfigError> {
        self.join(&self.shorten_path)
    }

    pub fn remove_bg_url(&self) -> Result<Url, ServiceConfigError> {
        self.join(&self.remove_bg_path)
    }

    /// Shared HTTP client honouring the configured timeout.
    pub fn build_client(&self) -> reqwest::Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }

    /// Resolve `path` under the base URL, keeping any path prefix the base
    /// carries (`https://host/plugin` + `/api/x` is `https://host/plugin/api/x`).
    fn join(&self, path: &str) -> Result<Url, ServiceConfigError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ServiceConfigError::InvalidUrl {
                url: format!("{}{}", self.base_url, path),
                message: e.to_string(),
            })
    }
}

fn non_empty_or(value: &str, default: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_config(base_url: &str) -> AppConfig {
        AppConfig {
            service_base_url: base_url.to_string(),
            ..AppConfig::empty()
        }
    }

    #[test]
    fn test_defaults_are_applied_for_missing_paths() {
        let config = ServiceConfig::from_app_config(&app_config("https://plugin.example.com")).unwrap();

        assert_eq!(
            config.shorten_url().unwrap().as_str(),
            "https://plugin.example.com/api/shorten_url"
        );
        assert_eq!(
            config.remove_bg_url().unwrap().as_str(),
            "https://plugin.example.com/api/remove_image_bg"
        );
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_configured_paths_and_timeout_win() {
        let mut raw = app_config("http://127.0.0.1:8080");
        raw.shorten_path = "/v2/short".to_string();
        raw.request_timeout_secs = Some(5);

        let config = ServiceConfig::from_app_config(&raw).unwrap();

        assert_eq!(config.shorten_url().unwrap().as_str(), "http://127.0.0.1:8080/v2/short");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_base_url_path_prefix_is_kept() {
        let config = ServiceConfig::from_app_config(&app_config("https://host/plugin")).unwrap();

        assert_eq!(config.base_url.as_str(), "https://host/plugin/");
        assert_eq!(
            config.shorten_url().unwrap().as_str(),
            "https://host/plugin/api/shorten_url"
        );

        let config = ServiceConfig::from_app_config(&app_config("https://host/plugin/")).unwrap();
        assert_eq!(
            config.remove_bg_url().unwrap().as_str(),
            "https://host/plugin/api/remove_image_bg"
        );
    }

    #[test]
    fn test_missing_base_url_is_an_error() {
        let err = ServiceConfig::from_app_config(&AppConfig::empty()).unwrap_err();
        assert!(matches!(err, ServiceConfigError::MissingBaseUrl));
    }

    #[test]
    fn test_invalid_base_url_is_an_error() {
        let err = ServiceConfig::from_app_config(&app_config("not a url")).unwrap_err();
        assert!(matches!(err, ServiceConfigError::InvalidUrl { .. }));
    }
}
