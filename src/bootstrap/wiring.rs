//! # Dependency Injection / 依赖注入模块
//!
//! ## Responsibilities / 职责
//!
//! - ✅ Create HTTP clients for the plugin backend / 创建插件后端 HTTP 客户端
//! - ✅ Inject host ports and infra implementations into App / 将宿主端口与 infra 实现注入 App
//!
//! ## Prohibited / 禁止事项
//!
//! ❌ **No business logic / 禁止包含任何业务逻辑**
//! - Do not decide what happens when a selection is empty
//! - 不判断"选区为空时怎样"
//!
//! ## Architecture Principle / 架构原则
//!
//! > **This is the only place allowed to depend on bk-infra + bk-app simultaneously.**
//! > **这是唯一允许同时依赖 bk-infra 和 bk-app 的地方。**

use std::sync::Arc;

use bk_app::{App, AppDeps};
use bk_core::config::AppConfig;
use bk_core::ports::*;
use bk_core::ScanMode;
use bk_infra::config::{ServiceConfig, ServiceConfigError};
use bk_infra::{HttpAttachmentFetcher, HttpBackgroundRemover, HttpUrlShortener, SystemClock};

/// Result type for wiring operations
pub type WiringResult<T> = Result<T, WiringError>;

/// Errors during dependency injection
/// 依赖注入错误
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("Service configuration invalid: {0}")]
    ServiceConfig(#[from] ServiceConfigError),

    #[error("HTTP client initialization failed: {0}")]
    HttpClientInit(String),

    #[error("Invalid scan mode in config: {0}")]
    ScanMode(String),
}

/// Backend clients shared by every use case.
/// 后端客户端集合
struct ServiceLayer {
    fetcher: Arc<dyn AttachmentFetcherPort>,
    background_remover: Arc<dyn BackgroundRemoverPort>,
    url_shortener: Arc<dyn UrlShortenerPort>,
}

fn create_service_layer(config: &AppConfig) -> WiringResult<ServiceLayer> {
    let service = ServiceConfig::from_app_config(config)?;
    let client = service
        .build_client()
        .map_err(|e| WiringError::HttpClientInit(e.to_string()))?;

    Ok(ServiceLayer {
        fetcher: Arc::new(HttpAttachmentFetcher::new(client.clone())),
        background_remover: Arc::new(HttpBackgroundRemover::new(
            client.clone(),
            service.remove_bg_url()?,
        )),
        url_shortener: Arc::new(HttpUrlShortener::new(client, service.shorten_url()?)),
    })
}

/// Parse the configured scan mode; an empty value selects cell mode.
/// 解析扫描模式；未配置时使用单元格模式。
pub fn scan_mode_from_config(config: &AppConfig) -> WiringResult<ScanMode> {
    if config.scan_mode.trim().is_empty() {
        return Ok(ScanMode::default());
    }
    config
        .scan_mode
        .parse::<ScanMode>()
        .map_err(|e: anyhow::Error| WiringError::ScanMode(e.to_string()))
}

/// Wire the application dependencies around the given host ports.
/// 围绕宿主端口装配应用依赖
pub fn wire_dependencies(
    config: &AppConfig,
    selection: Arc<dyn SelectionPort>,
    table: Arc<dyn BaseTablePort>,
) -> WiringResult<AppDeps> {
    let services = create_service_layer(config)?;

    Ok(AppDeps {
        selection,
        table,
        fetcher: services.fetcher,
        background_remover: services.background_remover,
        url_shortener: services.url_shortener,
        clock: Arc::new(SystemClock),
    })
}

/// Build the whole application for a host.
pub fn build_app(
    config: &AppConfig,
    selection: Arc<dyn SelectionPort>,
    table: Arc<dyn BaseTablePort>,
) -> WiringResult<App> {
    let scan_mode = scan_mode_from_config(config)?;
    let deps = wire_dependencies(config, selection, table)?;
    Ok(App::new(deps, scan_mode))
}

/// Background remover for stand-alone use (CLI), without a host.
pub fn build_background_remover(
    config: &AppConfig,
) -> WiringResult<Arc<dyn BackgroundRemoverPort>> {
    Ok(create_service_layer(config)?.background_remover)
}

/// URL shortener for stand-alone use (CLI), without a host.
pub fn build_url_shortener(config: &AppConfig) -> WiringResult<Arc<dyn UrlShortenerPort>> {
    Ok(create_service_layer(config)?.url_shortener)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bk_infra::InMemoryBase;

    fn config(base_url: &str, scan_mode: &str) -> AppConfig {
        AppConfig {
            service_base_url: base_url.to_string(),
            scan_mode: scan_mode.to_string(),
            ..AppConfig::empty()
        }
    }

    #[test]
    fn test_scan_mode_defaults_to_cell() {
        assert_eq!(
            scan_mode_from_config(&config("", "")).unwrap(),
            ScanMode::Cell
        );
        assert_eq!(
            scan_mode_from_config(&config("", "Field")).unwrap(),
            ScanMode::Field
        );
    }

    #[test]
    fn test_scan_mode_rejects_unknown_value() {
        let err = scan_mode_from_config(&config("", "row")).unwrap_err();
        assert!(matches!(err, WiringError::ScanMode(_)));
    }

    #[test]
    fn test_build_app_requires_base_url() {
        let host = Arc::new(InMemoryBase::new("http://files.local"));
        let result = build_app(&config("", "cell"), host.clone(), host);

        assert!(matches!(
            result,
            Err(WiringError::ServiceConfig(ServiceConfigError::MissingBaseUrl))
        ));
    }

    #[tokio::test]
    async fn test_build_app_uses_configured_scan_mode() {
        let host = Arc::new(InMemoryBase::new("http://files.local"));
        let app = build_app(&config("http://127.0.0.1:9", "field"), host.clone(), host).unwrap();

        let snapshot = app.synchronizer.snapshot();
        assert_eq!(snapshot.scan_mode, ScanMode::Field);
        assert!(snapshot.working_set.is_empty());
        assert!(!snapshot.loading);
    }
}
