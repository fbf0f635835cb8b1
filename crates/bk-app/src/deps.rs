//! # Application Dependencies / 应用依赖
//!
//! This module defines the dependency grouping for App construction.
//! 此模块定义 App 构造的依赖分组。
//!
//! **Note / 注意**: This is NOT a Builder pattern. No build steps, no default
//! values, no hidden logic, just parameter grouping.

use std::sync::Arc;

use bk_core::ports::*;
use bk_core::ScanMode;

use crate::synchronizer::SelectionSynchronizer;
use crate::usecases::{
    CommitImagesUseCase, ResolveSelectionUseCase, ShortenUrlUseCase, TransformImagesUseCase,
};

/// Application dependency grouping (non-Builder, just parameter grouping)
/// 应用依赖分组（非 Builder，仅参数打包）
pub struct AppDeps {
    // Host dependencies / 宿主依赖
    pub selection: Arc<dyn SelectionPort>,
    pub table: Arc<dyn BaseTablePort>,

    // Remote service dependencies / 远程服务依赖
    pub fetcher: Arc<dyn AttachmentFetcherPort>,
    pub background_remover: Arc<dyn BackgroundRemoverPort>,
    pub url_shortener: Arc<dyn UrlShortenerPort>,

    // System dependencies / 系统依赖
    pub clock: Arc<dyn ClockPort>,
}

/// Assembled application: the synchronizer plus the stand-alone URL tool.
pub struct App {
    pub synchronizer: Arc<SelectionSynchronizer>,
    pub shorten_url: ShortenUrlUseCase,
}

impl App {
    pub fn new(deps: AppDeps, scan_mode: ScanMode) -> Self {
        let resolve = ResolveSelectionUseCase::new(deps.table.clone(), deps.fetcher, deps.clock);
        let transform = TransformImagesUseCase::new(deps.background_remover);
        let commit = CommitImagesUseCase::new(deps.table);

        Self {
            synchronizer: Arc::new(SelectionSynchronizer::new(
                deps.selection,
                resolve,
                transform,
                commit,
                scan_mode,
            )),
            shorten_url: ShortenUrlUseCase::new(deps.url_shortener),
        }
    }
}
