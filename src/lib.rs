//! BaseKit Library
//!
//! 多维表格图片插件引擎：选区同步、去背景、回写与短链接。

pub mod bootstrap;
pub mod commands;

// 重新导出常用类型
pub use bk_app::{App, AppDeps, SelectionSynchronizer, SyncSnapshot};
pub use bk_core::config::AppConfig;
pub use bootstrap::{build_app, load_config};
