//! # Pure Data Module / 纯数据模块 - Data Transfer Objects Only
//!
//! ## Responsibilities / 职责
//!
//! - Define configuration data structures / 定义配置数据结构
//! - Provide TOML → DTO mapping / 提供 TOML → DTO 的映射
//!
//! Defaults (endpoint paths, scan mode) are applied by the wiring layer,
//! never here. Empty values are facts, not errors.

pub mod app_config;

pub use app_config::AppConfig;
