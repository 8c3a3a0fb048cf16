//! # Configuration Implementation
//!
//! 从配置文件和环境变量读取组件名称到位置的映射。
//!
//! ## 主要组件
//!
//! - [`IocConfig`] - 组件位置配置，实现 `ComponentLocator`
//! - [`ConfigFormat`] - TOML / JSON / YAML 文档格式
//! - [`EnvironmentOverrides`] - 环境变量覆盖

pub mod ioc_config;
pub mod providers;
pub mod validation;

pub use ioc_config::IocConfig;
pub use providers::{get_nested_value, load_document, load_document_as, ConfigFormat, EnvironmentOverrides};
pub use validation::validate_entry;
