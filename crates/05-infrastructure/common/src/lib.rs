//! # Infrastructure Common
//!
//! 这个 crate 提供了 IoC 容器各层共享的基础类型。
//!
//! ## 核心组件
//!
//! - [`Component`] - 组件基础 trait，带可选的异步初始化
//! - [`ComponentSpec`] / [`Locator`] - 组件名称、位置与依赖清单
//! - [`ResolutionState`] - 单个组件名称的解析状态
//! - [`DependencyError`] - 解析过程中的错误分类
//!
//! ## 设计原则
//!
//! - 组件按名称注册，依赖按名称声明
//! - 异步优先的初始化
//! - 错误可克隆，便于在共享的解析 future 之间传播

pub mod component;
pub mod errors;
pub mod lifecycle;
pub mod metadata;

pub use component::*;
pub use errors::*;
pub use lifecycle::*;
pub use metadata::*;

/// 保留的组件名称：始终解析为容器自身
pub const CORE_COMPONENT: &str = "core";
