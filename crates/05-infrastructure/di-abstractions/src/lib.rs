//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义按名称解析组件所需的核心接口。
//!
//! ## 核心接口
//!
//! - [`ComponentLocator`] - 组件名称到位置的映射
//! - [`ModuleLoader`] - 由位置加载组件定义
//! - [`ComponentDefinition`] - 依赖清单、构造函数与可选初始化
//! - [`DescriptorExtractor`] - 从组件定义中提取依赖名称
//! - [`ResolveContext`] - 当前解析链，用于检测循环依赖
//! - [`ComponentContainer`] - 面向应用代码的容器接口

pub mod container;
pub mod factory;
pub mod registry;
pub mod resolver;

pub use container::*;
pub use factory::*;
pub use registry::*;
pub use resolver::*;
