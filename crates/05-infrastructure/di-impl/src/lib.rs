//! # 依赖注入具体实现
//!
//! 提供按名称解析组件的容器、解析引擎、依赖图和依赖描述提取器。
//!
//! 解析流程：容器收到加载请求后交给解析引擎；引擎查询依赖图得到依赖名称，
//! 递归解析所有依赖（共享正在进行的解析），依赖全部就绪后构造并初始化组件，
//! 最后把实例记录到注册表中。

pub mod container;
pub mod descriptor;
pub mod engine;
pub mod graph;
pub mod loader;
mod registry;

pub use container::IocContainer;
pub use descriptor::{parse_signature, ManifestExtractor};
pub use engine::ResolutionEngine;
pub use graph::{DependencyGraph, GraphNode};
pub use loader::ModuleCatalog;
