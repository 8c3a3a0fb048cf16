//! 内存模块目录
//!
//! 以组件位置为键保存组件定义，作为默认的模块加载器。

use dashmap::DashMap;
use di_abstractions::{ComponentDefinition, ModuleLoader};
use infrastructure_common::{BoxError, Locator};
use tracing::debug;

/// 内存模块目录
#[derive(Debug, Default)]
pub struct ModuleCatalog {
    modules: DashMap<Locator, ComponentDefinition>,
}

impl ModuleCatalog {
    /// 创建空目录
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册模块，返回被替换的旧定义
    pub fn register(
        &self,
        locator: impl Into<Locator>,
        definition: ComponentDefinition,
    ) -> Option<ComponentDefinition> {
        let locator = locator.into();
        debug!("注册模块: {}", locator);
        self.modules.insert(locator, definition)
    }

    /// 以构建者方式注册模块
    pub fn with_module(self, locator: impl Into<Locator>, definition: ComponentDefinition) -> Self {
        self.register(locator, definition);
        self
    }

    /// 是否包含指定位置
    pub fn contains(&self, locator: &Locator) -> bool {
        self.modules.contains_key(locator)
    }

    /// 模块数量
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl ModuleLoader for ModuleCatalog {
    fn load(&self, locator: &Locator) -> Result<ComponentDefinition, BoxError> {
        self.modules
            .get(locator)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| format!("模块不存在: {}", locator).into())
    }
}
