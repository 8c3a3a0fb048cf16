//! 元数据定义
//!
//! 提供组件位置与依赖清单的元数据信息

use serde::{Deserialize, Serialize};
use std::fmt;

/// 组件位置
///
/// 由配置给出，交给模块加载器换取组件定义。容器本身不解释它的内容。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator(String);

impl Locator {
    /// 创建新的组件位置
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// 获取位置字符串
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 位置是否为空白
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Locator {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Locator {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// 组件规格
///
/// 组件名称、位置和按声明顺序排列的依赖名称。创建后不可变。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSpec {
    /// 组件名称
    pub name: String,
    /// 组件位置
    pub location: Locator,
    /// 依赖名称，保持声明顺序
    pub dependency_names: Vec<String>,
}

impl ComponentSpec {
    /// 创建新的组件规格
    pub fn new(
        name: impl Into<String>,
        location: Locator,
        dependency_names: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            location,
            dependency_names,
        }
    }

    /// 是否没有依赖
    pub fn is_leaf(&self) -> bool {
        self.dependency_names.is_empty()
    }

    /// 是否直接依赖指定组件
    pub fn depends_on(&self, name: &str) -> bool {
        self.dependency_names.iter().any(|dep| dep == name)
    }
}
