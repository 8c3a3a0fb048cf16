//! 组件定义与模块加载抽象接口
//!
//! 组件定义是一份静态清单：声明的依赖名称、构造函数以及可选的初始化步骤。

use futures::future::{self, BoxFuture, FutureExt};
use infrastructure_common::{
    downcast_instance, BoxError, Component, DependencyError, Instance, Locator,
};
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// 组件构造函数类型
pub type ConstructFn = Arc<dyn Fn(&Dependencies) -> Result<Instance, BoxError> + Send + Sync>;

/// 组件初始化函数类型
pub type InitFn = Arc<dyn Fn(Instance) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>;

/// 依赖清单
///
/// 可以直接列出依赖名称，也可以写成构造函数参数列表形式，例如 `"(db, cache)"`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyManifest {
    /// 依赖名称列表
    Names(Vec<String>),
    /// 参数列表签名
    Signature(String),
}

impl DependencyManifest {
    /// 无依赖
    pub fn empty() -> Self {
        Self::Names(Vec::new())
    }
}

impl Default for DependencyManifest {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<&str> for DependencyManifest {
    fn from(signature: &str) -> Self {
        Self::Signature(signature.to_string())
    }
}

impl From<String> for DependencyManifest {
    fn from(signature: String) -> Self {
        Self::Signature(signature)
    }
}

impl From<Vec<String>> for DependencyManifest {
    fn from(names: Vec<String>) -> Self {
        Self::Names(names)
    }
}

impl From<Vec<&str>> for DependencyManifest {
    fn from(names: Vec<&str>) -> Self {
        Self::Names(names.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for DependencyManifest {
    fn from(names: [&str; N]) -> Self {
        Self::Names(names.iter().map(|name| (*name).to_string()).collect())
    }
}

/// 已解析的依赖实例
///
/// 顺序与组件声明的依赖名称完全一致。
#[derive(Clone)]
pub struct Dependencies {
    owner: String,
    entries: Vec<(String, Instance)>,
}

impl Dependencies {
    /// 创建依赖集合
    pub fn new(owner: impl Into<String>, entries: Vec<(String, Instance)>) -> Self {
        Self {
            owner: owner.into(),
            entries,
        }
    }

    /// 依赖这些实例的组件名称
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// 依赖数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否没有依赖
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 依赖名称（声明顺序）
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// 按位置获取未转型的实例
    pub fn instance(&self, index: usize) -> Option<&Instance> {
        self.entries.get(index).map(|(_, instance)| instance)
    }

    /// 按位置获取依赖
    pub fn get<T>(&self, index: usize) -> Result<Arc<T>, DependencyError>
    where
        T: Any + Send + Sync,
    {
        let (name, instance) = self.entries.get(index).ok_or_else(|| {
            DependencyError::configuration(
                &self.owner,
                format!("依赖位置 {} 超出声明数量 {}", index, self.entries.len()),
            )
        })?;
        downcast_instance::<T>(instance).ok_or_else(|| DependencyError::type_mismatch::<T>(name))
    }

    /// 按名称获取依赖
    pub fn by_name<T>(&self, name: &str) -> Result<Arc<T>, DependencyError>
    where
        T: Any + Send + Sync,
    {
        let index = self
            .entries
            .iter()
            .position(|(dep, _)| dep == name)
            .ok_or_else(|| {
                DependencyError::configuration(&self.owner, format!("未声明依赖: {}", name))
            })?;
        self.get(index)
    }

    /// 取出全部实例（声明顺序）
    pub fn into_instances(self) -> Vec<Instance> {
        self.entries.into_iter().map(|(_, instance)| instance).collect()
    }
}

impl fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependencies")
            .field("owner", &self.owner)
            .field("names", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

/// 组件定义
///
/// 构造函数可以返回任意对象作为组件实例（工厂形式）。
#[derive(Clone)]
pub struct ComponentDefinition {
    manifest: DependencyManifest,
    constructor: ConstructFn,
    initializer: Option<InitFn>,
}

impl ComponentDefinition {
    /// 以工厂函数创建组件定义
    pub fn factory<M, F>(manifest: M, constructor: F) -> Self
    where
        M: Into<DependencyManifest>,
        F: Fn(&Dependencies) -> Result<Instance, BoxError> + Send + Sync + 'static,
    {
        Self {
            manifest: manifest.into(),
            constructor: Arc::new(constructor),
            initializer: None,
        }
    }

    /// 以 [`Component`] 类型创建组件定义，并把 [`Component::init`] 作为初始化步骤
    pub fn component<T, M, F>(manifest: M, constructor: F) -> Self
    where
        T: Component,
        M: Into<DependencyManifest>,
        F: Fn(&Dependencies) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self::factory(manifest, move |deps: &Dependencies| {
            constructor(deps).map(|component| Arc::new(component) as Instance)
        })
        .with_initializer(|component: Arc<T>| async move { component.init().await })
    }

    /// 设置初始化步骤
    ///
    /// 实例类型与 `T` 不符时，初始化以错误结束。
    pub fn with_initializer<T, F, Fut>(mut self, initializer: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(Arc<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.initializer = Some(Arc::new(move |instance: Instance| {
            match instance.downcast::<T>() {
                Ok(typed) => initializer(typed).boxed(),
                Err(_) => {
                    let message = format!("初始化需要 {} 类型的实例", std::any::type_name::<T>());
                    future::ready(Err(BoxError::from(message))).boxed()
                }
            }
        }));
        self
    }

    /// 依赖清单
    pub fn manifest(&self) -> &DependencyManifest {
        &self.manifest
    }

    /// 是否有初始化步骤
    pub fn has_initializer(&self) -> bool {
        self.initializer.is_some()
    }

    /// 调用构造函数
    pub fn construct(&self, name: &str, dependencies: &Dependencies) -> Result<Instance, DependencyError> {
        (self.constructor)(dependencies).map_err(|e| DependencyError::creation_failed(name, e))
    }

    /// 执行初始化步骤（如果有）
    pub async fn initialize(&self, name: &str, instance: &Instance) -> Result<(), DependencyError> {
        match &self.initializer {
            Some(initializer) => initializer(Arc::clone(instance))
                .await
                .map_err(|e| DependencyError::initialization(name, e)),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("manifest", &self.manifest)
            .field("constructor", &"<function>")
            .field("has_initializer", &self.has_initializer())
            .finish()
    }
}

/// 模块加载器 trait
///
/// 由组件位置得到组件定义。要求同步且幂等。
pub trait ModuleLoader: Send + Sync {
    /// 加载组件定义
    fn load(&self, locator: &Locator) -> Result<ComponentDefinition, BoxError>;
}
