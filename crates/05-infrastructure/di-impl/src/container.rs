//! IoC 容器
//!
//! 面向应用代码的入口。保留名称 `core` 始终解析为容器自身。

use crate::descriptor::ManifestExtractor;
use crate::engine::ResolutionEngine;
use crate::graph::DependencyGraph;
use async_trait::async_trait;
use di_abstractions::{
    ComponentContainer, ComponentLocator, ContainerStats, DescriptorExtractor, ModuleLoader,
    ResolveContext,
};
use futures::future;
use infrastructure_common::{
    downcast_instance, DependencyError, Instance, ResolutionState, CORE_COMPONENT,
};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

/// IoC 容器
pub struct IocContainer {
    engine: Arc<ResolutionEngine>,
}

impl IocContainer {
    /// 创建新的容器
    pub fn new(locator: Arc<dyn ComponentLocator>, loader: Arc<dyn ModuleLoader>) -> Arc<Self> {
        Self::with_extractor(locator, loader, Arc::new(ManifestExtractor::new()))
    }

    /// 使用自定义依赖描述提取器创建容器
    pub fn with_extractor(
        locator: Arc<dyn ComponentLocator>,
        loader: Arc<dyn ModuleLoader>,
        extractor: Arc<dyn DescriptorExtractor>,
    ) -> Arc<Self> {
        if locator.contains(CORE_COMPONENT) {
            warn!("配置中的 {} 是保留名称，已忽略", CORE_COMPONENT);
        }
        let registered = locator.names().len();
        let graph = DependencyGraph::new(locator, loader, extractor);

        let container = Arc::new_cyclic(|container: &Weak<Self>| {
            let core: Weak<dyn Any + Send + Sync> = container.clone();
            Self {
                engine: Arc::new(ResolutionEngine::new(graph, core)),
            }
        });

        info!("创建 IoC 容器，配置了 {} 个组件", registered);
        container
    }

    /// 加载单个组件
    ///
    /// 必须在 Tokio 运行时中调用：每个组件在独立的任务中构建。
    /// 没有运行时时，尚未完成的组件以 `DependencyError::Configuration` 失败，
    /// 已完成的组件和 `core` 照常返回。
    pub async fn load(&self, name: &str) -> Result<Instance, DependencyError> {
        debug!("加载组件: {}", name);
        self.engine.resolve(name, &ResolveContext::new()).await
    }

    /// 加载多个组件
    ///
    /// 返回以请求名称为键的实例；任意一个失败，整个请求失败。
    /// 与 [`IocContainer::load`] 一样需要 Tokio 运行时。
    pub async fn load_many<I, S>(&self, names: I) -> Result<HashMap<String, Instance>, DependencyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names.into_iter().map(|name| name.as_ref().to_string()).collect();
        debug!("加载组件: {:?}", names);

        let context = ResolveContext::new();
        let pending: Vec<_> = names
            .iter()
            .map(|name| self.engine.resolve(name, &context))
            .collect();
        let instances = future::try_join_all(pending).await?;

        Ok(names.into_iter().zip(instances).collect())
    }

    /// 加载组件并转型为具体类型
    pub async fn get<T>(&self, name: &str) -> Result<Arc<T>, DependencyError>
    where
        T: Any + Send + Sync,
    {
        let instance = self.load(name).await?;
        downcast_instance::<T>(&instance).ok_or_else(|| DependencyError::type_mismatch::<T>(name))
    }

    /// 查询组件的解析状态
    pub fn state(&self, name: &str) -> ResolutionState {
        self.engine.state(name)
    }

    /// 检查组件是否已配置
    pub fn is_registered(&self, name: &str) -> bool {
        name == CORE_COMPONENT || self.engine.graph().locator().contains(name)
    }

    /// 组件的直接依赖（声明顺序）
    pub fn direct_dependencies(&self, name: &str) -> Result<Vec<String>, DependencyError> {
        self.engine.graph().direct_dependencies(name)
    }

    /// 直接依赖指定组件的已加载组件
    pub fn dependents(&self, name: &str) -> Vec<String> {
        self.engine.graph().dependents(name)
    }

    /// 请求组件的分层构造顺序
    pub fn resolution_plan<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Vec<String>>, DependencyError> {
        self.engine.graph().resolution_plan(names)
    }

    /// 获取容器统计信息
    pub fn stats(&self) -> ContainerStats {
        let (settled_components, in_flight_components) = self.engine.counts();
        let registered_components = self
            .engine
            .graph()
            .locator()
            .names()
            .iter()
            .filter(|name| *name != CORE_COMPONENT)
            .count();

        ContainerStats {
            registered_components,
            settled_components,
            in_flight_components,
            constructions: self.engine.constructions(),
            initializations: self.engine.initializations(),
            resolution_errors: self.engine.resolution_errors(),
        }
    }
}

#[async_trait]
impl ComponentContainer for IocContainer {
    async fn load(&self, name: &str) -> Result<Instance, DependencyError> {
        IocContainer::load(self, name).await
    }

    async fn load_many(&self, names: &[&str]) -> Result<HashMap<String, Instance>, DependencyError> {
        IocContainer::load_many(self, names.iter().copied()).await
    }

    fn state(&self, name: &str) -> ResolutionState {
        IocContainer::state(self, name)
    }

    fn is_registered(&self, name: &str) -> bool {
        IocContainer::is_registered(self, name)
    }

    fn stats(&self) -> ContainerStats {
        IocContainer::stats(self)
    }
}

impl fmt::Debug for IocContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IocContainer")
            .field("engine", &self.engine)
            .finish()
    }
}
