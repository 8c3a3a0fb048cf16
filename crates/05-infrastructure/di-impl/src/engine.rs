//! 解析引擎
//!
//! 递归解析组件：先解析全部依赖，再构造，再初始化。
//! 每个名称只会构造一次；同一时间对同一名称的请求共享同一个解析 future。

use crate::graph::DependencyGraph;
use crate::registry::{Acquired, InstanceRegistry, SharedResolution};
use di_abstractions::{Dependencies, ResolveContext};
use futures::future::{self, BoxFuture, FutureExt};
use infrastructure_common::{DependencyError, Instance, ResolutionState, CORE_COMPONENT};
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// 解析引擎
pub struct ResolutionEngine {
    graph: DependencyGraph,
    registry: InstanceRegistry,
    /// 保留名称 `core` 对应的容器
    core: Weak<dyn Any + Send + Sync>,
    constructions: AtomicUsize,
    initializations: AtomicUsize,
    resolution_errors: AtomicUsize,
}

impl ResolutionEngine {
    /// 创建新的解析引擎
    pub fn new(graph: DependencyGraph, core: Weak<dyn Any + Send + Sync>) -> Self {
        Self {
            graph,
            registry: InstanceRegistry::new(),
            core,
            constructions: AtomicUsize::new(0),
            initializations: AtomicUsize::new(0),
            resolution_errors: AtomicUsize::new(0),
        }
    }

    /// 依赖图
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// 解析组件
    ///
    /// `context` 是调用方所在的解析链。返回的 future 不借用引擎，
    /// 启动后的解析在后台任务中运行到结束，即使调用方不再等待。
    ///
    /// 启动新的解析需要当前线程处于 Tokio 运行时中，
    /// 否则返回 `DependencyError::Configuration`，组件保持未请求状态。
    pub fn resolve(
        self: &Arc<Self>,
        name: &str,
        context: &ResolveContext,
    ) -> BoxFuture<'static, Result<Instance, DependencyError>> {
        if name == CORE_COMPONENT {
            return future::ready(self.core_instance()).boxed();
        }

        match self.registry.acquire(name, context, || self.start(name, context)) {
            Ok(Acquired::Settled(instance)) => future::ready(Ok(instance)).boxed(),
            Ok(Acquired::Pending(pending)) => pending.boxed(),
            Err(error) => {
                self.resolution_errors.fetch_add(1, Ordering::Relaxed);
                warn!("组件 {} 解析被拒绝: {}", name, error);
                future::ready(Err(error)).boxed()
            }
        }
    }

    /// 查询解析状态
    pub fn state(&self, name: &str) -> ResolutionState {
        if name == CORE_COMPONENT {
            return ResolutionState::Settled;
        }
        self.registry.state(name)
    }

    /// 已完成与进行中的组件数量
    pub fn counts(&self) -> (usize, usize) {
        self.registry.counts()
    }

    /// 构造函数调用次数
    pub fn constructions(&self) -> usize {
        self.constructions.load(Ordering::Relaxed)
    }

    /// 初始化调用次数
    pub fn initializations(&self) -> usize {
        self.initializations.load(Ordering::Relaxed)
    }

    /// 解析错误数量
    pub fn resolution_errors(&self) -> usize {
        self.resolution_errors.load(Ordering::Relaxed)
    }

    fn core_instance(&self) -> Result<Instance, DependencyError> {
        self.core
            .upgrade()
            .ok_or_else(|| DependencyError::configuration(CORE_COMPONENT, "容器已释放"))
    }

    /// 启动后台解析任务并包装为共享 future
    ///
    /// 构建任务由一个监督任务等待。构建任务 panic 时由监督任务记录失败，
    /// 与是否还有调用方在等待无关。
    fn start(self: &Arc<Self>, name: &str, context: &ResolveContext) -> Result<SharedResolution, DependencyError> {
        let runtime = Handle::try_current()
            .map_err(|error| DependencyError::configuration(name, format!("解析需要 Tokio 运行时: {}", error)))?;
        debug!("开始解析组件: {} (深度 {})", name, context.depth());

        let owned = name.to_string();
        let task = runtime.spawn(Arc::clone(self).build(owned.clone(), context.enter(name)));
        let engine = Arc::clone(self);
        let supervisor = runtime.spawn(async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(join_error) => {
                    let error = DependencyError::creation_failed(&owned, Box::new(join_error));
                    engine.resolution_errors.fetch_add(1, Ordering::Relaxed);
                    warn!("组件 {} 的构建任务异常结束: {}", owned, error);
                    engine.registry.finish(&owned, &Err(error.clone()));
                    Err(error)
                }
            }
        });

        let owned = name.to_string();
        Ok(async move {
            supervisor
                .await
                .unwrap_or_else(|join_error| Err(DependencyError::creation_failed(&owned, Box::new(join_error))))
        }
        .boxed()
        .shared())
    }

    async fn build(self: Arc<Self>, name: String, context: ResolveContext) -> Result<Instance, DependencyError> {
        let outcome = self.construct(&name, &context).await;
        match &outcome {
            Ok(_) => info!("组件 {} 解析完成", name),
            Err(error) => {
                self.resolution_errors.fetch_add(1, Ordering::Relaxed);
                warn!("组件 {} 解析失败: {}", name, error);
            }
        }
        self.registry.finish(&name, &outcome);
        outcome
    }

    async fn construct(self: &Arc<Self>, name: &str, context: &ResolveContext) -> Result<Instance, DependencyError> {
        let node = self.graph.node(name)?;
        let dependency_names = &node.spec.dependency_names;

        let awaited = dependency_names
            .iter()
            .filter(|dep| *dep != CORE_COMPONENT)
            .cloned()
            .collect();
        self.registry.begin_waiting(name, awaited);

        let pending: Vec<_> = dependency_names
            .iter()
            .map(|dep| self.resolve(dep, context))
            .collect();
        let resolved = future::try_join_all(pending).await;
        self.registry.end_waiting(name);
        let instances = resolved?;

        let dependencies = Dependencies::new(
            name,
            dependency_names.iter().cloned().zip(instances).collect(),
        );
        let instance = node.definition.construct(name, &dependencies)?;
        self.constructions.fetch_add(1, Ordering::Relaxed);
        debug!("组件 {} 构造完成", name);

        if node.definition.has_initializer() {
            node.definition.initialize(name, &instance).await?;
            self.initializations.fetch_add(1, Ordering::Relaxed);
            debug!("组件 {} 初始化完成", name);
        }

        Ok(instance)
    }
}

impl fmt::Debug for ResolutionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (settled, in_flight) = self.counts();
        f.debug_struct("ResolutionEngine")
            .field("graph", &self.graph)
            .field("settled", &settled)
            .field("in_flight", &in_flight)
            .finish_non_exhaustive()
    }
}
