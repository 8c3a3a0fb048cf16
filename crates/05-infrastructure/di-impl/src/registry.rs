//! 实例注册表
//!
//! 按名称保存解析状态。所有状态转换都在同一把锁内完成，
//! 同一名称同时只会存在一个进行中的解析。

use di_abstractions::ResolveContext;
use futures::future::{BoxFuture, Shared};
use infrastructure_common::{DependencyError, Instance, ResolutionState};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

/// 共享的解析 future
pub(crate) type SharedResolution = Shared<BoxFuture<'static, Result<Instance, DependencyError>>>;

enum Slot {
    InProgress(SharedResolution),
    Settled(Instance),
}

/// 查询注册表的结果
pub(crate) enum Acquired {
    /// 已完成解析
    Settled(Instance),
    /// 正在解析（可能是刚刚启动的）
    Pending(SharedResolution),
}

#[derive(Default)]
struct RegistryState {
    slots: HashMap<String, Slot>,
    /// 最近一次失败，仅用于状态查询，下一次解析开始时清除
    failures: HashMap<String, DependencyError>,
    /// 等待关系：正在解析的组件 -> 它等待的依赖
    waits: HashMap<String, Vec<String>>,
}

impl RegistryState {
    /// 在等待关系中查找从 `from` 到 `target` 的路径
    fn wait_path(&self, from: &str, target: &str) -> Option<Vec<String>> {
        let mut visited = HashSet::new();
        let mut path = Vec::new();
        self.search_wait_path(from, target, &mut visited, &mut path)
            .then_some(path)
    }

    fn search_wait_path<'a>(
        &'a self,
        current: &'a str,
        target: &str,
        visited: &mut HashSet<&'a str>,
        path: &mut Vec<String>,
    ) -> bool {
        path.push(current.to_string());
        if current == target {
            return true;
        }
        if visited.insert(current) {
            for next in self.waits.get(current).into_iter().flatten() {
                if self.search_wait_path(next, target, visited, path) {
                    return true;
                }
            }
        }
        path.pop();
        false
    }
}

/// 实例注册表
#[derive(Default)]
pub(crate) struct InstanceRegistry {
    state: Mutex<RegistryState>,
}

impl InstanceRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 查询组件，必要时启动新的解析
    ///
    /// 检查顺序：已完成的实例、当前解析链上的循环、跨请求的等待循环、
    /// 进行中的解析。都不满足时调用 `start` 并登记为进行中；
    /// `start` 失败时不登记任何状态。
    pub(crate) fn acquire<F>(
        &self,
        name: &str,
        context: &ResolveContext,
        start: F,
    ) -> Result<Acquired, DependencyError>
    where
        F: FnOnce() -> Result<SharedResolution, DependencyError>,
    {
        let mut state = self.state.lock();

        if let Some(Slot::Settled(instance)) = state.slots.get(name) {
            return Ok(Acquired::Settled(instance.clone()));
        }

        context.check(name)?;

        if let Some(Slot::InProgress(pending)) = state.slots.get(name) {
            if let Some(requester) = context.current() {
                if let Some(path) = state.wait_path(name, requester) {
                    let mut cycle = Vec::with_capacity(path.len() + 1);
                    cycle.push(requester.to_string());
                    cycle.extend(path);
                    return Err(DependencyError::CyclicDependency { cycle });
                }
            }
            return Ok(Acquired::Pending(pending.clone()));
        }

        let pending = start()?;
        state.failures.remove(name);
        state
            .slots
            .insert(name.to_string(), Slot::InProgress(pending.clone()));
        Ok(Acquired::Pending(pending))
    }

    /// 登记组件正在等待的依赖
    pub(crate) fn begin_waiting(&self, name: &str, dependencies: Vec<String>) {
        self.state.lock().waits.insert(name.to_string(), dependencies);
    }

    /// 依赖全部结束后清除等待关系
    pub(crate) fn end_waiting(&self, name: &str) {
        self.state.lock().waits.remove(name);
    }

    /// 记录解析结果
    ///
    /// 成功时转为已完成；失败时移除条目，之后的请求可以重新解析。
    pub(crate) fn finish(&self, name: &str, outcome: &Result<Instance, DependencyError>) {
        let mut state = self.state.lock();
        state.waits.remove(name);
        match outcome {
            Ok(instance) => {
                state
                    .slots
                    .insert(name.to_string(), Slot::Settled(instance.clone()));
            }
            Err(error) => {
                state.slots.remove(name);
                state.failures.insert(name.to_string(), error.clone());
            }
        }
    }

    /// 查询解析状态
    pub(crate) fn state(&self, name: &str) -> ResolutionState {
        let state = self.state.lock();
        match state.slots.get(name) {
            Some(Slot::Settled(_)) => ResolutionState::Settled,
            Some(Slot::InProgress(_)) => ResolutionState::InProgress,
            None => state
                .failures
                .get(name)
                .cloned()
                .map_or(ResolutionState::Unrequested, ResolutionState::Failed),
        }
    }

    /// 已完成与进行中的条目数量
    pub(crate) fn counts(&self) -> (usize, usize) {
        let state = self.state.lock();
        let settled = state
            .slots
            .values()
            .filter(|slot| matches!(slot, Slot::Settled(_)))
            .count();
        (settled, state.slots.len() - settled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::{self, FutureExt};
    use std::sync::Arc;

    fn pending_with(value: u32) -> Result<SharedResolution, DependencyError> {
        Ok(future::ready(Ok(Arc::new(value) as Instance)).boxed().shared())
    }

    #[test]
    fn second_acquire_joins_first() {
        let registry = InstanceRegistry::new();
        let context = ResolveContext::new();

        let first = registry.acquire("a", &context, || pending_with(1)).unwrap();
        assert!(matches!(first, Acquired::Pending(_)));
        assert!(registry.state("a").is_in_progress());

        let second = registry
            .acquire("a", &context, || panic!("不应该再次启动解析"))
            .unwrap();
        assert!(matches!(second, Acquired::Pending(_)));
    }

    #[test]
    fn failure_is_reported_then_cleared_on_retry() {
        let registry = InstanceRegistry::new();
        let context = ResolveContext::new();
        registry.acquire("a", &context, || pending_with(1)).unwrap();

        registry.finish("a", &Err(DependencyError::unknown("b")));
        assert!(registry.state("a").failure().is_some());

        registry.acquire("a", &context, || pending_with(2)).unwrap();
        assert!(registry.state("a").is_in_progress());

        registry.finish("a", &Ok(Arc::new(2_u32) as Instance));
        assert!(registry.state("a").is_settled());
        assert_eq!(registry.counts(), (1, 0));
    }

    #[test]
    fn failed_start_leaves_name_unrequested() {
        let registry = InstanceRegistry::new();
        let context = ResolveContext::new();

        let result = registry.acquire("a", &context, || Err(DependencyError::configuration("a", "无法启动")));
        assert!(matches!(result, Err(DependencyError::Configuration { .. })));
        assert!(matches!(registry.state("a"), ResolutionState::Unrequested));
        assert_eq!(registry.counts(), (0, 0));
    }

    #[test]
    fn wait_cycle_across_requests_is_detected() {
        let registry = InstanceRegistry::new();
        let root = ResolveContext::new();
        registry.acquire("a", &root, || pending_with(1)).unwrap();
        registry.acquire("b", &root, || pending_with(2)).unwrap();
        registry.begin_waiting("a", vec!["b".to_string()]);
        registry.begin_waiting("b", vec!["a".to_string()]);

        // b 的解析链去等待已经在等待 b 的 a
        let result = registry.acquire("a", &root.enter("b"), || pending_with(3));
        match result {
            Err(DependencyError::CyclicDependency { cycle }) => {
                assert_eq!(cycle, vec!["b", "a", "b"]);
            }
            _ => panic!("应该检测到循环依赖"),
        }
    }
}
