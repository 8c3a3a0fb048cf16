//! 依赖图
//!
//! 节点按需生成：只有被请求到的组件才会查询位置、加载定义并提取依赖。
//! 失败不会被缓存，修正配置或模块之后可以再次加载。

use dashmap::DashMap;
use di_abstractions::{ComponentDefinition, ComponentLocator, DescriptorExtractor, ModuleLoader};
use infrastructure_common::{ComponentSpec, DependencyError, CORE_COMPONENT};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// 依赖图节点
#[derive(Debug)]
pub struct GraphNode {
    /// 组件规格
    pub spec: ComponentSpec,
    /// 组件定义
    pub definition: ComponentDefinition,
}

/// 依赖图
pub struct DependencyGraph {
    locator: Arc<dyn ComponentLocator>,
    loader: Arc<dyn ModuleLoader>,
    extractor: Arc<dyn DescriptorExtractor>,
    nodes: DashMap<String, Arc<GraphNode>>,
}

impl DependencyGraph {
    /// 创建新的依赖图
    pub fn new(
        locator: Arc<dyn ComponentLocator>,
        loader: Arc<dyn ModuleLoader>,
        extractor: Arc<dyn DescriptorExtractor>,
    ) -> Self {
        Self {
            locator,
            loader,
            extractor,
            nodes: DashMap::new(),
        }
    }

    /// 组件位置映射
    pub fn locator(&self) -> &Arc<dyn ComponentLocator> {
        &self.locator
    }

    /// 获取节点，首次访问时加载定义并提取依赖
    pub fn node(&self, name: &str) -> Result<Arc<GraphNode>, DependencyError> {
        if let Some(node) = self.nodes.get(name) {
            return Ok(Arc::clone(node.value()));
        }

        let location = self
            .locator
            .lookup(name)
            .ok_or_else(|| DependencyError::unknown(name))?;
        let definition = self.loader.load(&location).map_err(|e| {
            DependencyError::configuration(name, format!("模块加载失败: {}: {}", location, e))
        })?;
        let dependency_names = self.extractor.extract(name, &definition)?;
        debug!("依赖图新增节点: {} ({})", name, location);

        let node = Arc::new(GraphNode {
            spec: ComponentSpec::new(name, location, dependency_names),
            definition,
        });
        let entry = self.nodes.entry(name.to_string()).or_insert(node);
        Ok(Arc::clone(entry.value()))
    }

    /// 直接依赖（声明顺序）
    pub fn direct_dependencies(&self, name: &str) -> Result<Vec<String>, DependencyError> {
        if name == CORE_COMPONENT {
            return Ok(Vec::new());
        }
        Ok(self.node(name)?.spec.dependency_names.clone())
    }

    /// 直接依赖指定组件的已加载组件
    ///
    /// 只统计已经生成的节点。
    pub fn dependents(&self, name: &str) -> Vec<String> {
        let mut dependents: Vec<String> = self
            .nodes
            .iter()
            .filter(|entry| entry.value().spec.depends_on(name))
            .map(|entry| entry.key().clone())
            .collect();
        dependents.sort();
        dependents
    }

    /// 已生成的节点数量
    pub fn materialized(&self) -> usize {
        self.nodes.len()
    }

    /// 计算请求组件的分层构造顺序
    ///
    /// 每一层只依赖之前各层的组件，同层组件之间互不依赖。
    /// `core` 不参与排序。子图中存在循环时返回其中一个完整循环。
    pub fn resolution_plan<S: AsRef<str>>(&self, roots: &[S]) -> Result<Vec<Vec<String>>, DependencyError> {
        let adjacency = self.collect_subgraph(roots)?;

        let mut pending: BTreeMap<&str, usize> = BTreeMap::new();
        let mut reverse: HashMap<&str, Vec<&str>> = HashMap::new();
        for (name, deps) in &adjacency {
            pending.insert(name.as_str(), deps.len());
            for dep in deps {
                reverse.entry(dep.as_str()).or_default().push(name.as_str());
            }
        }

        let mut levels = Vec::new();
        let mut ready: Vec<&str> = pending
            .iter()
            .filter(|(_, remaining)| **remaining == 0)
            .map(|(name, _)| *name)
            .collect();

        while !ready.is_empty() {
            for name in &ready {
                pending.remove(name);
            }

            let mut next = BTreeSet::new();
            for name in &ready {
                for dependent in reverse.get(name).into_iter().flatten() {
                    if let Some(remaining) = pending.get_mut(dependent) {
                        *remaining -= 1;
                        if *remaining == 0 {
                            next.insert(*dependent);
                        }
                    }
                }
            }

            levels.push(ready.iter().map(|name| (*name).to_string()).collect());
            ready = next.into_iter().collect();
        }

        if pending.is_empty() {
            Ok(levels)
        } else {
            Err(DependencyError::CyclicDependency {
                cycle: find_cycle(&adjacency, pending.keys().copied()),
            })
        }
    }

    /// 收集从请求组件出发可达的子图（去掉 `core`）
    fn collect_subgraph<S: AsRef<str>>(
        &self,
        roots: &[S],
    ) -> Result<BTreeMap<String, BTreeSet<String>>, DependencyError> {
        let mut adjacency = BTreeMap::new();
        let mut stack: Vec<String> = roots
            .iter()
            .map(|root| root.as_ref().to_string())
            .filter(|root| root != CORE_COMPONENT)
            .collect();

        while let Some(name) = stack.pop() {
            if adjacency.contains_key(&name) {
                continue;
            }
            let deps: BTreeSet<String> = self
                .direct_dependencies(&name)?
                .into_iter()
                .filter(|dep| dep != CORE_COMPONENT)
                .collect();
            stack.extend(deps.iter().cloned());
            adjacency.insert(name, deps);
        }

        Ok(adjacency)
    }
}

impl fmt::Debug for DependencyGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyGraph")
            .field("materialized", &self.nodes.len())
            .finish_non_exhaustive()
    }
}

/// 使用深度优先搜索找出一个完整的循环
fn find_cycle<'a>(
    adjacency: &'a BTreeMap<String, BTreeSet<String>>,
    candidates: impl Iterator<Item = &'a str>,
) -> Vec<String> {
    let mut visited = HashSet::new();
    for start in candidates {
        let mut path = Vec::new();
        if let Some(cycle) = dfs_cycle(start, adjacency, &mut visited, &mut path) {
            return cycle;
        }
    }
    Vec::new()
}

fn dfs_cycle<'a>(
    current: &'a str,
    adjacency: &'a BTreeMap<String, BTreeSet<String>>,
    visited: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    if let Some(start) = path.iter().position(|name| *name == current) {
        let mut cycle: Vec<String> = path[start..].iter().map(|name| (*name).to_string()).collect();
        cycle.push(current.to_string());
        return Some(cycle);
    }
    if !visited.insert(current) {
        return None;
    }

    path.push(current);
    for dep in adjacency.get(current).into_iter().flatten() {
        if let Some(cycle) = dfs_cycle(dep, adjacency, visited, path) {
            return Some(cycle);
        }
    }
    path.pop();
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ManifestExtractor;
    use crate::loader::ModuleCatalog;
    use infrastructure_common::{Instance, Locator};
    use std::collections::HashMap as Map;

    fn graph(components: &[(&str, &str)]) -> DependencyGraph {
        let catalog = ModuleCatalog::new();
        let mut locations = Map::new();
        for (name, signature) in components {
            let locator = Locator::new(format!("test::{}", name));
            catalog.register(
                locator.clone(),
                di_abstractions::ComponentDefinition::factory(*signature, |_| {
                    Ok(Arc::new(()) as Instance)
                }),
            );
            locations.insert((*name).to_string(), locator);
        }
        DependencyGraph::new(
            Arc::new(locations),
            Arc::new(catalog),
            Arc::new(ManifestExtractor::new()),
        )
    }

    #[test]
    fn nodes_are_materialized_lazily() {
        let graph = graph(&[("a", "(b)"), ("b", ""), ("unused", "")]);
        assert_eq!(graph.materialized(), 0);

        assert_eq!(graph.direct_dependencies("a").unwrap(), vec!["b"]);
        assert_eq!(graph.materialized(), 1);
        assert_eq!(graph.dependents("b"), vec!["a"]);
        assert!(graph.direct_dependencies("core").unwrap().is_empty());
    }

    #[test]
    fn unknown_name_is_reported() {
        let graph = graph(&[("a", "(missing)")]);
        assert!(matches!(
            graph.direct_dependencies("missing"),
            Err(DependencyError::UnknownComponent { name }) if name == "missing"
        ));
    }

    #[test]
    fn missing_module_is_configuration_error() {
        let mut locations = Map::new();
        locations.insert("ghost".to_string(), Locator::from("nowhere"));
        let graph = DependencyGraph::new(
            Arc::new(locations),
            Arc::new(ModuleCatalog::new()),
            Arc::new(ManifestExtractor::new()),
        );
        assert!(matches!(graph.node("ghost"), Err(DependencyError::Configuration { .. })));
        assert_eq!(graph.materialized(), 0);
    }

    #[test]
    fn plan_orders_diamond_in_waves() {
        let graph = graph(&[("a", "(b, c, core)"), ("b", "(d)"), ("c", "(d)"), ("d", "")]);
        let plan = graph.resolution_plan(&["a"]).unwrap();
        assert_eq!(
            plan,
            vec![vec!["d".to_string()], vec!["b".to_string(), "c".to_string()], vec!["a".to_string()]]
        );
    }

    #[test]
    fn plan_reports_cycle() {
        let graph = graph(&[("a", "(b)"), ("b", "(c)"), ("c", "(a)"), ("x", "(a)")]);
        let error = graph.resolution_plan(&["x"]).unwrap_err();
        let cycle = error.cycle().expect("应该是循环依赖错误").to_vec();
        assert_eq!(cycle.first(), cycle.last());
        for name in ["a", "b", "c"] {
            assert!(cycle.iter().any(|entry| entry == name));
        }
        assert!(!cycle.iter().any(|entry| entry == "x"));
    }
}
