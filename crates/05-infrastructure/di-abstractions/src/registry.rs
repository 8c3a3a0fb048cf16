//! 组件位置映射抽象接口

use infrastructure_common::Locator;
use std::collections::{BTreeMap, HashMap};

/// 组件位置映射 trait
///
/// 容器只需要按名称查询位置；映射如何从配置文件得到不属于容器的职责。
pub trait ComponentLocator: Send + Sync {
    /// 查询组件位置
    fn lookup(&self, name: &str) -> Option<Locator>;

    /// 所有已配置的组件名称
    fn names(&self) -> Vec<String>;

    /// 是否配置了指定组件
    fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }
}

impl ComponentLocator for HashMap<String, Locator> {
    fn lookup(&self, name: &str) -> Option<Locator> {
        self.get(name).cloned()
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.keys().cloned().collect();
        names.sort();
        names
    }
}

impl ComponentLocator for BTreeMap<String, Locator> {
    fn lookup(&self, name: &str) -> Option<Locator> {
        self.get(name).cloned()
    }

    fn names(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_map_locator_lists_sorted_names() {
        let mut locations = HashMap::new();
        locations.insert("web".to_string(), Locator::from("app::web"));
        locations.insert("db".to_string(), Locator::from("app::db"));

        assert_eq!(locations.names(), vec!["db".to_string(), "web".to_string()]);
        assert_eq!(locations.lookup("db"), Some(Locator::from("app::db")));
        assert!(!locations.contains("cache"));
    }
}
