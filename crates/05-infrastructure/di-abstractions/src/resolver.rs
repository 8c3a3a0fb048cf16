//! 组件解析抽象接口
//!
//! 提供依赖名称提取与解析链上下文

use crate::factory::ComponentDefinition;
use infrastructure_common::DependencyError;

/// 依赖描述提取器 trait
///
/// 从组件定义中得到按声明顺序排列的依赖名称。
pub trait DescriptorExtractor: Send + Sync {
    /// 提取依赖名称
    ///
    /// 清单格式错误时返回 [`DependencyError::Configuration`]，只影响该组件。
    fn extract(&self, name: &str, definition: &ComponentDefinition) -> Result<Vec<String>, DependencyError>;
}

/// 解析上下文
///
/// 记录当前调用链上正在解析的组件名称，用于检测循环依赖。
#[derive(Debug, Clone, Default)]
pub struct ResolveContext {
    /// 当前解析链
    resolution_chain: Vec<String>,
}

impl ResolveContext {
    /// 创建新的解析上下文
    pub fn new() -> Self {
        Self::default()
    }

    /// 进入下一层解析，返回追加了 `name` 的新上下文
    pub fn enter(&self, name: &str) -> Self {
        let mut resolution_chain = self.resolution_chain.clone();
        resolution_chain.push(name.to_string());
        Self { resolution_chain }
    }

    /// 当前正在解析的组件
    pub fn current(&self) -> Option<&str> {
        self.resolution_chain.last().map(String::as_str)
    }

    /// 解析链中是否包含指定组件
    pub fn contains(&self, name: &str) -> bool {
        self.resolution_chain.iter().any(|entry| entry == name)
    }

    /// 解析深度
    pub fn depth(&self) -> usize {
        self.resolution_chain.len()
    }

    /// 当前解析链
    pub fn chain(&self) -> &[String] {
        &self.resolution_chain
    }

    /// 如果再次进入 `name` 会形成循环，返回完整的循环路径
    ///
    /// 路径从 `name` 第一次出现的位置开始，并以 `name` 结束。
    pub fn cycle_with(&self, name: &str) -> Option<Vec<String>> {
        let start = self.resolution_chain.iter().position(|entry| entry == name)?;
        let mut cycle = self.resolution_chain[start..].to_vec();
        cycle.push(name.to_string());
        Some(cycle)
    }

    /// 检查进入 `name` 是否会形成循环
    pub fn check(&self, name: &str) -> Result<(), DependencyError> {
        match self.cycle_with(name) {
            Some(cycle) => Err(DependencyError::CyclicDependency { cycle }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_does_not_mutate_parent() {
        let root = ResolveContext::new();
        let child = root.enter("a").enter("b");

        assert_eq!(root.depth(), 0);
        assert_eq!(child.chain(), ["a".to_string(), "b".to_string()]);
        assert_eq!(child.current(), Some("b"));
    }

    #[test]
    fn cycle_is_suffix_from_first_occurrence() {
        let context = ResolveContext::new().enter("x").enter("a").enter("b");

        assert_eq!(
            context.cycle_with("a"),
            Some(vec!["a".to_string(), "b".to_string(), "a".to_string()])
        );
        assert!(context.cycle_with("c").is_none());
        assert!(matches!(
            context.check("x"),
            Err(DependencyError::CyclicDependency { cycle }) if cycle.len() == 4
        ));
    }
}
