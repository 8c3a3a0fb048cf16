//! 依赖注入容器抽象接口
//!
//! 提供面向应用代码的组件加载接口

use async_trait::async_trait;
use infrastructure_common::{downcast_instance, DependencyError, Instance, ResolutionState};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// 依赖注入容器 trait
#[async_trait]
pub trait ComponentContainer: Send + Sync {
    /// 加载单个组件
    ///
    /// 实现可以要求调用方处于特定的异步运行时中。
    async fn load(&self, name: &str) -> Result<Instance, DependencyError>;

    /// 加载多个组件
    ///
    /// 全部成功才返回；任意一个失败，整个请求以该错误失败。
    async fn load_many(&self, names: &[&str]) -> Result<HashMap<String, Instance>, DependencyError>;

    /// 查询组件的解析状态
    fn state(&self, name: &str) -> ResolutionState;

    /// 检查组件是否已配置位置
    fn is_registered(&self, name: &str) -> bool;

    /// 获取容器统计信息
    fn stats(&self) -> ContainerStats;

    /// 加载组件并转型为具体类型
    async fn get<T>(&self, name: &str) -> Result<Arc<T>, DependencyError>
    where
        Self: Sized,
        T: Any + Send + Sync,
    {
        let instance = self.load(name).await?;
        downcast_instance::<T>(&instance).ok_or_else(|| DependencyError::type_mismatch::<T>(name))
    }
}

/// 容器统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerStats {
    /// 已配置组件数量
    pub registered_components: usize,
    /// 已完成解析的组件数量
    pub settled_components: usize,
    /// 正在解析的组件数量
    pub in_flight_components: usize,
    /// 构造函数调用次数
    pub constructions: usize,
    /// 初始化调用次数
    pub initializations: usize,
    /// 解析错误数量
    pub resolution_errors: usize,
}
