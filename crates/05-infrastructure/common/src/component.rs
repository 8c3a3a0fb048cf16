//! 组件基础接口定义
//!
//! 提供容器管理的组件可以实现的基础 trait

use crate::errors::BoxError;
use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;

/// 容器中保存的已解析组件实例
///
/// 实例按名称管理，具体类型在取用时再向下转型。
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 组件基础 trait
///
/// 通过 `ComponentDefinition::component` 注册的类型必须实现此 trait。
/// 容器在构造完成后恰好调用一次 [`Component::init`]，
/// 初始化成功之前，组件不会交给任何依赖它的组件。
#[async_trait]
pub trait Component: Send + Sync + 'static {
    /// 异步初始化，默认不做任何事
    async fn init(&self) -> Result<(), BoxError> {
        Ok(())
    }
}

/// 将实例向下转型为具体类型
pub fn downcast_instance<T>(instance: &Instance) -> Option<Arc<T>>
where
    T: Any + Send + Sync,
{
    Arc::clone(instance).downcast::<T>().ok()
}
