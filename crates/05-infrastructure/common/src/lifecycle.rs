//! 组件解析状态

use crate::errors::DependencyError;

/// 单个组件名称的解析状态
///
/// 状态转换：`Unrequested -> InProgress -> Settled | Failed`。
/// 失败不会被永久缓存，之后独立的加载请求会从头重新解析。
#[derive(Debug, Clone, Default)]
pub enum ResolutionState {
    /// 尚未请求
    #[default]
    Unrequested,
    /// 解析中
    InProgress,
    /// 已构造并完成初始化
    Settled,
    /// 最近一次解析失败
    Failed(DependencyError),
}

impl ResolutionState {
    /// 是否已完成解析
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Settled)
    }

    /// 是否正在解析
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::InProgress)
    }

    /// 最近一次失败的错误
    pub fn failure(&self) -> Option<&DependencyError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }
}
