//! 错误类型定义

use std::sync::Arc;
use thiserror::Error;

/// 组件构造与初始化返回的装箱错误
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 可共享的错误源
///
/// 解析结果会在多个等待者之间共享，因此错误源必须可克隆。
pub type SharedError = Arc<dyn std::error::Error + Send + Sync>;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置文件读取失败: {source}")]
    FileReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("配置解析失败: {source}")]
    ParseError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("不支持的配置文件格式: {path}")]
    UnsupportedFormat { path: String },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },

    #[error("配置键不存在: {key}")]
    KeyNotFound { key: String },
}

impl ConfigError {
    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    /// 创建解析错误
    pub fn parse<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ParseError {
            source: Box::new(error),
        }
    }
}

/// 依赖解析错误类型
///
/// 所有变体都可克隆：同一个组件的解析失败会交给每一个等待它的请求。
#[derive(Error, Debug, Clone)]
pub enum DependencyError {
    #[error("组件配置错误: {component}, 原因: {message}")]
    Configuration { component: String, message: String },

    #[error("组件未注册: {name}")]
    UnknownComponent { name: String },

    #[error("循环依赖检测到: {}", .cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    #[error("组件创建失败: {component}, 原因: {source}")]
    ComponentCreationFailed {
        component: String,
        source: SharedError,
    },

    #[error("组件初始化失败: {component}, 原因: {source}")]
    Initialization {
        component: String,
        source: SharedError,
    },

    #[error("组件类型不匹配: {component}, 期望类型: {expected}")]
    TypeMismatch { component: String, expected: String },
}

impl DependencyError {
    /// 创建配置错误
    pub fn configuration(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// 创建未注册错误
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::UnknownComponent { name: name.into() }
    }

    /// 创建组件构造失败错误
    pub fn creation_failed(component: impl Into<String>, source: BoxError) -> Self {
        Self::ComponentCreationFailed {
            component: component.into(),
            source: Arc::from(source),
        }
    }

    /// 创建初始化失败错误
    pub fn initialization(component: impl Into<String>, source: BoxError) -> Self {
        Self::Initialization {
            component: component.into(),
            source: Arc::from(source),
        }
    }

    /// 创建类型不匹配错误
    pub fn type_mismatch<T: ?Sized>(component: impl Into<String>) -> Self {
        Self::TypeMismatch {
            component: component.into(),
            expected: std::any::type_name::<T>().to_string(),
        }
    }

    /// 循环依赖时返回完整的循环路径
    pub fn cycle(&self) -> Option<&[String]> {
        match self {
            Self::CyclicDependency { cycle } => Some(cycle),
            _ => None,
        }
    }
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("配置错误: {source}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("依赖注入错误: {source}")]
    DependencyError {
        #[from]
        source: DependencyError,
    },

    #[error("基础设施启动失败: {message}")]
    BootstrapFailed { message: String },
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;
