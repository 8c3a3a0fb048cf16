//! # 基础设施组合层
//!
//! 把组件位置配置、模块和日志组合成一个可用的 IoC 容器。
//!
//! ## 主要功能
//!
//! - **容器构建器**: 使用构建者模式合并配置源并注册模块
//! - **日志配置**: 按需安装 `tracing` 订阅者
//! - **启动预加载**: 构建完成后立即加载指定组件
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use infrastructure_composition::{ContainerBuilder, LoggingConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (container, _instances) = ContainerBuilder::new()
//!         .add_config_toml("config/app.toml")?
//!         .add_config_env_vars("APP_IOC")?
//!         .with_logging(LoggingConfig::development())
//!         .build_and_load(["web"])
//!         .await?;
//!
//!     println!("{:?}", container.stats());
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod logging;

// 重新导出主要类型
pub use builder::ContainerBuilder;
pub use logging::LoggingConfig;

// 重新导出错误类型
pub use infrastructure_common::InfrastructureError;
