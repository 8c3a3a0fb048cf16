//! 日志配置

use infrastructure_common::InfrastructureError;
use tracing::info;
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::EnvFilter;

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: tracing::Level,
    /// 额外的过滤指令，例如 `di_impl=trace`
    pub filter: Option<String>,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            filter: None,
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 创建开发环境日志配置
    pub fn development() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            filter: None,
            show_target: true,
            show_thread_ids: true,
            show_file: true,
            show_line_number: true,
            json_format: false,
        }
    }

    /// 创建生产环境日志配置
    pub fn production() -> Self {
        Self {
            level: tracing::Level::INFO,
            filter: None,
            show_target: false,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: true,
        }
    }

    /// 设置额外的过滤指令
    pub fn with_filter(mut self, directives: impl Into<String>) -> Self {
        self.filter = Some(directives.into());
        self
    }

    /// 构造过滤器：先按级别，再叠加额外指令
    pub fn env_filter(&self) -> Result<EnvFilter, InfrastructureError> {
        let mut filter = EnvFilter::default().add_directive(LevelFilter::from_level(self.level).into());
        if let Some(directives) = &self.filter {
            for directive in directives.split(',').map(str::trim).filter(|d| !d.is_empty()) {
                let parsed = directive.parse::<Directive>().map_err(|e| InfrastructureError::BootstrapFailed {
                    message: format!("日志过滤指令无效: {}: {}", directive, e),
                })?;
                filter = filter.add_directive(parsed);
            }
        }
        Ok(filter)
    }

    /// 安装全局日志订阅者
    ///
    /// 全局订阅者只能安装一次，重复安装返回错误。
    pub fn install(&self) -> Result<(), InfrastructureError> {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(self.env_filter()?)
            .with_target(self.show_target)
            .with_thread_ids(self.show_thread_ids)
            .with_file(self.show_file)
            .with_line_number(self.show_line_number);

        if self.json_format {
            subscriber.json().try_init()
        } else {
            subscriber.try_init()
        }
        .map_err(|e| InfrastructureError::BootstrapFailed {
            message: format!("日志初始化失败: {}", e),
        })?;

        info!("日志系统初始化完成");
        Ok(())
    }
}
