//! # 示例应用程序
//!
//! 演示如何从配置文件构建 IoC 容器并在启动时加载组件

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use di_abstractions::ComponentDefinition;
use di_impl::IocContainer;
use infrastructure_common::{BoxError, Component};
use infrastructure_composition::{ContainerBuilder, LoggingConfig};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "Lorn IoC 示例应用")]
struct Args {
    /// 配置文件路径
    #[arg(short, long, default_value = "config/app.toml")]
    config: String,

    /// 环境变量覆盖前缀
    #[arg(long, default_value = "APP_IOC")]
    env_prefix: String,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 使用 JSON 日志格式
    #[arg(long)]
    json_logs: bool,

    /// 只打印构造顺序，不加载组件
    #[arg(long)]
    plan: bool,

    /// 启动时加载的组件
    #[arg(default_values_t = vec!["greeter".to_string()])]
    components: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let logging = if args.json_logs {
        LoggingConfig::production()
    } else {
        LoggingConfig::development()
    };
    let logging = LoggingConfig {
        level: parse_log_level(&args.log_level),
        ..logging
    };

    let container = build_container(&args, logging)?;

    if args.plan {
        for (level, names) in container.resolution_plan(args.components.as_slice())?.iter().enumerate() {
            println!("{}: {}", level, names.join(", "));
        }
        return Ok(());
    }

    let loaded = container.load_many(&args.components).await?;
    info!("启动时加载了 {} 个组件", loaded.len());

    if let Ok(greeter) = container.get::<Greeter>("greeter").await {
        println!("{}", greeter.greet());
    }

    let stats = container.stats();
    info!(
        "容器统计: 已配置 {}, 已完成 {}, 构造 {}, 初始化 {}",
        stats.registered_components,
        stats.settled_components,
        stats.constructions,
        stats.initializations
    );
    Ok(())
}

/// 构建容器
fn build_container(args: &Args, logging: LoggingConfig) -> Result<Arc<IocContainer>> {
    let mut builder = ContainerBuilder::new()
        .with_logging(logging)
        .with_location("clock", "demo::clock")?
        .with_location("greeter", "demo::greeter")?;

    // 添加配置文件（如果存在）
    let path = std::path::Path::new(&args.config);
    let config_found = path.exists();
    if config_found {
        builder = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => builder.add_config_json(path)?,
            Some("yaml" | "yml") => builder.add_config_yaml(path)?,
            _ => builder.add_config_toml(path)?,
        };
    }

    let container = register_demo_modules(builder)
        .add_config_env_vars(&args.env_prefix)?
        .build()?;

    if !config_found {
        warn!("配置文件不存在，使用内置组件位置: {}", args.config);
    }
    Ok(container)
}

/// 注册示例模块
fn register_demo_modules(builder: ContainerBuilder) -> ContainerBuilder {
    builder
        .register_module("demo::clock", ComponentDefinition::component("()", |_| Ok(Clock::default())))
        .register_module(
            "demo::greeter",
            ComponentDefinition::component("(clock)", |deps| {
                Ok(Greeter {
                    clock: deps.by_name::<Clock>("clock")?,
                })
            }),
        )
}

/// 解析日志级别
fn parse_log_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}

/// 记录启动时间的时钟组件
#[derive(Debug, Default)]
pub struct Clock {
    started_at: AtomicU64,
}

#[async_trait]
impl Component for Clock {
    async fn init(&self) -> Result<(), BoxError> {
        tokio::time::sleep(Duration::from_millis(10)).await;
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        self.started_at.store(now, Ordering::SeqCst);
        info!("时钟组件初始化完成");
        Ok(())
    }
}

/// 问候组件
#[derive(Debug)]
pub struct Greeter {
    clock: Arc<Clock>,
}

impl Component for Greeter {}

impl Greeter {
    /// 生成问候语
    pub fn greet(&self) -> String {
        format!("你好，启动于 {}", self.clock.started_at.load(Ordering::SeqCst))
    }
}
