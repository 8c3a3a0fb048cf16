//! 配置文件到容器的端到端集成测试

use anyhow::Result;
use async_trait::async_trait;
use config_impl::IocConfig;
use di_abstractions::{ComponentContainer, ComponentDefinition};
use di_impl::{IocContainer, ModuleCatalog};
use infrastructure_common::{BoxError, Component, DependencyError, Instance, ResolutionState};
use infrastructure_composition::ContainerBuilder;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

/// 存储组件，初始化后才可用
#[derive(Debug, Default)]
struct Repository {
    ready: AtomicBool,
}

#[async_trait]
impl Component for Repository {
    async fn init(&self) -> Result<(), BoxError> {
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.ready.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// 业务服务，要求注入的存储已经初始化
#[derive(Debug)]
struct OrderService {
    repository: Arc<Repository>,
}

impl Component for OrderService {}

/// 审计组件
#[derive(Debug)]
struct Audit;

impl Component for Audit {}

/// 插件宿主：初始化时通过 `core` 按名称加载其他组件
#[derive(Debug)]
struct PluginHost {
    container: Weak<IocContainer>,
    plugin: OnceLock<Arc<Audit>>,
}

#[async_trait]
impl Component for PluginHost {
    async fn init(&self) -> Result<(), BoxError> {
        let container = self.container.upgrade().ok_or("容器已释放")?;
        let audit = container.get::<Audit>("audit").await?;
        self.plugin.set(audit).map_err(|_| "插件重复加载")?;
        Ok(())
    }
}

fn application_modules() -> ModuleCatalog {
    ModuleCatalog::new()
        .with_module(
            "storage::repository",
            ComponentDefinition::component("()", |_| Ok(Repository::default())),
        )
        .with_module(
            "orders::service",
            ComponentDefinition::component(vec!["repository"], |deps| {
                let repository = deps.get::<Repository>(0)?;
                if !repository.ready.load(Ordering::SeqCst) {
                    return Err("存储尚未初始化".into());
                }
                Ok(OrderService { repository })
            }),
        )
        .with_module("audit::log", ComponentDefinition::component("", |_| Ok(Audit)))
        .with_module(
            "plugins::host",
            ComponentDefinition::component("(core)", |deps| {
                let container = deps.get::<IocContainer>(0)?;
                Ok(PluginHost {
                    container: Arc::downgrade(&container),
                    plugin: OnceLock::new(),
                })
            }),
        )
}

const APPLICATION_TOML: &str = r#"
[ioc]
repository = "storage::repository"
orders = { location = "orders::service" }
audit = "audit::log"
plugins = "plugins::host"
"#;

fn application_container() -> Result<Arc<IocContainer>> {
    let config = IocConfig::from_toml_str(APPLICATION_TOML)?;
    Ok(IocContainer::new(Arc::new(config), Arc::new(application_modules())))
}

#[tokio::test]
async fn test_config_driven_resolution() -> Result<()> {
    let container = application_container()?;

    let orders = container.get::<OrderService>("orders").await?;
    assert!(orders.repository.ready.load(Ordering::SeqCst));

    let repository = container.get::<Repository>("repository").await?;
    assert!(Arc::ptr_eq(&orders.repository, &repository));

    assert!(matches!(container.state("audit"), ResolutionState::Unrequested));
    assert_eq!(container.stats().registered_components, 4);
    Ok(())
}

#[tokio::test]
async fn test_component_uses_core_during_init() -> Result<()> {
    let container = application_container()?;

    let host = container.get::<PluginHost>("plugins").await?;
    let audit = container.get::<Audit>("audit").await?;
    let plugin = host.plugin.get().expect("插件应该在初始化时加载");
    assert!(Arc::ptr_eq(plugin, &audit));
    Ok(())
}

#[tokio::test]
async fn test_trait_object_container() -> Result<()> {
    let container: Arc<dyn ComponentContainer> = application_container()?;

    let loaded = container.load_many(&["orders", "core"]).await?;
    assert_eq!(loaded.len(), 2);
    assert!(loaded["core"].clone().downcast::<IocContainer>().is_ok());
    assert!(container.state("repository").is_settled());
    assert!(container.is_registered("core"));
    assert!(!container.is_registered("missing"));
    Ok(())
}

#[tokio::test]
async fn test_cycle_in_configuration_is_isolated() -> Result<()> {
    let modules = application_modules()
        .with_module("cycle::a", ComponentDefinition::factory("(b)", |_| Ok(Arc::new(()) as Instance)))
        .with_module("cycle::b", ComponentDefinition::factory("(a)", |_| Ok(Arc::new(()) as Instance)));
    let config = IocConfig::from_toml_str(APPLICATION_TOML)?
        .with_location("a", "cycle::a")?
        .with_location("b", "cycle::b")?;
    let container = IocContainer::new(Arc::new(config), Arc::new(modules));

    let planned = container.resolution_plan(&["a"]);
    assert!(planned.unwrap_err().cycle().is_some());

    let loaded = tokio::time::timeout(Duration::from_secs(5), container.load("a")).await?;
    match loaded {
        Err(DependencyError::CyclicDependency { cycle }) => assert_eq!(cycle, vec!["a", "b", "a"]),
        other => panic!("应该检测到循环依赖: {:?}", other.map(|_| ())),
    }

    // 循环之外的组件不受影响
    container.get::<OrderService>("orders").await?;
    Ok(())
}

#[tokio::test]
async fn test_builder_end_to_end() -> Result<()> {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
    file.write_all(APPLICATION_TOML.as_bytes())?;

    let (container, instances) = ContainerBuilder::new()
        .add_config_toml(file.path())?
        .with_loader(Arc::new(application_modules()))
        .build_and_load(["orders", "plugins"])
        .await?;

    assert_eq!(instances.len(), 2);
    let stats = container.stats();
    assert_eq!(stats.settled_components, 4);
    assert_eq!(stats.constructions, 4);
    assert_eq!(stats.initializations, 4);
    assert_eq!(stats.in_flight_components, 0);
    Ok(())
}
