//! 容器构建器

use crate::logging::LoggingConfig;
use config_impl::{ConfigFormat, IocConfig};
use di_abstractions::{ComponentDefinition, ModuleLoader};
use di_impl::{IocContainer, ModuleCatalog};
use infrastructure_common::{BoxError, InfrastructureError, Instance, Locator};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// 容器构建器
///
/// 使用建造者模式汇总组件位置配置与模块，构建 IoC 容器。
/// 配置源按添加顺序合并，后添加的覆盖先添加的。
pub struct ContainerBuilder {
    /// 合并后的组件位置
    config: IocConfig,
    /// 构建器上注册的模块
    catalog: ModuleCatalog,
    /// 自定义模块加载器
    loader: Option<Arc<dyn ModuleLoader>>,
    /// 是否启用日志初始化
    logging_enabled: bool,
    /// 日志配置
    logging_config: LoggingConfig,
}

impl ContainerBuilder {
    /// 创建新的容器构建器
    pub fn new() -> Self {
        Self {
            config: IocConfig::new(),
            catalog: ModuleCatalog::new(),
            loader: None,
            logging_enabled: false, // 默认不启用日志初始化
            logging_config: LoggingConfig::default(),
        }
    }

    /// 添加 TOML 配置文件
    ///
    /// 文件内容按 TOML 解析，与扩展名无关。
    pub fn add_config_toml<P: AsRef<Path>>(self, path: P) -> Result<Self, InfrastructureError> {
        self.add_config_file(ConfigFormat::Toml, path.as_ref())
    }

    /// 添加 JSON 配置文件
    pub fn add_config_json<P: AsRef<Path>>(self, path: P) -> Result<Self, InfrastructureError> {
        self.add_config_file(ConfigFormat::Json, path.as_ref())
    }

    /// 添加 YAML 配置文件
    pub fn add_config_yaml<P: AsRef<Path>>(self, path: P) -> Result<Self, InfrastructureError> {
        self.add_config_file(ConfigFormat::Yaml, path.as_ref())
    }

    fn add_config_file(self, format: ConfigFormat, path: &Path) -> Result<Self, InfrastructureError> {
        if !path.exists() {
            return Err(InfrastructureError::BootstrapFailed {
                message: format!("配置文件不存在: {}", path.display()),
            });
        }

        info!("添加 {} 配置文件: {}", format, path.display());
        let config = IocConfig::from_file_as(path, format)?;
        Ok(self.add_config(config))
    }

    /// 添加环境变量覆盖
    pub fn add_config_env_vars<S: AsRef<str>>(mut self, prefix: S) -> Result<Self, InfrastructureError> {
        info!("添加环境变量配置，前缀: {}", prefix.as_ref());
        self.config = self.config.with_env_overrides(prefix.as_ref())?;
        Ok(self)
    }

    /// 合并一份组件位置配置
    pub fn add_config(mut self, config: IocConfig) -> Self {
        debug!("合并 {} 个组件位置", config.len());
        self.config.merge(config);
        self
    }

    /// 添加单个组件位置
    pub fn with_location(
        mut self,
        name: impl Into<String>,
        location: impl Into<Locator>,
    ) -> Result<Self, InfrastructureError> {
        self.config.insert(name, location)?;
        Ok(self)
    }

    /// 注册模块
    pub fn register_module(self, location: impl Into<Locator>, definition: ComponentDefinition) -> Self {
        let location = location.into();
        if self.catalog.register(location.clone(), definition).is_some() {
            debug!("模块 {} 被替换", location);
        }
        self
    }

    /// 设置自定义模块加载器
    ///
    /// 构建器上注册的模块优先，找不到时交给该加载器。
    pub fn with_loader(mut self, loader: Arc<dyn ModuleLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// 配置日志
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = config;
        self.logging_enabled = true; // 启用日志初始化
        self
    }

    /// 构建容器
    pub fn build(self) -> Result<Arc<IocContainer>, InfrastructureError> {
        // 只有在明确配置了日志时才初始化日志
        if self.logging_enabled {
            self.logging_config.install()?;
        }
        info!("开始构建 IoC 容器");

        let loader: Arc<dyn ModuleLoader> = match self.loader {
            Some(fallback) => Arc::new(ChainedLoader {
                catalog: self.catalog,
                fallback,
            }),
            None => Arc::new(self.catalog),
        };
        let container = IocContainer::new(Arc::new(self.config), loader);

        info!("IoC 容器构建完成");
        Ok(container)
    }

    /// 构建容器并预先加载指定组件
    ///
    /// 任意一个组件加载失败，整个构建失败。
    pub async fn build_and_load<I, S>(
        self,
        names: I,
    ) -> Result<(Arc<IocContainer>, HashMap<String, Instance>), InfrastructureError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let container = self.build()?;
        let instances = container.load_many(names).await?;
        info!("启动时加载了 {} 个组件", instances.len());
        Ok((container, instances))
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 先查构建器上注册的模块，再查自定义加载器
struct ChainedLoader {
    catalog: ModuleCatalog,
    fallback: Arc<dyn ModuleLoader>,
}

impl ModuleLoader for ChainedLoader {
    fn load(&self, location: &Locator) -> Result<ComponentDefinition, BoxError> {
        if self.catalog.contains(location) {
            self.catalog.load(location)
        } else {
            self.fallback.load(location)
        }
    }
}
