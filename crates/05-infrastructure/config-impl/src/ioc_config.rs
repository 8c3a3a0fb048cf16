//! 组件位置配置
//!
//! 配置节中每一项是 `name = "location"`，或者 `name = { location = "..." }`。

use crate::providers::{get_nested_value, load_document, load_document_as, ConfigFormat, EnvironmentOverrides};
use crate::validation::validate_entry;
use di_abstractions::ComponentLocator;
use infrastructure_common::{ConfigError, Locator};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// 配置项的两种写法
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LocatorEntry {
    Plain(Locator),
    Detailed { location: Locator },
}

impl LocatorEntry {
    fn into_locator(self) -> Locator {
        match self {
            Self::Plain(locator) | Self::Detailed { location: locator } => locator,
        }
    }
}

/// 组件名称到位置的映射
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IocConfig {
    locations: BTreeMap<String, Locator>,
}

impl IocConfig {
    /// 默认配置节
    pub const DEFAULT_SECTION: &'static str = "ioc";

    /// 创建空配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 TOML 文本读取默认配置节
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, ConfigFormat::Toml, Self::DEFAULT_SECTION)
    }

    /// 从 JSON 文本读取默认配置节
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, ConfigFormat::Json, Self::DEFAULT_SECTION)
    }

    /// 从 YAML 文本读取默认配置节
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, ConfigFormat::Yaml, Self::DEFAULT_SECTION)
    }

    /// 按格式解析文本并读取指定配置节
    pub fn parse(content: &str, format: ConfigFormat, section: &str) -> Result<Self, ConfigError> {
        let document = format.parse(content)?;
        Self::from_value(&document, section)
    }

    /// 从文件读取默认配置节，格式由扩展名决定
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_file_section(path, Self::DEFAULT_SECTION)
    }

    /// 从文件读取指定配置节
    pub fn from_file_section(path: impl AsRef<Path>, section: &str) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let document = load_document(path)?;
        Self::from_document(path, &document, section)
    }

    /// 按指定格式读取文件的默认配置节，忽略扩展名
    pub fn from_file_as(path: impl AsRef<Path>, format: ConfigFormat) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let document = load_document_as(path, format)?;
        Self::from_document(path, &document, Self::DEFAULT_SECTION)
    }

    fn from_document(path: &Path, document: &Value, section: &str) -> Result<Self, ConfigError> {
        let config = Self::from_value(document, section)?;
        info!("从 {} 加载了 {} 个组件位置", path.display(), config.len());
        Ok(config)
    }

    /// 从已解析的文档读取配置节
    ///
    /// 节路径可以用点号分隔，空路径表示整个文档。节存在但为空时得到空配置。
    pub fn from_value(document: &Value, section: &str) -> Result<Self, ConfigError> {
        let section_value = get_nested_value(document, section).ok_or_else(|| ConfigError::KeyNotFound {
            key: section.to_string(),
        })?;
        if section_value.is_null() {
            return Ok(Self::new());
        }

        let entries: BTreeMap<String, LocatorEntry> =
            serde_json::from_value(section_value.clone()).map_err(ConfigError::parse)?;

        let mut config = Self::new();
        for (name, entry) in entries {
            config.insert(name, entry.into_locator())?;
        }
        Ok(config)
    }

    /// 添加或替换一条位置配置
    pub fn insert(&mut self, name: impl Into<String>, location: impl Into<Locator>) -> Result<(), ConfigError> {
        let name = name.into();
        let location = location.into();
        validate_entry(&name, &location)?;
        if let Some(previous) = self.locations.insert(name.clone(), location) {
            debug!("组件 {} 的位置被覆盖，原位置: {}", name, previous);
        }
        Ok(())
    }

    /// 链式添加位置配置
    pub fn with_location(mut self, name: impl Into<String>, location: impl Into<Locator>) -> Result<Self, ConfigError> {
        self.insert(name, location)?;
        Ok(self)
    }

    /// 应用当前进程的环境变量覆盖
    pub fn with_env_overrides(self, prefix: &str) -> Result<Self, ConfigError> {
        let overrides = EnvironmentOverrides::new(prefix).collect();
        self.with_overrides(overrides)
    }

    /// 应用给定的覆盖项
    pub fn with_overrides<I>(mut self, overrides: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, location) in overrides {
            self.insert(name, location)?;
        }
        Ok(self)
    }

    /// 合并另一份配置，同名项以 `other` 为准
    pub fn merge(&mut self, other: IocConfig) {
        for (name, location) in other.locations {
            if let Some(previous) = self.locations.insert(name.clone(), location) {
                debug!("合并配置时覆盖组件 {}，原位置: {}", name, previous);
            }
        }
    }

    /// 查询组件位置
    pub fn get(&self, name: &str) -> Option<&Locator> {
        self.locations.get(name)
    }

    /// 配置项数量
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// 按名称顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Locator)> {
        self.locations.iter().map(|(name, location)| (name.as_str(), location))
    }
}

impl ComponentLocator for IocConfig {
    fn lookup(&self, name: &str) -> Option<Locator> {
        self.locations.get(name).cloned()
    }

    fn names(&self) -> Vec<String> {
        self.locations.keys().cloned().collect()
    }
}
