//! 配置源实现
//!
//! 把 TOML、JSON、YAML 文档统一读成 `serde_json::Value`，
//! 再按点号路径取出配置节。环境变量覆盖也在这里收集。

use infrastructure_common::ConfigError;
use serde_json::Value;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// 配置文档格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

impl ConfigFormat {
    /// 根据文件扩展名判断格式
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// 解析文档内容
    pub fn parse(self, content: &str) -> Result<Value, ConfigError> {
        match self {
            Self::Toml => toml::from_str(content).map_err(ConfigError::parse),
            Self::Json => serde_json::from_str(content).map_err(ConfigError::parse),
            Self::Yaml => serde_yaml::from_str(content).map_err(ConfigError::parse),
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Toml => "toml",
            Self::Json => "json",
            Self::Yaml => "yaml",
        };
        f.write_str(name)
    }
}

/// 读取配置文件，格式由扩展名决定
pub fn load_document(path: &Path) -> Result<Value, ConfigError> {
    let display = path.display().to_string();
    if !path.exists() {
        return Err(ConfigError::FileNotFound { path: display });
    }
    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| ConfigError::UnsupportedFormat { path: display.clone() })?;
    load_document_as(path, format)
}

/// 按指定格式读取配置文件，不看扩展名
pub fn load_document_as(path: &Path, format: ConfigFormat) -> Result<Value, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    debug!("加载 {} 配置文件: {}", format, path.display());
    let content = std::fs::read_to_string(path)?;
    format.parse(&content)
}

/// 按点号路径取出配置节
///
/// 空路径返回整个文档。
pub fn get_nested_value<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(document);
    }
    path.split('.').try_fold(document, |current, part| current.get(part))
}

/// 环境变量覆盖
///
/// `PREFIX_NAME=location` 覆盖组件 `name` 的位置，名称转为小写。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentOverrides {
    prefix: String,
}

impl EnvironmentOverrides {
    /// 创建新的环境变量覆盖
    pub fn new(prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        if !prefix.is_empty() && !prefix.ends_with('_') {
            prefix.push('_');
        }
        Self { prefix }
    }

    /// 变量前缀（含末尾下划线）
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// 从当前进程环境收集覆盖项
    pub fn collect(&self) -> Vec<(String, String)> {
        self.collect_from(std::env::vars())
    }

    /// 从给定变量集合收集覆盖项，按名称排序
    pub fn collect_from<I>(&self, vars: I) -> Vec<(String, String)>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut overrides: Vec<(String, String)> = vars
            .into_iter()
            .filter_map(|(key, value)| {
                let name = key.strip_prefix(&self.prefix)?;
                (!name.is_empty()).then(|| (name.to_lowercase(), value))
            })
            .collect();
        overrides.sort();
        debug!("环境变量覆盖，前缀 {}: {} 项", self.prefix, overrides.len());
        overrides
    }
}
