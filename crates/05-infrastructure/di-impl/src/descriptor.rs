//! 依赖描述提取
//!
//! 组件的依赖以静态清单声明，这里负责把清单规范化为依赖名称列表。

use di_abstractions::{ComponentDefinition, DependencyManifest, DescriptorExtractor};
use infrastructure_common::DependencyError;
use std::collections::HashSet;
use tracing::debug;

/// 解析参数列表形式的依赖清单
///
/// 接受 `"(db, cache)"` 或 `"db, cache"`；空列表表示没有依赖。
/// 每个名称两侧的空白会被去掉。
pub fn parse_signature(signature: &str) -> Result<Vec<String>, String> {
    let trimmed = signature.trim();
    let inner = match (trimmed.strip_prefix('('), trimmed.ends_with(')')) {
        (Some(rest), true) => &rest[..rest.len() - 1],
        (Some(_), false) => return Err(format!("参数列表缺少右括号: {}", signature)),
        (None, true) => return Err(format!("参数列表缺少左括号: {}", signature)),
        (None, false) => trimmed,
    };

    if inner.contains(['(', ')']) {
        return Err(format!("参数列表括号不匹配: {}", signature));
    }
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    normalize_names(inner.split(','))
}

/// 规范化依赖名称：去掉空白，拒绝空名称、非法字符和重复名称
fn normalize_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<Vec<String>, String> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::new();

    for raw in names {
        let name = raw.trim();
        if name.is_empty() {
            return Err("依赖名称为空".to_string());
        }
        if !name.chars().all(is_name_char) {
            return Err(format!("非法的依赖名称: {}", name));
        }
        if !seen.insert(name) {
            return Err(format!("重复的依赖名称: {}", name));
        }
        normalized.push(name.to_string());
    }

    Ok(normalized)
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | ':' | '$')
}

/// 基于静态清单的依赖描述提取器
#[derive(Debug, Default, Clone, Copy)]
pub struct ManifestExtractor;

impl ManifestExtractor {
    /// 创建新的提取器
    pub fn new() -> Self {
        Self
    }
}

impl DescriptorExtractor for ManifestExtractor {
    fn extract(&self, name: &str, definition: &ComponentDefinition) -> Result<Vec<String>, DependencyError> {
        let extracted = match definition.manifest() {
            DependencyManifest::Names(names) => normalize_names(names.iter().map(String::as_str)),
            DependencyManifest::Signature(signature) => parse_signature(signature),
        };

        let dependencies = extracted.map_err(|message| DependencyError::configuration(name, message))?;
        debug!("组件 {} 声明的依赖: {:?}", name, dependencies);
        Ok(dependencies)
    }
}
