//! 组件位置配置验证

use infrastructure_common::{ConfigError, Locator, CORE_COMPONENT};

/// 验证一条 名称 -> 位置 配置
///
/// 名称不能为空、不能含空白、不能是保留名称 `core`；位置不能为空白。
pub fn validate_entry(name: &str, location: &Locator) -> Result<(), ConfigError> {
    if name.trim().is_empty() {
        return Err(ConfigError::validation("组件名称不能为空"));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(ConfigError::validation(format!("组件名称不能包含空白: {:?}", name)));
    }
    if name == CORE_COMPONENT {
        return Err(ConfigError::validation(format!(
            "{} 是保留名称，不能配置位置",
            CORE_COMPONENT
        )));
    }
    if location.is_blank() {
        return Err(ConfigError::validation(format!("组件 {} 的位置不能为空", name)));
    }
    Ok(())
}
