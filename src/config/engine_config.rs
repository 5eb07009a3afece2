// ==========================================
// 产品参数配置引擎 - 引擎配置
// ==========================================
// 职责: 显式注入到各组件的配置结构（无全局开关）
// ==========================================

use crate::domain::types::Locale;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 描述各段之间的分隔符
    pub description_separator: String,
    /// 尺寸值之间的连接符
    pub dimension_joiner: String,
    /// 面积保留小数位
    pub area_decimals: usize,
    /// 供应商覆写范围是否强制收窄到基础范围内
    ///
    /// false: 覆写值原样生效（可能比基础范围更宽）
    /// true: min 取 max(基础, 覆写)，max 取 min(基础, 覆写)
    pub enforce_override_narrowing: bool,
    /// 命令行等外层未指定语言时使用
    pub default_locale: Locale,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            description_separator: " | ".to_string(),
            dimension_joiner: "×".to_string(),
            area_decimals: 2,
            enforce_override_narrowing: false,
            default_locale: Locale::Ru,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"enforce_override_narrowing": true, "default_locale": "it"}"#)
                .unwrap();
        assert!(config.enforce_override_narrowing);
        assert_eq!(config.default_locale, Locale::It);
        assert_eq!(config.description_separator, " | ");
        assert_eq!(config.area_decimals, 2);
    }
}
