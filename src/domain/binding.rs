// ==========================================
// 产品参数配置引擎 - 类目绑定领域模型
// ==========================================
// 职责: 类目 ↔ 参数 关联记录及其本地覆写
// 约束: 每个 (category_id, parameter_id) 至多一条绑定
// ==========================================

use crate::domain::parameter::{LocalizedText, Parameter};
use crate::domain::types::Locale;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// CategoryBinding - 类目绑定
// ==========================================
// 对齐: category_binding 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryBinding {
    pub category_id: String,
    pub parameter_id: String,
    pub is_required: bool,
    pub is_visible: bool,
    pub sort_order: i32,
    pub display_name_ru: Option<String>,
    pub display_name_it: Option<String>,
    pub default_value: Option<String>,
    pub help_text: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// 绑定时的本地覆写
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingOverrides {
    #[serde(default)]
    pub is_required: bool,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    /// None 时追加到该类目 max(order)+1
    #[serde(default)]
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub display_name_ru: Option<String>,
    #[serde(default)]
    pub display_name_it: Option<String>,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub help_text: Option<String>,
}

fn default_visible() -> bool {
    true
}

impl Default for BindingOverrides {
    fn default() -> Self {
        Self {
            is_required: false,
            is_visible: true,
            sort_order: None,
            display_name_ru: None,
            display_name_it: None,
            default_value: None,
            help_text: None,
        }
    }
}

impl BindingOverrides {
    pub fn required() -> Self {
        Self {
            is_required: true,
            ..Default::default()
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.sort_order = Some(order);
        self
    }
}

/// 更新绑定请求（None 表示不修改；Some(None) 表示清空）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BindingPatch {
    #[serde(default)]
    pub is_required: Option<bool>,
    #[serde(default)]
    pub is_visible: Option<bool>,
    #[serde(default)]
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub display_name_ru: Option<Option<String>>,
    #[serde(default)]
    pub display_name_it: Option<Option<String>>,
    #[serde(default)]
    pub default_value: Option<Option<String>>,
    #[serde(default)]
    pub help_text: Option<Option<String>>,
}

// ==========================================
// EffectiveParameter - 类目有效参数
// ==========================================
// 读取时计算: 全局参数 ∪ 本类目绑定参数
// 系统/型号参数的 is_required 在此处强制为 true（读时覆写，不落库）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveParameter {
    pub parameter: Parameter,
    pub binding: Option<CategoryBinding>,
    pub is_required: bool,
    pub is_visible: bool,
    /// 绑定顺序；全局参数为 None
    pub order: Option<i32>,
    pub display_name: LocalizedText,
    pub default_value: Option<String>,
    pub help_text: Option<String>,
}

impl EffectiveParameter {
    pub fn parameter_id(&self) -> &str {
        &self.parameter.parameter_id
    }

    pub fn name(&self, locale: Locale) -> &str {
        self.display_name.get_or_fallback(locale)
    }
}
