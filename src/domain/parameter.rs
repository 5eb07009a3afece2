// ==========================================
// 产品参数配置引擎 - 参数目录领域模型
// ==========================================
// 职责: 参数定义 (Parameter) 与可选值 (ParameterValue)
// 红线: is_global == (类目绑定数 == 0)，由仓储层在绑定事务内维护
// 红线: 可选值只做软删除 (is_active)，保证历史配置可渲染
// ==========================================

use crate::domain::types::{Locale, ParameterKind, SystemRole};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// LocalizedText - 双语文本
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub ru: String,
    pub it: String,
}

impl LocalizedText {
    pub fn new(ru: impl Into<String>, it: impl Into<String>) -> Self {
        Self {
            ru: ru.into(),
            it: it.into(),
        }
    }

    /// 两种语言使用相同文本
    pub fn same(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            ru: text.clone(),
            it: text,
        }
    }

    pub fn get(&self, locale: Locale) -> &str {
        match locale {
            Locale::Ru => &self.ru,
            Locale::It => &self.it,
        }
    }

    /// 按语言取值，目标语言为空时回退到另一语言
    pub fn get_or_fallback(&self, locale: Locale) -> &str {
        let primary = self.get(locale);
        if !primary.trim().is_empty() {
            return primary;
        }
        match locale {
            Locale::Ru => &self.it,
            Locale::It => &self.ru,
        }
    }

    /// 任一语言文本包含关键字（小写比较）
    pub fn any_contains(&self, needle: &str) -> bool {
        self.ru.to_lowercase().contains(needle) || self.it.to_lowercase().contains(needle)
    }
}

// ==========================================
// ColorMeta - 颜色元数据
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorMeta {
    pub hex: String,                // 规范化 HEX (#RRGGBB)
    pub standard_code: Option<String>, // 最近的标准色号 (RAL)
}

// ==========================================
// ParameterValue - 参数可选值
// ==========================================
// 对齐: parameter_value 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterValue {
    pub value_id: String,
    pub parameter_id: String,
    pub raw_value: String,            // 配置中保存的原始值（精确匹配）
    pub text: LocalizedText,          // 双语显示文本
    pub display_name: Option<String>, // 可选显示名
    pub color: Option<ColorMeta>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl ParameterValue {
    /// 描述中使用的显示值: 本地化文本 → 显示名 → 原始值
    pub fn display(&self, locale: Locale) -> String {
        let text = self.text.get_or_fallback(locale).trim();
        if !text.is_empty() {
            return text.to_string();
        }
        if let Some(name) = self.display_name.as_deref().map(str::trim) {
            if !name.is_empty() {
                return name.to_string();
            }
        }
        self.raw_value.clone()
    }
}

// ==========================================
// Parameter - 参数定义
// ==========================================
// 对齐: parameter 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub parameter_id: String,
    pub name: LocalizedText,
    pub kind: ParameterKind,
    pub unit: Option<String>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub step_value: Option<f64>,
    pub is_system: bool,
    pub system_role: Option<SystemRole>,
    pub is_global: bool,              // 派生字段: 无类目绑定时为 true
    pub values: Vec<ParameterValue>,  // 按 sort_order 排序（含停用值）
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Parameter {
    pub fn is_model(&self) -> bool {
        self.system_role == Some(SystemRole::Model)
    }

    /// 系统参数与型号参数在读取时强制必填
    pub fn is_forced_required(&self) -> bool {
        self.is_system || self.is_model()
    }

    pub fn active_values(&self) -> impl Iterator<Item = &ParameterValue> {
        self.values.iter().filter(|v| v.is_active)
    }

    /// 按原始值查找（包含停用值，用于历史配置渲染）
    pub fn find_value(&self, raw: &str) -> Option<&ParameterValue> {
        self.values
            .iter()
            .find(|v| v.is_active && v.raw_value == raw)
            .or_else(|| self.values.iter().find(|v| v.raw_value == raw))
    }
}

// ==========================================
// 写入请求
// ==========================================

/// 创建参数请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewParameter {
    pub name: LocalizedText,
    pub kind: ParameterKind,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub max_value: Option<f64>,
    #[serde(default)]
    pub step_value: Option<f64>,
    #[serde(default)]
    pub is_system: bool,
    #[serde(default)]
    pub system_role: Option<SystemRole>,
}

impl NewParameter {
    pub fn new(name: LocalizedText, kind: ParameterKind) -> Self {
        Self {
            name,
            kind,
            unit: None,
            min_value: None,
            max_value: None,
            step_value: None,
            is_system: false,
            system_role: None,
        }
    }
}

/// 更新参数请求（None 表示不修改；Some(None) 表示清空）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterPatch {
    #[serde(default)]
    pub name: Option<LocalizedText>,
    #[serde(default)]
    pub kind: Option<ParameterKind>,
    #[serde(default)]
    pub unit: Option<Option<String>>,
    #[serde(default)]
    pub min_value: Option<Option<f64>>,
    #[serde(default)]
    pub max_value: Option<Option<f64>>,
    #[serde(default)]
    pub step_value: Option<Option<f64>>,
}

/// 新增可选值请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewValue {
    pub raw_value: String,
    #[serde(default)]
    pub text_ru: Option<String>,
    #[serde(default)]
    pub text_it: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub color_hex: Option<String>,
    /// 显式插入位置；None 时追加到 max(order)+1
    #[serde(default)]
    pub position: Option<i32>,
}

impl NewValue {
    pub fn new(raw_value: impl Into<String>) -> Self {
        Self {
            raw_value: raw_value.into(),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, ru: impl Into<String>, it: impl Into<String>) -> Self {
        self.text_ru = Some(ru.into());
        self.text_it = Some(it.into());
        self
    }
}
