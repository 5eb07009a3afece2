// ==========================================
// 产品参数配置引擎 - 校验结果模型
// ==========================================
// 职责: 字段级校验问题（机器字段键 + 双语消息）
// ==========================================

use crate::domain::types::Locale;
use serde::{Deserialize, Serialize};

/// 双语消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedMessage {
    pub ru: String,
    pub it: String,
}

impl LocalizedMessage {
    pub fn get(&self, locale: Locale) -> &str {
        match locale {
            Locale::Ru => &self.ru,
            Locale::It => &self.it,
        }
    }
}

/// 单个字段问题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// 机器字段键: 参数 id，或 "category_id" / "supplier_id" 等
    pub field: String,
    /// 问题代码，例如 "required" / "out_of_range"
    pub code: String,
    pub message: LocalizedMessage,
}

/// 校验结果（累积全部问题，不在首个错误处停止）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn from_issues(errors: Vec<ValidationIssue>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn has_error(&self, field: &str, code: &str) -> bool {
        self.errors.iter().any(|e| e.field == field && e.code == code)
    }

    pub fn errors_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a ValidationIssue> + 'a {
        self.errors.iter().filter(move |e| e.field == field)
    }
}
