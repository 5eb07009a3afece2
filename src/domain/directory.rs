// ==========================================
// 产品参数配置引擎 - 类目/供应商目录记录
// ==========================================
// 职责: 外部主数据的最小投影（标识 + 描述所需标签）
// ==========================================

use crate::domain::parameter::LocalizedText;
use crate::domain::types::Locale;
use serde::{Deserialize, Serialize};

/// 类目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub category_id: String,
    pub name: LocalizedText,
    /// 尺寸参数未设置单位时使用的类目单位（如 "mm"）
    pub dimension_unit: Option<String>,
}

/// 供应商
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierRecord {
    pub supplier_id: String,
    pub name: String,
    pub short_name: Option<String>,
}

impl SupplierRecord {
    /// 描述标签: 优先简称，回退全称
    pub fn label(&self) -> &str {
        match self.short_name.as_deref().map(str::trim) {
            Some(short) if !short.is_empty() => short,
            _ => self.name.trim(),
        }
    }
}

impl CategoryRecord {
    pub fn label(&self, locale: Locale) -> &str {
        self.name.get_or_fallback(locale)
    }
}
