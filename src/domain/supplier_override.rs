// ==========================================
// 产品参数配置引擎 - 供应商覆写领域模型
// ==========================================
// 职责: 供应商 ↔ 参数 关联记录，收窄/替换可选值与数值范围
// 约束: 每个 (supplier_id, parameter_id) 至多一条覆写
// ==========================================

use crate::domain::types::{ConstraintSource, ParameterKind};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// SupplierOverride - 供应商覆写
// ==========================================
// 对齐: supplier_override 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierOverride {
    pub supplier_id: String,
    pub parameter_id: String,
    /// 自定义可选值（原始值列表）；存在时整体替换基础列表
    pub custom_values: Option<Vec<String>>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    /// false: 该供应商完全不提供此参数
    pub is_available: bool,
    pub updated_at: NaiveDateTime,
}

/// 设置覆写请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierOverrideInput {
    #[serde(default)]
    pub custom_values: Option<Vec<String>>,
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub max_value: Option<f64>,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

impl Default for SupplierOverrideInput {
    fn default() -> Self {
        Self {
            custom_values: None,
            min_value: None,
            max_value: None,
            is_available: true,
        }
    }
}

impl SupplierOverrideInput {
    pub fn unavailable() -> Self {
        Self {
            is_available: false,
            ..Default::default()
        }
    }
}

// ==========================================
// EffectiveConstraints - 有效约束
// ==========================================
// 基础定义叠加供应商覆写后的最终约束
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveConstraints {
    pub parameter_id: String,
    pub kind: ParameterKind,
    pub is_available: bool,
    /// 允许的原始值（仅 SELECT / COLOR 有意义）
    pub allowed_values: Vec<String>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub source: ConstraintSource,
}

impl EffectiveConstraints {
    /// 精确匹配（区分大小写）
    pub fn allows(&self, raw: &str) -> bool {
        self.allowed_values.iter().any(|v| v == raw)
    }
}
