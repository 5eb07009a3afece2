// ==========================================
// 产品参数配置引擎 - 配置领域模型
// ==========================================
// 职责: 销售行的具体参数取值 (Configuration) 与签发快照
// 红线: ISSUED 后不可修改；参数以 id 弱引用，渲染可回退到快照
// ==========================================

use crate::domain::parameter::LocalizedText;
use crate::domain::types::{ConfigurationStatus, ParameterKind, SystemRole};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 参数 id → 原始取值（形态取决于参数类型）
pub type ConfigurationValues = BTreeMap<String, serde_json::Value>;

// ==========================================
// Configuration - 配置
// ==========================================
// 对齐: configuration + configuration_value 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    pub configuration_id: String,
    pub category_id: Option<String>,
    pub supplier_id: Option<String>,
    pub values: ConfigurationValues,
    pub status: ConfigurationStatus,
    /// 签发时捕获的参数快照（草稿为空，或保留上次保存时的快照）
    #[serde(default)]
    pub snapshot: Vec<ParameterSnapshot>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub issued_at: Option<NaiveDateTime>,
}

impl Configuration {
    pub fn is_issued(&self) -> bool {
        self.status == ConfigurationStatus::Issued
    }

    pub fn value(&self, parameter_id: &str) -> Option<&serde_json::Value> {
        self.values.get(parameter_id)
    }
}

/// 保存草稿请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigurationDraft {
    /// None 时新建
    #[serde(default)]
    pub configuration_id: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub supplier_id: Option<String>,
    #[serde(default)]
    pub values: ConfigurationValues,
}

impl ConfigurationDraft {
    pub fn new(category_id: &str, supplier_id: &str) -> Self {
        Self {
            configuration_id: None,
            category_id: Some(category_id.to_string()),
            supplier_id: Some(supplier_id.to_string()),
            values: ConfigurationValues::new(),
        }
    }

    pub fn set(mut self, parameter_id: &str, value: serde_json::Value) -> Self {
        self.values.insert(parameter_id.to_string(), value);
        self
    }
}

// ==========================================
// ParameterSnapshot - 参数快照
// ==========================================
// 签发时记录最后已知的参数元数据，参数后续改名/停用值后仍可渲染
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSnapshot {
    pub parameter_id: String,
    pub name: LocalizedText,
    pub kind: ParameterKind,
    pub unit: Option<String>,
    pub system_role: Option<SystemRole>,
    pub is_system: bool,
    pub order: Option<i32>,
    /// 取值对应的目录文本（SELECT / COLOR）
    pub value_text: Option<LocalizedText>,
}
