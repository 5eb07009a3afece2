// ==========================================
// 产品参数配置引擎 - 领域类型定义
// ==========================================
// 职责: 参数类型、系统角色、语言、配置状态等封闭枚举
// 红线: 参数类型为封闭集合，校验与渲染必须穷尽匹配
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 参数类型 (Parameter Kind)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParameterKind {
    Text,    // 自由文本
    Number,  // 数值（可带单位/范围）
    Select,  // 枚举选项
    Color,   // 颜色（目录值或自由 HEX）
    Boolean, // 是/否
}

impl ParameterKind {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ParameterKind::Text => "TEXT",
            ParameterKind::Number => "NUMBER",
            ParameterKind::Select => "SELECT",
            ParameterKind::Color => "COLOR",
            ParameterKind::Boolean => "BOOLEAN",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "TEXT" => Some(ParameterKind::Text),
            "NUMBER" => Some(ParameterKind::Number),
            "SELECT" => Some(ParameterKind::Select),
            "COLOR" => Some(ParameterKind::Color),
            "BOOLEAN" => Some(ParameterKind::Boolean),
            _ => None,
        }
    }

    /// 该类型是否持有可选值列表（仅 SELECT / COLOR）
    pub fn has_values(&self) -> bool {
        matches!(self, ParameterKind::Select | ParameterKind::Color)
    }

    /// 该类型是否支持数值范围（仅 NUMBER）
    pub fn has_range(&self) -> bool {
        matches!(self, ParameterKind::Number)
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 系统参数角色 (System Role)
// ==========================================
// 受保护参数: 宽/高/型号，不可删除、强制必填
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemRole {
    Width,
    Height,
    Model,
}

impl SystemRole {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            SystemRole::Width => "WIDTH",
            SystemRole::Height => "HEIGHT",
            SystemRole::Model => "MODEL",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "WIDTH" => Some(SystemRole::Width),
            "HEIGHT" => Some(SystemRole::Height),
            "MODEL" => Some(SystemRole::Model),
            _ => None,
        }
    }

    /// 有效参数集中的强制排序位次（宽在高之前）
    pub fn sort_rank(&self) -> u8 {
        match self {
            SystemRole::Width => 0,
            SystemRole::Height => 1,
            SystemRole::Model => 2,
        }
    }
}

impl fmt::Display for SystemRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 语言 (Locale)
// ==========================================
// 封闭集合: 俄语 / 意大利语；由调用方显式传入，核心内无全局语言状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Ru,
    It,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::Ru, Locale::It];

    pub fn code(&self) -> &'static str {
        match self {
            Locale::Ru => "ru",
            Locale::It => "it",
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ru" => Ok(Locale::Ru),
            "it" => Ok(Locale::It),
            other => Err(format!("不支持的语言: {}", other)),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ==========================================
// 配置状态 (Configuration Status)
// ==========================================
// DRAFT 可修改；ISSUED 已挂入单据，不可再修改
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigurationStatus {
    Draft,
    Issued,
}

impl ConfigurationStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ConfigurationStatus::Draft => "DRAFT",
            ConfigurationStatus::Issued => "ISSUED",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "DRAFT" => Some(ConfigurationStatus::Draft),
            "ISSUED" => Some(ConfigurationStatus::Issued),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigurationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 约束来源 (Constraint Source)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintSource {
    Base,     // 参数自身定义
    Supplier, // 供应商覆写
}

// ==========================================
// 尺寸轴 (Dimension Axis)
// ==========================================
// 描述生成时的固定语义顺序: 宽 → 高 → 深
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DimensionAxis {
    Width,
    Height,
    Depth,
}
