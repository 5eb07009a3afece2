// ==========================================
// 产品参数配置引擎 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod binding;
pub mod configuration;
pub mod directory;
pub mod parameter;
pub mod supplier_override;
pub mod types;
pub mod validation;

// 重导出核心类型
pub use binding::{BindingOverrides, BindingPatch, CategoryBinding, EffectiveParameter};
pub use configuration::{Configuration, ConfigurationDraft, ConfigurationValues, ParameterSnapshot};
pub use directory::{CategoryRecord, SupplierRecord};
pub use parameter::{
    ColorMeta, LocalizedText, NewParameter, NewValue, Parameter, ParameterPatch, ParameterValue,
};
pub use supplier_override::{EffectiveConstraints, SupplierOverride, SupplierOverrideInput};
pub use types::{
    ConfigurationStatus, ConstraintSource, DimensionAxis, Locale, ParameterKind, SystemRole,
};
pub use validation::{LocalizedMessage, ValidationIssue, ValidationResult};
