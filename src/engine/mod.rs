// ==========================================
// 产品参数配置引擎 - 引擎层
// ==========================================
// 职责: 实现业务规则（有效参数集、覆写解析、校验、描述渲染）
// 红线: Engine 不拼 SQL，不做 I/O；同一输入结果确定
// ==========================================

pub mod color;
pub mod config_validator;
pub mod description;
pub mod effective_set;
pub mod normalize;
pub mod override_resolver;
pub mod snapshot;

// 重导出核心引擎
pub use config_validator::{ConfigurationValidator, ConstrainedParameter};
pub use description::{DescriptionGenerator, DescriptionLabels};
pub use effective_set::build_effective_parameters;
pub use override_resolver::SupplierOverrideResolver;
pub use snapshot::{capture_snapshot, restore_all, restore_effective};
