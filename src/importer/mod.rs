// ==========================================
// 产品参数配置引擎 - 导入层
// ==========================================
// 职责: 从 CSV 批量导入参数可选值
// ==========================================

pub mod error;
pub mod value_csv;

pub use error::{ImportError, ImportResult};
pub use value_csv::{import_values_csv, import_values_file, ImportSummary, RejectedRow};
