// ==========================================
// 产品参数配置引擎 - 应用层
// ==========================================
// 职责: 装配仓储与 API，供 CLI 使用
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
