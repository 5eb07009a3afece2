// ==========================================
// 产品参数配置引擎 - API 层
// ==========================================
// 职责: 提供业务 API 接口，供 CLI 与导入层调用
// ==========================================

pub mod error;
pub mod validator;
pub mod catalog_api;
pub mod binding_api;
pub mod supplier_api;
pub mod directory_api;
pub mod configurator_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use catalog_api::CatalogApi;
pub use binding_api::BindingApi;
pub use supplier_api::SupplierApi;
pub use directory_api::DirectoryApi;
pub use configurator_api::ConfiguratorApi;
