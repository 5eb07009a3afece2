// ==========================================
// 产品参数配置引擎 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// 约束: 多记录写入（绑定+is_global、插值+移位、签发）在单事务内完成
// ==========================================

pub mod binding_repo;
pub mod configuration_repo;
pub mod directory_repo;
pub mod error;
pub mod parameter_repo;
pub mod supplier_override_repo;

// 重导出核心仓储
pub use binding_repo::{BindingWriteOutcome, CategoryBindingRepository, CategoryParameterView};
pub use configuration_repo::ConfigurationRepository;
pub use directory_repo::DirectoryRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use parameter_repo::ParameterRepository;
pub use supplier_override_repo::SupplierOverrideRepository;
