// ==========================================
// 产品参数配置引擎 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository错误为调用方可处理的错误种类
// 种类: NotFound / Conflict / ValidationFailed / InvariantViolation
// ==========================================

use crate::domain::types::Locale;
use crate::domain::validation::ValidationIssue;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务错误
    // ==========================================
    /// 引用的参数/类目/供应商/绑定/配置不存在
    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 重名、重复取值、重复绑定、被引用时删除、删除系统参数
    #[error("冲突: {0}")]
    Conflict(String),

    /// 字段级问题列表（唯一可直接展示给最终用户的错误种类）
    #[error("校验失败: {} 个问题", issues.len())]
    ValidationFailed { issues: Vec<ValidationIssue> },

    /// 防御性检查失败，表示调用方或存储数据存在缺陷
    #[error("不变量违反: {0}")]
    InvariantViolation(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(issues: Vec<ValidationIssue>) -> Self {
        ApiError::ValidationFailed { issues }
    }

    /// 校验问题的本地化消息（非校验错误返回空）
    pub fn messages(&self, locale: Locale) -> Vec<String> {
        match self {
            ApiError::ValidationFailed { issues } => issues
                .iter()
                .map(|i| i.message.get(locale).to_string())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ApiError::Conflict(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::Conflict(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::NotFound(format!("引用的记录不存在: {}", msg))
            }
            RepositoryError::ImmutableRecord { entity, id } => {
                ApiError::Conflict(format!("{}(id={})已不可修改", entity, id))
            }
            RepositoryError::InvariantViolation(msg) => ApiError::InvariantViolation(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::SerializationError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
