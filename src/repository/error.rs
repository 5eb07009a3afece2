// ==========================================
// 产品参数配置引擎 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 数据库错误 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    #[error("唯一约束违反: {0}")]
    UniqueConstraintViolation(String),

    #[error("外键约束违反: {0}")]
    ForeignKeyViolation(String),

    /// 记录已处于不可修改状态（如已签发的配置）
    #[error("记录不可修改: {entity} with id={id}")]
    ImmutableRecord { entity: String, id: String },

    // ===== 数据完整性错误 =====
    /// 库中存储了封闭枚举之外的值（如未知参数类型）
    #[error("数据不变量违反: {0}")]
    InvariantViolation(String),

    #[error("序列化失败: {0}")]
    SerializationError(String),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::SerializationError(err.to_string())
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// 行映射时遇到非法枚举值，转换为 rusqlite 的转换错误，
/// 再由调用方映射为 InvariantViolation
pub(crate) fn invalid_enum(column: usize, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        format!("unknown enum value: {}", value).into(),
    )
}

/// 将行映射错误中的非法枚举提升为 InvariantViolation
pub(crate) fn lift_row_error(err: rusqlite::Error) -> RepositoryError {
    match err {
        rusqlite::Error::FromSqlConversionFailure(_, _, ref inner)
            if inner.to_string().starts_with("unknown enum value") =>
        {
            RepositoryError::InvariantViolation(inner.to_string())
        }
        other => other.into(),
    }
}
