// ==========================================
// 产品参数配置引擎 - 类目绑定仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 红线: 绑定/解绑与 is_global 重算必须在同一事务内完成
// ==========================================
// 说明:
// - 事务以 IMMEDIATE 方式开启，先取得写锁再读取绑定计数，
//   避免两个并发绑定读到同一旧计数
// - is_global 通过单条 UPDATE 子查询重算: is_global = (COUNT(*) = 0)
// ==========================================

use crate::domain::binding::CategoryBinding;
use crate::domain::parameter::Parameter;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::parameter_repo::load_parameters;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::sync::{Arc, Mutex};

const BINDING_COLUMNS: &str = r#"
    category_id, parameter_id, is_required, is_visible, sort_order,
    display_name_ru, display_name_it, default_value, help_text,
    created_at, updated_at
"#;

/// 绑定写入结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingWriteOutcome {
    pub sort_order: i32,
    /// 写入后参数的 is_global
    pub is_global: bool,
}

/// 类目视图: 全局参数 + 本类目绑定参数（同一连接锁内读取，保证一致）
#[derive(Debug, Clone)]
pub struct CategoryParameterView {
    pub global_parameters: Vec<Parameter>,
    pub bound: Vec<(CategoryBinding, Parameter)>,
}

// ==========================================
// CategoryBindingRepository - 类目绑定仓储
// ==========================================
pub struct CategoryBindingRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CategoryBindingRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入绑定并重算 is_global（单事务）
    ///
    /// # 参数
    /// - binding: 绑定记录（sort_order 由 order 参数决定）
    /// - order: 显式顺序；None 时追加到该类目 max(order)+1
    pub fn insert(
        &self,
        binding: &CategoryBinding,
        order: Option<i32>,
    ) -> RepositoryResult<BindingWriteOutcome> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let sort_order = match order {
            Some(o) => o,
            None => {
                let max: Option<i32> = tx.query_row(
                    "SELECT MAX(sort_order) FROM category_binding WHERE category_id = ?1",
                    params![binding.category_id],
                    |row| row.get(0),
                )?;
                max.map(|m| m + 1).unwrap_or(0)
            }
        };

        tx.execute(
            r#"
            INSERT INTO category_binding (
                category_id, parameter_id, is_required, is_visible, sort_order,
                display_name_ru, display_name_it, default_value, help_text,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                binding.category_id,
                binding.parameter_id,
                binding.is_required,
                binding.is_visible,
                sort_order,
                binding.display_name_ru,
                binding.display_name_it,
                binding.default_value,
                binding.help_text,
                binding.created_at,
                binding.updated_at,
            ],
        )?;

        let is_global = recompute_is_global(&tx, &binding.parameter_id)?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(BindingWriteOutcome {
            sort_order,
            is_global,
        })
    }

    /// 删除绑定并重算 is_global（单事务）
    ///
    /// # 返回
    /// - Ok(Some(is_global)): 已删除，返回重算后的 is_global
    /// - Ok(None): 绑定不存在
    pub fn delete(&self, category_id: &str, parameter_id: &str) -> RepositoryResult<Option<bool>> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let changed = tx.execute(
            "DELETE FROM category_binding WHERE category_id = ?1 AND parameter_id = ?2",
            params![category_id, parameter_id],
        )?;
        if changed == 0 {
            return Ok(None);
        }

        let is_global = recompute_is_global(&tx, parameter_id)?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(Some(is_global))
    }

    /// 更新绑定覆写字段
    pub fn update(&self, binding: &CategoryBinding) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            r#"
            UPDATE category_binding SET
                is_required = ?3, is_visible = ?4, sort_order = ?5,
                display_name_ru = ?6, display_name_it = ?7,
                default_value = ?8, help_text = ?9, updated_at = ?10
            WHERE category_id = ?1 AND parameter_id = ?2
            "#,
            params![
                binding.category_id,
                binding.parameter_id,
                binding.is_required,
                binding.is_visible,
                binding.sort_order,
                binding.display_name_ru,
                binding.display_name_it,
                binding.default_value,
                binding.help_text,
                binding.updated_at,
            ],
        )?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "CategoryBinding".to_string(),
                id: format!("{}/{}", binding.category_id, binding.parameter_id),
            });
        }
        Ok(())
    }

    pub fn find(&self, category_id: &str, parameter_id: &str) -> RepositoryResult<Option<CategoryBinding>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM category_binding WHERE category_id = ?1 AND parameter_id = ?2",
            BINDING_COLUMNS
        );
        let binding = conn
            .query_row(&sql, params![category_id, parameter_id], map_binding_row)
            .optional()?;
        Ok(binding)
    }

    /// 查询类目的全部绑定（按 sort_order 排序）
    pub fn list_by_category(&self, category_id: &str) -> RepositoryResult<Vec<CategoryBinding>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM category_binding WHERE category_id = ?1 ORDER BY sort_order ASC, parameter_id ASC",
            BINDING_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let bindings = stmt
            .query_map(params![category_id], map_binding_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(bindings)
    }

    /// 查询参数的全部绑定
    pub fn list_by_parameter(&self, parameter_id: &str) -> RepositoryResult<Vec<CategoryBinding>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM category_binding WHERE parameter_id = ?1 ORDER BY category_id ASC",
            BINDING_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let bindings = stmt
            .query_map(params![parameter_id], map_binding_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(bindings)
    }

    pub fn count_by_parameter(&self, parameter_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM category_binding WHERE parameter_id = ?1",
            params![parameter_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// 读取类目视图（全局参数 + 本类目绑定参数）
    pub fn load_category_view(&self, category_id: &str) -> RepositoryResult<CategoryParameterView> {
        let conn = self.get_conn()?;

        let global_parameters = load_parameters(&conn, "is_global = 1", &[])?;

        let bound_parameters = load_parameters(
            &conn,
            "parameter_id IN (SELECT parameter_id FROM category_binding WHERE category_id = ?1)",
            &[&category_id as &dyn rusqlite::ToSql],
        )?;

        let sql = format!(
            "SELECT {} FROM category_binding WHERE category_id = ?1 ORDER BY sort_order ASC, parameter_id ASC",
            BINDING_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let bindings = stmt
            .query_map(params![category_id], map_binding_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut bound = Vec::with_capacity(bindings.len());
        for binding in bindings {
            let parameter = bound_parameters
                .iter()
                .find(|p| p.parameter_id == binding.parameter_id)
                .cloned()
                .ok_or_else(|| RepositoryError::NotFound {
                    entity: "Parameter".to_string(),
                    id: binding.parameter_id.clone(),
                })?;
            bound.push((binding, parameter));
        }

        Ok(CategoryParameterView {
            global_parameters,
            bound,
        })
    }
}

/// 在事务内重算 is_global 并返回新值
fn recompute_is_global(tx: &Transaction<'_>, parameter_id: &str) -> RepositoryResult<bool> {
    tx.execute(
        r#"
        UPDATE parameter
        SET is_global = ((SELECT COUNT(*) FROM category_binding WHERE parameter_id = ?1) = 0)
        WHERE parameter_id = ?1
        "#,
        params![parameter_id],
    )?;
    let is_global: bool = tx.query_row(
        "SELECT is_global FROM parameter WHERE parameter_id = ?1",
        params![parameter_id],
        |row| row.get(0),
    )?;
    Ok(is_global)
}

fn map_binding_row(row: &Row<'_>) -> rusqlite::Result<CategoryBinding> {
    Ok(CategoryBinding {
        category_id: row.get(0)?,
        parameter_id: row.get(1)?,
        is_required: row.get(2)?,
        is_visible: row.get(3)?,
        sort_order: row.get(4)?,
        display_name_ru: row.get(5)?,
        display_name_it: row.get(6)?,
        default_value: row.get(7)?,
        help_text: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}
